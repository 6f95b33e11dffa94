use super::{DisplayValue, ReviewPresenter, ReviewRow};
use crate::locale::Locale;

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

struct Labels {
    title: &'static str,
    field: &'static str,
    before: &'static str,
    after: &'static str,
    reason: &'static str,
    common: &'static str,
    apply: &'static str,
    cancel: &'static str,
    confirm: &'static str,
    required: &'static str,
}

fn labels(locale: Locale) -> Labels {
    match locale {
        Locale::En => Labels {
            title: "Confirm changes",
            field: "Field",
            before: "Before",
            after: "After",
            reason: "Reason for change",
            common: "Same reason for all changes",
            apply: "Apply to all",
            cancel: "Cancel",
            confirm: "Confirm and save",
            required: "A reason is required.",
        },
        Locale::Es => Labels {
            title: "Confirmar cambios",
            field: "Campo",
            before: "Antes",
            after: "Después",
            reason: "Motivo del cambio",
            common: "Mismo motivo para todos los cambios",
            apply: "Aplicar a todos",
            cancel: "Cancelar",
            confirm: "Confirmar y guardar",
            required: "El motivo es obligatorio.",
        },
    }
}

/// Server-side rendering of the review dialog as an HTML fragment.
pub struct HtmlPresenter {
    locale: Locale,
    rows: Vec<ReviewRow>,
    focused: Option<usize>,
    open: bool,
}

impl HtmlPresenter {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            rows: Vec::new(),
            focused: None,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn cell(&self, value: &DisplayValue) -> String {
        match value {
            DisplayValue::Empty => format!(
                r#"<em class="empty">{}</em>"#,
                escape_html(self.locale.empty_marker())
            ),
            DisplayValue::Text(s) => escape_html(s),
        }
    }

    /// Markup of the dialog in its current state; empty once closed.
    pub fn render(&self) -> String {
        if !self.open {
            return String::new();
        }
        let l = labels(self.locale);
        let mut out = String::new();
        out.push_str(&format!(
            "<div class=\"modal change-review\" role=\"dialog\" aria-modal=\"true\" lang=\"{}\">\n",
            self.locale.code()
        ));
        out.push_str(&format!("  <h2>{}</h2>\n", escape_html(l.title)));
        out.push_str("  <div class=\"common-reason\">\n");
        out.push_str(&format!(
            "    <input type=\"text\" name=\"common_reason\" placeholder=\"{}\"/>\n",
            escape_html(l.common)
        ));
        out.push_str(&format!(
            "    <button type=\"button\" data-action=\"apply-common\">{}</button>\n",
            escape_html(l.apply)
        ));
        out.push_str("  </div>\n");
        out.push_str("  <table>\n");
        out.push_str(&format!(
            "    <thead><tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr></thead>\n",
            escape_html(l.field),
            escape_html(l.before),
            escape_html(l.after),
            escape_html(l.reason)
        ));
        out.push_str("    <tbody>\n");
        for (idx, row) in self.rows.iter().enumerate() {
            let key = escape_html(&row.key);
            let class = if row.invalid { " class=\"is-invalid\"" } else { "" };
            let autofocus = if self.focused == Some(idx) { " autofocus" } else { "" };
            out.push_str(&format!("      <tr data-key=\"{key}\"{class}>\n"));
            out.push_str(&format!(
                "        <td>{} <code>{}</code></td>\n",
                escape_html(&row.label),
                key
            ));
            out.push_str(&format!("        <td>{}</td>\n", self.cell(&row.old_display)));
            out.push_str(&format!("        <td>{}</td>\n", self.cell(&row.new_display)));
            out.push_str(&format!(
                "        <td><input type=\"text\" name=\"reason[{key}]\" value=\"{}\" required{autofocus}/>",
                escape_html(&row.reason)
            ));
            if row.invalid {
                out.push_str(&format!(
                    "<div class=\"invalid-feedback\">{}</div>",
                    escape_html(l.required)
                ));
            }
            out.push_str("</td>\n");
            out.push_str("      </tr>\n");
        }
        out.push_str("    </tbody>\n");
        out.push_str("  </table>\n");
        out.push_str(&format!(
            "  <button type=\"button\" data-action=\"cancel\">{}</button>\n",
            escape_html(l.cancel)
        ));
        out.push_str(&format!(
            "  <button type=\"submit\" data-action=\"confirm\">{}</button>\n",
            escape_html(l.confirm)
        ));
        out.push_str("</div>\n");
        out
    }
}

impl ReviewPresenter for HtmlPresenter {
    fn present(&mut self, rows: &[ReviewRow]) {
        self.rows = rows.to_vec();
        self.focused = None;
        self.open = true;
    }

    fn focus_reason(&mut self, index: usize) {
        if index < self.rows.len() {
            self.focused = Some(index);
        }
    }

    fn update_reasons(&mut self, rows: &[ReviewRow]) {
        self.rows = rows.to_vec();
    }

    fn mark_invalid(&mut self, rows: &[ReviewRow]) {
        self.rows = rows.to_vec();
        self.focused = rows.iter().position(|r| r.invalid).or(self.focused);
    }

    fn close(&mut self) {
        self.open = false;
        self.rows.clear();
        self.focused = None;
    }
}
