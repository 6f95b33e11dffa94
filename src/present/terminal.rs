use std::io::Write;

use colored::Colorize;

use super::{DisplayValue, ReviewPresenter, ReviewRow};
use crate::locale::Locale;

/// Plain console rendering of the review dialog.
pub struct TerminalPresenter<W: Write> {
    out: W,
    locale: Locale,
    focused: Option<usize>,
    open: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, locale: Locale) -> Self {
        Self {
            out,
            locale,
            focused: None,
            open: false,
        }
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn display(&self, value: &DisplayValue) -> String {
        match value {
            DisplayValue::Empty => self.locale.empty_marker().dimmed().italic().to_string(),
            DisplayValue::Text(s) => s.clone(),
        }
    }

    fn tag(&self, tag: &str) -> String {
        let colored_tag = match tag {
            "ERR" => tag.bold().red(),
            "WRN" => tag.bold().yellow(),
            _ => tag.bold().cyan(),
        };
        format!("{}{}{}", "[".bold().white(), colored_tag, "]".bold().white())
    }
}

impl<W: Write> ReviewPresenter for TerminalPresenter<W> {
    fn present(&mut self, rows: &[ReviewRow]) {
        self.open = true;
        self.focused = None;
        let _ = writeln!(self.out, ":: {:<10}: {}", "Changes", rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let _ = writeln!(
                self.out,
                "  {:>2}. {} {}",
                idx + 1,
                row.label.bold(),
                format!("[{}]", row.key).dimmed()
            );
            let _ = writeln!(
                self.out,
                "      {} {} {}",
                self.display(&row.old_display),
                "->".dimmed(),
                self.display(&row.new_display).green()
            );
        }
    }

    fn focus_reason(&mut self, index: usize) {
        self.focused = Some(index);
    }

    fn update_reasons(&mut self, _rows: &[ReviewRow]) {}

    fn mark_invalid(&mut self, rows: &[ReviewRow]) {
        let tag = self.tag("ERR");
        for (idx, row) in rows.iter().enumerate().filter(|(_, r)| r.invalid) {
            let _ = writeln!(
                self.out,
                "{} {:>2}. {}: reason required",
                tag,
                idx + 1,
                row.label
            );
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.focused = None;
        let _ = self.out.flush();
    }
}
