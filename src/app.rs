use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::differ::{DiffOptions, Differ, DEFAULT_REPEATING_GROUP_PATTERN};
use crate::locale::Locale;
use crate::model::{ChangeDocument, ChangedField, DescriptorSource};
use crate::normalize::NormalizeOptions;
use crate::output::{self, OutputFormat};
use crate::present::{self, HtmlPresenter, ReviewPresenter, ReviewRow, TerminalPresenter};
use crate::review::{ReviewError, ReviewSession, ReviewState, Submission};
use crate::table::{self, Pagination};

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn log_tag(tag: &str, message: &str) {
    let colored_tag = match tag {
        "ERR" => tag.bold().red(),
        "WRN" => tag.bold().yellow(),
        _ => tag.bold().cyan(),
    };
    eprintln!(
        "{}{}{} {}",
        "[".bold().white(),
        colored_tag,
        "]".bold().white(),
        message
    );
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Clone, Debug)]
struct RunConfig {
    input: PathBuf,
    locale: Locale,
    verbose: u8,
    no_color: bool,
    diff_only: bool,
    interactive: bool,
    reasons: Vec<(String, String)>,
    reasons_file: Option<PathBuf>,
    common_reason: Option<String>,
    diff_options: DiffOptions,
    search: Option<String>,
    page: usize,
    page_size: usize,
    html: Option<PathBuf>,
    output: Option<PathBuf>,
    output_format: OutputFormat,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let locale_raw = args.lang.or(cfg.locale).unwrap_or_else(|| "en".to_string());
    let locale = Locale::parse(&locale_raw)
        .ok_or_else(|| format!("invalid locale '{locale_raw}', expected en or es"))?;

    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text or json"))?,
        None => args
            .output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(20);
    if page_size == 0 {
        return Err("invalid page_size in config, expected positive integer".to_string());
    }

    let mut excluded_keys = cfg.excluded_keys.unwrap_or_default();
    if let Some(raw) = args.exclude.as_deref() {
        for key in crate::utils::parse_csv_list(raw)? {
            if !excluded_keys.contains(&key) {
                excluded_keys.push(key);
            }
        }
    }

    let mut normalize = NormalizeOptions::default();
    if let Some(markers) = cfg.empty_markers {
        normalize.empty_markers = markers;
    }

    let diff_options = DiffOptions {
        normalize,
        repeating_group_pattern: args
            .repeating_group_pattern
            .or(cfg.repeating_group_pattern)
            .unwrap_or_else(|| DEFAULT_REPEATING_GROUP_PATTERN.to_string()),
        excluded_keys,
    };

    let reasons = args
        .reason
        .iter()
        .map(|raw| crate::utils::parse_reason_assignment(raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RunConfig {
        input: config::expand_tilde(args.input.as_deref().unwrap_or_default().trim()),
        locale,
        verbose: args.verbose,
        no_color,
        diff_only: args.diff_only,
        interactive: args.interactive,
        reasons,
        reasons_file: args.reasons_file.as_deref().map(config::expand_tilde),
        common_reason: args.common_reason,
        diff_options,
        search: args.search,
        page: args.page.unwrap_or(1),
        page_size,
        html: args.html.as_deref().map(config::expand_tilde),
        output: args.output.as_deref().map(config::expand_tilde),
        output_format,
    })
}

/// Terminal rendering on stderr plus an optional HTML copy of the dialog.
struct CliPresenter {
    terminal: TerminalPresenter<std::io::Stderr>,
    html: Option<HtmlPresenter>,
    html_snapshot: Option<String>,
}

impl CliPresenter {
    fn new(locale: Locale, with_html: bool) -> Self {
        Self {
            terminal: TerminalPresenter::new(std::io::stderr(), locale),
            html: with_html.then(|| HtmlPresenter::new(locale)),
            html_snapshot: None,
        }
    }

    fn snapshot_html(&mut self) {
        if let Some(html) = self.html.as_ref() {
            self.html_snapshot = Some(html.render());
        }
    }
}

impl ReviewPresenter for CliPresenter {
    fn present(&mut self, rows: &[ReviewRow]) {
        self.terminal.present(rows);
        if let Some(html) = self.html.as_mut() {
            html.present(rows);
        }
    }

    fn focus_reason(&mut self, index: usize) {
        self.terminal.focus_reason(index);
        if let Some(html) = self.html.as_mut() {
            html.focus_reason(index);
        }
        self.snapshot_html();
    }

    fn update_reasons(&mut self, rows: &[ReviewRow]) {
        self.terminal.update_reasons(rows);
        if let Some(html) = self.html.as_mut() {
            html.update_reasons(rows);
        }
        self.snapshot_html();
    }

    fn mark_invalid(&mut self, rows: &[ReviewRow]) {
        self.terminal.mark_invalid(rows);
        if let Some(html) = self.html.as_mut() {
            html.mark_invalid(rows);
        }
        self.snapshot_html();
    }

    fn close(&mut self) {
        self.terminal.close();
        if let Some(html) = self.html.as_mut() {
            html.close();
        }
    }
}

fn write_result(path: Option<&Path>, bytes: &[u8]) -> Result<(), String> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .map_err(|e| format!("failed to write output file '{}': {e}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("failed to write output: {e}"))
        }
    }
}

fn load_reasons_file(path: &Path) -> Result<BTreeMap<String, String>, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read reasons file '{}': {e}", path.display()))?;
    serde_yaml::from_str::<BTreeMap<String, String>>(&contents)
        .map_err(|e| format!("failed to parse reasons file '{}': {e}", path.display()))
}

fn log_changes(run: &RunConfig, changes: &[ChangedField]) {
    for change in changes {
        if change.descriptor_source == DescriptorSource::Fallback {
            log_tag(
                "WRN",
                &format!("no descriptor for changed field '{}', shown as text", change.key),
            );
        }
        if run.verbose > 1 {
            log_tag(
                "INF",
                &format!(
                    "{} ({}): '{}' -> '{}'",
                    change.key,
                    change.descriptor.field_type.as_str(),
                    change.old_normalized,
                    change.new_normalized
                ),
            );
        }
    }
}

fn run_listing(run: &RunConfig, changes: &[ChangedField]) -> Result<(), String> {
    let rows = present::build_rows(changes, run.locale);
    let query = run.search.as_deref().unwrap_or("");
    let matched_keys: Vec<&str> = table::search_rows(&rows, query)
        .into_iter()
        .map(|r| r.key.as_str())
        .collect();
    let (changes, rows): (Vec<ChangedField>, Vec<ReviewRow>) = changes
        .iter()
        .zip(rows.iter())
        .filter(|(c, _)| matched_keys.contains(&c.key.as_str()))
        .map(|(c, r)| (c.clone(), r.clone()))
        .unzip();

    let pagination = Pagination::new(run.page, run.page_size, rows.len());
    if run.verbose > 0 {
        format_kv_line("Matched", &rows.len().to_string());
        format_kv_line(
            "Page",
            &format!("{}/{}", pagination.page(), pagination.total_pages()),
        );
    }
    let records = output::build_records(
        pagination.slice(&changes),
        pagination.slice(&rows),
        run.locale,
    );
    write_result(run.output.as_deref(), &output::render_diff(&records, run.output_format))
}

fn apply_supplied_reasons<P: ReviewPresenter>(
    run: &RunConfig,
    session: &mut ReviewSession<'_, P>,
) -> Result<(), String> {
    if let Some(common) = run.common_reason.as_deref() {
        let applied = session.apply_common_reason(common).map_err(|e| e.to_string())?;
        if !applied {
            log_tag("WRN", "common reason is blank, ignored");
        }
    }

    let mut supplied: Vec<(String, String)> = Vec::new();
    if let Some(path) = run.reasons_file.as_ref() {
        supplied.extend(load_reasons_file(path)?);
    }
    supplied.extend(run.reasons.iter().cloned());

    for (key, text) in supplied {
        if text.trim().is_empty() {
            log_tag("WRN", &format!("reason for '{key}' is blank, ignored"));
            continue;
        }
        match session.set_reason(&key, &text) {
            Ok(()) => {}
            Err(ReviewError::UnknownField(key)) => {
                log_tag("WRN", &format!("reason for '{key}' ignored, field is not changed"));
            }
            Err(e) => return Err(e.to_string()),
        }
    }
    Ok(())
}

enum PromptOutcome {
    Submit,
    Cancel,
    Eof,
}

/// Text after `:all`, if the line is that command.
fn parse_all_command(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix(":all")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn prompt_reasons<P: ReviewPresenter, R: BufRead>(
    session: &mut ReviewSession<'_, P>,
    input: &mut R,
    start: usize,
) -> Result<PromptOutcome, String> {
    let pending: Vec<usize> = (0..session.rows().len())
        .cycle()
        .skip(start)
        .take(session.rows().len())
        .filter(|&idx| session.rows()[idx].reason.trim().is_empty())
        .collect();

    for idx in pending {
        if !session.rows()[idx].reason.trim().is_empty() {
            continue;
        }
        let row = &session.rows()[idx];
        eprint!("reason for {} [{}]: ", row.label.bold(), row.key);
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| format!("failed to read reason: {e}"))?;
        if read == 0 {
            return Ok(PromptOutcome::Eof);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim() == ":cancel" {
            return Ok(PromptOutcome::Cancel);
        }
        if let Some(common) = parse_all_command(line) {
            let applied = session.apply_common_reason(common).map_err(|e| e.to_string())?;
            if !applied {
                log_tag("WRN", "common reason is blank, ignored");
            }
            return Ok(PromptOutcome::Submit);
        }
        session.set_reason_at(idx, line).map_err(|e| e.to_string())?;
    }
    Ok(PromptOutcome::Submit)
}

fn run_review<R: BufRead>(
    run: &RunConfig,
    changes: Vec<ChangedField>,
    input: &mut R,
) -> Result<(Submission, Option<String>), String> {
    let completed: RefCell<Option<Submission>> = RefCell::new(None);
    let presenter = CliPresenter::new(run.locale, run.html.is_some());
    let mut session = ReviewSession::new(presenter, run.locale);

    session
        .open(changes, |submission| {
            *completed.borrow_mut() = Some(submission.clone());
        })
        .map_err(|e| e.to_string())?;

    if session.state() == ReviewState::Reviewing {
        apply_supplied_reasons(run, &mut session)?;

        let mut start = session.presenter().terminal.focused().unwrap_or(0);
        loop {
            let mut exhausted = !run.interactive;
            if run.interactive {
                match prompt_reasons(&mut session, input, start)? {
                    PromptOutcome::Submit => {}
                    PromptOutcome::Eof => exhausted = true,
                    PromptOutcome::Cancel => {
                        session.cancel().map_err(|e| e.to_string())?;
                        return Err("review cancelled".to_string());
                    }
                }
            }
            match session.submit() {
                Ok(_) => break,
                Err(ReviewError::Validation(err)) if !exhausted => {
                    start = session
                        .rows()
                        .iter()
                        .position(|r| r.invalid)
                        .unwrap_or(0);
                    log_tag("ERR", &err.to_string());
                }
                Err(e) => return Err(e.to_string()),
            }
        }
    }

    let html = session.presenter_mut().html_snapshot.take();
    drop(session);
    let submission = completed
        .into_inner()
        .ok_or_else(|| "review finished without a submission".to_string())?;
    Ok((submission, html))
}

fn run_with_input<R: BufRead>(run: RunConfig, input: &mut R) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let document = ChangeDocument::load(&run.input).map_err(|e| e.to_string())?;
    let differ = Differ::new(run.diff_options.clone()).map_err(|e| e.to_string())?;
    let descriptors = document.descriptors();
    let changes = differ.diff(&document.original, &document.edited, &descriptors);

    if run.verbose > 0 {
        format_kv_line("Input", &run.input.display().to_string());
        format_kv_line("Locale", run.locale.code());
        format_kv_line("Fields", &descriptors.len().to_string());
        format_kv_line("Changes", &changes.len().to_string());
        format_kv_line("Interactive", format_bool(run.interactive));
    }
    log_changes(&run, &changes);

    if run.diff_only {
        return run_listing(&run, &changes);
    }

    if changes.is_empty() {
        log_tag("INF", "no changed fields, nothing to review");
    }
    let (submission, html) = run_review(&run, changes, input)?;

    if let Some(path) = run.html.as_ref() {
        std::fs::write(path, html.unwrap_or_default())
            .map_err(|e| format!("failed to write html file '{}': {e}", path.display()))?;
    }
    if run.verbose > 0 {
        format_kv_line("Reasons", &submission.reason_map.len().to_string());
    }
    write_result(
        run.output.as_deref(),
        &output::render_submission(&submission, run.output_format),
    )
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", CliArgs::command().render_long_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    run_with_input(run, &mut input)
}
