use crate::cli::args::CliArgs;
use crate::locale::Locale;
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.input.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err("missing --input, expected a change document".to_string());
    }
    if let Some(raw) = args.lang.as_deref() {
        if Locale::parse(raw).is_none() {
            return Err(format!("invalid --lang '{raw}', expected en or es"));
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!("invalid --output-format '{raw}', expected text or json"));
        }
    }
    for raw in &args.reason {
        crate::utils::parse_reason_assignment(raw)
            .map_err(|e| format!("invalid --reason '{raw}': {e}"))?;
    }
    if let Some(raw) = args.exclude.as_deref() {
        crate::utils::parse_csv_list(raw).map_err(|e| format!("invalid --exclude '{raw}': {e}"))?;
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid page, expected positive integer".to_string());
        }
    }
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            return Err("invalid page-size, expected positive integer".to_string());
        }
    }
    if args.diff_only && (args.interactive || !args.reason.is_empty() || args.reasons_file.is_some()) {
        return Err("--diff-only cannot be combined with reason options".to_string());
    }
    Ok(())
}
