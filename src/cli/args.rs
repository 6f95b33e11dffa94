use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "changereview",
    version,
    about = "review changed form fields and collect a reason for each change",
    long_about = "Changereview compares the original and edited values of a data-entry form, shows every changed field for review and requires a justification per change before the edit may be saved.\n\nExamples:\n  changereview -i change.yml --diff-only\n  changereview -i change.yml -r status=corrected -r weight='scale error'\n  changereview -i change.yml --common-reason 'source document verified' -o reasons.json\n  changereview -i change.yml --interactive --lang es\n\nTip: Use --config to persist locale and filter settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'i',
        long = "in",
        visible_alias = "input",
        value_name = "FILE",
        help_heading = "Input",
        help = "Change document (YAML or JSON) with fields, original and edited values."
    )]
    pub input: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.changereview/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'L',
        long = "lng",
        visible_alias = "lang",
        value_name = "LOCALE",
        help_heading = "Input",
        help = "Display language (en, es)."
    )]
    pub lang: Option<String>,

    #[arg(
        short = 'd',
        long = "do",
        visible_alias = "diff-only",
        help_heading = "Review",
        help = "Only list the changed fields, do not collect reasons."
    )]
    pub diff_only: bool,

    #[arg(
        short = 'r',
        long = "rsn",
        visible_alias = "reason",
        value_name = "KEY=TEXT",
        action = ArgAction::Append,
        help_heading = "Review",
        help = "Reason for a changed field (repeatable)."
    )]
    pub reason: Vec<String>,

    #[arg(
        short = 'R',
        long = "rf",
        visible_alias = "reasons-file",
        value_name = "FILE",
        help_heading = "Review",
        help = "Load reasons from a YAML/JSON map of field key to reason."
    )]
    pub reasons_file: Option<String>,

    #[arg(
        short = 'a',
        long = "cr",
        visible_alias = "common-reason",
        value_name = "TEXT",
        help_heading = "Review",
        help = "Use the same reason for every changed field (applied before per-field reasons)."
    )]
    pub common_reason: Option<String>,

    #[arg(
        short = 'I',
        long = "ia",
        visible_alias = "interactive",
        help_heading = "Review",
        help = "Prompt for missing reasons on the terminal (':all TEXT' fills all, ':cancel' aborts)."
    )]
    pub interactive: bool,

    #[arg(
        short = 'x',
        long = "ex",
        visible_alias = "exclude",
        value_name = "KEYS",
        help_heading = "Filters",
        help = "Field keys never reviewed (comma-separated)."
    )]
    pub exclude: Option<String>,

    #[arg(
        short = 'g',
        long = "rgp",
        visible_alias = "repeating-group-pattern",
        value_name = "REGEX",
        help_heading = "Filters",
        help = "Regex for repeating-group field keys, which are never reviewed (empty disables)."
    )]
    pub repeating_group_pattern: Option<String>,

    #[arg(
        short = 's',
        long = "q",
        visible_alias = "search",
        value_name = "QUERY",
        help_heading = "Listing",
        help = "Only list changed fields whose key, label or values contain QUERY."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "Listing",
        help = "Page of the changed-field listing to show (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'P',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "Listing",
        help = "Changed fields per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        short = 'H',
        long = "htm",
        visible_alias = "html",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the review dialog as an HTML fragment."
    )]
    pub html: Option<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the result (listing or submission) to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json)."
    )]
    pub output_format: Option<String>,
}
