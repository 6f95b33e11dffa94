use serde::{Deserialize, Serialize};

/// Display language for review rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "en" | "en-gb" | "en-us" | "english" => Some(Self::En),
            "es" | "es-es" | "es-ar" | "spanish" | "español" | "espanol" => Some(Self::Es),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    pub fn yes(self) -> &'static str {
        match self {
            Self::En => "Yes",
            Self::Es => "Sí",
        }
    }

    pub fn no(self) -> &'static str {
        match self {
            Self::En => "No",
            Self::Es => "No",
        }
    }

    pub fn empty_marker(self) -> &'static str {
        match self {
            Self::En => "(empty)",
            Self::Es => "(vacío)",
        }
    }

    /// chrono pattern used when a parsed date is shown to the user.
    pub fn date_pattern(self) -> &'static str {
        match self {
            Self::En | Self::Es => "%d/%m/%Y",
        }
    }

    pub fn all() -> [Locale; 2] {
        [Self::En, Self::Es]
    }

    /// Empty markers of every locale; a value round-tripped through any UI
    /// language still normalizes to blank.
    pub fn all_empty_markers() -> Vec<String> {
        Self::all()
            .iter()
            .map(|l| l.empty_marker().to_string())
            .collect()
    }
}
