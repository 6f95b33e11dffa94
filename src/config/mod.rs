use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    #[serde(alias = "lang", alias = "language")]
    pub locale: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    pub page_size: Option<usize>,
    pub repeating_group_pattern: Option<String>,
    pub empty_markers: Option<Vec<String>>,
    pub excluded_keys: Option<Vec<String>>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".changereview").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(ConfigFile::default()),
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# Changereview config
#
# Location (default):
#   ~/.changereview/config.yml

# Display language: en or es
locale: en

# Output (text or json)
output_format: text
no_color: false

# Changed-field listing
page_size: 20

# Field keys matching this regex belong to repeating groups and are never
# reviewed. Leave empty to review every key.
repeating_group_pattern: '\[\d+\]'

# Values that mean "no value" and compare equal to a blank field
# (null, none and na always do).
empty_markers:
  - "(empty)"
  - "(vacío)"

# Field keys that are never reviewed
excluded_keys: []
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        ensure_default_config_file(&path).unwrap();
        let cfg = load_config(&path, false).unwrap();
        assert_eq!(cfg.locale.as_deref(), Some("en"));
        assert_eq!(cfg.page_size, Some(20));
        assert_eq!(cfg.repeating_group_pattern.as_deref(), Some(r"\[\d+\]"));
        assert_eq!(
            cfg.empty_markers,
            Some(vec!["(empty)".to_string(), "(vacío)".to_string()])
        );
        assert_eq!(cfg.excluded_keys, Some(Vec::new()));
    }

    #[test]
    fn existing_config_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "lang: es\n").unwrap();
        ensure_default_config_file(&path).unwrap();
        let cfg = load_config(&path, false).unwrap();
        assert_eq!(cfg.locale.as_deref(), Some("es"));
    }

    #[test]
    fn missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.yml");
        assert!(load_config(&missing, true).is_ok());
        let err = load_config(&missing, false).unwrap_err();
        assert!(err.starts_with("config file not found"));

        let bad = dir.path().join("bad.yml");
        std::fs::write(&bad, "page_size: many\n").unwrap();
        let err = load_config(&bad, false).unwrap_err();
        assert!(err.starts_with("failed to parse config"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/x.yml"), home.join("x.yml"));
        }
        assert_eq!(expand_tilde("/etc/x.yml"), PathBuf::from("/etc/x.yml"));
    }
}
