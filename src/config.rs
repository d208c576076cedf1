use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub colors: ColorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Mount point of the counter source.
    pub proc_root: PathBuf,
    /// Processes per page in the table.
    pub page_size: usize,
    pub show_per_core: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            proc_root: PathBuf::from("/proc"),
            page_size: 20,
            show_per_core: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub theme: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("proctop").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.proc_root, PathBuf::from("/proc"));
        assert_eq!(config.general.page_size, 20);
        assert!(config.general.show_per_core);
        assert_eq!(config.colors.theme, "dark");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
page_size = 40
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.page_size, 40);
        // Other fields should be defaults
        assert_eq!(config.general.proc_root, PathBuf::from("/proc"));
        assert_eq!(config.colors.theme, "dark");
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
proc_root = "/host/proc"
page_size = 10
show_per_core = false

[colors]
theme = "light"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.proc_root, PathBuf::from("/host/proc"));
        assert_eq!(config.general.page_size, 10);
        assert!(!config.general.show_per_core);
        assert_eq!(config.colors.theme, "light");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.page_size, 20);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("proctop_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.page_size, 20);
        let _ = std::fs::remove_file(&temp);
    }
}
