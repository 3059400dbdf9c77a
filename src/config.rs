//! Widget configuration.
//!
//! Every path the widget touches is configurable. Values come from an
//! optional JSON file at `<config_dir>/DuMemo/config.json`; missing keys fall
//! back to the defaults below. A leading `~` in path values expands to the
//! home directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const APP_DIR: &str = "DuMemo";
const CONFIG_FILE: &str = "config.json";

/// Paths and switches for the drop pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Analysis script passed as the interpreter's only argument.
    pub script_path: PathBuf,
    /// Directory files are moved into; default for the directory prompt.
    pub working_directory: PathBuf,
    /// Interpreter executable.
    pub interpreter_path: PathBuf,
    /// Directory prepended to `PATH` for the interpreter.
    pub interpreter_env_dir: Option<PathBuf>,
    /// Editor launcher install locations, checked in order.
    pub editor_candidates: Vec<PathBuf>,
    /// Launcher name used through the shell when no candidate exists.
    pub editor_name: String,
    /// Extension (without dot) of files handed to the editor.
    pub text_extension: String,
    /// Whether the opener still runs after a failed analysis.
    pub open_after_failed_analysis: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        let workspace = home.join("Documents").join(APP_DIR);
        let env_bin = home.join("miniconda3/envs/dumemo/bin");
        Self {
            script_path: workspace.join("analyze.py"),
            working_directory: workspace,
            interpreter_path: env_bin.join("python"),
            interpreter_env_dir: Some(env_bin),
            editor_candidates: vec![
                PathBuf::from("/usr/local/bin/code"),
                PathBuf::from("/opt/homebrew/bin/code"),
                PathBuf::from(
                    "/Applications/Visual Studio Code.app/Contents/Resources/app/bin/code",
                ),
            ],
            editor_name: "code".to_string(),
            text_extension: "txt".to_string(),
            open_after_failed_analysis: true,
        }
    }
}

impl WidgetConfig {
    /// Parse a JSON document, filling absent keys with defaults.
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        let mut config: WidgetConfig = serde_json::from_str(json)?;
        config.expand_paths();
        Ok(config)
    }

    /// Load the config at `path`, or defaults if it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No config file, using defaults");
                return Self::default();
            }
        };
        match Self::parse(&contents) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load from the default location.
    pub fn load() -> Self {
        match default_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    fn expand_paths(&mut self) {
        self.script_path = expand_home(&self.script_path);
        self.working_directory = expand_home(&self.working_directory);
        self.interpreter_path = expand_home(&self.interpreter_path);
        self.interpreter_env_dir = self.interpreter_env_dir.as_deref().map(expand_home);
        for candidate in &mut self.editor_candidates {
            *candidate = expand_home(candidate);
        }
        self.text_extension = self.text_extension.trim_start_matches('.').to_string();
    }
}

/// `<config_dir>/DuMemo/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = WidgetConfig::parse("{}").unwrap();
        assert_eq!(config, WidgetConfig::default());
    }

    #[test]
    fn test_defaults_match_fixed_layout() {
        let config = WidgetConfig::default();
        assert!(config.script_path.ends_with("Documents/DuMemo/analyze.py"));
        assert!(config.working_directory.ends_with("Documents/DuMemo"));
        assert_eq!(config.editor_candidates.len(), 3);
        assert_eq!(config.editor_name, "code");
        assert_eq!(config.text_extension, "txt");
        assert!(config.open_after_failed_analysis);
    }

    #[test]
    fn test_partial_override() {
        let config = WidgetConfig::parse(
            r#"{"interpreter_path": "/usr/bin/python3", "open_after_failed_analysis": false}"#,
        )
        .unwrap();
        assert_eq!(config.interpreter_path, PathBuf::from("/usr/bin/python3"));
        assert!(!config.open_after_failed_analysis);
        assert_eq!(config.editor_name, "code");
    }

    #[test]
    fn test_tilde_expansion() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let config = WidgetConfig::parse(r#"{"script_path": "~/s/run.py"}"#).unwrap();
        assert_eq!(config.script_path, home.join("s/run.py"));
    }

    #[test]
    fn test_extension_leading_dot_is_dropped() {
        let config = WidgetConfig::parse(r#"{"text_extension": ".md"}"#).unwrap();
        assert_eq!(config.text_extension, "md");
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(WidgetConfig::load_or_default(&path), WidgetConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(WidgetConfig::load_or_default(&path), WidgetConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"editor_name": "subl"}"#).unwrap();
        assert_eq!(WidgetConfig::load_or_default(&path).editor_name, "subl");
    }
}
