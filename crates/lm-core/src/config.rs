use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
    pub share: ShareConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Custom storage directory. Defaults to ~/.local/share/lovematch/.
    pub dir: Option<String>,
}

impl StorageConfig {
    /// Resolve the storage directory, using the configured path or the XDG default.
    pub fn resolve_dir(&self) -> PathBuf {
        if let Some(ref custom) = self.dir {
            return PathBuf::from(custom);
        }

        let base = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".local").join("share")
            });
        base.join("lovematch")
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pause before a result is shown, in milliseconds. 0 disables it.
    pub delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { delay_ms: 1500 }
    }
}

impl AnalysisConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// How a result is shared.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShareMethod {
    /// Clipboard when stdout is a terminal, print otherwise.
    #[default]
    Auto,
    Clipboard,
    File,
    Print,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShareConfig {
    pub method: ShareMethod,
    /// Destination for `method = "file"`. Defaults to lovematch-result.txt
    /// in the current directory.
    pub export_path: Option<String>,
}

impl ShareConfig {
    pub fn resolve_export_path(&self) -> PathBuf {
        self.export_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("lovematch-result.txt"))
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when RUST_LOG is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location.
    /// A missing file yields defaults; a malformed one warns and yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                eprintln!("warning: failed to parse {}: {e}", path.display());
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }
}

fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("lovematch").join("config.toml")
}
