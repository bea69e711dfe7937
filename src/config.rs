//! Configuration file for the Miniflux connection and display settings.
//!
//! Lives at `<user config dir>/cliflux/config.toml`. Unlike most settings
//! files the server connection has no sensible default, so a missing file is
//! an error that points at `--init`.
use crate::util::{validate_server_url, UrlValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Config file not found at {}. Run with --init to create one", .0.display())]
    NotFound(PathBuf),

    #[error("Configuration file already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("server_url cannot be empty")]
    EmptyServerUrl,

    #[error("server_url '{url}' is not usable: {source}")]
    InvalidServerUrl {
        url: String,
        source: UrlValidationError,
    },

    #[error("Could not determine the user config directory")]
    NoConfigDir,
}

// ============================================================================
// Configuration Structs
// ============================================================================

pub const DEFAULT_UNREAD_COLOR: &str = "reset";
pub const DEFAULT_READ_COLOR: &str = "gray";

/// `[theme]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Base palette: "dark" or "light".
    pub variant: String,
    /// Color of unread entry titles (a color name, `#rrggbb`, or a 0-255 index).
    pub unread_color: String,
    /// Color of read entry titles.
    pub read_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            variant: "dark".to_string(),
            unread_color: DEFAULT_UNREAD_COLOR.to_string(),
            read_color: DEFAULT_READ_COLOR.to_string(),
        }
    }
}

/// Top-level configuration.
///
/// Every key is optional while parsing; `load` then validates what the
/// client cannot run without.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Miniflux API token, sent as `X-Auth-Token`.
    pub api_key: String,

    /// Base URL of the Miniflux server, without trailing slash after `load`.
    pub server_url: String,

    /// Skip TLS certificate verification (self-signed servers).
    pub allow_invalid_certs: bool,

    pub theme: ThemeConfig,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

/// Mask api_key in Debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("server_url", &self.server_url)
            .field("allow_invalid_certs", &self.allow_invalid_certs)
            .field("theme", &self.theme)
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

/// Default location of the config file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("cliflux").join("config.toml"))
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "api_key",
        "server_url",
        "allow_invalid_certs",
        "theme",
        "keybindings",
    ];

    /// The file written by `--init`, with placeholders for the user to fill.
    pub fn template() -> Self {
        Self {
            api_key: "FIXME".to_string(),
            server_url: "FIXME".to_string(),
            ..Self::default()
        }
    }

    /// Write [`Config::template`] to `path`, creating parent directories.
    ///
    /// Refuses to overwrite an existing file.
    pub fn init(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&Self::template())?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            // The file will hold an API token.
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                ConfigError::AlreadyExists(path.to_path_buf())
            } else {
                ConfigError::Io(e)
            }
        })?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;

        tracing::info!(path = %path.display(), "Wrote default configuration");
        Ok(())
    }

    /// Load and validate configuration from a TOML file.
    ///
    /// - Missing file → `Err(ConfigError::NotFound)`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - `server_url` is trimmed and loses one trailing `/`; empty or
    ///   unparseable values are rejected
    /// - Empty theme colors fall back to their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        config.normalize()?;

        tracing::info!(
            path = %path.display(),
            server_url = %config.server_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        let trimmed = self.server_url.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyServerUrl);
        }
        validate_server_url(trimmed).map_err(|source| ConfigError::InvalidServerUrl {
            url: trimmed.to_string(),
            source,
        })?;
        self.server_url = trimmed.to_string();

        if self.theme.unread_color.trim().is_empty() {
            self.theme.unread_color = DEFAULT_UNREAD_COLOR.to_string();
        }
        if self.theme.read_color.trim().is_empty() {
            self.theme.read_color = DEFAULT_READ_COLOR.to_string();
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(test: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("cliflux_config_test_{}", test));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_points_at_init() {
        let path = Path::new("/tmp/cliflux_test_nonexistent/config.toml");
        let err = Config::load(path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("--init"));
    }

    #[test]
    fn test_full_config() {
        let (dir, path) = write_config(
            "full",
            r##"
api_key = "token-123"
server_url = "https://rss.example.com"
allow_invalid_certs = true

[theme]
variant = "light"
unread_color = "#ffffff"
read_color = "240"

[keybindings]
quit = "Ctrl+q"
"##,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_key, "token-123");
        assert_eq!(config.server_url, "https://rss.example.com");
        assert!(config.allow_invalid_certs);
        assert_eq!(config.theme.variant, "light");
        assert_eq!(config.theme.unread_color, "#ffffff");
        assert_eq!(config.theme.read_color, "240");
        assert_eq!(
            config.keybindings.get("quit").map(String::as_str),
            Some("Ctrl+q")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_server_url_trimmed_and_trailing_slash_removed() {
        let (dir, path) = write_config(
            "trailing_slash",
            "api_key = \"k\"\nserver_url = \"  https://rss.example.com/  \"\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server_url, "https://rss.example.com");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_server_url_rejected() {
        let (dir, path) = write_config("empty_url", "api_key = \"k\"\nserver_url = \"   \"\n");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyServerUrl));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_server_url_rejected() {
        let (dir, path) = write_config("no_url", "api_key = \"k\"\n");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyServerUrl));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_placeholder_server_url_rejected() {
        let (dir, path) = write_config("placeholder", "api_key = \"k\"\nserver_url = \"FIXME\"\n");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidServerUrl { .. }));
        assert!(err.to_string().contains("FIXME"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_theme_colors_use_defaults() {
        let (dir, path) = write_config(
            "theme_defaults",
            "server_url = \"https://x.example\"\n[theme]\nunread_color = \"\"\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme.unread_color, DEFAULT_UNREAD_COLOR);
        assert_eq!(config.theme.read_color, DEFAULT_READ_COLOR);
        assert_eq!(config.theme.variant, "dark");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config(
            "unknown",
            "server_url = \"https://x.example\"\ntotally_fake_key = 1\n",
        );

        assert!(Config::load(&path).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_init_writes_template_and_refuses_overwrite() {
        let dir = std::env::temp_dir().join("cliflux_config_test_init");
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("nested").join("config.toml");

        Config::init(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("api_key = \"FIXME\""));
        assert!(written.contains("server_url = \"FIXME\""));
        assert!(written.contains("unread_color = \"reset\""));

        let err = Config::init(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_template_round_trips_through_parser() {
        let text = toml::to_string_pretty(&Config::template()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api_key, "FIXME");
        assert_eq!(parsed.theme, ThemeConfig::default());
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = Config {
            api_key: "super-secret-key-12345".to_string(),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-key-12345"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_config_path_ends_with_app_dir() {
        if let Ok(path) = config_path() {
            assert!(path.ends_with("cliflux/config.toml"));
        }
    }
}
