//! Configuration management for Quill.
//!
//! Parses `quill.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.name`
//! - `site.description`
//! - `content.source_dir`
//! - `assets.base_url`

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content source directory.
    pub source_dir: Option<PathBuf>,
    /// Override asset base URL.
    pub base_url: Option<String>,
    /// Override the nesting limit.
    pub max_nesting: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Default content directory, relative to the config file.
const DEFAULT_SOURCE_DIR: &str = "content";

/// Default nesting limit for rendered documents.
const DEFAULT_MAX_NESTING: usize = 128;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity.
    pub site: SiteConfig,
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Asset configuration.
    pub assets: AssetsConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site identity.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name.
    pub name: String,
    /// Short site description.
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Blog".to_owned(),
            description: String::new(),
        }
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
    max_nesting: Option<usize>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug)]
pub struct ContentConfig {
    /// Directory holding posts; pages live in its `pages` subdirectory.
    pub source_dir: PathBuf,
    /// Maximum element nesting accepted by the renderer.
    pub max_nesting: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl ContentConfig {
    /// Directory holding standalone pages (`<source_dir>/pages`).
    #[must_use]
    pub fn pages_dir(&self) -> PathBuf {
        self.source_dir.join("pages")
    }
}

/// Content asset configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Location relative asset references are resolved against.
    pub base_url: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_url: "/assets/".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`assets.base_url`").
        field: String,
        /// Error message (e.g., "${`CDN_URL`} not set").
        message: String,
    },
}

/// Expand `${VAR}` and `${VAR:-default}` in `value`.
///
/// Values without `${` are left alone, so a bare `$` stays literal.
fn expand_in_place(field: &str, value: &mut String) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }
    let expanded = shellexpand::env(value.as_str())
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: match e.cause {
                std::env::VarError::NotPresent => format!("${{{}}} not set", e.var_name),
                std::env::VarError::NotUnicode(_) => {
                    format!("${{{}}} is not valid unicode", e.var_name)
                }
            },
        })?
        .into_owned();
    *value = expanded;
    Ok(())
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require an http(s) URL or a site-rooted path.
fn require_url_or_root(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http://, https:// or /"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quill.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.assets.base_url.clone_from(base_url);
        }
        if let Some(max_nesting) = settings.max_nesting {
            self.content_resolved.max_nesting = max_nesting;
        }
    }

    /// Search for a config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            content: ContentConfigRaw::default(),
            assets: AssetsConfig::default(),
            content_resolved: ContentConfig {
                source_dir: base.join(DEFAULT_SOURCE_DIR),
                max_nesting: DEFAULT_MAX_NESTING,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.name, "site.name")?;
        require_non_empty(&self.assets.base_url, "assets.base_url")?;
        require_url_or_root(&self.assets.base_url, "assets.base_url")?;

        if self.content_resolved.max_nesting == 0 {
            return Err(ConfigError::Validation(
                "content.max_nesting must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let fields = [
            ("site.name", &mut self.site.name),
            ("site.description", &mut self.site.description),
            ("assets.base_url", &mut self.assets.base_url),
        ];
        for (field, value) in fields {
            expand_in_place(field, value)?;
        }
        if let Some(dir) = self.content.source_dir.as_mut() {
            expand_in_place("content.source_dir", dir)?;
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            source_dir: config_dir.join(
                self.content
                    .source_dir
                    .as_deref()
                    .unwrap_or(DEFAULT_SOURCE_DIR),
            ),
            max_nesting: self.content.max_nesting.unwrap_or(DEFAULT_MAX_NESTING),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/blog"));
        assert_eq!(config.site.name, "Blog");
        assert_eq!(config.assets.base_url, "/assets/");
        assert_eq!(
            config.content_resolved.source_dir,
            PathBuf::from("/blog/content")
        );
        assert_eq!(
            config.content_resolved.pages_dir(),
            PathBuf::from("/blog/content/pages")
        );
        assert_eq!(config.content_resolved.max_nesting, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site.name, "Blog");
        assert_eq!(config.assets.base_url, "/assets/");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[site]
name = "Notes"
description = "Things I learned"

[content]
source_dir = "writing"
max_nesting = 64

[assets]
base_url = "https://cdn.example.com/blog/"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.site.name, "Notes");
        assert_eq!(config.site.description, "Things I learned");
        assert_eq!(config.assets.base_url, "https://cdn.example.com/blog/");
        assert_eq!(
            config.content_resolved.source_dir,
            PathBuf::from("/project/writing")
        );
        assert_eq!(config.content_resolved.max_nesting, 64);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[site]\nname = \"Explicit\"\n");

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.site.name, "Explicit");
        assert_eq!(config.config_path, Some(path));
        assert_eq!(
            config.content_resolved.source_dir,
            dir.path().join("content")
        );
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[site\nname = ");
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_discover_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");
        let nested = dir.path().join("content").join("posts");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(&nested), Some(path));
    }

    #[test]
    fn test_discover_none() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a");
        std::fs::create_dir_all(&nested).unwrap();
        // Parents of the temp dir may hold a config; only check the nearest
        // candidate is not inside the temp dir.
        let found = Config::discover_from(&nested);
        assert!(found.is_none_or(|path| !path.starts_with(dir.path())));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/blog"));
        config.apply_cli_settings(&CliSettings {
            source_dir: Some(PathBuf::from("/elsewhere")),
            base_url: Some("/static/".to_owned()),
            max_nesting: Some(32),
        });

        assert_eq!(
            config.content_resolved.source_dir,
            PathBuf::from("/elsewhere")
        );
        assert_eq!(config.assets.base_url, "/static/");
        assert_eq!(config.content_resolved.max_nesting, 32);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/blog"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.assets.base_url, "/assets/");
        assert_eq!(
            config.content_resolved.source_dir,
            PathBuf::from("/blog/content")
        );
    }

    #[test]
    fn test_cli_settings_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");
        let settings = CliSettings {
            base_url: Some("assets".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            Config::load(Some(&path), Some(&settings)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUILL_TEST_SITE_NAME", "Env Blog");
        }

        let toml = r#"
[site]
name = "${QUILL_TEST_SITE_NAME}"

[assets]
base_url = "${QUILL_TEST_ASSETS_UNSET:-/media/}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.site.name, "Env Blog");
        assert_eq!(config.assets.base_url, "/media/");

        unsafe {
            std::env::remove_var("QUILL_TEST_SITE_NAME");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUILL_TEST_MISSING_DIR");
        }
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(
            dir.path(),
            "[content]\nsource_dir = \"${QUILL_TEST_MISSING_DIR}/posts\"\n",
        );

        let err = Config::load(Some(&path), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in content.source_dir: ${QUILL_TEST_MISSING_DIR} not set"
        );
    }

    #[test]
    fn test_expand_leaves_bare_dollar() {
        let mut value = "Costs $5 a month".to_owned();
        expand_in_place("site.description", &mut value).unwrap();
        assert_eq!(value, "Costs $5 a month");
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = Config::default_with_base(Path::new("/blog"));

        config.assets.base_url = String::new();
        assert!(config.validate().is_err());

        config.assets.base_url = "ftp://example.com".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("assets.base_url"));

        config.assets.base_url = "https://cdn.example.com".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_nesting_zero() {
        let mut config = Config::default_with_base(Path::new("/blog"));
        config.content_resolved.max_nesting = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: content.max_nesting must be greater than 0"
        );
    }

    #[test]
    fn test_validate_empty_site_name() {
        let mut config = Config::default_with_base(Path::new("/blog"));
        config.site.name = "  ".to_owned();
        assert!(config.validate().is_err());
    }
}
