//! Configuration management for apinav.
//!
//! Parses `apinav.toml` configuration files with serde and provides
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
//! - `input.path`
//! - `output.dir`
//! - `output.navigation_file`
//! - `output.search_file`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override input JSON path.
    pub input: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override pretty-printing of JSON output.
    pub pretty: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "apinav.toml";

const DEFAULT_INPUT: &str = "docs.json";
const DEFAULT_OUTPUT_DIR: &str = "api";
const DEFAULT_NAVIGATION_FILE: &str = "navigation.json";
const DEFAULT_SEARCH_FILE: &str = "search-keywords.json";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input configuration (paths are relative strings from TOML).
    input: InputConfigRaw,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,

    /// Resolved input configuration (set after loading).
    #[serde(skip)]
    pub input_resolved: InputConfig,
    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw input configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct InputConfigRaw {
    path: Option<String>,
}

/// Resolved input configuration with absolute paths.
#[derive(Debug, Default)]
pub struct InputConfig {
    /// Extractor JSON output to read.
    pub path: PathBuf,
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    navigation_file: Option<String>,
    search_file: Option<String>,
    pretty: Option<bool>,
}

/// Resolved output configuration.
#[derive(Debug)]
pub struct OutputConfig {
    /// Directory receiving content pages and data files.
    pub dir: PathBuf,
    /// File name of the navigation tree, inside `dir`.
    pub navigation_file: String,
    /// File name of the search index, inside `dir`.
    pub search_file: String,
    /// Whether JSON is pretty-printed.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            navigation_file: DEFAULT_NAVIGATION_FILE.to_owned(),
            search_file: DEFAULT_SEARCH_FILE.to_owned(),
            pretty: true,
        }
    }
}

impl OutputConfig {
    /// Full path of the navigation file.
    #[must_use]
    pub fn navigation_path(&self) -> PathBuf {
        self.dir.join(&self.navigation_file)
    }

    /// Full path of the search index file.
    #[must_use]
    pub fn search_path(&self) -> PathBuf {
        self.dir.join(&self.search_file)
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
        /// Config field path (e.g., "`output.dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_OUT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a field to be a bare file name.
fn require_file_name(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(ConfigError::Validation(format!(
            "{field} must be a file name, not a path"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `apinav.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(input) = &settings.input {
            self.input_resolved.path.clone_from(input);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
        if let Some(pretty) = settings.pretty {
            self.output_resolved.pretty = pretty;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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
            input: InputConfigRaw::default(),
            output: OutputConfigRaw::default(),
            input_resolved: InputConfig {
                path: base.join(DEFAULT_INPUT),
            },
            output_resolved: OutputConfig {
                dir: base.join(DEFAULT_OUTPUT_DIR),
                ..OutputConfig::default()
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
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let output = &self.output_resolved;
        require_file_name(&output.navigation_file, "output.navigation_file")?;
        require_file_name(&output.search_file, "output.search_file")?;

        if output.navigation_file == output.search_file {
            return Err(ConfigError::Validation(
                "output.navigation_file and output.search_file must differ".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let expand_opt = |value: &mut Option<String>, field: &str| -> Result<(), ConfigError> {
            if let Some(raw) = value {
                *raw = expand::expand_env(raw, field)?;
            }
            Ok(())
        };

        expand_opt(&mut self.input.path, "input.path")?;
        expand_opt(&mut self.output.dir, "output.dir")?;
        expand_opt(&mut self.output.navigation_file, "output.navigation_file")?;
        expand_opt(&mut self.output.search_file, "output.search_file")?;

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.input_resolved = InputConfig {
            path: resolve(self.input.path.as_deref(), DEFAULT_INPUT),
        };

        self.output_resolved = OutputConfig {
            dir: resolve(self.output.dir.as_deref(), DEFAULT_OUTPUT_DIR),
            navigation_file: self
                .output
                .navigation_file
                .clone()
                .unwrap_or_else(|| DEFAULT_NAVIGATION_FILE.to_owned()),
            search_file: self
                .output
                .search_file
                .clone()
                .unwrap_or_else(|| DEFAULT_SEARCH_FILE.to_owned()),
            pretty: self.output.pretty.unwrap_or(true),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.input_resolved.path, PathBuf::from("/test/docs.json"));
        assert_eq!(config.output_resolved.dir, PathBuf::from("/test/api"));
        assert_eq!(
            config.output_resolved.navigation_path(),
            PathBuf::from("/test/api/navigation.json")
        );
        assert_eq!(
            config.output_resolved.search_path(),
            PathBuf::from("/test/api/search-keywords.json")
        );
        assert!(config.output_resolved.pretty);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = "";
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.input_resolved.path,
            PathBuf::from("/project/docs.json")
        );
        assert_eq!(config.output_resolved.navigation_file, "navigation.json");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[input]
path = "build/doc-data.json"

[output]
dir = "site/api"
navigation_file = "nav.json"
search_file = "search.json"
pretty = false
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.input_resolved.path,
            PathBuf::from("/project/build/doc-data.json")
        );
        assert_eq!(config.output_resolved.dir, PathBuf::from("/project/site/api"));
        assert_eq!(
            config.output_resolved.navigation_path(),
            PathBuf::from("/project/site/api/nav.json")
        );
        assert_eq!(
            config.output_resolved.search_path(),
            PathBuf::from("/project/site/api/search.json")
        );
        assert!(!config.output_resolved.pretty);
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let toml = r#"
[input]
path = "/data/docs.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.input_resolved.path, PathBuf::from("/data/docs.json"));
    }

    #[test]
    fn test_unknown_field_type_is_parse_error() {
        let toml = r#"
[output]
pretty = "yes"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_cli_settings_input() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            input: Some(PathBuf::from("/other/docs.json")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.input_resolved.path, PathBuf::from("/other/docs.json"));
        assert_eq!(config.output_resolved.dir, PathBuf::from("/test/api")); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_output_dir_and_pretty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            output_dir: Some(PathBuf::from("/out")),
            pretty: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.output_resolved.dir, PathBuf::from("/out"));
        assert_eq!(
            config.output_resolved.navigation_path(),
            PathBuf::from("/out/navigation.json")
        );
        assert!(!config.output_resolved.pretty);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.input_resolved.path, PathBuf::from("/test/docs.json"));
        assert_eq!(config.output_resolved.dir, PathBuf::from("/test/api"));
        assert!(config.output_resolved.pretty);
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apinav.toml");
        std::fs::write(
            &path,
            r#"
[input]
path = "doc.json"

[output]
dir = "public/api"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.input_resolved.path, dir.path().join("doc.json"));
        assert_eq!(config.output_resolved.dir, dir.path().join("public/api"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_applies_cli_settings_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apinav.toml");
        std::fs::write(&path, "[output]\npretty = true\n").unwrap();
        let settings = CliSettings {
            pretty: Some(false),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert!(!config.output_resolved.pretty);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/apinav.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("/nonexistent/apinav.toml"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apinav.toml");
        std::fs::write(&path, "[output\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_rejects_invalid_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apinav.toml");
        std::fs::write(&path, "[output]\nsearch_file = \"nested/search.json\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("output.search_file"));
    }

    #[test]
    fn test_expand_env_vars_output_dir() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("APINAV_TEST_OUT", "dist");
        }

        let toml = r#"
[output]
dir = "${APINAV_TEST_OUT}/api"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.output_resolved.dir, PathBuf::from("/project/dist/api"));

        unsafe {
            std::env::remove_var("APINAV_TEST_OUT");
        }
    }

    #[test]
    fn test_expand_env_vars_default_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("APINAV_TEST_UNSET_INPUT");
        }

        let toml = r#"
[input]
path = "${APINAV_TEST_UNSET_INPUT:-docs/data.json}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.input.path.as_deref(), Some("docs/data.json"));
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("APINAV_TEST_MISSING");
        }

        let toml = r#"
[output]
navigation_file = "${APINAV_TEST_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("APINAV_TEST_MISSING"));
        assert!(err.to_string().contains("output.navigation_file"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_navigation_file_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.output_resolved.navigation_file = String::new();
        assert_validation_error(&config, &["output.navigation_file", "empty"]);
    }

    #[test]
    fn test_validate_search_file_is_path() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.output_resolved.search_file = "../search.json".to_owned();
        assert_validation_error(&config, &["output.search_file", "file name"]);
    }

    #[test]
    fn test_validate_same_file_names() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.output_resolved.search_file = "navigation.json".to_owned();
        assert_validation_error(&config, &["must differ"]);
    }
}
