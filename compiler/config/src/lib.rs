#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! modgen Configuration
//!
//! This crate provides configuration management for a generation run.
//! A configuration file specifies:
//! - Which module to evaluate, and with which arguments
//! - How to invoke the evaluator
//! - Naming rules and code generation parameters
//! - Logging configuration
//!
//! Configuration is stored in TOML format. Every section and every key is
//! optional; anything left out falls back to the defaults below.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Configuration file was not found at the specified path
    #[error("Config file not found at: {0}")]
    NotFound(PathBuf),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The module to evaluate
    pub module: ModuleConfig,
    /// How to run the evaluator
    pub evaluator: EvaluatorConfig,
    /// Identifier rules for generated code
    pub naming: NamingConfig,
    /// Code generation settings
    pub codegen: CodegenConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// The module handed to the evaluator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Path to the module file, or a source expression when `expr` is set
    pub locator: String,
    /// Treat `locator` as an expression instead of a path
    pub expr: bool,
    /// Package-set expression passed as `pkgs`
    pub pkgs: Option<String>,
    /// Dotted option path the evaluator should restrict itself to
    pub options_path: Option<String>,
    /// Extra named arguments, each value an expression
    pub special_args: BTreeMap<String, String>,
}

/// Evaluator invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Program to run
    pub program: String,
    /// Arguments placed before the request's own arguments
    pub args: Vec<String>,
    /// The dump expression file passed as the last argument.
    ///
    /// It reads the `module`, `pkgs`, `specialArgs` and `optionsPath`
    /// arguments and prints the option tree in the wire format. There is no
    /// default; a run without one is rejected before the evaluator starts.
    pub dumper: Option<String>,
    /// Parse every request expression with `program --parse` before evaluating
    pub check_syntax: bool,
    /// Kill the evaluator after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            program: "nix-instantiate".to_string(),
            args: vec!["--eval".to_string(), "--strict".to_string(), "--json".to_string()],
            dumper: None,
            check_syntax: false,
            timeout_secs: None,
        }
    }
}

/// Identifier rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Words rendered fully upper-case (matched case-insensitively)
    pub initialisms: BTreeSet<String>,
    /// Substring replacements applied to rendered names, in key order
    pub overrides: BTreeMap<String, String>,
}

/// What the run produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rust type declarations
    #[default]
    Rust,
    /// The decoded module, re-encoded
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Rust => "rs",
            OutputFormat::Json => "json",
        }
    }
}

/// Code generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Name of the root struct
    pub root_type: String,
    /// Package the generated code belongs to; also the output file stem
    pub package: String,
    /// Output format
    pub format: OutputFormat,
    /// Indent JSON output
    pub json_pretty: bool,
    /// Dotted path of the sub-tree to generate from, resolved after decoding
    pub select: Option<String>,
    /// Where to write output
    pub output_dir: Option<PathBuf>,
    /// Run `rustfmt` over written Rust output
    pub rustfmt: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            root_type: "Config".to_string(),
            package: "config".to_string(),
            format: OutputFormat::Rust,
            json_pretty: true,
            select: None,
            output_dir: None,
            rustfmt: false,
        }
    }
}

impl CodegenConfig {
    /// The configured output directory, or [`Config::default_output_dir`].
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(Config::default_output_dir)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load the file at `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/modgen/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("modgen");
        Ok(config_dir.join("config.toml"))
    }

    /// Get the default output directory for generated code
    pub fn default_output_dir() -> PathBuf {
        Self::default_output_dir_internal(
            std::env::var("OUT_DIR").ok(),
            std::env::current_dir().ok(),
        )
    }

    /// Internal function for testing - allows injection of environment values
    fn default_output_dir_internal(
        out_dir: Option<String>,
        current_dir: Option<PathBuf>,
    ) -> PathBuf {
        if let Some(out_dir) = out_dir {
            return PathBuf::from(out_dir);
        }
        if let Some(current_dir) = current_dir {
            return current_dir;
        }
        PathBuf::from(".")
    }

    /// The configured options path split into segments.
    pub fn options_path(&self) -> Vec<String> { split_dotted(self.module.options_path.as_deref()) }

    /// The configured selection split into segments.
    pub fn select_path(&self) -> Vec<String> { split_dotted(self.codegen.select.as_deref()) }
}

fn split_dotted(path: Option<&str>) -> Vec<String> {
    match path {
        Some(path) if !path.is_empty() => path.split('.').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [module]
            locator = "./module.nix"
            pkgs = "import <nixpkgs> { }"
            options_path = "services.magics"

            [module.special_args]
            hostName = '"box"'

            [evaluator]
            program = "/run/current-system/sw/bin/nix-instantiate"
            dumper = "./dump-module.nix"
            check_syntax = true
            timeout_secs = 30

            [naming]
            initialisms = ["id", "url"]

            [naming.overrides]
            Magics = "Magic"

            [codegen]
            root_type = "Magics"
            package = "magics"
            format = "json"
            json_pretty = false
            output_dir = "generated"

            [logging]
            level = "debug"
            file = "debug.log"
        "#;
        fs::write(&temp_file, toml_content)
            .expect("Failed to write TOML content to temporary file");

        let config = Config::from_file(&temp_file).expect("Failed to load config");
        assert_eq!(config.module.locator, "./module.nix");
        assert!(!config.module.expr);
        assert_eq!(config.module.pkgs.as_deref(), Some("import <nixpkgs> { }"));
        assert_eq!(config.options_path(), vec!["services", "magics"]);
        assert_eq!(
            config.module.special_args.get("hostName").map(String::as_str),
            Some("\"box\"")
        );
        assert_eq!(config.evaluator.program, "/run/current-system/sw/bin/nix-instantiate");
        assert_eq!(config.evaluator.args, vec!["--eval", "--strict", "--json"]);
        assert_eq!(config.evaluator.dumper.as_deref(), Some("./dump-module.nix"));
        assert!(config.evaluator.check_syntax);
        assert_eq!(config.evaluator.timeout_secs, Some(30));
        assert!(config.naming.initialisms.contains("url"));
        assert_eq!(config.naming.overrides.get("Magics").map(String::as_str), Some("Magic"));
        assert_eq!(config.codegen.root_type, "Magics");
        assert_eq!(config.codegen.format, OutputFormat::Json);
        assert!(!config.codegen.json_pretty);
        assert_eq!(config.codegen.output_dir(), PathBuf::from("generated"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("debug.log")));

        // Test file not found error
        match Config::from_file("nonexistent_file.toml").expect_err("missing file") {
            ConfigError::FileRead(_) => {}
            other => panic!("Expected FileRead error, got {:?}", other),
        }

        // Test parse error
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&temp_file, "invalid toml content").expect("Failed to write invalid TOML");
        match Config::from_file(&temp_file).expect_err("invalid TOML") {
            ConfigError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[module]\nlocator = \"m.nix\"\n").expect("parses");
        assert_eq!(config.module.locator, "m.nix");
        assert_eq!(config.evaluator, EvaluatorConfig::default());
        assert!(config.evaluator.dumper.is_none());
        assert_eq!(config.codegen, CodegenConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.select_path().is_empty());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(toml::from_str::<Config>("[codegen]\nformat = \"go\"\n").is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let mut config = Config::default();
        config.module.locator = "./module.nix".to_string();
        config.module.special_args.insert("hostName".to_string(), "\"box\"".to_string());
        config.naming.initialisms.insert("id".to_string());
        config.naming.overrides.insert("Foo".to_string(), "Bar".to_string());
        config.codegen.select = Some("services.magics".to_string());
        config.codegen.output_dir = Some(PathBuf::from("out"));

        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        config.save(&temp_file).expect("saves");
        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config file");
        assert!(contents.contains("nix-instantiate"));
        assert!(contents.contains("services.magics"));

        let loaded = Config::from_file(&temp_file).expect("loads");
        assert_eq!(loaded, config);

        // Test file write error - try to save to a non-existent directory
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let non_existent_subdir = temp_dir.path().join("nonexistent").join("config.toml");
        match config.save(&non_existent_subdir).expect_err("missing directory") {
            ConfigError::FileRead(_) => (),
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_or_default() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let config = Config::load_or_default(temp_dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.ends_with("modgen/config.toml"));
    }

    #[test]
    fn test_default_output_dir_internal() {
        let dir = Config::default_output_dir_internal(
            Some("/tmp/out_dir".to_string()),
            Some(PathBuf::from("/tmp/current")),
        );
        assert_eq!(dir, PathBuf::from("/tmp/out_dir"));

        let dir = Config::default_output_dir_internal(None, Some(PathBuf::from("/tmp/current")));
        assert_eq!(dir, PathBuf::from("/tmp/current"));

        let dir = Config::default_output_dir_internal(None, None);
        assert_eq!(dir, PathBuf::from("."));
    }

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(config.evaluator.program, "nix-instantiate");
        assert_eq!(config.codegen.root_type, "Config");
        assert_eq!(config.codegen.package, "config");
        assert_eq!(config.codegen.format, OutputFormat::Rust);
        assert!(config.codegen.json_pretty);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, None);
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
