use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_FILENAME: &str = "repox.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "results";
pub const DEFAULT_OUTPUT_FILENAME: &str = "repo-to-text.txt";
pub const STDOUT_SENTINEL: &str = "stdout";

/// Rule applied to every recognized source file. Files of an unrecognized
/// kind always behave as `RawContent`, whatever the configured rule.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingRule {
    RawContent,
    Interface,
    Integral,
    Imports,
}

impl ProcessingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingRule::RawContent => "raw-content",
            ProcessingRule::Interface => "interface",
            ProcessingRule::Integral => "integral",
            ProcessingRule::Imports => "imports",
        }
    }
}

impl FromStr for ProcessingRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "raw-content" => Ok(ProcessingRule::RawContent),
            "interface" => Ok(ProcessingRule::Interface),
            "integral" => Ok(ProcessingRule::Integral),
            "imports" => Ok(ProcessingRule::Imports),
            other => Err(format!(
                "Unknown processing rule \"{}\" (expected one of: raw-content, interface, integral, imports)",
                other
            )),
        }
    }
}

impl fmt::Display for ProcessingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputStyle {
    RepoMap,
    Flat,
    ImportList,
}

impl OutputStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStyle::RepoMap => "repo_map",
            OutputStyle::Flat => "flat",
            OutputStyle::ImportList => "import_list",
        }
    }
}

impl FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "repo_map" => Ok(OutputStyle::RepoMap),
            "flat" => Ok(OutputStyle::Flat),
            "import_list" => Ok(OutputStyle::ImportList),
            other => Err(format!(
                "Unknown output style \"{}\" (expected one of: repo_map, flat, import_list)",
                other
            )),
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default)]
    pub path_pattern: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProcessingConfig {
    #[serde(default = "default_rule")]
    pub rule: ProcessingRule,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_style")]
    pub style: OutputStyle,
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_output_filename")]
    pub filename: String,
}

fn default_rule() -> ProcessingRule {
    ProcessingRule::Interface
}
fn default_style() -> OutputStyle {
    OutputStyle::RepoMap
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}
fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            rule: default_rule(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            dir: default_output_dir(),
            filename: default_output_filename(),
        }
    }
}

impl Config {
    /// Loads a configuration file, failing on malformed TOML or unknown keys.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        log::debug!("Loading config from: {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| AppError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| AppError::TomlParse(format!("{}: {}", path.display(), e)))?;
        log::trace!("Config loaded: {:?}", config);
        Ok(config)
    }

    /// Resolves which config file (if any) should be loaded. An explicit
    /// override must exist; the default `repox.toml` is optional.
    pub fn resolve_config_path(
        repo_root: &Path,
        override_path: Option<&PathBuf>,
        disabled: bool,
    ) -> Result<Option<PathBuf>> {
        if disabled {
            log::debug!("Config file loading disabled.");
            return Ok(None);
        }
        if let Some(explicit) = override_path {
            let path = if explicit.is_absolute() {
                explicit.clone()
            } else {
                repo_root.join(explicit)
            };
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Config file '{}' not found",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }
        let default_path = repo_root.join(DEFAULT_CONFIG_FILENAME);
        if default_path.is_file() {
            Ok(Some(default_path))
        } else {
            Ok(None)
        }
    }

    /// Resolved output location: either the stdout sentinel or dir/filename.
    pub fn is_stdout(&self) -> bool {
        self.output.dir == Path::new(STDOUT_SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.processing.rule, ProcessingRule::Interface);
        assert_eq!(config.output.style, OutputStyle::RepoMap);
        assert_eq!(config.output.dir, PathBuf::from("results"));
        assert_eq!(config.output.filename, "repo-to-text.txt");
        assert!(config.filter.ignore_patterns.is_empty());
        assert!(config.filter.include_patterns.is_empty());
    }

    #[test]
    fn parses_full_config_file() {
        let toml_str = r#"
            [filter]
            ignore_patterns = ["*.log", "target/"]
            include_patterns = ["*.py"]
            path_pattern = "^src/"

            [processing]
            rule = "imports"

            [output]
            style = "import_list"
            dir = "out"
            filename = "imports.txt"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.filter.ignore_patterns, vec!["*.log", "target/"]);
        assert_eq!(config.filter.path_pattern.as_deref(), Some("^src/"));
        assert_eq!(config.processing.rule, ProcessingRule::Imports);
        assert_eq!(config.output.style, OutputStyle::ImportList);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.filename, "imports.txt");
    }

    #[test]
    fn rejects_unknown_keys() {
        let toml_str = r#"
            [output]
            stylo = "flat"
        "#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn rule_and_style_round_trip_through_config_names() {
        for rule in [
            ProcessingRule::RawContent,
            ProcessingRule::Interface,
            ProcessingRule::Integral,
            ProcessingRule::Imports,
        ] {
            assert_eq!(rule.as_str().parse::<ProcessingRule>().unwrap(), rule);
        }
        for style in [
            OutputStyle::RepoMap,
            OutputStyle::Flat,
            OutputStyle::ImportList,
        ] {
            assert_eq!(style.as_str().parse::<OutputStyle>().unwrap(), style);
        }
        assert!("full-content".parse::<ProcessingRule>().is_err());
    }

    #[test]
    fn stdout_sentinel_is_detected() {
        let mut config = Config::default();
        assert!(!config.is_stdout());
        config.output.dir = PathBuf::from("stdout");
        assert!(config.is_stdout());
    }
}
