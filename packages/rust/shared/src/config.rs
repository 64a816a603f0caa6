//! Build configuration for stylebuild.
//!
//! The configuration lives at `./stylebuild.toml`, next to the stylesheet it
//! builds. It is consumed as-is by the pipeline stages: nothing here checks
//! that class names, colors or lengths make sense.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StyleBuildError};

/// Configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "stylebuild.toml";

// ---------------------------------------------------------------------------
// Config structs (matching stylebuild.toml schema)
// ---------------------------------------------------------------------------

/// Top-level build config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Glob patterns of files scanned for utility class candidates.
    #[serde(default = "default_content")]
    pub content: Vec<String>,

    /// Classes generated whether or not they appear in content.
    #[serde(default)]
    pub safelist: Vec<String>,

    /// Prefix every generated utility must carry (e.g. `tw-`).
    #[serde(default)]
    pub prefix: String,

    /// Mark every generated declaration `!important`.
    #[serde(default)]
    pub important: bool,

    /// How the `dark:` variant is expressed.
    #[serde(default)]
    pub dark_mode: DarkMode,

    /// Source and destination stylesheet locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Post-processing stage options.
    #[serde(default)]
    pub postprocess: PostprocessConfig,

    /// Theme overrides and extensions.
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content: default_content(),
            safelist: Vec::new(),
            prefix: String::new(),
            important: false,
            dark_mode: DarkMode::default(),
            paths: PathsConfig::default(),
            postprocess: PostprocessConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

fn default_content() -> Vec<String> {
    vec!["templates/**/*.html".into()]
}

/// Strategy for the `dark:` variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkMode {
    /// `@media (prefers-color-scheme: dark)`.
    #[default]
    Media,
    /// A `.dark` class on an ancestor element.
    Class,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Source stylesheet, relative to the working directory.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Destination stylesheet, relative to the working directory.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("assets/css/tailwind_input.css")
}
fn default_output() -> PathBuf {
    PathBuf::from("static/css/tailwind.css")
}

/// `[postprocess]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostprocessConfig {
    /// Emit minified CSS.
    #[serde(default)]
    pub minify: bool,

    /// Browserslist queries used for vendor prefixing and syntax lowering.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// A color entry: either a single value or a map of shades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Flat(String),
    Shades(BTreeMap<String, String>),
}

/// Named theme scales. Every scale is optional so that a table can say
/// "replace this one" or "extend this one" without restating the others.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeScales {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screens: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<BTreeMap<String, ColorValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<BTreeMap<String, String>>,
}

/// `[theme]` section: scales given directly replace the defaults, scales
/// under `[theme.extend]` are merged over them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(flatten)]
    pub overrides: ThemeScales,

    #[serde(default)]
    pub extend: ThemeScales,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the build config from the working directory. Returns defaults if the
/// file does not exist.
pub fn load_config() -> Result<BuildConfig> {
    load_config_in(Path::new("."))
}

/// Load the build config from `dir`. Returns defaults if the file does not
/// exist.
pub fn load_config_in(dir: &Path) -> Result<BuildConfig> {
    let path = dir.join(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(BuildConfig::default());
    }

    load_config_from(&path)
}

/// Load the build config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<BuildConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StyleBuildError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| StyleBuildError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into `dir`. Refuses to replace an existing one.
/// Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(StyleBuildError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let config = BuildConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StyleBuildError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StyleBuildError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn default_config_serializes() {
        let config = BuildConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("tailwind_input.css"));
        assert!(toml_str.contains("templates/**/*.html"));
    }

    #[test]
    fn config_roundtrip() {
        let config = BuildConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: BuildConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.paths.output, PathBuf::from("static/css/tailwind.css"));
        assert_eq!(parsed.dark_mode, DarkMode::Media);
        assert!(!parsed.postprocess.minify);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let parsed: BuildConfig = toml::from_str("").expect("parse");
        assert_eq!(parsed.content, vec!["templates/**/*.html".to_string()]);
        assert!(parsed.theme.overrides.spacing.is_none());
    }

    #[test]
    fn theme_overrides_and_extend() {
        let toml_str = r##"
content = ["web/**/*.html"]
prefix = "tw-"
dark_mode = "class"

[theme.spacing]
"1" = "4px"

[theme.extend.colors]
brand = "#123456"

[theme.extend.colors.accent]
100 = "#fef"
500 = "#f0f"
"##;
        let config: BuildConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.prefix, "tw-");
        assert_eq!(config.dark_mode, DarkMode::Class);

        let spacing = config.theme.overrides.spacing.expect("spacing override");
        assert_eq!(spacing.get("1").map(String::as_str), Some("4px"));

        let colors = config.theme.extend.colors.expect("color extension");
        assert_eq!(colors.get("brand"), Some(&ColorValue::Flat("#123456".into())));
        match colors.get("accent") {
            Some(ColorValue::Shades(shades)) => assert_eq!(shades.len(), 2),
            other => panic!("expected shades, got {other:?}"),
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sb_cfg_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    #[test]
    fn malformed_config_is_config_error() {
        let dir = temp_dir();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "content = 42").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, StyleBuildError::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = temp_dir();

        let config = load_config_in(&dir).expect("load");
        assert_eq!(config.paths.input, PathBuf::from("assets/css/tailwind_input.css"));
        assert_eq!(config.content, vec!["templates/**/*.html".to_string()]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn init_then_load_and_refuse_overwrite() {
        let dir = temp_dir();

        let path = init_config(&dir).expect("init");
        assert_eq!(path, dir.join(CONFIG_FILE_NAME));
        std::fs::write(&path, "prefix = \"tw-\"\n").expect("edit");
        assert_eq!(load_config_in(&dir).expect("load").prefix, "tw-");

        let err = init_config(&dir).unwrap_err();
        assert!(matches!(err, StyleBuildError::Config { .. }));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "prefix = \"tw-\"\n"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
