use crate::core::models::{AutoprefixerConfig, BuildConfig, BuildMode, PostCssPlugin};
use crate::utils::{Logger, Result, SokuError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "soku-styles.config.json";

/// One stylesheet registration as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessorEntry {
    pub kind: String,
    pub src: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub plugin_options: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_css_plugins: Vec<PostCssPlugin>,
}

/// Configuration file format (soku-styles.config.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesConfig {
    /// Entry point the stylesheets are added to (default: "main")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Files already present in that entry point
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_files: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_css_urls: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_maps: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmr: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BuildMode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_css: Vec<PostCssPlugin>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoprefixer: Option<AutoprefixerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_nano: Option<Value>,

    #[serde(default)]
    pub preprocessors: Vec<PreprocessorEntry>,
}

/// Command-line overrides; `None` leaves the file value in place
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub mode: Option<BuildMode>,
    pub hmr: Option<bool>,
    pub source_maps: Option<bool>,
    pub process_css_urls: Option<bool>,
}

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file if it exists
    pub async fn load_from_file(root: &Path) -> Result<Option<StylesConfig>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        let content = match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Logger::debug(&format!("No {} found in {}", CONFIG_FILE_NAME, root.display()));
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        Logger::debug(&format!("Loading config from {}", config_path.display()));
        Self::parse(&content).map(Some)
    }

    pub fn parse(content: &str) -> Result<StylesConfig> {
        serde_json::from_str(content).map_err(|e| {
            SokuError::config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
        })
    }

    /// Merge file config with CLI arguments (CLI > config file > default)
    pub fn merge_with_cli(file_config: &StylesConfig, root: PathBuf, cli: &CliOverrides) -> BuildConfig {
        let defaults = BuildConfig::default();

        BuildConfig {
            root,
            public_path: file_config
                .public_path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or(defaults.public_path),
            process_css_urls: cli
                .process_css_urls
                .or(file_config.process_css_urls)
                .unwrap_or(defaults.process_css_urls),
            post_css: file_config.post_css.clone(),
            autoprefixer: file_config.autoprefixer.clone().unwrap_or(defaults.autoprefixer),
            css_nano: file_config.css_nano.clone().unwrap_or(defaults.css_nano),
            enable_source_maps: cli
                .source_maps
                .or(file_config.source_maps)
                .unwrap_or(defaults.enable_source_maps),
            hmr: cli.hmr.or(file_config.hmr).unwrap_or(defaults.hmr),
            mode: cli.mode.or(file_config.mode).unwrap_or(defaults.mode),
        }
    }

    /// Generate example config file
    pub fn generate_example() -> String {
        let example = StylesConfig {
            entry: Some("app".to_string()),
            entry_files: vec!["resources/js/app.js".to_string()],
            public_path: Some("public".to_string()),
            process_css_urls: Some(true),
            source_maps: Some(false),
            mode: Some(BuildMode::Development),
            post_css: vec![PostCssPlugin::new("postcss-nested", json!({}))],
            preprocessors: vec![
                PreprocessorEntry {
                    kind: "sass".to_string(),
                    src: "resources/sass/app.scss".to_string(),
                    output: "public/css".to_string(),
                    plugin_options: Map::new(),
                    post_css_plugins: Vec::new(),
                },
                PreprocessorEntry {
                    kind: "less".to_string(),
                    src: "resources/less/admin.less".to_string(),
                    output: "public/css/admin.css".to_string(),
                    plugin_options: json!({ "lessOptions": { "javascriptEnabled": true } })
                        .as_object()
                        .cloned()
                        .unwrap_or_default(),
                    post_css_plugins: Vec::new(),
                },
            ],
            ..Default::default()
        };

        serde_json::to_string_pretty(&example).unwrap_or_else(|_| {
            r#"{
  "entry": "app",
  "publicPath": "public",
  "preprocessors": [
    { "kind": "sass", "src": "resources/sass/app.scss", "output": "public/css" }
  ]
}"#
            .to_string()
        })
    }
}
