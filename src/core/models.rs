use crate::core::file_ref::FileRef;
use crate::utils::{Result, SokuError};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    pub fn is_production(&self) -> bool {
        matches!(self, BuildMode::Production)
    }
}

impl FromStr for BuildMode {
    type Err = SokuError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            other => Err(SokuError::config(format!("Unknown build mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoprefixerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "empty_object")]
    pub options: Value,
}

impl Default for AutoprefixerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            options: empty_object(),
        }
    }
}

/// Read-only snapshot of the global build settings consulted while
/// generating stylesheet rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Public web root, stripped from output paths
    #[serde(default = "default_public_path")]
    pub public_path: PathBuf,
    /// Rewrite `url()` references inside stylesheets
    #[serde(default = "default_true")]
    pub process_css_urls: bool,
    /// Default post-processing plugins for tasks that bring none
    #[serde(default)]
    pub post_css: Vec<PostCssPlugin>,
    #[serde(default)]
    pub autoprefixer: AutoprefixerConfig,
    /// Options for the cssnano `default` preset, production only
    #[serde(default = "empty_object")]
    pub css_nano: Value,
    #[serde(default)]
    pub enable_source_maps: bool,
    #[serde(default)]
    pub hmr: bool,
    #[serde(default = "default_mode")]
    pub mode: BuildMode,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_public_path() -> PathBuf {
    PathBuf::from("public")
}

fn default_true() -> bool {
    true
}

fn default_mode() -> BuildMode {
    BuildMode::Production
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_path: default_public_path(),
            process_css_urls: true,
            post_css: Vec::new(),
            autoprefixer: AutoprefixerConfig::default(),
            css_nano: empty_object(),
            enable_source_maps: false,
            hmr: false,
            mode: default_mode(),
        }
    }
}

impl BuildConfig {
    pub fn in_production(&self) -> bool {
        self.mode.is_production()
    }
}

/// Compiler family handled by a registered stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreprocessorKind {
    Sass,
    Less,
    Stylus,
    PostCss,
}

impl PreprocessorKind {
    pub fn name(&self) -> &'static str {
        match self {
            PreprocessorKind::Sass => "sass",
            PreprocessorKind::Less => "less",
            PreprocessorKind::Stylus => "stylus",
            PreprocessorKind::PostCss => "postCss",
        }
    }

    /// Loader running the kind's own compiler. Plain PostCSS has none.
    pub fn compiler_loader(&self) -> Option<String> {
        match self {
            PreprocessorKind::Sass | PreprocessorKind::Less | PreprocessorKind::Stylus => {
                Some(format!("{}-loader", self.name()))
            }
            PreprocessorKind::PostCss => None,
        }
    }

    /// npm packages a project needs installed to build this kind
    pub fn dependencies(&self) -> &'static [&'static str] {
        match self {
            PreprocessorKind::Sass => &["sass-loader", "sass"],
            PreprocessorKind::Less => &["less-loader", "less"],
            PreprocessorKind::Stylus => &["stylus-loader", "stylus"],
            PreprocessorKind::PostCss => &["postcss-loader"],
        }
    }
}

impl fmt::Display for PreprocessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreprocessorKind {
    type Err = SokuError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sass" => Ok(PreprocessorKind::Sass),
            "less" => Ok(PreprocessorKind::Less),
            "stylus" => Ok(PreprocessorKind::Stylus),
            "postcss" => Ok(PreprocessorKind::PostCss),
            "" => Err(SokuError::validation("preprocessor kind must not be empty")),
            other => Err(SokuError::validation(format!(
                "Unknown preprocessor kind: {}",
                other
            ))),
        }
    }
}

/// Compiler implementation handed to the kind's loader. A deferred value is
/// resolved once, when rules are generated.
pub enum Implementation {
    Fixed(Value),
    Deferred(Box<dyn FnOnce() -> Result<Value>>),
}

impl Implementation {
    pub fn deferred(f: impl FnOnce() -> Result<Value> + 'static) -> Self {
        Implementation::Deferred(Box::new(f))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Implementation::Fixed(_))
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Implementation::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Options passed through to the kind's compiler loader
#[derive(Debug, Default)]
pub struct PluginOptions {
    values: Map<String, Value>,
    implementation: Option<Implementation>,
}

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementation = Some(implementation);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if key == "implementation" {
            self.implementation = Some(Implementation::Fixed(value));
        } else {
            self.values.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn implementation(&self) -> Option<&Implementation> {
        self.implementation.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.implementation.is_none()
    }

    /// Resolve a deferred implementation and inject the source map flag.
    /// The injected `sourceMap` always overrides a caller-supplied one.
    pub(crate) fn resolve(&mut self, source_map: bool) -> Result<Map<String, Value>> {
        self.implementation = match self.implementation.take() {
            Some(Implementation::Deferred(resolve)) => Some(Implementation::Fixed(resolve()?)),
            other => other,
        };

        self.values
            .insert("sourceMap".to_string(), Value::Bool(source_map));

        let mut options = self.values.clone();
        if let Some(Implementation::Fixed(value)) = &self.implementation {
            options.insert("implementation".to_string(), value.clone());
        }
        Ok(options)
    }
}

impl From<Map<String, Value>> for PluginOptions {
    fn from(values: Map<String, Value>) -> Self {
        let mut options = PluginOptions::new();
        for (key, value) in values {
            options.insert(key, value);
        }
        options
    }
}

/// A post-processing plugin instance, e.g. `autoprefixer` with its options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCssPlugin {
    pub name: String,
    #[serde(default = "empty_object")]
    pub options: Value,
}

impl PostCssPlugin {
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

#[derive(Debug)]
pub struct PreprocessingTask {
    pub kind: PreprocessorKind,
    pub source: FileRef,
    /// Always a file path, never a directory
    pub output: FileRef,
    pub plugin_options: PluginOptions,
    pub post_css_plugins: Vec<PostCssPlugin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loader {
    pub loader: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

impl Loader {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: None,
        }
    }

    pub fn with_options(loader: impl Into<String>, options: Map<String, Value>) -> Self {
        Self {
            loader: loader.into(),
            options: Some(options),
        }
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.as_ref().and_then(|options| options.get(key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleRule {
    pub test: String,
    /// Output path relative to the public root; not part of the bundler schema
    #[serde(skip_serializing)]
    pub output: String,
    #[serde(rename = "use")]
    pub loaders: Vec<Loader>,
}

impl ModuleRule {
    pub fn loader_names(&self) -> Vec<&str> {
        self.loaders.iter().map(|l| l.loader.as_str()).collect()
    }

    pub fn find_loader(&self, name: &str) -> Option<&Loader> {
        self.loaders.iter().find(|l| l.loader == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundlerPlugin {
    pub name: String,
    pub options: Value,
}

/// Attributes attached to a split-chunk group
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMetadata {
    pub combine_all: bool,
    pub force: bool,
    pub asset_kind: String,
}

impl ChunkMetadata {
    pub fn css_extract() -> Self {
        Self {
            combine_all: true,
            force: true,
            asset_kind: "css/mini-extract".to_string(),
        }
    }
}

/// Entry point name → source files, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    structure: Vec<(String, Vec<String>)>,
}

pub const DEFAULT_ENTRY_NAME: &str = "main";

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// An accumulator with one empty entry point
    pub fn named(name: &str) -> Self {
        Self {
            structure: vec![(name.to_string(), Vec::new())],
        }
    }

    pub fn add(&mut self, name: &str, path: impl Into<String>) {
        let path = path.into();
        match self.structure.iter_mut().find(|(key, _)| key == name) {
            Some((_, paths)) => paths.push(path),
            None => self.structure.push((name.to_string(), vec![path])),
        }
    }

    /// Append to the first entry point, creating `main` when there is none
    pub fn add_to_first(&mut self, path: impl Into<String>) {
        let name = self
            .keys()
            .first()
            .map(|key| key.to_string())
            .unwrap_or_else(|| DEFAULT_ENTRY_NAME.to_string());
        self.add(&name, path);
    }

    pub fn keys(&self) -> Vec<&str> {
        self.structure.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.structure
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, paths)| paths.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.structure.len()))?;
        for (name, paths) in &self.structure {
            map.serialize_entry(name, paths)?;
        }
        map.end()
    }
}
