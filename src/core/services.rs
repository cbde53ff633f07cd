use crate::core::file_ref::FileRef;
use crate::core::interfaces::{ChunkRegistry, PreprocessorValidator};
use crate::core::loaders;
use crate::core::models::*;
use crate::utils::{Logger, Result, Timer};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;

/// Cache group every extracted stylesheet is registered under
pub const STYLES_CHUNK: &str = "styles";
pub const CSS_PATTERN: &str = r"\.css$";

/// Records stylesheet registrations for one build and turns them into
/// bundler entries, module rules and plugins.
///
/// Registration must finish before any of the `webpack_*` queries run.
pub struct PreprocessorRegistry {
    root: PathBuf,
    tasks: Vec<PreprocessingTask>,
    validator: Arc<dyn PreprocessorValidator>,
    chunks: Arc<dyn ChunkRegistry>,
}

impl PreprocessorRegistry {
    pub fn new(
        root: impl Into<PathBuf>,
        validator: Arc<dyn PreprocessorValidator>,
        chunks: Arc<dyn ChunkRegistry>,
    ) -> Self {
        chunks.enable_runtime();

        Self {
            root: root.into(),
            tasks: Vec::new(),
            validator,
            chunks,
        }
    }

    pub fn tasks(&self) -> &[PreprocessingTask] {
        &self.tasks
    }

    /// Register a stylesheet. A directory output gets `<source stem>.css`
    /// appended. Repeated calls append; nothing is deduplicated.
    pub fn register(
        &mut self,
        kind: PreprocessorKind,
        source: impl AsRef<Path>,
        output: impl AsRef<Path>,
        plugin_options: PluginOptions,
        post_css_plugins: Vec<PostCssPlugin>,
    ) -> Result<&mut Self> {
        let source = source.as_ref();
        let output = output.as_ref();

        self.validator.validate(
            kind.name(),
            &source.to_string_lossy(),
            &output.to_string_lossy(),
        )?;

        let source = FileRef::new(source);
        let fallback = format!("{}.css", source.name_without_extension());
        let output = self.normalize_output(FileRef::new(output), &fallback);

        self.chunks.add(
            STYLES_CHUNK,
            &output.relative_path_without_extension(&self.root),
            CSS_PATTERN,
            ChunkMetadata::css_extract(),
        )?;

        Logger::registered_preprocessor(kind.name(), &source.path_string(), &output.path_string());

        self.tasks.push(PreprocessingTask {
            kind,
            source,
            output,
            plugin_options,
            post_css_plugins,
        });

        Ok(self)
    }

    /// The stored path stays as written; only the directory check looks under the root
    fn normalize_output(&self, output: FileRef, fallback_name: &str) -> FileRef {
        if output.is_directory(&self.root) {
            output.join(fallback_name)
        } else {
            output
        }
    }

    /// Add every registered source to the first entry point
    pub fn webpack_entry(&self, entry: &mut Entry) {
        for task in &self.tasks {
            entry.add_to_first(task.source.path_string());
        }
    }

    /// One module rule per registered stylesheet, in registration order.
    /// Deferred compiler implementations are resolved here.
    pub fn webpack_rules(&mut self, config: &BuildConfig) -> Result<Vec<ModuleRule>> {
        let _timer = Timer::start("Generating stylesheet rules");

        let mut rules = Vec::with_capacity(self.tasks.len());
        for (index, task) in self.tasks.iter_mut().enumerate() {
            rules.push(Self::rule_for(task, index, config)?);
        }

        Logger::synthesized_rules(rules.len());
        Ok(rules)
    }

    fn rule_for(task: &mut PreprocessingTask, index: usize, config: &BuildConfig) -> Result<ModuleRule> {
        let url_resolution = Self::needs_url_resolution(task.kind, config);
        let source_map = url_resolution || config.enable_source_maps;

        let mut chain = vec![
            loaders::extract_loader(config),
            loaders::css_loader(config),
            loaders::postcss_loader(&task.post_css_plugins, config, source_map, index),
        ];

        if url_resolution {
            chain.push(loaders::resolve_url_loader());
        }

        if let Some(compiler) = task.kind.compiler_loader() {
            let options = task.plugin_options.resolve(source_map)?;
            chain.push(Loader::with_options(compiler, options));
        }

        Ok(ModuleRule {
            test: task.source.path_string(),
            output: Self::public_output_path(&task.output, &config.public_path),
            loaders: loaders::apply_hot_reload(config.hmr, chain),
        })
    }

    /// Sass needs its `url()`s rebased before css-loader sees them
    fn needs_url_resolution(kind: PreprocessorKind, config: &BuildConfig) -> bool {
        match kind {
            PreprocessorKind::Sass => config.process_css_urls,
            PreprocessorKind::Less | PreprocessorKind::Stylus | PreprocessorKind::PostCss => false,
        }
    }

    fn public_output_path(output: &FileRef, public_path: &Path) -> String {
        let prefix = format!("{}{}", public_path.to_string_lossy(), MAIN_SEPARATOR);
        output
            .path_string()
            .replacen(&prefix, &MAIN_SEPARATOR.to_string(), 1)
            .replace('\\', "/")
    }

    /// A single extraction plugin serves every registered stylesheet
    pub fn webpack_plugins(&self) -> Vec<BundlerPlugin> {
        vec![loaders::extract_plugin()]
    }

    /// npm packages required by the registered kinds, first use first
    pub fn dependencies(&self) -> Vec<&'static str> {
        let mut deps: Vec<&'static str> = Vec::new();
        for task in &self.tasks {
            for dep in task.kind.dependencies() {
                if !deps.contains(dep) {
                    deps.push(dep);
                }
            }
        }
        deps
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleSection {
    pub rules: Vec<ModuleRule>,
}

/// Everything the registry contributes to the bundler configuration
#[derive(Debug, Clone, Serialize)]
pub struct BundlerFragment {
    pub entry: Entry,
    pub module: ModuleSection,
    pub plugins: Vec<BundlerPlugin>,
    pub optimization: Value,
}

impl BundlerFragment {
    /// Runs entry augmentation, rule generation and plugin listing once each
    pub fn assemble(
        registry: &mut PreprocessorRegistry,
        config: &BuildConfig,
        mut entry: Entry,
        chunks: &dyn ChunkRegistry,
    ) -> Result<Self> {
        registry.webpack_entry(&mut entry);
        let rules = registry.webpack_rules(config)?;
        let plugins = registry.webpack_plugins();

        Ok(Self {
            entry,
            module: ModuleSection { rules },
            plugins,
            optimization: chunks.optimization(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> Value {
        json!({
            "entries": self.entry.keys(),
            "rules": self.module.rules.len(),
            "plugins": self.plugins.len(),
        })
    }
}
