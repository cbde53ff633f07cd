use crate::core::{
    BuildConfig, BundlerFragment, Entry, PluginOptions, PreprocessorKind, PreprocessorRegistry,
};
use crate::infrastructure::{ArgumentValidator, Chunks};
use crate::utils::{
    CliOverrides, ConfigLoader, Logger, Result, SokuError, StylesConfig, CONFIG_FILE_NAME,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "soku-styles")]
#[command(about = "Soku Styles - stylesheet preprocessor rules for the bundler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit the bundler configuration fragment for the registered stylesheets
    Build {
        /// Project root containing soku-styles.config.json
        #[arg(short, long, default_value = ".")]
        root: String,
        /// Write the fragment here instead of stdout
        #[arg(short, long)]
        out: Option<String>,
        /// Build for production (adds cssnano)
        #[arg(long, conflicts_with = "development")]
        production: bool,
        /// Build for development
        #[arg(long)]
        development: bool,
        /// Inject styles at runtime for live reload
        #[arg(long)]
        hmr: bool,
        /// Enable source maps
        #[arg(long)]
        source_maps: bool,
        /// Leave url() references untouched
        #[arg(long)]
        no_process_css_urls: bool,
    },
    /// List the npm packages the registered stylesheets need
    Deps {
        #[arg(short, long, default_value = ".")]
        root: String,
    },
    /// Print an example soku-styles.config.json
    Init,
}

impl Commands {
    fn overrides(&self) -> CliOverrides {
        match self {
            Commands::Build {
                production,
                development,
                hmr,
                source_maps,
                no_process_css_urls,
                ..
            } => CliOverrides {
                mode: if *production {
                    Some(crate::core::BuildMode::Production)
                } else if *development {
                    Some(crate::core::BuildMode::Development)
                } else {
                    None
                },
                hmr: hmr.then_some(true),
                source_maps: source_maps.then_some(true),
                process_css_urls: no_process_css_urls.then_some(false),
            },
            _ => CliOverrides::default(),
        }
    }
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        // Initialize logging
        Logger::init();

        self.execute(Cli::parse()).await
    }

    pub async fn execute(&self, cli: Cli) -> anyhow::Result<()> {
        let overrides = cli.command.overrides();

        match cli.command {
            Commands::Build { root, out, .. } => {
                let fragment = self
                    .build_fragment(Path::new(&root), &overrides)
                    .await
                    .with_context(|| format!("Failed to build stylesheet rules for {}", root))?;
                let json = fragment.to_json()?;

                match out {
                    Some(path) => {
                        tokio::fs::write(&path, json)
                            .await
                            .with_context(|| format!("Failed to write {}", path))?;
                        Logger::fragment_written(&path);
                    }
                    None => println!("{}", json),
                }
                Ok(())
            }
            Commands::Deps { root } => {
                let (registry, _, _, _) = self
                    .load_registry(Path::new(&root), &overrides)
                    .await
                    .with_context(|| format!("Failed to load {} from {}", CONFIG_FILE_NAME, root))?;
                for dep in registry.dependencies() {
                    println!("{}", dep);
                }
                Ok(())
            }
            Commands::Init => {
                println!("{}", ConfigLoader::generate_example());
                Ok(())
            }
        }
    }

    /// Load the config file under `root`, register its stylesheets and
    /// assemble the bundler fragment
    pub async fn build_fragment(&self, root: &Path, overrides: &CliOverrides) -> Result<BundlerFragment> {
        let (mut registry, config, entry, chunks) = self.load_registry(root, overrides).await?;

        let fragment = BundlerFragment::assemble(&mut registry, &config, entry, &*chunks)?;
        Logger::info(&format!("🎨 Stylesheet fragment: {}", fragment.summary()));
        Ok(fragment)
    }

    async fn load_registry(
        &self,
        root: &Path,
        overrides: &CliOverrides,
    ) -> Result<(PreprocessorRegistry, BuildConfig, Entry, Arc<Chunks>)> {
        let file_config = ConfigLoader::load_from_file(root).await?.ok_or_else(|| {
            SokuError::config(format!("{} not found in {}", CONFIG_FILE_NAME, root.display()))
        })?;
        let config = ConfigLoader::merge_with_cli(&file_config, PathBuf::from(root), overrides);

        let chunks = Arc::new(Chunks::new());
        let registry = Self::register_all(&file_config, root, chunks.clone())?;
        let entry = Self::initial_entry(&file_config);

        Ok((registry, config, entry, chunks))
    }

    fn register_all(file_config: &StylesConfig, root: &Path, chunks: Arc<Chunks>) -> Result<PreprocessorRegistry> {
        let mut registry = PreprocessorRegistry::new(root, Arc::new(ArgumentValidator), chunks);

        for preprocessor in &file_config.preprocessors {
            let kind: PreprocessorKind = preprocessor.kind.parse()?;
            registry.register(
                kind,
                &preprocessor.src,
                &preprocessor.output,
                PluginOptions::from(preprocessor.plugin_options.clone()),
                preprocessor.post_css_plugins.clone(),
            )?;
        }

        if registry.tasks().is_empty() {
            Logger::warn("No preprocessors registered");
        }

        Ok(registry)
    }

    fn initial_entry(file_config: &StylesConfig) -> Entry {
        let mut entry = match &file_config.entry {
            Some(name) => Entry::named(name),
            None => Entry::new(),
        };
        for file in &file_config.entry_files {
            entry.add_to_first(file.clone());
        }
        entry
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_overrides() {
        let cli = Cli::parse_from(["soku-styles", "build", "--production", "--hmr", "--no-process-css-urls"]);
        let overrides = cli.command.overrides();
        assert_eq!(overrides.mode, Some(crate::core::BuildMode::Production));
        assert_eq!(overrides.hmr, Some(true));
        assert_eq!(overrides.source_maps, None);
        assert_eq!(overrides.process_css_urls, Some(false));
    }

    #[tokio::test]
    async fn test_build_error_carries_context() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(["soku-styles", "build", "--root", root.as_str()]);

        let err = CliHandler::new().execute(cli).await.unwrap_err();
        let report = format!("{:#}", err);
        assert!(report.starts_with("Failed to build stylesheet rules for"));
        assert!(report.contains(CONFIG_FILE_NAME));
        assert!(err.downcast_ref::<SokuError>().is_some());
    }

    #[test]
    fn test_production_conflicts_with_development() {
        assert!(Cli::try_parse_from(["soku-styles", "build", "--production", "--development"]).is_err());
    }

    #[test]
    fn test_initial_entry() {
        let config = StylesConfig {
            entry: Some("app".to_string()),
            entry_files: vec!["resources/js/app.js".to_string()],
            ..Default::default()
        };
        let entry = CliHandler::initial_entry(&config);
        assert_eq!(entry.keys(), vec!["app"]);
        assert_eq!(entry.get("app").unwrap(), &["resources/js/app.js".to_string()]);
    }

    #[test]
    fn test_register_all_rejects_unknown_kind() {
        let config = StylesConfig {
            preprocessors: vec![crate::utils::PreprocessorEntry {
                kind: "scss-ish".to_string(),
                src: "src/app.scss".to_string(),
                output: "public/css".to_string(),
                plugin_options: Default::default(),
                post_css_plugins: Vec::new(),
            }],
            ..Default::default()
        };

        let err = CliHandler::register_all(&config, Path::new("."), Arc::new(Chunks::new()))
            .err()
            .unwrap();
        assert!(err.is_validation());
    }
}
