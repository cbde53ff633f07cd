// Soku Styles - stylesheet preprocessor registration for the bundler

pub mod cli;
pub mod core;
pub mod infrastructure;
pub mod utils;

pub use crate::core::{
    BuildConfig, BuildMode, BundlerFragment, Entry, Implementation, PluginOptions, PostCssPlugin,
    PreprocessorKind, PreprocessorRegistry,
};
pub use crate::utils::{Result, SokuError};
