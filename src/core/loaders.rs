// Loader descriptions for the stylesheet chain, outermost first:
// extract -> css -> postcss -> resolve-url -> compiler

use crate::core::models::{BuildConfig, BuildMode, BundlerPlugin, Loader, PostCssPlugin};
use serde_json::{json, Map, Value};

pub const EXTRACT_LOADER: &str = "mini-css-extract-plugin/loader";
pub const EXTRACT_PLUGIN: &str = "mini-css-extract-plugin";
pub const CSS_LOADER: &str = "css-loader";
pub const POSTCSS_LOADER: &str = "postcss-loader";
pub const RESOLVE_URL_LOADER: &str = "resolve-url-loader";
pub const STYLE_LOADER: &str = "style-loader";

fn options(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Pulls the CSS out into its own file
pub fn extract_loader(config: &BuildConfig) -> Loader {
    Loader::with_options(
        EXTRACT_LOADER,
        options(json!({
            "hmr": config.mode == BuildMode::Development,
            "esModule": true,
        })),
    )
}

/// Resolves `@import` and `url()`; `importLoaders: 1` routes imports
/// through the post-processing step as well.
pub fn css_loader(config: &BuildConfig) -> Loader {
    Loader::with_options(
        CSS_LOADER,
        options(json!({
            "url": config.process_css_urls,
            "sourceMap": config.enable_source_maps,
            "importLoaders": 1,
        })),
    )
}

/// Task plugins (or the global defaults when the task has none), then
/// autoprefixer and, in production, cssnano.
pub fn postcss_plugins(task_plugins: &[PostCssPlugin], config: &BuildConfig) -> Vec<PostCssPlugin> {
    let mut plugins = if task_plugins.is_empty() {
        config.post_css.clone()
    } else {
        task_plugins.to_vec()
    };

    if config.autoprefixer.enabled {
        plugins.push(PostCssPlugin::new(
            "autoprefixer",
            config.autoprefixer.options.clone(),
        ));
    }

    if config.in_production() {
        plugins.push(PostCssPlugin::new(
            "cssnano",
            json!({ "preset": ["default", config.css_nano] }),
        ));
    }

    plugins
}

/// `ident` must differ per rule or the bundler shares one loader cache
pub fn postcss_loader(
    task_plugins: &[PostCssPlugin],
    config: &BuildConfig,
    source_map: bool,
    index: usize,
) -> Loader {
    let plugins: Vec<Value> = postcss_plugins(task_plugins, config)
        .into_iter()
        .map(|plugin| json!({ "name": plugin.name, "options": plugin.options }))
        .collect();

    Loader::with_options(
        POSTCSS_LOADER,
        options(json!({
            "sourceMap": source_map,
            "ident": format!("postcss{}", index),
            "plugins": plugins,
        })),
    )
}

pub fn resolve_url_loader() -> Loader {
    Loader::with_options(
        RESOLVE_URL_LOADER,
        options(json!({
            "sourceMap": true,
            "engine": "rework",
        })),
    )
}

pub fn style_loader() -> Loader {
    Loader::new(STYLE_LOADER)
}

/// Injects styles at runtime ahead of the rest of the chain when live reload is on
pub fn apply_hot_reload(hmr: bool, loaders: Vec<Loader>) -> Vec<Loader> {
    if hmr {
        std::iter::once(style_loader()).chain(loaders).collect()
    } else {
        loaders
    }
}

pub fn extract_plugin() -> BundlerPlugin {
    BundlerPlugin {
        name: EXTRACT_PLUGIN.to_string(),
        options: json!({
            "filename": "[name].css",
            "esModule": true,
        }),
    }
}
