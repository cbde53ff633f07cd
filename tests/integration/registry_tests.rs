use serde_json::json;
use soku_styles::core::loaders::{
    CSS_LOADER, EXTRACT_LOADER, POSTCSS_LOADER, RESOLVE_URL_LOADER, STYLE_LOADER,
};
use soku_styles::infrastructure::{ArgumentValidator, Chunks};
use soku_styles::{
    BuildConfig, BuildMode, Entry, Implementation, PluginOptions, PostCssPlugin, PreprocessorKind,
    PreprocessorRegistry,
};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

fn new_registry() -> PreprocessorRegistry {
    PreprocessorRegistry::new(".", Arc::new(ArgumentValidator), Arc::new(Chunks::new()))
}

fn development() -> BuildConfig {
    BuildConfig {
        mode: BuildMode::Development,
        ..Default::default()
    }
}

#[test]
fn test_sass_into_public_css_directory() {
    let mut registry = new_registry();
    registry
        .register(PreprocessorKind::Sass, "src/app.scss", "public/css", PluginOptions::new(), vec![])
        .unwrap();

    assert_eq!(registry.tasks()[0].output.path(), Path::new("public/css/app.css"));

    let rules = registry.webpack_rules(&development()).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].test, "src/app.scss");
    assert_eq!(
        rules[0].loader_names(),
        vec![EXTRACT_LOADER, CSS_LOADER, POSTCSS_LOADER, RESOLVE_URL_LOADER, "sass-loader"]
    );
    assert_eq!(
        rules[0].find_loader(POSTCSS_LOADER).unwrap().option("sourceMap"),
        Some(&json!(true))
    );
    assert_eq!(
        rules[0].find_loader(RESOLVE_URL_LOADER).unwrap().option("engine"),
        Some(&json!("rework"))
    );
}

#[test]
fn test_two_less_files() {
    let mut registry = new_registry();
    registry
        .register(PreprocessorKind::Less, "src/a.less", "public/a.css", PluginOptions::new(), vec![])
        .unwrap()
        .register(PreprocessorKind::Less, "src/b.less", "public/b.css", PluginOptions::new(), vec![])
        .unwrap();

    let mut entry = Entry::new();
    entry.add("app", "resources/js/app.js");
    entry.add("admin", "resources/js/admin.js");
    registry.webpack_entry(&mut entry);

    assert_eq!(
        entry.get("app").unwrap(),
        &[
            "resources/js/app.js".to_string(),
            "src/a.less".to_string(),
            "src/b.less".to_string(),
        ]
    );
    assert_eq!(entry.get("admin").unwrap().len(), 1);
    assert_eq!(registry.webpack_plugins().len(), 1);

    let rules = registry.webpack_rules(&development()).unwrap();
    let tests: Vec<&str> = rules.iter().map(|r| r.test.as_str()).collect();
    assert_eq!(tests, vec!["src/a.less", "src/b.less"]);
    assert_eq!(rules[0].output, "/a.css");
}

#[test]
fn test_production_postcss_plugins() {
    let mut registry = new_registry();
    registry
        .register(
            PreprocessorKind::PostCss,
            "src/app.css",
            "public/css/app.css",
            PluginOptions::new(),
            vec![PostCssPlugin::new("tailwindcss", json!({}))],
        )
        .unwrap();

    let rules = registry.webpack_rules(&BuildConfig::default()).unwrap();
    let postcss = rules[0].find_loader(POSTCSS_LOADER).unwrap();
    let names: Vec<&str> = postcss
        .option("plugins")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|plugin| plugin["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["tailwindcss", "autoprefixer", "cssnano"]);
    assert!(!rules[0].loader_names().iter().any(|name| *name == "postCss-loader"));
}

#[test]
fn test_hmr_chain_starts_with_style_loader() {
    let mut registry = new_registry();
    registry
        .register(PreprocessorKind::Stylus, "src/app.styl", "public/css", PluginOptions::new(), vec![])
        .unwrap();

    let config = BuildConfig {
        hmr: true,
        ..development()
    };
    let rules = registry.webpack_rules(&config).unwrap();
    assert_eq!(rules[0].loaders[0].loader, STYLE_LOADER);
    assert!(rules[0].loaders[0].options.is_none());
}

#[test]
fn test_implementation_resolved_at_rule_generation() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);

    let mut registry = new_registry();
    registry
        .register(
            PreprocessorKind::Sass,
            "src/app.scss",
            "public/css",
            PluginOptions::new()
                .with("sassOptions", json!({ "precision": 8 }))
                .with_implementation(Implementation::deferred(move || {
                    counter.set(counter.get() + 1);
                    Ok(json!("sass"))
                })),
            vec![],
        )
        .unwrap();
    assert_eq!(calls.get(), 0);

    let rules = registry.webpack_rules(&development()).unwrap();
    assert_eq!(calls.get(), 1);

    let sass = rules[0].find_loader("sass-loader").unwrap();
    assert_eq!(sass.option("implementation"), Some(&json!("sass")));
    assert_eq!(sass.option("sassOptions"), Some(&json!({ "precision": 8 })));
}
