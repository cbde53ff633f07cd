use serde_json::Value;
use soku_styles::cli::CliHandler;
use soku_styles::utils::{CliOverrides, CONFIG_FILE_NAME};
use soku_styles::BuildMode;

fn write_config(dir: &std::path::Path, content: &str) {
    std::fs::write(dir.join(CONFIG_FILE_NAME), content).unwrap();
}

#[tokio::test]
async fn test_build_fragment_from_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(
        temp_dir.path(),
        r#"{
            "entry": "app",
            "entryFiles": ["resources/js/app.js"],
            "mode": "development",
            "preprocessors": [
                { "kind": "sass", "src": "resources/sass/app.scss", "output": "public/css" },
                { "kind": "less", "src": "resources/less/admin.less", "output": "public/css/admin.css",
                  "pluginOptions": { "implementation": "less" } }
            ]
        }"#,
    );

    let handler = CliHandler::new();
    let fragment = handler
        .build_fragment(temp_dir.path(), &CliOverrides::default())
        .await
        .unwrap();

    let value: Value = serde_json::from_str(&fragment.to_json().unwrap()).unwrap();
    assert_eq!(
        value["entry"]["app"],
        serde_json::json!([
            "resources/js/app.js",
            "resources/sass/app.scss",
            "resources/less/admin.less"
        ])
    );

    let rules = value["module"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["use"][4]["loader"], "sass-loader");
    assert_eq!(rules[1]["use"][3]["options"]["implementation"], "less");
    assert_eq!(value["plugins"].as_array().unwrap().len(), 1);
    assert!(value["optimization"]["splitChunks"]["cacheGroups"].is_object());
}

#[tokio::test]
async fn test_cli_overrides_mode() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(
        temp_dir.path(),
        r#"{ "mode": "development",
             "preprocessors": [ { "kind": "postcss", "src": "src/app.css", "output": "public/app.css" } ] }"#,
    );

    let overrides = CliOverrides {
        mode: Some(BuildMode::Production),
        hmr: Some(true),
        ..Default::default()
    };
    let fragment = CliHandler::new()
        .build_fragment(temp_dir.path(), &overrides)
        .await
        .unwrap();

    let rule = &fragment.module.rules[0];
    assert_eq!(rule.loaders[0].loader, "style-loader");
    let plugins = rule
        .find_loader("postcss-loader")
        .unwrap()
        .option("plugins")
        .unwrap()
        .as_array()
        .unwrap();
    assert!(plugins.iter().any(|plugin| plugin["name"] == "cssnano"));
}

#[tokio::test]
async fn test_missing_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let err = CliHandler::new()
        .build_fragment(temp_dir.path(), &CliOverrides::default())
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}

#[tokio::test]
async fn test_invalid_registration_in_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(
        temp_dir.path(),
        r#"{ "preprocessors": [ { "kind": "sass", "src": "", "output": "public/css" } ] }"#,
    );

    let err = CliHandler::new()
        .build_fragment(temp_dir.path(), &CliOverrides::default())
        .await
        .err()
        .unwrap();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_dotted_output_directory_under_root() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("public/v1.2")).unwrap();
    write_config(
        temp_dir.path(),
        r#"{ "mode": "development",
             "preprocessors": [ { "kind": "sass", "src": "resources/sass/app.scss", "output": "public/v1.2" } ] }"#,
    );

    let fragment = CliHandler::new()
        .build_fragment(temp_dir.path(), &CliOverrides::default())
        .await
        .unwrap();

    assert_eq!(fragment.module.rules[0].output, "/v1.2/app.css");
    assert_eq!(
        fragment.optimization["splitChunks"]["cacheGroups"]["styles"]["name"],
        "public/v1.2/app"
    );
}
