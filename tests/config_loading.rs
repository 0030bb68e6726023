// tests/config_loading.rs

mod common;
use crate::common::{init_tracing, write_file};

use std::error::Error;

use assetflow::config::{load_and_validate, load_from_path};
use assetflow::errors::AssetflowError;
use assetflow_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

const TOML_CONFIG: &str = r#"
[paths]
src = "src"
build = "_site"

[paths.css]
src = "src/_assets/css"
dest = "src/assets/css"

[paths.sass]
src = "src/_assets/sass"
vendor = "src/_assets/sass/vendor"

[paths.js]
src = "src/_assets/js"
dest = "src/assets/js"

[paths.vendor]
src = "src/_assets/vendor"
dest = "src/assets/js"

[paths.img]
src = "src/_assets/img"
dest = "src/assets/img"

[site]
command = "bundle"
args = ["exec", "jekyll", "build"]

[server]
port = 4000

[watch]
debounce_ms = 250
exclude = ["src/_drafts/**"]
"#;

#[test]
fn toml_config_resolves_relative_to_its_directory() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "site/Assetflow.toml", TOML_CONFIG);

    let cfg = load_and_validate(dir.path().join("site/Assetflow.toml"))?;

    assert_eq!(cfg.root(), dir.path().join("site"));
    assert_eq!(
        cfg.paths.resolve("css.dest")?,
        dir.path().join("site").join("src/assets/css")
    );
    assert_eq!(cfg.site.command, "bundle");
    assert_eq!(cfg.site.config, "_config.yml");
    assert_eq!(cfg.site.prod_config, "_config.build.yml");
    assert_eq!(cfg.server.port, 4000);
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.watch.debounce_ms, 250);
    assert!(cfg.js.lint);
    assert!(cfg.images.optimizer.is_none());
    Ok(())
}

#[test]
fn package_json_with_paths_object_loads() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let json = r#"{
      "name": "my-site",
      "version": "1.0.0",
      "devDependencies": { "gulp": "^4.0.0" },
      "paths": {
        "tasks": "./gulp/tasks/",
        "build": "_site",
        "css":    { "src": "_assets/css/",  "dest": "assets/css/" },
        "sass":   { "src": "_assets/sass/", "vendor": "_assets/sass/vendor/" },
        "js":     { "src": "_assets/js/",   "dest": "assets/js/" },
        "vendor": { "src": "_assets/vendor/", "dest": "assets/js/" },
        "img":    { "src": "_assets/img/",  "dest": "assets/img/" }
      }
    }"#;
    write_file(dir.path(), "package.json", json);

    let cfg = load_and_validate(dir.path().join("package.json"))?;

    assert_eq!(cfg.paths.get("tasks"), Some("./gulp/tasks/"));
    assert_eq!(cfg.paths.glob_base("css.src")?, "_assets/css");
    assert_eq!(cfg.paths.site_src_base(), "");
    Ok(())
}

#[test]
fn missing_required_path_fails_fast_naming_the_key() {
    let err = ConfigFileBuilder::new()
        .without_path("img.dest")
        .try_build()
        .unwrap_err();

    match err {
        AssetflowError::MissingPath(key) => assert_eq!(key, "img.dest"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_path_counts_as_missing() {
    let err = ConfigFileBuilder::new()
        .with_path("build", "  ")
        .try_build()
        .unwrap_err();
    assert!(err.to_string().contains("paths.build"));
}

#[test]
fn invalid_sections_are_rejected() {
    assert!(ConfigFileBuilder::new().with_port(0).try_build().is_err());
    assert!(ConfigFileBuilder::new().with_debounce_ms(0).try_build().is_err());
    assert!(ConfigFileBuilder::new().with_site_timeout(0).try_build().is_err());
    assert!(
        ConfigFileBuilder::new()
            .with_site_command(" ", &[])
            .try_build()
            .is_err()
    );
}

#[test]
fn unknown_path_keys_are_tolerated() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_path("fonts.src", "src/_assets/fonts")
        .try_build()?;
    assert_eq!(cfg.paths.get("fonts.src"), Some("src/_assets/fonts"));
    Ok(())
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "Assetflow.toml", "[paths\nbuild = ");
    let err = load_from_path(dir.path().join("Assetflow.toml")).unwrap_err();
    assert!(matches!(err, AssetflowError::TomlError(_)));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/here/Assetflow.toml").unwrap_err();
    assert!(matches!(err, AssetflowError::IoError(_)));
}
