// tests/transforms_on_disk.rs

mod common;
use crate::common::{digest, init_tracing, read_file, write_file};

use std::collections::BTreeSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetflow::assets::{
    AssetTransform, CssTransform, ImageTransform, JsTransform, TransformOutcome, VendorCssImport,
};
use assetflow::config::ConfigFile;
use assetflow::fs::{FileSystem, RealFileSystem};
use assetflow::tasks::standard::names;
use assetflow::tasks::{Components, standard_registry};
use assetflow_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn real_fs() -> Arc<dyn FileSystem> {
    Arc::new(RealFileSystem)
}

fn config(root: &Path) -> ConfigFile {
    ConfigFileBuilder::new().with_root(root).build()
}

fn all_files(root: &Path) -> BTreeSet<PathBuf> {
    let mut out = BTreeSet::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.insert(path);
            }
        }
    }
    out
}

fn seed_stylesheets(root: &Path) {
    write_file(root, "src/_assets/sass/_base.scss", "$ink: #112233;\n");
    write_file(
        root,
        "src/_assets/css/main.scss",
        "@import \"base\";\nbody { color: $ink; }\n",
    );
}

#[test]
fn css_compiles_partials_into_min_css() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    seed_stylesheets(dir.path());
    let css = CssTransform::from_config(&config(dir.path()), real_fs())?;

    let report = css.run()?;

    assert_eq!(report.outcome, TransformOutcome::Written);
    let out = read_file(dir.path(), "src/assets/css/main.min.css");
    assert!(out.contains("body{color:"), "not compressed: {out}");
    assert!(!out.contains('$'));
    Ok(())
}

#[test]
fn second_run_without_changes_rewrites_nothing() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    seed_stylesheets(dir.path());
    write_file(dir.path(), "src/_assets/js/app.js", "function add(a, b) { return a + b; }\n");
    write_file(dir.path(), "src/_assets/img/logo.png", "\u{89}PNG fake");
    let cfg = config(dir.path());

    let transforms: Vec<Box<dyn AssetTransform>> = vec![
        Box::new(CssTransform::from_config(&cfg, real_fs())?),
        Box::new(JsTransform::from_config(&cfg, real_fs())?),
        Box::new(ImageTransform::from_config(&cfg, real_fs())?),
    ];

    for t in &transforms {
        assert_eq!(t.run()?.outcome, TransformOutcome::Written, "{}", t.name());
    }
    let before: Vec<String> = ["src/assets/css/main.min.css", "src/assets/js/main.min.js", "src/assets/img/logo.png"]
        .iter()
        .map(|p| digest(dir.path(), p))
        .collect();

    for t in &transforms {
        assert_eq!(t.run()?.outcome, TransformOutcome::Unchanged, "{}", t.name());
    }
    let after: Vec<String> = ["src/assets/css/main.min.css", "src/assets/js/main.min.js", "src/assets/img/logo.png"]
        .iter()
        .map(|p| digest(dir.path(), p))
        .collect();
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn broken_stylesheet_keeps_previous_output() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    seed_stylesheets(dir.path());
    let css = CssTransform::from_config(&config(dir.path()), real_fs())?;
    css.run()?;
    let before = digest(dir.path(), "src/assets/css/main.min.css");

    write_file(dir.path(), "src/_assets/css/main.scss", "body { color: ;\n");
    let report = css.run()?;

    assert!(matches!(report.outcome, TransformOutcome::CompileFailed(_)));
    assert!(report.outputs.is_empty());
    assert_eq!(digest(dir.path(), "src/assets/css/main.min.css"), before);
    Ok(())
}

#[test]
fn js_bundles_land_only_in_destinations() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "src/_assets/vendor/a-lib.js", "var lib = { name: 'a' };\n");
    write_file(dir.path(), "src/_assets/vendor/b-plugin.js", "lib.plugin = function () { return 1; };\n");
    write_file(
        dir.path(),
        "src/_assets/js/app.js",
        "if (x == 1) { debugger; }\nconsole.log('hi');\n",
    );
    let cfg = config(dir.path());
    let before = all_files(dir.path());

    let report = JsTransform::from_config(&cfg, real_fs())?.run()?;

    // Lint findings are warnings: the bundle is still written.
    assert_eq!(report.outputs.len(), 2);
    let created: Vec<PathBuf> = all_files(dir.path()).difference(&before).cloned().collect();
    let js_dest = cfg.paths.resolve("js.dest")?;
    assert_eq!(
        created,
        vec![js_dest.join("main.min.js"), js_dest.join("vendor.min.js")]
    );
    let vendor = read_file(dir.path(), "src/assets/js/vendor.min.js");
    assert!(vendor.find("name").unwrap() < vendor.find("plugin").unwrap());
    Ok(())
}

#[test]
fn images_mirror_source_tree() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "src/_assets/img/logo.png", "png-bytes");
    write_file(dir.path(), "src/_assets/img/icons/menu.svg", "<svg/>");

    ImageTransform::from_config(&config(dir.path()), real_fs())?.run()?;

    assert_eq!(read_file(dir.path(), "src/assets/img/logo.png"), "png-bytes");
    assert_eq!(read_file(dir.path(), "src/assets/img/icons/menu.svg"), "<svg/>");
    Ok(())
}

#[cfg(unix)]
#[test]
fn image_optimizer_command_is_used() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "src/_assets/img/a.txt", "abc");
    let cfg = ConfigFileBuilder::new()
        .with_root(dir.path())
        .with_image_optimizer("tr a-z A-Z < {input} > {output}")
        .build();

    ImageTransform::from_config(&cfg, real_fs())?.run()?;

    assert_eq!(read_file(dir.path(), "src/assets/img/a.txt"), "ABC");
    Ok(())
}

#[cfg(unix)]
#[test]
fn failing_optimizer_leaves_nothing_in_destination() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "src/_assets/img/logo.png", "png-bytes");
    let cfg = ConfigFileBuilder::new()
        .with_root(dir.path())
        .with_image_optimizer("printf partial > {output}; exit 3")
        .build();

    let err = ImageTransform::from_config(&cfg, real_fs())?
        .run()
        .expect_err("optimizer exit code must fail the task");
    assert!(format!("{err:#}").contains("exited with code 3"), "got {err:#}");

    let dest = dir.path().join("src/assets/img");
    let leftovers: Vec<_> = match std::fs::read_dir(&dest) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    };
    assert!(leftovers.is_empty(), "scratch files left behind: {leftovers:?}");
    Ok(())
}

#[test]
fn vendor_stylesheet_import_is_registered_with_bower() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_file(
        dir.path(),
        "bower_components/normalize-scss/_normalize.scss",
        "html { line-height: 1.15; }\n",
    );
    let cfg = ConfigFileBuilder::new()
        .with_root(dir.path())
        .with_path("bower", "bower_components")
        .build();

    let import = VendorCssImport::from_config(&cfg, real_fs())?.expect("bower is configured");
    import.run()?;
    assert!(read_file(dir.path(), "src/_assets/sass/vendor/_normalize.scss").contains("line-height"));

    let registry = standard_registry(&Components::from_config(&cfg)?)?;
    assert!(registry.contains(names::IMPORT_VENDOR_CSS));
    Ok(())
}
