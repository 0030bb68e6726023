#![allow(dead_code)]

use std::path::Path;

pub use assetflow_test_utils::init_tracing;

/// Write `contents` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub fn read_file(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}

pub fn digest(root: &Path, rel: &str) -> String {
    blake3::hash(&std::fs::read(root.join(rel)).unwrap()).to_hex().to_string()
}
