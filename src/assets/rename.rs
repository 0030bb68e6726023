// src/assets/rename.rs

/// Insert a `.min` infix before the final extension.
///
/// `main.css` → `main.min.css`, `vendor.js` → `vendor.min.js`,
/// `README` → `README.min`.
pub fn min_file_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => {
            let (stem, ext) = file_name.split_at(idx);
            format!("{stem}.min{ext}")
        }
        _ => format!("{file_name}.min"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_min_before_last_extension() {
        assert_eq!(min_file_name("main.css"), "main.min.css");
        assert_eq!(min_file_name("vendor.js"), "vendor.min.js");
        assert_eq!(min_file_name("app.bundle.js"), "app.bundle.min.js");
        assert_eq!(min_file_name("LICENSE"), "LICENSE.min");
        assert_eq!(min_file_name(".hidden"), ".hidden.min");
    }
}
