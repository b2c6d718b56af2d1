//! Build script for anticaptcha
//!
//! Generates C header file when the `ffi` feature is enabled.

fn main() {
    // Only generate headers when ffi feature is enabled
    #[cfg(feature = "ffi")]
    {
        let Ok(crate_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
            return;
        };

        let include_dir = std::path::Path::new(&crate_dir).join("include");
        std::fs::create_dir_all(&include_dir).ok();

        let config = cbindgen::Config {
            language: cbindgen::Language::C,
            include_guard: Some("ANTICAPTCHA_H".to_string()),
            ..Default::default()
        };

        cbindgen::Builder::new()
            .with_crate(&crate_dir)
            .with_config(config)
            .generate()
            .map(|bindings| {
                bindings.write_to_file(include_dir.join("anticaptcha.h"));
            })
            .ok();
    }
}
