use std::env::current_exe;
use std::path::PathBuf;

use crate::exception;
use crate::exception::AppResult;

pub fn asset_path(path: &str) -> AppResult<PathBuf> {
    let exe_path = current_exe()?;
    let asset_path = resolve(&exe_path, path);
    if asset_path.exists() {
        Ok(asset_path)
    } else {
        Err(exception!(
            message = format!(
                "asset not found, asset={}, exe={}",
                asset_path.to_string_lossy(),
                exe_path.to_string_lossy()
            )
        ))
    }
}

// with debug build, fall back to the crate source folder, so `cargo run` finds assets without copying
fn resolve(exe_path: &std::path::Path, path: &str) -> PathBuf {
    let asset_path = exe_path.with_file_name(path);
    #[cfg(debug_assertions)]
    if !asset_path.exists() {
        let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
        let source_path = PathBuf::from(manifest_dir).join(path);
        if source_path.exists() {
            tracing::info!("load asset from source folder, asset={}", source_path.to_string_lossy());
            return source_path;
        }
    }
    asset_path
}
