//! Static file serving from the public directory.

use tower_http::services::ServeDir;

use crate::config::AssetsConfig;

/// Create a static file service rooted at the configured public directory.
///
/// Missing files fall through to a plain 404.
pub fn create_static_service(assets: &AssetsConfig) -> ServeDir {
    ServeDir::new(&assets.public_dir).append_index_html_on_directories(false)
}
