//! Static front-end hosting.

use std::path::Path;

use tower_http::services::ServeDir;
use tracing::debug;

/// Serves the web front-end (index.html, script, styles) from `dir`.
pub fn ui_service(dir: &Path) -> ServeDir {
    debug!(dir = %dir.display(), "Serving front-end assets");
    ServeDir::new(dir).append_index_html_on_directories(true)
}
