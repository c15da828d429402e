use std::fs;
use std::path::Path;

use crate::io::document_io::DocumentError;
use crate::model::config::Config;

/// Name of the optional per-directory config file.
pub const CONFIG_FILE: &str = "reqmark.toml";

/// Load `reqmark.toml` from the directory containing `doc_path`.
/// An absent file yields the defaults; a malformed one is an error.
pub fn load_config_near(doc_path: &Path) -> Result<Config, DocumentError> {
    let dir = doc_path.parent().unwrap_or(Path::new("."));
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(&config_path).map_err(|e| DocumentError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}
