use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lotree::error::{Chainable, Result};
use lotree::value::{Format, Toml};

/// Settings read from an optional `lotc.toml` in the course directory.
/// Command-line flags take precedence.
#[derive(Default, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Output path, relative to the course directory.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Extra directory names to skip, on top of the defaults.
    #[serde(default)]
    pub skip: Vec<String>,
    #[serde(default)]
    pub html: bool,
    #[serde(default)]
    pub course_url: Option<String>,
}

impl Config {
    /// Reads `lotc.toml` from `dir`, or the defaults if there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(crate::CONFIG_FILE);
        if !path.is_file() {
            return Ok(Config::default());
        }

        tracing::debug!(path = %path.display(), "reading configuration");
        Toml::read(path.as_path()).chain_with(|| lotree::error! {
            "invalid configuration file",
            "path" => path.display(),
        })
    }

    /// Reads the configuration of the course that `json` was compiled from,
    /// looking next to it and one directory up.
    pub fn discover_for(json: &Path) -> Result<Self> {
        for dir in json.ancestors().skip(1).take(2) {
            if dir.join(crate::CONFIG_FILE).is_file() {
                return Config::discover(dir);
            }
        }

        Ok(Config::default())
    }
}
