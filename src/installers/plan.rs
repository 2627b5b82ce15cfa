//! Install plans: copy rules plus cleanup patterns
//!
//! The built-in plan deploys the REFramework loader DLL. A plan can also be
//! loaded from a TOML file:
//!
//! ```toml
//! cleanup = ["re2_framework_log.txt"]
//!
//! [[rule]]
//! source = "dinput8.dll"
//! destination = "dinput8.dll"
//! kind = "file"
//!
//! [[rule]]
//! source = "reframework/plugins"
//! destination = "reframework/plugins"
//! kind = "dir"
//! overwrite = false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::deploy::CopyRule;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read install plan {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid install plan: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPlan {
    #[serde(default, rename = "rule")]
    pub rules: Vec<CopyRule>,
    #[serde(default)]
    pub cleanup: Vec<String>,
}

impl InstallPlan {
    /// Plan for a REFramework nightly build.
    pub fn reframework() -> Self {
        Self {
            rules: vec![CopyRule::file("dinput8.dll", "dinput8.dll")],
            cleanup: vec!["re2_framework_log.txt".to_string()],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PlanError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, PlanError> {
        let content = fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
