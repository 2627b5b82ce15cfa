//! Application context
//!
//! Shared services that every component receives at construction time.

use std::path::{Path, PathBuf};

use crate::logging::Logger;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub logger: Logger,
    data_dir: PathBuf,
}

impl AppContext {
    /// Build the context for a normal run: file logging under `<data dir>/logs`,
    /// falling back to console-only logging when that directory is unusable.
    pub fn new(debug: bool) -> Self {
        let data_dir = crate::data_path!().to_path_buf();
        let logger = match Logger::new(&data_dir.join("logs"), debug) {
            Ok(logger) => logger,
            Err(e) => {
                let logger = Logger::console(debug);
                logger.warning(&format!("File logging unavailable: {}", e));
                logger
            }
        };
        Self { logger, data_dir }
    }

    pub fn with_logger(logger: Logger, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            logger,
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Default location of the persisted config document.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }
}
