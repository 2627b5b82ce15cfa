//! Logging
//!
//! Provides levelled logging with a session information header. Every line
//! goes to a per-run log file and is mirrored to stderr.
//!
//! The logger is a cloneable handle owned by [`crate::context::AppContext`]
//! and handed to each component when it is constructed.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ============================================================================
// Session Information
// ============================================================================

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub app_version: String,
    pub os: String,
    pub arch: String,
    pub debug: bool,
}

impl SessionInfo {
    pub fn detect(debug: bool) -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            debug,
        }
    }

    pub fn to_log_header(&self) -> String {
        format!(
r#"================================================================================
MHWilds Mod Manager Log - {}
================================================================================
Application:   mhwmm v{}
Platform:      {} ({})
Debug:         {}
================================================================================"#,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.app_version,
            self.os,
            self.arch,
            if self.debug { "on" } else { "off" },
        )
    }
}

// ============================================================================
// Log Levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Download,
    Install,
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Info => "[INFO]",
            LogLevel::Download => "[DOWNLOAD]",
            LogLevel::Install => "[INSTALL]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error => "[ERROR]",
        }
    }
}

// ============================================================================
// Logger
// ============================================================================

#[derive(Default)]
struct Sink {
    file: Option<File>,
    console: bool,
    memory: Option<Vec<String>>,
}

impl Sink {
    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = writeln!(file, "{}", msg);
            let _ = file.flush();
        }

        if let Some(ref mut lines) = self.memory {
            lines.push(msg.to_string());
        }

        if self.console {
            eprintln!("{}", msg);
        }
    }
}

/// Handle to a log sink. Clones share the same sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<Mutex<Sink>>,
    debug: bool,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("debug", &self.debug)
            .field("path", &self.path)
            .finish()
    }
}

impl Logger {
    /// Open a new timestamped log file in `log_dir` and write the session header.
    pub fn new(log_dir: &Path, debug: bool) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("mhwmm_{}.log", timestamp));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let logger = Self {
            sink: Arc::new(Mutex::new(Sink {
                file: Some(file),
                console: true,
                memory: None,
            })),
            debug,
            path: Some(log_path),
        };

        logger
            .sink
            .lock()
            .write_raw(&SessionInfo::detect(debug).to_log_header());

        Ok(logger)
    }

    /// Console-only logger, used when the log directory is not writable.
    pub fn console(debug: bool) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink {
                console: true,
                ..Sink::default()
            })),
            debug,
            path: None,
        }
    }

    /// Logger that discards everything.
    pub fn silent() -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink::default())),
            debug: false,
            path: None,
        }
    }

    /// Logger that keeps formatted lines in memory (debug level included).
    pub fn memory() -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink {
                memory: Some(Vec::new()),
                ..Sink::default()
            })),
            debug: true,
            path: None,
        }
    }

    /// Lines captured by a [`Logger::memory`] sink.
    pub fn captured(&self) -> Vec<String> {
        self.sink.lock().memory.clone().unwrap_or_default()
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if level == LogLevel::Debug && !self.debug {
            return;
        }
        let timestamp = Local::now().format("%H:%M:%S");
        let formatted = format!("[{}] {} {}", timestamp, level.prefix(), message);
        self.sink.lock().write_raw(&formatted);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn download(&self, message: &str) {
        self.log(LogLevel::Download, message);
    }

    pub fn install(&self, message: &str) {
        self.log(LogLevel::Install, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}
