//! REFramework installation pipeline
//!
//! `Idle -> Downloading -> Verifying -> Extracting -> Deploying -> CleaningUp -> Done`,
//! with `Aborted` reachable from every non-terminal stage. Everything up to
//! `Deploying` happens in a temporary workspace, so a failure before that
//! point leaves the installation root untouched. The workspace is removed on
//! every exit path.

mod common;
mod deploy;
mod download;
mod extract;
mod plan;

pub use common::{check_cancelled, contained_child, contained_join, InstallError};
pub use deploy::{cleanup, deploy_assets, CopyKind, CopyRule, DeployReport};
pub use download::{download_archive, fetch, probe_size, verify_size, write_stream, DownloadOutcome, CHUNK_SIZE};
pub use extract::{extract_archive, EXTRACT_DIR};
pub use plan::{InstallPlan, PlanError};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::ReleaseRecord;
use crate::config::ConfigStore;
use crate::context::AppContext;
use crate::games::validate_game_path;
use crate::http::HttpClient;
use crate::logging::Logger;

const ARCHIVE_NAME: &str = "download.zip";

// ============================================================================
// Shared Types
// ============================================================================

/// Context for installation tasks
#[derive(Clone)]
pub struct TaskContext {
    pub status_callback: Arc<dyn Fn(String) + Send + Sync>,
    pub progress_callback: Arc<dyn Fn(u64, u64) + Send + Sync>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl TaskContext {
    pub fn new(
        status: impl Fn(String) + Send + Sync + 'static,
        progress: impl Fn(u64, u64) + Send + Sync + 'static,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            status_callback: Arc::new(status),
            progress_callback: Arc::new(progress),
            cancel_flag: cancel,
        }
    }

    pub fn set_status(&self, msg: String) {
        (self.status_callback)(msg);
    }

    /// Bytes transferred so far out of the expected total.
    pub fn set_progress(&self, done: u64, total: u64) {
        (self.progress_callback)(done, total);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(std::sync::atomic::Ordering::Relaxed)
    }
}

impl Default for TaskContext {
    fn default() -> Self {
        Self::new(|_| {}, |_, _| {}, Arc::new(AtomicBool::new(false)))
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Idle,
    Downloading,
    Verifying,
    Extracting,
    Deploying,
    CleaningUp,
    Done,
    Aborted,
}

impl InstallStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallStage::Done | InstallStage::Aborted)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InstallStage::Idle => "idle",
            InstallStage::Downloading => "downloading",
            InstallStage::Verifying => "verifying",
            InstallStage::Extracting => "extracting",
            InstallStage::Deploying => "deploying",
            InstallStage::CleaningUp => "cleaning up",
            InstallStage::Done => "done",
            InstallStage::Aborted => "aborted",
        }
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An install that stopped, and the stage it stopped in.
#[derive(Debug, Error)]
#[error("installation failed while {stage}: {error}")]
pub struct InstallFailure {
    pub stage: InstallStage,
    #[source]
    pub error: InstallError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Stages entered, in order.
    pub stages: Vec<InstallStage>,
    pub archive_bytes: u64,
    pub deployed: DeployReport,
    pub cleaned: Vec<PathBuf>,
}

// ============================================================================
// Installer
// ============================================================================

#[derive(Debug)]
pub struct Installer {
    logger: Logger,
    http: HttpClient,
    target_root: PathBuf,
    task: TaskContext,
    stage: InstallStage,
}

impl Installer {
    pub fn new(ctx: &AppContext, http: HttpClient, target_root: impl Into<PathBuf>) -> Self {
        Self {
            logger: ctx.logger.clone(),
            http,
            target_root: target_root.into(),
            task: TaskContext::default(),
            stage: InstallStage::Idle,
        }
    }

    pub fn with_task(mut self, task: TaskContext) -> Self {
        self.task = task;
        self
    }

    pub fn stage(&self) -> InstallStage {
        self.stage
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn install_plan(&mut self, url: &str, plan: &InstallPlan) -> Result<InstallReport, InstallFailure> {
        self.install(url, &plan.rules, &plan.cleanup)
    }

    /// Download the zip at `url`, deploy it into the target root under
    /// `rules`, then remove whatever matches `cleanup_patterns`.
    pub fn install(
        &mut self,
        url: &str,
        rules: &[CopyRule],
        cleanup_patterns: &[String],
    ) -> Result<InstallReport, InstallFailure> {
        self.stage = InstallStage::Idle;
        let mut report = InstallReport::default();

        match self.run(url, rules, cleanup_patterns, &mut report) {
            Ok(()) => {
                self.enter(InstallStage::Done, &mut report);
                self.logger.install("Installation complete");
                Ok(report)
            }
            Err(error) => {
                let stage = self.stage;
                self.logger
                    .error(&format!("Installation failed while {}: {}", stage, error));
                self.enter(InstallStage::Aborted, &mut report);
                Err(InstallFailure { stage, error })
            }
        }
    }

    fn enter(&mut self, stage: InstallStage, report: &mut InstallReport) {
        self.stage = stage;
        report.stages.push(stage);
        self.logger.debug(&format!("Install stage: {}", stage));
        self.task.set_status(format!("REFramework: {}", stage));
    }

    fn run(
        &mut self,
        url: &str,
        rules: &[CopyRule],
        cleanup_patterns: &[String],
        report: &mut InstallReport,
    ) -> Result<(), InstallError> {
        self.enter(InstallStage::Downloading, report);
        // Removed on drop, whichever way this function returns
        let workspace = tempfile::Builder::new()
            .prefix("mhwmm-install-")
            .tempdir()
            .map_err(InstallError::io("Failed to create install workspace"))?;
        let archive = workspace.path().join(ARCHIVE_NAME);
        let outcome = fetch(&self.http, url, &archive, &self.task, &self.logger)?;
        check_cancelled(&self.task)?;

        self.enter(InstallStage::Verifying, report);
        verify_size(&archive, outcome)?;
        report.archive_bytes = outcome.written;
        check_cancelled(&self.task)?;

        self.enter(InstallStage::Extracting, report);
        let extracted = extract_archive(&archive, workspace.path(), &self.logger)?;
        check_cancelled(&self.task)?;

        self.enter(InstallStage::Deploying, report);
        report.deployed = deploy_assets(&extracted, &self.target_root, rules, &self.logger)?;
        check_cancelled(&self.task)?;

        self.enter(InstallStage::CleaningUp, report);
        report.cleaned = cleanup(&self.target_root, cleanup_patterns, &self.logger)?;

        Ok(())
    }
}

/// Install `release` into the configured game root and record its version.
pub fn install_release(
    ctx: &AppContext,
    store: &mut ConfigStore,
    http: HttpClient,
    release: &ReleaseRecord,
    plan: &InstallPlan,
    task: TaskContext,
) -> Result<InstallReport, InstallFailure> {
    let idle = |error: InstallError| InstallFailure {
        stage: InstallStage::Idle,
        error,
    };

    let game_path = store
        .installed_state()
        .game_path
        .ok_or_else(|| idle(InstallError::NoGamePath))?;
    let game_root = validate_game_path(&game_path.to_string_lossy())
        .map_err(|e| idle(e.into()))?;

    ctx.logger.install(&format!(
        "Installing REFramework {} ({}) into {}",
        release.version,
        release.tag,
        game_root.display()
    ));

    let report = Installer::new(ctx, http, game_root)
        .with_task(task)
        .install_plan(&release.download_url, plan)?;

    store
        .record_installed_version(release.version)
        .map_err(|e| InstallFailure {
            stage: InstallStage::Done,
            error: e.into(),
        })?;
    ctx.logger
        .info(&format!("Recorded installed version {}", release.version));

    Ok(report)
}
