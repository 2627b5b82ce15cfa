//! Copy rules and post-install cleanup
//!
//! Deployment is not transactional: rules are applied in order and a failing
//! rule stops the run, but whatever earlier rules already copied stays in
//! place.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::logging::Logger;

use super::common::{contained_child, contained_join, InstallError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyKind {
    File,
    #[serde(rename = "dir", alias = "directory")]
    Directory,
    /// Decided by looking at the source on disk.
    #[default]
    Auto,
}

/// Copy `source` (relative to the extracted archive) to `destination`
/// (relative to the installation root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    #[serde(alias = "src")]
    pub source: String,
    #[serde(alias = "dst")]
    pub destination: String,
    #[serde(default, alias = "type")]
    pub kind: CopyKind,
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

fn default_overwrite() -> bool {
    true
}

impl CopyRule {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind: CopyKind::Auto,
            overwrite: true,
        }
    }

    pub fn file(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self::new(source, destination).kind(CopyKind::File)
    }

    pub fn dir(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self::new(source, destination).kind(CopyKind::Directory)
    }

    pub fn kind(mut self, kind: CopyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Destinations written and destinations left alone because `overwrite` was off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub applied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

// ============================================================================
// Deployment
// ============================================================================

/// Apply `rules` in order, copying from `extracted_root` into `target_root`.
pub fn deploy_assets(
    extracted_root: &Path,
    target_root: &Path,
    rules: &[CopyRule],
    logger: &Logger,
) -> Result<DeployReport, InstallError> {
    let mut report = DeployReport::default();

    for rule in rules {
        let result = apply_rule(extracted_root, target_root, rule, logger);
        match result {
            Ok(Some(dest)) => report.applied.push(dest),
            Ok(None) => {
                let dest = contained_child(target_root, &rule.destination)?;
                report.skipped.push(dest);
            }
            Err(e) => {
                logger.error(&format!(
                    "Copy rule {} -> {} failed: {}",
                    rule.source, rule.destination, e
                ));
                return Err(e);
            }
        }
    }

    Ok(report)
}

/// `Some(destination)` when copied, `None` when skipped.
fn apply_rule(
    extracted_root: &Path,
    target_root: &Path,
    rule: &CopyRule,
    logger: &Logger,
) -> Result<Option<PathBuf>, InstallError> {
    let src = contained_join(extracted_root, &rule.source)?;
    let dst = contained_child(target_root, &rule.destination)?;

    let kind = match rule.kind {
        CopyKind::Auto if src.is_dir() => CopyKind::Directory,
        CopyKind::Auto => CopyKind::File,
        explicit => explicit,
    };

    let exists = dst.symlink_metadata().is_ok();

    match kind {
        CopyKind::Directory => {
            if !src.is_dir() {
                return Err(InstallError::SourceMissing(src));
            }
            if exists {
                if !rule.overwrite {
                    logger.debug(&format!("Skipping existing directory {}", dst.display()));
                    return Ok(None);
                }
                logger.debug(&format!("Replacing directory {}", dst.display()));
                remove_path(&dst)?;
            }
            copy_tree(&src, &dst)?;
            logger.install(&format!("Copied {} -> {}", src.display(), dst.display()));
        }
        _ => {
            if !src.is_file() {
                return Err(InstallError::SourceMissing(src));
            }
            if exists {
                if !rule.overwrite {
                    logger.debug(&format!("Skipping existing file {}", dst.display()));
                    return Ok(None);
                }
                logger.debug(&format!("Replacing file {}", dst.display()));
                remove_path(&dst)?;
            }
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)
                    .map_err(InstallError::io(format!("Failed to create {}", parent.display())))?;
            }
            fs::copy(&src, &dst).map_err(InstallError::io(format!(
                "Failed to copy {} to {}",
                src.display(),
                dst.display()
            )))?;
            logger.install(&format!("Copied {} -> {}", src.display(), dst.display()));
        }
    }

    Ok(Some(dst))
}

fn remove_path(path: &Path) -> Result<(), InstallError> {
    let is_dir = path
        .symlink_metadata()
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(InstallError::io(format!("Failed to remove {}", path.display())))
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), InstallError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| InstallError::Io {
            context: format!("Failed to read {}", src.display()),
            source: e.into(),
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(InstallError::io(format!("Failed to create {}", target.display())))?;
        } else {
            fs::copy(entry.path(), &target).map_err(InstallError::io(format!(
                "Failed to copy {}",
                entry.path().display()
            )))?;
        }
    }
    Ok(())
}

// ============================================================================
// Cleanup
// ============================================================================

/// Remove everything under `root` matching one of the glob `patterns`.
///
/// Patterns must stay below `root`. Individual removals that fail are
/// logged and skipped.
pub fn cleanup(root: &Path, patterns: &[String], logger: &Logger) -> Result<Vec<PathBuf>, InstallError> {
    for pattern in patterns {
        contained_child(root, pattern)?;
    }

    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let mut removed = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);
        let paths = match glob::glob(&full) {
            Ok(paths) => paths,
            Err(e) => {
                logger.warning(&format!("Invalid cleanup pattern '{}': {}", pattern, e));
                continue;
            }
        };

        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    logger.warning(&format!("Failed to read cleanup match: {}", e));
                    continue;
                }
            };
            if !path.starts_with(root) || path == root {
                continue;
            }
            match remove_path(&path) {
                Ok(()) => {
                    logger.debug(&format!("Removed {}", path.display()));
                    removed.push(path);
                }
                Err(e) => logger.warning(&format!("Cleanup failed: {}", e)),
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(root)
            .into_iter()
            .flatten()
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
                let contents = if e.file_type().is_file() {
                    fs::read(e.path()).unwrap()
                } else {
                    Vec::new()
                };
                (rel, contents)
            })
            .collect()
    }

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("extracted");
        let dst = dir.path().join("game");
        fs::create_dir_all(src.join("reframework/plugins")).unwrap();
        fs::write(src.join("dinput8.dll"), "new dll").unwrap();
        fs::write(src.join("reframework/plugins/a.dll"), "a").unwrap();
        fs::create_dir_all(&dst).unwrap();
        (dir, src, dst)
    }

    #[test]
    fn test_rule_deserialization_accepts_short_keys() {
        let rule: CopyRule =
            serde_json::from_str(r#"{"src": "a", "dst": "b", "type": "dir"}"#).unwrap();
        assert_eq!(rule, CopyRule::dir("a", "b"));

        let rule: CopyRule =
            serde_json::from_str(r#"{"source": "a", "destination": "b", "overwrite": false}"#).unwrap();
        assert_eq!(rule.kind, CopyKind::Auto);
        assert!(!rule.overwrite);
    }

    #[test]
    fn test_deploy_twice_equals_once() {
        let (_dir, src, dst) = fixture();
        fs::create_dir_all(dst.join("reframework/plugins")).unwrap();
        fs::write(dst.join("reframework/plugins/stale.dll"), "stale").unwrap();

        let rules = vec![
            CopyRule::new("dinput8.dll", "dinput8.dll"),
            CopyRule::new("reframework", "reframework"),
        ];
        deploy_assets(&src, &dst, &rules, &Logger::silent()).unwrap();
        let once = snapshot(&dst);
        deploy_assets(&src, &dst, &rules, &Logger::silent()).unwrap();
        assert_eq!(snapshot(&dst), once);

        assert!(!dst.join("reframework/plugins/stale.dll").exists());
        assert_eq!(fs::read_to_string(dst.join("dinput8.dll")).unwrap(), "new dll");
    }

    #[test]
    fn test_existing_directory_is_skipped_without_overwrite() {
        let (_dir, src, dst) = fixture();
        fs::create_dir_all(dst.join("reframework")).unwrap();
        fs::write(dst.join("reframework/user.cfg"), "mine").unwrap();
        let before = snapshot(&dst);

        let rules = vec![CopyRule::dir("reframework", "reframework").overwrite(false)];
        let report = deploy_assets(&src, &dst, &rules, &Logger::silent()).unwrap();

        assert_eq!(snapshot(&dst), before);
        assert!(report.applied.is_empty());
        assert_eq!(report.skipped, vec![dst.join("reframework")]);
    }

    #[test]
    fn test_existing_file_is_skipped_without_overwrite() {
        let (_dir, src, dst) = fixture();
        fs::write(dst.join("dinput8.dll"), "old dll").unwrap();

        let rules = vec![CopyRule::file("dinput8.dll", "dinput8.dll").overwrite(false)];
        let report = deploy_assets(&src, &dst, &rules, &Logger::silent()).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(fs::read_to_string(dst.join("dinput8.dll")).unwrap(), "old dll");
    }

    #[test]
    fn test_missing_source_aborts_without_rollback() {
        let (_dir, src, dst) = fixture();
        let rules = vec![
            CopyRule::new("dinput8.dll", "dinput8.dll"),
            CopyRule::file("missing.dll", "missing.dll"),
            CopyRule::new("reframework", "reframework"),
        ];
        let err = deploy_assets(&src, &dst, &rules, &Logger::silent()).unwrap_err();

        assert!(matches!(err, InstallError::SourceMissing(p) if p == src.join("missing.dll")));
        assert!(dst.join("dinput8.dll").exists());
        assert!(!dst.join("reframework").exists());
    }

    #[test]
    fn test_escaping_rules_are_rejected() {
        let (dir, src, dst) = fixture();
        let logger = Logger::silent();

        let out = deploy_assets(&src, &dst, &[CopyRule::new("dinput8.dll", "../outside.dll")], &logger);
        assert!(matches!(out, Err(InstallError::PathEscape(_))));
        assert!(!dir.path().join("outside.dll").exists());

        let out = deploy_assets(&src, &dst, &[CopyRule::new("../../etc/passwd", "x")], &logger);
        assert!(matches!(out, Err(InstallError::PathEscape(_))));

        let out = deploy_assets(&src, &dst, &[CopyRule::dir("reframework", ".")], &logger);
        assert!(matches!(out, Err(InstallError::PathEscape(_))));
    }

    #[test]
    fn test_cleanup_removes_matches_and_rejects_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("game [v1]");
        fs::create_dir_all(root.join("logs")).unwrap();
        fs::write(root.join("re2_framework_log.txt"), "log").unwrap();
        fs::write(root.join("a.tmp"), "").unwrap();
        fs::write(root.join("keep.dll"), "").unwrap();
        fs::write(root.join("logs/x.log"), "").unwrap();

        let patterns = vec![
            "re2_framework_log.txt".to_string(),
            "*.tmp".to_string(),
            "logs".to_string(),
        ];
        let removed = cleanup(&root, &patterns, &Logger::silent()).unwrap();

        assert_eq!(removed.len(), 3);
        assert!(root.join("keep.dll").exists());
        assert!(!root.join("logs").exists());
        assert!(!root.join("a.tmp").exists());

        let escape = cleanup(&root, &["../*".to_string()], &Logger::silent());
        assert!(matches!(escape, Err(InstallError::PathEscape(_))));
        assert!(root.exists());
    }
}
