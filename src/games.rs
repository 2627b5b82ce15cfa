//! Game installation root
//!
//! Checks that a user supplied path is a Monster Hunter Wilds installation
//! before anything gets deployed into it.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Executable that marks a game installation root
pub const GAME_EXECUTABLE: &str = "MonsterHunterWilds.exe";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GamePathError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("MonsterHunterWilds.exe not found in {}", .0.display())]
    MissingExecutable(PathBuf),

    #[error("game path must be absolute: {}", .0.display())]
    NotAbsolute(PathBuf),
}

/// Normalize `input` and confirm it is an absolute game root containing the game executable.
pub fn validate_game_path(input: &str) -> Result<PathBuf, GamePathError> {
    let trimmed = input.trim().trim_matches('"');
    let path = normalize(Path::new(trimmed));

    if !path.is_absolute() {
        return Err(GamePathError::NotAbsolute(path));
    }
    if !path.exists() {
        return Err(GamePathError::NotFound(path));
    }
    if !path.is_dir() {
        return Err(GamePathError::NotADirectory(path));
    }
    if !path.join(GAME_EXECUTABLE).is_file() {
        return Err(GamePathError::MissingExecutable(path));
    }
    Ok(path)
}

/// Lexically drop `.` components and trailing separators.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
