//! Build numbers encoded in REFramework release tags

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid release tag format: '{0}'")]
pub struct InvalidTagFormat(pub String);

/// Build number encoded in a release tag.
///
/// The tag is split on `-`; there must be at least three segments and the
/// second one must be a non-empty run of ASCII digits (`nightly-01090-abc` is
/// build 1090).
pub fn extract_version(tag: &str) -> Result<u64, InvalidTagFormat> {
    let invalid = || InvalidTagFormat(tag.to_string());
    let parts: Vec<&str> = tag.split('-').collect();
    if parts.len() < 3 {
        return Err(invalid());
    }
    parse_build_number(parts[1]).ok_or_else(invalid)
}

/// A bare run of ASCII digits (`1090`, `01090`) as a build number.
pub fn parse_build_number(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
