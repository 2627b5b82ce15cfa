//! GitHub release feed types

use serde::Deserialize;

/// Releases of the REFramework nightly repository
pub const REFRAMEWORK_RELEASES_URL: &str =
    "https://api.github.com/repos/praydog/REFramework-nightly/releases";

/// Position of the Monster Hunter Wilds build in each release's asset list
pub const MHWILDS_ASSET_INDEX: usize = 3;

/// GitHub release metadata
///
/// Every field is optional so that one odd entry cannot fail the whole feed.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct GithubRelease {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

/// GitHub release asset
#[derive(Deserialize, Debug, Clone, Default)]
pub struct GithubAsset {
    #[serde(default)]
    pub name: String,
    pub browser_download_url: Option<String>,
}
