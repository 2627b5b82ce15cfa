//! Release catalog
//!
//! Normalizes the REFramework nightly release feed into [`ReleaseRecord`]s
//! and answers pagination, lookup and update-check queries over them. The
//! feed's own order (newest first) is kept as is.

use thiserror::Error;

use crate::config::ConfigStore;
use crate::context::AppContext;
use crate::github::{GithubRelease, MHWILDS_ASSET_INDEX, REFRAMEWORK_RELEASES_URL};
use crate::http::{HttpClient, HttpError};
use crate::logging::Logger;
use crate::version::{self, InvalidTagFormat};

pub use crate::version::extract_version;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("release feed unavailable: {0}")]
    FeedUnavailable(#[source] HttpError),

    #[error("release feed is malformed: {0}")]
    FeedMalformed(#[source] serde_json::Error),

    #[error("invalid release tag format: '{0}'")]
    InvalidTagFormat(String),
}

impl From<InvalidTagFormat> for CatalogError {
    fn from(e: InvalidTagFormat) -> Self {
        CatalogError::InvalidTagFormat(e.0)
    }
}

/// One installable framework build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub display_name: String,
    pub version: u64,
    pub tag: String,
    pub published_at: String,
    pub download_url: String,
}

/// Outcome of comparing the installed build with the newest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    Available { installed: u64, latest: ReleaseRecord },
    UpToDate,
    Skipped,
}

impl UpdateCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, UpdateCheck::Available { .. })
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug)]
pub struct ReleaseCatalog {
    logger: Logger,
    http: HttpClient,
    feed_url: String,
    asset_index: usize,
    releases: Vec<ReleaseRecord>,
}

impl ReleaseCatalog {
    pub fn new(ctx: &AppContext, http: HttpClient) -> Self {
        Self {
            logger: ctx.logger.clone(),
            http,
            feed_url: REFRAMEWORK_RELEASES_URL.to_string(),
            asset_index: MHWILDS_ASSET_INDEX,
            releases: Vec::new(),
        }
    }

    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    /// Which entry of each release's asset list is the game's build.
    pub fn with_asset_index(mut self, index: usize) -> Self {
        self.asset_index = index;
        self
    }

    /// Seed the catalog without touching the network.
    pub fn with_records(mut self, records: Vec<ReleaseRecord>) -> Self {
        self.releases = records;
        self
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn releases(&self) -> Vec<ReleaseRecord> {
        self.releases.clone()
    }

    pub fn latest(&self) -> Option<ReleaseRecord> {
        self.releases.first().cloned()
    }

    /// Fetch the feed and replace the current list. On error the previous
    /// list is kept.
    pub fn refresh(&mut self) -> Result<usize, CatalogError> {
        self.logger
            .download(&format!("Fetching releases from {}", self.feed_url));

        let body = self.http.get_text(&self.feed_url).map_err(|e| {
            self.logger
                .error(&format!("Failed to fetch release feed: {}", e));
            CatalogError::FeedUnavailable(e)
        })?;

        let feed: Vec<GithubRelease> = serde_json::from_str(&body).map_err(|e| {
            self.logger
                .error(&format!("Failed to parse release feed: {}", e));
            CatalogError::FeedMalformed(e)
        })?;

        let mut records = Vec::with_capacity(feed.len());
        for release in feed {
            match self.to_record(release) {
                Ok(record) => records.push(record),
                Err(reason) => self
                    .logger
                    .warning(&format!("Skipping release: {}", reason)),
            }
        }

        self.logger
            .info(&format!("Loaded {} releases", records.len()));
        self.releases = records;
        Ok(self.releases.len())
    }

    fn to_record(&self, release: GithubRelease) -> Result<ReleaseRecord, String> {
        let tag = release
            .tag_name
            .ok_or_else(|| "entry has no tag_name".to_string())?;
        let version = extract_version(&tag).map_err(|e| e.to_string())?;
        let (asset_name, download_url) = release
            .assets
            .into_iter()
            .nth(self.asset_index)
            .and_then(|a| Some((a.name, a.browser_download_url?)))
            .ok_or_else(|| format!("{} has no asset at index {}", tag, self.asset_index))?;
        self.logger
            .debug(&format!("Selected asset '{}' for {}", asset_name, tag));

        Ok(ReleaseRecord {
            display_name: release.name.unwrap_or_else(|| tag.clone()),
            version,
            published_at: release.published_at.unwrap_or_default(),
            tag,
            download_url,
        })
    }

    /// Records on 1-indexed page `page_number` of `page_size` entries.
    pub fn page(&self, page_size: usize, page_number: usize) -> Vec<ReleaseRecord> {
        if page_size == 0 || page_number == 0 {
            return Vec::new();
        }
        let Some(start) = (page_number - 1).checked_mul(page_size) else {
            return Vec::new();
        };
        if start >= self.releases.len() {
            return Vec::new();
        }
        let end = start.saturating_add(page_size).min(self.releases.len());
        self.releases[start..end].to_vec()
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            0
        } else {
            self.releases.len().div_ceil(page_size)
        }
    }

    pub fn find_by_version(&self, version: u64) -> Option<ReleaseRecord> {
        self.releases.iter().find(|r| r.version == version).cloned()
    }

    /// Record with exactly this tag. The tag must itself be well formed.
    pub fn find_by_tag(&self, tag: &str) -> Result<Option<ReleaseRecord>, CatalogError> {
        extract_version(tag)?;
        Ok(self.releases.iter().find(|r| r.tag == tag).cloned())
    }

    /// Look up a release by bare build number (`1090`) or full tag.
    pub fn search(&self, query: &str) -> Result<Option<ReleaseRecord>, CatalogError> {
        let query = query.trim();
        if !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit()) {
            let version = version::parse_build_number(query)
                .ok_or_else(|| CatalogError::InvalidTagFormat(query.to_string()))?;
            return Ok(self.find_by_version(version));
        }
        self.find_by_tag(query)
    }

    pub fn check_for_update(&self, installed: Option<u64>) -> UpdateCheck {
        let Some(installed) = installed else {
            self.logger
                .warning("No installed REFramework version recorded, skipping update check");
            return UpdateCheck::Skipped;
        };
        let Some(latest) = self.latest() else {
            self.logger
                .warning("Release catalog is empty, skipping update check");
            return UpdateCheck::Skipped;
        };

        if latest.version > installed {
            self.logger.info(&format!(
                "Update available: {} -> {}",
                installed, latest.version
            ));
            UpdateCheck::Available { installed, latest }
        } else {
            UpdateCheck::UpToDate
        }
    }

    /// Update check against the version recorded in the config.
    pub fn check_for_update_from(&self, store: &ConfigStore) -> UpdateCheck {
        self.check_for_update(store.installed_state().version)
    }
}
