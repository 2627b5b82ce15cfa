//! Application config schema and typed views over it

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::schema::{Schema, ValueKind};

/// Current application config schema version.
pub const CONFIG_VERSION: u32 = 1;

pub const KEY_GAME_PATH: &str = "game.game_path";
pub const KEY_INSTALLED_VERSION: &str = "ref.installed_version";
pub const KEY_PROXY_MODE: &str = "github.proxy_mode";
pub const KEY_PROXY_URL: &str = "github.proxy_url";
pub const KEY_NEXUS_API: &str = "nexusmod.api";

pub const DEFAULT_PROXY_URL: &str = "https://api-gh.muran.eu.org/";

/// Every key the application persists.
pub fn app_schema() -> Schema {
    Schema::new()
        // ---------- Language ----------
        .field("language", ValueKind::String, "", "Interface language (en_us / zh_cn)")
        // ---------- UI ----------
        .field("ui.light_mode", ValueKind::String, "Auto", "Theme: Auto / Light / Dark")
        .field("ui.vague_mode", ValueKind::Bool, true, "Enable blur effects")
        .field("ui.animation", ValueKind::Bool, true, "Enable animations")
        // ---------- NexusMods ----------
        .field(KEY_NEXUS_API, ValueKind::String, "", "NexusMods API key")
        .field("nexusmod.username", ValueKind::String, "", "NexusMods user name")
        // ---------- Game ----------
        .field(KEY_GAME_PATH, ValueKind::String, "", "Game installation root")
        // ---------- REFramework ----------
        .nullable_field(KEY_INSTALLED_VERSION, ValueKind::Integer, "Installed REFramework build")
        // ---------- GitHub ----------
        .field(KEY_PROXY_MODE, ValueKind::Bool, false, "Route GitHub traffic through a proxy")
        .field(KEY_PROXY_URL, ValueKind::String, DEFAULT_PROXY_URL, "Proxy prefix for GitHub URLs")
        // ---------- Mods ----------
        .field(
            "mod.installed_mods",
            ValueKind::Object,
            Value::Object(Map::new()),
            "Installed mods (maintained automatically)",
        )
}

// ============================================================================
// Typed Views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub language: String,
    pub ui: UiSettings,
    pub nexusmod: NexusSettings,
    pub game: GameSettings,
    #[serde(rename = "ref")]
    pub framework: FrameworkSettings,
    pub github: GithubSettings,
    #[serde(rename = "mod")]
    pub mods: ModSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    pub light_mode: String,
    pub vague_mode: bool,
    pub animation: bool,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct NexusSettings {
    pub api: String,
    pub username: String,
}

impl std::fmt::Debug for NexusSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusSettings")
            .field("api", &if self.api.is_empty() { "<unset>" } else { "<redacted>" })
            .field("username", &self.username)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub game_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkSettings {
    pub installed_version: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubSettings {
    pub proxy_mode: bool,
    pub proxy_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModSettings {
    pub installed_mods: BTreeMap<String, Value>,
}

/// The installed framework build and the game root it was deployed into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledState {
    pub version: Option<u64>,
    pub game_path: Option<PathBuf>,
}
