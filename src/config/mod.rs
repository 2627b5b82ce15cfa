//! Persistent config store
//!
//! A JSON document on disk, addressed by dotted key paths (`game.game_path`)
//! and checked against a declared [`Schema`] whenever it is loaded or saved.
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the target, so the file on disk is always either the previous complete
//! document or the new one. Stored documents older than the running schema
//! version are backed up and migrated before use.

mod migrate;
mod path;
mod schema;
mod settings;

pub use migrate::{app_migrations, stored_version, Migration, VERSION_KEY};
pub use schema::{FieldSpec, Schema, ValueKind};
pub use settings::{
    app_schema, AppSettings, FrameworkSettings, GameSettings, GithubSettings, InstalledState,
    ModSettings, NexusSettings, UiSettings, CONFIG_VERSION, DEFAULT_PROXY_URL, KEY_GAME_PATH,
    KEY_INSTALLED_VERSION, KEY_NEXUS_API, KEY_PROXY_MODE, KEY_PROXY_URL,
};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::context::AppContext;
use crate::logging::Logger;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    FileAbsent(PathBuf),

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("invalid config path: {0}")]
    InvalidPath(String),

    #[error("failed to save config file {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported config version marker {0}")]
    UnknownVersion(String),

    #[error("no migration from config version {from} towards {to}")]
    MigrationMissing { from: u32, to: u32 },

    #[error("migration {from} -> {to} failed: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },
}

// ============================================================================
// Config Store
// ============================================================================

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    schema: Schema,
    version: u32,
    defaults: Option<Map<String, Value>>,
    migrations: Vec<Migration>,
    data: Map<String, Value>,
    logger: Logger,
}

impl ConfigStore {
    /// A store without a seed document; loading a missing file fails with `FileAbsent`.
    pub fn new(ctx: &AppContext, path: impl Into<PathBuf>, schema: Schema, version: u32) -> Self {
        let mut data = Map::new();
        data.insert(VERSION_KEY.to_string(), Value::from(version));
        Self {
            path: path.into(),
            schema,
            version,
            defaults: None,
            migrations: Vec::new(),
            data,
            logger: ctx.logger.clone(),
        }
    }

    /// The application store at the context's config path.
    pub fn app(ctx: &AppContext) -> Self {
        Self::app_at(ctx, ctx.config_path())
    }

    pub fn app_at(ctx: &AppContext, path: impl Into<PathBuf>) -> Self {
        Self::new(ctx, path, app_schema(), CONFIG_VERSION)
            .with_schema_defaults()
            .with_migrations(app_migrations())
    }

    /// Seed document written when the file does not exist yet.
    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn with_schema_defaults(self) -> Self {
        let defaults = self.schema.default_document();
        self.with_defaults(defaults)
    }

    pub fn with_migrations(mut self, migrations: Vec<Migration>) -> Self {
        self.migrations = migrations;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Copy of the whole document.
    pub fn data(&self) -> Map<String, Value> {
        self.data.clone()
    }

    /// Load the document from disk, seeding it from the defaults on first run.
    ///
    /// The in-memory document is only replaced once the loaded one has been
    /// migrated and validated.
    pub fn load(&mut self) -> Result<Map<String, Value>, ConfigError> {
        if !self.path.exists() {
            let Some(mut defaults) = self.defaults.clone() else {
                return Err(ConfigError::FileAbsent(self.path.clone()));
            };
            self.logger.info(&format!(
                "Config file not found, creating defaults at {}",
                self.path.display()
            ));
            defaults.insert(VERSION_KEY.to_string(), Value::from(self.version));
            self.persist(&defaults)?;
            self.data = defaults;
            return Ok(self.data.clone());
        }

        let content = fs::read(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        let mut doc: Map<String, Value> =
            serde_json::from_slice(&content).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let from = stored_version(&doc).ok_or_else(|| {
            ConfigError::UnknownVersion(
                doc.get(VERSION_KEY).map(Value::to_string).unwrap_or_default(),
            )
        })?;

        if from != self.version {
            doc = self.migrated(doc, from)?;
        } else {
            let filled = self.schema.fill_missing(&mut doc);
            if !filled.is_empty() {
                self.logger
                    .debug(&format!("Filled missing config keys: {}", filled.join(", ")));
            }
            self.check(&doc)?;
        }

        self.data = doc;
        Ok(self.data.clone())
    }

    /// Value at `key`, or `default` when any segment is missing.
    pub fn get(&self, key: &str, default: Value) -> Value {
        path::lookup(&self.data, key).cloned().unwrap_or(default)
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        path::lookup(&self.data, key)
    }

    /// Value at `key` deserialized as `T`; `None` when missing or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_value(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_value(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_value(key).and_then(Value::as_bool)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get_value(key).and_then(Value::as_u64)
    }

    /// Store `value` at `key`, creating intermediate levels. Saves right away if `auto_save`.
    ///
    /// With `auto_save`, a value that fails validation or cannot be written
    /// leaves the previous value in place.
    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        auto_save: bool,
    ) -> Result<(), ConfigError> {
        let mut next = self.data.clone();
        path::insert(&mut next, key, value.into())?;
        if auto_save {
            self.persist(&next)?;
        }
        self.data = next;
        Ok(())
    }

    /// Check every declared key against the schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check(&self.data)
    }

    /// Validate, then atomically replace the file on disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.persist(&self.data)
    }

    /// Back up the file, upgrade the in-memory document from `from` to the
    /// running version, and persist it.
    pub fn migrate(&mut self, from: u32) -> Result<(), ConfigError> {
        self.data = self.migrated(self.data.clone(), from)?;
        Ok(())
    }

    fn check(&self, doc: &Map<String, Value>) -> Result<(), ConfigError> {
        let errors = self.schema.validate(doc);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn persist(&self, doc: &Map<String, Value>) -> Result<(), ConfigError> {
        self.check(doc)?;
        write_atomic(&self.path, doc).map_err(|source| {
            self.logger.error(&format!(
                "Failed to save config {}: {}",
                self.path.display(),
                source
            ));
            ConfigError::Save {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// `doc` upgraded from `from` and written back, after backing up the file.
    fn migrated(
        &self,
        mut doc: Map<String, Value>,
        from: u32,
    ) -> Result<Map<String, Value>, ConfigError> {
        let steps = migrate::plan(&self.migrations, from, self.version).map_err(|stuck| {
            ConfigError::MigrationMissing {
                from: stuck,
                to: self.version,
            }
        })?;

        self.logger.debug(&format!(
            "Config version changed ({} -> {})",
            from, self.version
        ));

        if self.path.exists() {
            let backup = backup_path(&self.path);
            fs::copy(&self.path, &backup).map_err(|source| ConfigError::Save {
                path: backup.clone(),
                source,
            })?;
            self.logger
                .info(&format!("Created config backup: {}", backup.display()));
        }

        for step in steps {
            (step.apply)(&mut doc).map_err(|reason| ConfigError::MigrationFailed {
                from: step.from,
                to: step.to,
                reason,
            })?;
            self.logger.debug(&format!(
                "Migrated config {} -> {}: {}",
                step.from, step.to, step.description
            ));
        }

        doc.insert(VERSION_KEY.to_string(), Value::from(self.version));
        self.schema.fill_missing(&mut doc);
        self.persist(&doc)?;
        Ok(doc)
    }

    // ========================================================================
    // Installed state
    // ========================================================================

    pub fn installed_state(&self) -> InstalledState {
        let version = self.get_u64(KEY_INSTALLED_VERSION);
        let game_path = self
            .get_str(KEY_GAME_PATH)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        InstalledState { version, game_path }
    }

    /// Record a verified deployment and persist it.
    pub fn record_installed_version(&mut self, version: u64) -> Result<(), ConfigError> {
        self.set(KEY_INSTALLED_VERSION, version, true)
    }

    /// Typed view of an application document.
    pub fn settings(&self) -> Result<AppSettings, ConfigError> {
        serde_json::from_value(Value::Object(self.data.clone()))
            .map_err(|e| ConfigError::Validation(vec![e.to_string()]))
    }
}

/// First free backup name: `<stem>.bak`, then `<stem>.bak.1`, `<stem>.bak.2`, ...
fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.with_extension("bak");
    let mut counter = 1;
    while backup.exists() {
        backup = path.with_extension(format!("bak.{}", counter));
        counter += 1;
    }
    backup
}

fn write_atomic(path: &Path, data: &Map<String, Value>) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;

    // Dropping the temp file on any early return removes it
    let mut tmp = tempfile::Builder::new()
        .prefix(".config-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(dir: &Path) -> AppContext {
        AppContext::with_logger(Logger::memory(), dir)
    }

    fn test_schema() -> Schema {
        Schema::new()
            .field("database.host", ValueKind::String, "localhost", "Host")
            .field("database.port", ValueKind::Integer, 3306, "Port")
            .field("debug", ValueKind::Bool, false, "Debug")
    }

    fn tmp_entries(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_first_load_seeds_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1)
            .with_schema_defaults();

        let data = store.load().unwrap();
        assert_eq!(data["database"]["port"], json!(3306));
        assert_eq!(data[VERSION_KEY], json!(1));

        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, Value::Object(data));
    }

    #[test]
    fn test_missing_file_without_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1);
        assert!(matches!(store.load(), Err(ConfigError::FileAbsent(p)) if p == path));
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1)
            .with_schema_defaults();
        assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_non_utf8_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{\"debug\": \"\xff\xfe\"}").unwrap();
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1);
        assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_failed_load_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1)
            .with_schema_defaults();
        store.load().unwrap();
        let before = store.data();

        fs::write(&path, r#"{"__version__": 1, "debug": "yes"}"#).unwrap();
        assert!(matches!(store.load(), Err(ConfigError::Validation(_))));
        assert_eq!(store.data(), before);

        fs::write(&path, r#"{"__version__": 7}"#).unwrap();
        assert!(matches!(store.load(), Err(ConfigError::MigrationMissing { .. })));
        assert_eq!(store.data(), before);
    }

    #[test]
    fn test_load_reports_every_type_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"__version__": 1, "database": {"host": 5, "port": "x"}, "debug": "yes"}"#,
        )
        .unwrap();
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1);
        match store.load() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| e.contains("database.host")));
                assert!(errors.iter().any(|e| e.contains("database.port")));
                assert!(errors.iter().any(|e| e.contains("debug")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_get_and_set_dotted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1)
            .with_schema_defaults();
        store.load().unwrap();

        assert_eq!(store.get("database.port", json!(0)), json!(3306));
        assert_eq!(store.get("database.port.inner", json!("fallback")), json!("fallback"));
        assert_eq!(store.get("missing.key", Value::Null), Value::Null);

        store.set("new_feature.enabled", true, false).unwrap();
        assert_eq!(store.get_bool("new_feature.enabled"), Some(true));

        let err = store.set("debug.level", 3, false).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath(_)));
    }

    #[test]
    fn test_set_without_auto_save_leaves_disk_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1)
            .with_schema_defaults();
        store.load().unwrap();
        let before = fs::read_to_string(&path).unwrap();

        store.set("database.port", 3307, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        store.set("database.port", 3308, true).unwrap();
        let after: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(after["database"]["port"], json!(3308));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let context = ctx(dir.path());
        let mut store =
            ConfigStore::new(&context, &path, test_schema(), 1).with_schema_defaults();
        store.load().unwrap();
        store.set("database.host", "db.internal", false).unwrap();
        store.set("extra.list", json!([1, 2, 3]), false).unwrap();
        store.save().unwrap();

        let mut reloaded = ConfigStore::new(&context, &path, test_schema(), 1);
        let data = reloaded.load().unwrap();
        assert_eq!(data, store.data());
        assert!(tmp_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_invalid_document_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1)
            .with_schema_defaults();
        store.load().unwrap();
        let before = fs::read_to_string(&path).unwrap();

        store.set("debug", "definitely", false).unwrap();
        assert!(matches!(store.save(), Err(ConfigError::Validation(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_rejected_auto_save_keeps_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let context = ctx(dir.path());
        let mut store = ConfigStore::app_at(&context, &path);
        store.load().unwrap();

        assert!(matches!(
            store.set("ui.animation", "yes", true),
            Err(ConfigError::Validation(_))
        ));
        assert_eq!(store.get_bool("ui.animation"), Some(true));
        store.validate().unwrap();

        store.record_installed_version(1090).unwrap();
        let mut reloaded = ConfigStore::app_at(&context, &path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.installed_state().version, Some(1090));
        assert_eq!(reloaded.get_bool("ui.animation"), Some(true));
    }

    #[test]
    fn test_stray_temp_file_is_ignored_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let context = ctx(dir.path());
        let mut store =
            ConfigStore::new(&context, &path, test_schema(), 1).with_schema_defaults();
        store.load().unwrap();
        store.set("database.port", 4000, true).unwrap();
        let complete = fs::read_to_string(&path).unwrap();

        // Left behind by a write that never reached the rename
        let mut stray = tempfile::Builder::new()
            .prefix(".config-")
            .suffix(".tmp")
            .tempfile_in(dir.path())
            .unwrap();
        stray.write_all(b"{\"database\": {\"po").unwrap();
        let _kept = stray.into_temp_path().keep().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), complete);
        let mut reloaded = ConfigStore::new(&context, &path, test_schema(), 1);
        assert_eq!(reloaded.load().unwrap()["database"]["port"], json!(4000));
    }

    #[test]
    fn test_failed_save_reports_save_error_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // The target is a directory, so the final rename fails
        let path = dir.path().join("config.json");
        fs::create_dir_all(path.join("occupied")).unwrap();

        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 1);
        store.set("database.host", "x", false).unwrap();
        store.set("database.port", 1, false).unwrap();
        store.set("debug", false, false).unwrap();

        assert!(matches!(store.save(), Err(ConfigError::Save { .. })));
        assert!(tmp_entries(dir.path()).is_empty());
    }

    fn add_timeout(doc: &mut Map<String, Value>) -> Result<(), String> {
        path::insert(doc, "database.timeout", json!(30)).map_err(|e| e.to_string())
    }

    fn rename_debug(doc: &mut Map<String, Value>) -> Result<(), String> {
        let old = doc.remove("verbose").unwrap_or(Value::Bool(false));
        doc.insert("debug".to_string(), old);
        Ok(())
    }

    fn chain() -> Vec<Migration> {
        vec![
            Migration {
                from: 1,
                to: 2,
                description: "add timeout",
                apply: add_timeout,
            },
            Migration {
                from: 0,
                to: 1,
                description: "rename verbose",
                apply: rename_debug,
            },
        ]
    }

    #[test]
    fn test_migration_backs_up_and_upgrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let original = r#"{"__version__": "0", "database": {"host": "h", "port": 1}, "verbose": true}"#;
        fs::write(&path, original).unwrap();

        let schema = test_schema().field("database.timeout", ValueKind::Integer, 10, "Timeout");
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, schema, 2)
            .with_migrations(chain());
        let data = store.load().unwrap();

        assert_eq!(data[VERSION_KEY], json!(2));
        assert_eq!(data["debug"], json!(true));
        assert_eq!(data["database"]["timeout"], json!(30));
        assert!(data.get("verbose").is_none());

        assert_eq!(fs::read_to_string(dir.path().join("config.bak")).unwrap(), original);
        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk[VERSION_KEY], json!(2));
    }

    #[test]
    fn test_existing_backup_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(dir.path().join("config.bak"), "older backup").unwrap();
        fs::write(&path, r#"{"database": {"host": "h", "port": 1}}"#).unwrap();

        let schema = test_schema().field("database.timeout", ValueKind::Integer, 10, "Timeout");
        let mut store = ConfigStore::new(&ctx(dir.path()), &path, schema, 2)
            .with_migrations(chain());
        store.load().unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("config.bak")).unwrap(),
            "older backup"
        );
        assert!(dir.path().join("config.bak.1").exists());
    }

    #[test]
    fn test_missing_migration_step_fails_without_touching_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let original = r#"{"__version__": 5, "database": {"host": "h", "port": 1}, "debug": true}"#;
        fs::write(&path, original).unwrap();

        let mut store = ConfigStore::new(&ctx(dir.path()), &path, test_schema(), 2)
            .with_migrations(chain());
        assert!(matches!(
            store.load(),
            Err(ConfigError::MigrationMissing { from: 5, to: 2 })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        assert!(!dir.path().join("config.bak").exists());
    }

    #[test]
    fn test_app_store_migrates_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "ui": {"light_mode": "Dark", "vague_mode": false, "animation": true},
                "game": {"game_path": "/games/MonsterHunterWilds"},
                "ref": {"installed_rf_version": "nightly-01080-def"}
            }"#,
        )
        .unwrap();

        let mut store = ConfigStore::app_at(&ctx(dir.path()), &path);
        store.load().unwrap();

        let state = store.installed_state();
        assert_eq!(state.version, Some(1080));
        assert_eq!(state.game_path, Some(PathBuf::from("/games/MonsterHunterWilds")));

        let settings = store.settings().unwrap();
        assert_eq!(settings.ui.light_mode, "Dark");
        assert_eq!(settings.github.proxy_url, DEFAULT_PROXY_URL);
    }

    #[test]
    fn test_record_installed_version_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let context = ctx(dir.path());
        let mut store = ConfigStore::app_at(&context, &path);
        store.load().unwrap();
        assert_eq!(store.installed_state(), InstalledState::default());

        store.record_installed_version(1090).unwrap();

        let mut reloaded = ConfigStore::app_at(&context, &path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.installed_state().version, Some(1090));

        store.record_installed_version(5_000_000_000).unwrap();
        reloaded.load().unwrap();
        assert_eq!(reloaded.installed_state().version, Some(5_000_000_000));
    }
}
