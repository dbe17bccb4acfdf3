// crates/gatewayctrl-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Config Repository
// Description: Durable ConfigRepository backed by SQLite WAL.
// Purpose: Persist gateway configs with sensitive fields sealed per value.
// Dependencies: gatewayctrl-core, gatewayctrl-credentials, rusqlite, serde_json, uuid
// ============================================================================

//! ## Overview
//! This module implements [`ConfigRepository`] on a single `SQLite` table, one
//! row per gateway. Both field maps are stored as JSON objects whose values
//! are individually plaintext or `enc:v1:` sealed, so legacy rows stay
//! readable. Every write runs inside one transaction on a mutex-guarded
//! connection, which makes "check the name is free, then write" atomic.
//! Security posture: database contents are untrusted; rows that fail to parse
//! are reported as corruption and marked values that fail to decrypt are
//! reported loudly, never returned empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use gatewayctrl_core::AuditSink;
use gatewayctrl_core::ConfigRepository;
use gatewayctrl_core::CredentialAuditEvent;
use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::GatewayConfigSummary;
use gatewayctrl_core::GatewayId;
use gatewayctrl_core::GatewayType;
use gatewayctrl_core::NoopAuditSink;
use gatewayctrl_core::RepositoryAuditEvent;
use gatewayctrl_core::RepositoryError;
use gatewayctrl_core::SaveReceipt;
use gatewayctrl_credentials::FieldSealer;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Columns read for a full record, in `map_row` order.
const RECORD_COLUMNS: &str = "id, name, gateway_type, base_url, tls_verify, certificate_path, \
                              credentials, additional_config";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` config repository.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - Certificate files are only ever deleted from inside `certificate_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Directory holding managed certificate files.
    #[serde(default = "default_certificate_dir")]
    pub certificate_dir: PathBuf,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default settings and a certificate
    /// directory next to the database.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let certificate_dir = path
            .parent()
            .map_or_else(default_certificate_dir, |parent| parent.join("certificates"));
        Self {
            path,
            certificate_dir,
            ..Self::default()
        }
    }
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            certificate_dir: default_certificate_dir(),
        }
    }
}

/// Returns the default database path.
fn default_store_path() -> PathBuf {
    PathBuf::from("gatewayctrl.db")
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default certificate directory.
fn default_certificate_dir() -> PathBuf {
    PathBuf::from("certificates")
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages never embed field values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row failed to parse.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store configuration or input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for RepositoryError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Storage(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Validation(message),
        }
    }
}

/// Maps an engine error, treating constraint violations as name conflicts.
fn map_db_error(err: &rusqlite::Error, name: &str) -> RepositoryError {
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => RepositoryError::Conflict(name.to_string()),
        _ => SqliteStoreError::Db(err.to_string()).into(),
    }
}

/// Shorthand for engine errors outside of name-sensitive writes.
fn db_error(err: &rusqlite::Error) -> RepositoryError {
    SqliteStoreError::Db(err.to_string()).into()
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Stored row with field maps still sealed.
struct StoredRow {
    /// Gateway identifier.
    id: String,
    /// Display name.
    name: String,
    /// Vendor key.
    gateway_type: String,
    /// Management endpoint.
    base_url: String,
    /// TLS verification flag.
    tls_verify: bool,
    /// Optional managed certificate path.
    certificate_path: Option<String>,
    /// Credentials JSON object.
    credentials: String,
    /// Additional config JSON object.
    additional_config: String,
}

/// Reads a row selected with [`RECORD_COLUMNS`].
fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        id: row.get(0)?,
        name: row.get(1)?,
        gateway_type: row.get(2)?,
        base_url: row.get(3)?,
        tls_verify: row.get(4)?,
        certificate_path: row.get(5)?,
        credentials: row.get(6)?,
        additional_config: row.get(7)?,
    })
}

/// Parses a stored field map.
fn parse_fields(
    raw: &str,
    column: &str,
    id: &str,
) -> Result<BTreeMap<String, String>, RepositoryError> {
    serde_json::from_str(raw).map_err(|_| {
        SqliteStoreError::Corrupt(format!("{column} of gateway {id} is not a string map")).into()
    })
}

/// Serializes a field map for storage.
fn encode_fields(fields: &BTreeMap<String, String>) -> Result<String, RepositoryError> {
    serde_json::to_string(fields).map_err(|err| {
        SqliteStoreError::Invalid(format!("field map not serializable: {err}")).into()
    })
}

// ============================================================================
// SECTION: Repository
// ============================================================================

/// `SQLite`-backed gateway config repository.
///
/// # Invariants
/// - Connection access is serialized through a mutex; writes run in one transaction.
/// - With a key configured, no sensitive field is written readable.
/// - `gateway_type` never changes for an existing id.
#[derive(Clone)]
pub struct SqliteConfigRepository {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
    /// Per-field encryption.
    sealer: FieldSealer,
    /// Sink for repository and credential events.
    audit: Arc<dyn AuditSink>,
}

impl SqliteConfigRepository {
    /// Opens or creates a repository.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn open(
        config: SqliteStoreConfig,
        sealer: FieldSealer,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
            sealer,
            audit,
        })
    }

    /// Opens a repository that records no audit events.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened.
    pub fn open_quiet(
        config: SqliteStoreConfig,
        sealer: FieldSealer,
    ) -> Result<Self, SqliteStoreError> {
        Self::open(config, sealer, Arc::new(NoopAuditSink))
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Returns the directory holding managed certificates.
    #[must_use]
    pub fn certificate_dir(&self) -> &Path {
        &self.config.certificate_dir
    }

    /// Returns the field sealer.
    #[must_use]
    pub const fn sealer(&self) -> &FieldSealer {
        &self.sealer
    }

    /// Looks up a config id by its unique name.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the store cannot be read.
    pub fn find_by_name(&self, name: &str) -> Result<Option<GatewayId>, RepositoryError> {
        let guard = self.lock()?;
        guard
            .query_row("SELECT id FROM gateways WHERE name = ?1", params![name], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map(|id| id.map(GatewayId::new))
            .map_err(|err| db_error(&err))
    }

    /// Removes every record and its managed certificate; returns the count.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the store cannot be written.
    pub fn clear(&self) -> Result<usize, RepositoryError> {
        let (count, certificates) = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| db_error(&err))?;
            let certificates = {
                let mut statement = tx
                    .prepare(
                        "SELECT certificate_path FROM gateways WHERE certificate_path IS NOT NULL",
                    )
                    .map_err(|err| db_error(&err))?;
                let rows = statement
                    .query_map([], |row| row.get::<_, String>(0))
                    .map_err(|err| db_error(&err))?;
                rows.collect::<Result<Vec<_>, _>>().map_err(|err| db_error(&err))?
            };
            let count = tx.execute("DELETE FROM gateways", []).map_err(|err| db_error(&err))?;
            tx.commit().map_err(|err| db_error(&err))?;
            (count, certificates)
        };
        for path in certificates {
            self.remove_managed_certificate(Path::new(&path))?;
        }
        self.audit.record_repository(&RepositoryAuditEvent::bulk("cleared", count));
        Ok(count)
    }

    /// Re-saves every record holding readable sensitive fields so they become
    /// sealed under the current key; returns the number of records rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::EncryptionUnavailable`] when no key is
    /// configured and [`RepositoryError::DecryptionFailed`] when an existing
    /// value cannot be read under the current key.
    pub fn reseal_all(&self) -> Result<usize, RepositoryError> {
        if !self.sealer.store().is_enabled() {
            return Err(RepositoryError::EncryptionUnavailable(
                "resealing requires an encryption key".to_string(),
            ));
        }
        let resealed = self.reseal_rows(self.stored_rows()?)?;
        self.audit.record_repository(&RepositoryAuditEvent::bulk("resealed", resealed));
        Ok(resealed)
    }

    /// Re-saves the rows of a snapshot that hold readable sensitive fields,
    /// skipping rows deleted or renamed since the snapshot was read.
    fn reseal_rows(&self, rows: Vec<StoredRow>) -> Result<usize, RepositoryError> {
        let mut resealed = 0;
        for row in rows {
            let credentials = parse_fields(&row.credentials, "credentials", &row.id)?;
            let additional = parse_fields(&row.additional_config, "additional_config", &row.id)?;
            if self.sealer.plaintext_sensitive_fields(&credentials).is_empty()
                && self.sealer.plaintext_sensitive_fields(&additional).is_empty()
            {
                continue;
            }
            let resaved = self.load(&GatewayId::new(row.id)).and_then(|config| self.save(&config));
            match resaved {
                Ok(_) => resealed += 1,
                Err(RepositoryError::NotFound(_) | RepositoryError::Conflict(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(resealed)
    }

    /// Locks the connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite mutex poisoned".to_string()).into())
    }

    /// Reads every stored row in name order.
    fn stored_rows(&self) -> Result<Vec<StoredRow>, RepositoryError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM gateways ORDER BY name"))
            .map_err(|err| db_error(&err))?;
        let rows = statement
            .query_map([], map_row)
            .map_err(|err| db_error(&err))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| db_error(&err))?;
        Ok(rows)
    }

    /// Seals both field maps, returning them encoded plus the readable
    /// sensitive field names.
    fn seal_config(
        &self,
        config: &GatewayConfig,
    ) -> Result<(String, String, Vec<String>), RepositoryError> {
        let credentials = self.sealer.seal(&config.credentials)?;
        let additional = self.sealer.seal(&config.additional_config)?;
        let mut plaintext_fields = credentials.plaintext_fields;
        plaintext_fields.extend(additional.plaintext_fields);
        Ok((
            encode_fields(&credentials.fields)?,
            encode_fields(&additional.fields)?,
            plaintext_fields,
        ))
    }

    /// Deletes a certificate file when it lives inside the certificate directory.
    fn remove_managed_certificate(&self, path: &Path) -> Result<(), RepositoryError> {
        let (Ok(file), Ok(dir)) = (path.canonicalize(), self.config.certificate_dir.canonicalize())
        else {
            return Ok(());
        };
        if !file.starts_with(&dir) {
            return Ok(());
        }
        match fs::remove_file(&file) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SqliteStoreError::Io(err.to_string()).into()),
        }
    }
}

impl ConfigRepository for SqliteConfigRepository {
    fn save(&self, config: &GatewayConfig) -> Result<SaveReceipt, RepositoryError> {
        config.validate().map_err(RepositoryError::Validation)?;
        let (credentials, additional_config, plaintext_fields) = self.seal_config(config)?;
        let certificate_path =
            config.certificate_path.as_ref().map(|path| path.display().to_string());
        let now = unix_millis();

        let (id, created) = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| db_error(&err))?;
            let (id, created) = match &config.id {
                Some(id) => {
                    ensure_same_type(&tx, id, &config.gateway_type)?;
                    (id.clone(), false)
                }
                None => (GatewayId::new(Uuid::new_v4().to_string()), true),
            };
            ensure_name_free(&tx, &config.name, &id)?;
            if created {
                tx.execute(
                    "INSERT INTO gateways (id, name, gateway_type, base_url, tls_verify, \
                     certificate_path, credentials, additional_config, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                    params![
                        id.as_str(),
                        config.name,
                        config.gateway_type.as_str(),
                        config.base_url,
                        config.tls_verify,
                        certificate_path,
                        credentials,
                        additional_config,
                        now
                    ],
                )
                .map_err(|err| map_db_error(&err, &config.name))?;
            } else {
                tx.execute(
                    "UPDATE gateways SET name = ?2, base_url = ?3, tls_verify = ?4, \
                     certificate_path = ?5, credentials = ?6, additional_config = ?7, \
                     updated_at = ?8 WHERE id = ?1",
                    params![
                        id.as_str(),
                        config.name,
                        config.base_url,
                        config.tls_verify,
                        certificate_path,
                        credentials,
                        additional_config,
                        now
                    ],
                )
                .map_err(|err| map_db_error(&err, &config.name))?;
            }
            tx.commit().map_err(|err| db_error(&err))?;
            (id, created)
        };

        if !plaintext_fields.is_empty() {
            self.audit.record_credential(&CredentialAuditEvent::plaintext_stored(
                &config.name,
                plaintext_fields.clone(),
            ));
        }
        let action = if created { "created" } else { "updated" };
        self.audit.record_repository(&RepositoryAuditEvent::record(
            action,
            id.as_str(),
            Some(&config.name),
        ));
        Ok(SaveReceipt {
            id,
            created,
            plaintext_fields,
        })
    }

    fn load(&self, id: &GatewayId) -> Result<GatewayConfig, RepositoryError> {
        let row = {
            let guard = self.lock()?;
            guard
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM gateways WHERE id = ?1"),
                    params![id.as_str()],
                    map_row,
                )
                .optional()
                .map_err(|err| db_error(&err))?
        };
        let Some(row) = row else {
            return Err(RepositoryError::NotFound(id.to_string()));
        };
        let credentials = parse_fields(&row.credentials, "credentials", &row.id)?;
        let additional_config = parse_fields(&row.additional_config, "additional_config", &row.id)?;
        Ok(GatewayConfig {
            id: Some(GatewayId::new(row.id)),
            name: row.name,
            gateway_type: GatewayType::new(row.gateway_type),
            base_url: row.base_url,
            tls_verify: row.tls_verify,
            certificate_path: row.certificate_path.map(PathBuf::from),
            credentials: self.sealer.unseal(&credentials)?,
            additional_config: self.sealer.unseal(&additional_config)?,
        })
    }

    fn list_all(&self) -> Result<Vec<GatewayConfigSummary>, RepositoryError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare("SELECT id, name, gateway_type, base_url FROM gateways ORDER BY name")
            .map_err(|err| db_error(&err))?;
        let summaries = statement
            .query_map([], |row| {
                Ok(GatewayConfigSummary {
                    id: GatewayId::new(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    gateway_type: GatewayType::new(row.get::<_, String>(2)?),
                    base_url: row.get(3)?,
                })
            })
            .map_err(|err| db_error(&err))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| db_error(&err))?;
        Ok(summaries)
    }

    fn delete(&self, id: &GatewayId) -> Result<(), RepositoryError> {
        let removed = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| db_error(&err))?;
            let existing: Option<(String, Option<String>)> = tx
                .query_row(
                    "SELECT name, certificate_path FROM gateways WHERE id = ?1",
                    params![id.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|err| db_error(&err))?;
            if existing.is_some() {
                tx.execute("DELETE FROM gateways WHERE id = ?1", params![id.as_str()])
                    .map_err(|err| db_error(&err))?;
            }
            tx.commit().map_err(|err| db_error(&err))?;
            existing
        };
        let Some((name, certificate_path)) = removed else {
            return Ok(());
        };
        if let Some(path) = certificate_path {
            self.remove_managed_certificate(Path::new(&path))?;
        }
        self.audit.record_repository(&RepositoryAuditEvent::record(
            "deleted",
            id.as_str(),
            Some(&name),
        ));
        Ok(())
    }
}

// ============================================================================
// SECTION: Write Guards
// ============================================================================

/// Fails unless `id` exists with the same vendor type.
fn ensure_same_type(
    tx: &Transaction<'_>,
    id: &GatewayId,
    gateway_type: &GatewayType,
) -> Result<(), RepositoryError> {
    let stored: Option<String> = tx
        .query_row("SELECT gateway_type FROM gateways WHERE id = ?1", params![id.as_str()], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|err| db_error(&err))?;
    match stored {
        None => Err(RepositoryError::NotFound(id.to_string())),
        Some(stored) if stored == gateway_type.as_str() => Ok(()),
        Some(stored) => Err(RepositoryError::Validation(format!(
            "gateway type is immutable (stored {stored}, requested {gateway_type}); delete and \
             recreate the gateway instead"
        ))),
    }
}

/// Fails when another record already uses `name`.
fn ensure_name_free(
    tx: &Transaction<'_>,
    name: &str,
    id: &GatewayId,
) -> Result<(), RepositoryError> {
    let holder: Option<String> = tx
        .query_row(
            "SELECT id FROM gateways WHERE name = ?1 AND id <> ?2",
            params![name, id.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|err| db_error(&err))?;
    match holder {
        Some(_) => Err(RepositoryError::Conflict(name.to_string())),
        None => Ok(()),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    if path
        .components()
        .any(|component| component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(SqliteStoreError::Invalid(
            "store path contains an overlong component".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS gateways (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL UNIQUE,
                    gateway_type TEXT NOT NULL,
                    base_url TEXT NOT NULL,
                    tls_verify INTEGER NOT NULL,
                    certificate_path TEXT,
                    credentials TEXT NOT NULL,
                    additional_config TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
