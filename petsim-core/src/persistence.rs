//! SQLite save slots for pets.
//!
//! Each slot holds one [`PetSnapshot`] serialised to JSON:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS pet_slots (
//!     slot       TEXT PRIMARY KEY,
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! ```
//!
//! - A save is a single UPSERT, so a failed write leaves the previous save
//!   in place.
//! - The snapshot is copied under the engine lock; the lock is released
//!   before any I/O.
//! - With checksums enabled, a CRC-32 of the JSON bytes is stored and a
//!   mismatch on load is reported as [`PetError::CorruptSave`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, params};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::config::{PersistenceConfig, TimingConfig};
use crate::engine::PetEngine;
use crate::error::{PetError, Result};
use crate::snapshot::PetSnapshot;
use crate::types::SlotId;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS pet_slots (
    slot       TEXT PRIMARY KEY,
    data       BLOB NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 of `data` as a lowercase hex string.
fn crc32_hex(data: &[u8]) -> String {
    let crc = crc32_compute(data);
    format!("{crc:08x}")
}

/// Basic CRC-32 (ISO 3309 / ITU-T V.42) computation.
fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// PersistenceGateway
// ---------------------------------------------------------------------------

/// Handle to the save database, plus at most one autosave timer.
///
/// # Usage
///
/// ```no_run
/// # use petsim_core::{PersistenceGateway, PetEngine, SlotId};
/// # use petsim_core::config::{PersistenceConfig, TimingConfig};
/// # async fn demo() -> petsim_core::error::Result<()> {
/// let saves = PersistenceGateway::open("pets.db", &PersistenceConfig::default())?;
/// let pet = PetEngine::new(&TimingConfig::default())?;
/// saves.save(&pet, &SlotId::from("1"))?;
/// let _pet = saves.load(&SlotId::from("1"), &TimingConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub struct PersistenceGateway {
    conn: Mutex<Connection>,
    config: PersistenceConfig,
    db_path: PathBuf,
    autosave: Mutex<Option<Autosave>>,
}

struct Autosave {
    slot: SlotId,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("db_path", &self.db_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PersistenceGateway {
    /// Open (or create) a save database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Save database opened"
        );

        Ok(Self::with_connection(conn, config, db_path))
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`PetError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::with_connection(conn, config, PathBuf::from(":memory:")))
    }

    fn with_connection(conn: Connection, config: &PersistenceConfig, db_path: PathBuf) -> Self {
        Self {
            conn: Mutex::new(conn),
            config: config.clone(),
            db_path,
            autosave: Mutex::new(None),
        }
    }

    // ------------------------------------------------------------------
    // Save / load
    // ------------------------------------------------------------------

    /// Snapshot `engine` and write it to `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::Serialization`] or [`PetError::Database`]. The
    /// previous contents of the slot are untouched on failure.
    pub fn save(&self, engine: &PetEngine, slot: &SlotId) -> Result<()> {
        let snapshot = engine.snapshot();
        self.save_snapshot(slot, &snapshot)
    }

    /// Write an already-taken snapshot to `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::Serialization`] or [`PetError::Database`].
    pub fn save_snapshot(&self, slot: &SlotId, snapshot: &PetSnapshot) -> Result<()> {
        let start = Instant::now();

        let json =
            serde_json::to_vec(snapshot).map_err(|e| PetError::Serialization(e.to_string()))?;
        let checksum = self.config.checksum_enabled.then(|| crc32_hex(&json));
        let now = Utc::now().to_rfc3339();

        self.conn.lock().execute(
            "INSERT INTO pet_slots (slot, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(slot) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![slot.as_str(), json, now, checksum],
        )?;

        info!(
            %slot,
            pet = %snapshot.pet_id,
            bytes = json.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Pet saved"
        );
        Ok(())
    }

    /// Read and decode the snapshot in `slot`.
    ///
    /// # Errors
    ///
    /// - [`PetError::SlotNotFound`] if nothing was saved there.
    /// - [`PetError::CorruptSave`] if the record fails its checksum, does not
    ///   decode, or was written by a newer schema.
    /// - [`PetError::Database`] on SQLite failures.
    pub fn load_snapshot(&self, slot: &SlotId) -> Result<PetSnapshot> {
        let row: Option<(Vec<u8>, Option<String>)> = {
            let conn = self.conn.lock();
            let mut stmt =
                conn.prepare_cached("SELECT data, checksum FROM pet_slots WHERE slot = ?1")?;
            stmt.query_row(params![slot.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))
                .optional()?
        };

        let Some((data, stored_checksum)) = row else {
            return Err(PetError::SlotNotFound(slot.clone()));
        };

        let corrupt = |reason: String| {
            warn!(%slot, %reason, "Save slot rejected");
            PetError::CorruptSave {
                slot: slot.clone(),
                reason,
            }
        };

        if self.config.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(&data);
                if expected != actual {
                    return Err(corrupt(format!(
                        "checksum mismatch (stored {expected}, computed {actual})"
                    )));
                }
            }
        }

        let snapshot: PetSnapshot =
            serde_json::from_slice(&data).map_err(|e| corrupt(e.to_string()))?;
        if !snapshot.is_supported() {
            return Err(corrupt(format!(
                "snapshot version {} is newer than this build",
                snapshot.version
            )));
        }

        debug!(%slot, pet = %snapshot.pet_id, "Snapshot read");
        Ok(snapshot)
    }

    /// Rebuild a live engine from `slot` on the current Tokio runtime.
    ///
    /// The engine comes back with decay enabled even if it was saved before
    /// [`PetEngine::allow_execution`]; use [`PersistenceGateway::load_snapshot`]
    /// and [`PetEngine::from_snapshot`] to keep the saved flag.
    ///
    /// # Errors
    ///
    /// As [`PersistenceGateway::load_snapshot`], plus [`PetError::NoRuntime`].
    pub fn load(&self, slot: &SlotId, timing: &TimingConfig) -> Result<PetEngine> {
        let snapshot = self.load_snapshot(slot)?;
        let engine = PetEngine::from_snapshot(snapshot, timing)?;
        engine.allow_execution();
        info!(%slot, pet = %engine.id(), "Pet loaded");
        Ok(engine)
    }

    /// Remove a slot. Returns `true` if something was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::Database`] on SQLite failures.
    pub fn delete_slot(&self, slot: &SlotId) -> Result<bool> {
        let deleted = self
            .conn
            .lock()
            .execute("DELETE FROM pet_slots WHERE slot = ?1", params![slot.as_str()])?;
        Ok(deleted > 0)
    }

    /// Every slot that holds a save, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::Database`] on SQLite failures.
    pub fn list_slots(&self) -> Result<Vec<SlotId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT slot FROM pet_slots ORDER BY slot")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut slots = Vec::new();
        for row in rows {
            slots.push(SlotId::new(row?));
        }
        Ok(slots)
    }

    /// Return the path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ------------------------------------------------------------------
    // Autosave
    // ------------------------------------------------------------------

    /// Save `engine` to `slot` every `interval`, replacing any running
    /// autosave.
    ///
    /// The timer holds only weak references: it ends by itself once the
    /// engine or the gateway is dropped. Failed writes are logged and retried
    /// at the next firing.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::NoRuntime`] outside a Tokio runtime.
    pub fn start_autosave(
        self: &Arc<Self>,
        engine: &PetEngine,
        slot: SlotId,
        interval: Duration,
    ) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| PetError::NoRuntime)?;
        let interval = interval.max(Duration::from_millis(1));
        let gateway = Arc::downgrade(self);
        let pet = engine.downgrade();
        let task_slot = slot.clone();

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(snapshot) = pet.snapshot() else {
                    debug!(slot = %task_slot, "Pet dropped, autosave exiting");
                    break;
                };
                if !autosave_once(&gateway, &task_slot, snapshot).await {
                    break;
                }
            }
        });

        let previous = self.autosave.lock().replace(Autosave {
            slot: slot.clone(),
            task,
        });
        if let Some(previous) = previous {
            previous.task.abort();
            debug!(slot = %previous.slot, "Previous autosave replaced");
        }
        info!(%slot, interval_ms = interval.as_millis(), "Autosave started");
        Ok(())
    }

    /// Stop the autosave timer. Idempotent; does not wait for a write in
    /// flight.
    pub fn stop_autosave(&self) {
        if let Some(autosave) = self.autosave.lock().take() {
            autosave.task.abort();
            info!(slot = %autosave.slot, "Autosave stopped");
        }
    }

    /// Slot the autosave is writing to, if running.
    #[must_use]
    pub fn autosave_slot(&self) -> Option<SlotId> {
        self.autosave
            .lock()
            .as_ref()
            .filter(|a| !a.task.is_finished())
            .map(|a| a.slot.clone())
    }
}

impl Drop for PersistenceGateway {
    fn drop(&mut self) {
        if let Some(autosave) = self.autosave.get_mut().take() {
            autosave.task.abort();
        }
    }
}

/// One autosave firing. Returns `false` once the gateway is gone.
async fn autosave_once(
    gateway: &Weak<PersistenceGateway>,
    slot: &SlotId,
    snapshot: PetSnapshot,
) -> bool {
    let Some(gateway) = gateway.upgrade() else {
        return false;
    };
    let slot = slot.clone();
    let write = tokio::task::spawn_blocking(move || gateway.save_snapshot(&slot, &snapshot));
    match write.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Autosave failed; will retry"),
        Err(e) => warn!(error = %e, "Autosave task failed; will retry"),
    }
    true
}

/// Extension trait that adds an `.optional()` combinator to `rusqlite::Result`.
trait OptionalExt<T> {
    /// Convert `QueryReturnedNoRows` into `Ok(None)`.
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;
    use crate::personality::Personality;
    use crate::types::LifecycleState;

    fn test_config() -> PersistenceConfig {
        PersistenceConfig {
            checksum_enabled: true,
            ..PersistenceConfig::default()
        }
    }

    fn timing() -> TimingConfig {
        TimingConfig {
            item_seed: Some(3),
            ..TimingConfig::default()
        }
    }

    fn slot(s: &str) -> SlotId {
        SlotId::from(s)
    }

    #[tokio::test]
    async fn round_trip_save_load() {
        let saves = PersistenceGateway::open_in_memory(&test_config()).expect("open");
        let pet = PetEngine::new(&timing()).expect("engine");
        pet.set_name("Biscuit");
        pet.select_personality(Personality::Bird).expect("bird");
        pet.set_attribute(Attribute::Hunger, 42);
        pet.set_attribute(Attribute::Score, 1234);
        pet.allow_execution();

        saves.save(&pet, &slot("1")).expect("save");
        let loaded = saves.load(&slot("1"), &timing()).expect("load");

        assert_eq!(loaded.snapshot(), pet.snapshot());
        assert_eq!(loaded.name(), "Biscuit");
        assert_eq!(loaded.personality(), Some(Personality::Bird));
        assert!(loaded.timers().decay);
    }

    #[test]
    fn missing_slot_is_not_found() {
        let saves = PersistenceGateway::open_in_memory(&test_config()).expect("open");
        let err = saves.load_snapshot(&slot("2")).expect_err("missing");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn upsert_overwrites() {
        let saves = PersistenceGateway::open_in_memory(&test_config()).expect("open");
        let pet = PetEngine::new(&timing()).expect("engine");

        saves.save(&pet, &slot("1")).expect("save1");
        pet.feed().expect("feed");
        saves.save(&pet, &slot("1")).expect("save2");

        let snap = saves.load_snapshot(&slot("1")).expect("load");
        assert_eq!(snap.attributes.hunger(), 10);
        assert_eq!(saves.list_slots().expect("list"), vec![slot("1")]);
    }

    #[tokio::test]
    async fn delete_and_list_slots() {
        let saves = PersistenceGateway::open_in_memory(&test_config()).expect("open");
        let pet = PetEngine::new(&timing()).expect("engine");
        for s in ["3", "1", "2"] {
            saves.save(&pet, &slot(s)).expect("save");
        }
        assert_eq!(
            saves.list_slots().expect("list"),
            vec![slot("1"), slot("2"), slot("3")]
        );

        assert!(saves.delete_slot(&slot("2")).expect("delete"));
        assert!(!saves.delete_slot(&slot("2")).expect("delete again"));
        assert!(saves.load_snapshot(&slot("2")).expect_err("gone").is_not_found());
    }

    #[tokio::test]
    async fn checksum_mismatch_is_corruption() {
        let saves = PersistenceGateway::open_in_memory(&test_config()).expect("open");
        let pet = PetEngine::new(&timing()).expect("engine");
        saves.save(&pet, &slot("1")).expect("save");

        saves
            .conn
            .lock()
            .execute("UPDATE pet_slots SET checksum = 'deadbeef' WHERE slot = '1'", [])
            .expect("corrupt checksum");

        let err = saves.load_snapshot(&slot("1")).expect_err("corrupt");
        assert!(matches!(err, PetError::CorruptSave { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn garbage_payload_is_corruption() {
        let config = PersistenceConfig {
            checksum_enabled: false,
            ..PersistenceConfig::default()
        };
        let saves = PersistenceGateway::open_in_memory(&config).expect("open");
        saves
            .conn
            .lock()
            .execute(
                "INSERT INTO pet_slots (slot, data, updated_at) VALUES ('1', x'00ff', 'now')",
                [],
            )
            .expect("insert garbage");

        let err = saves.load_snapshot(&slot("1")).expect_err("corrupt");
        assert!(matches!(err, PetError::CorruptSave { .. }));
    }

    #[tokio::test]
    async fn newer_schema_is_corruption() {
        let saves = PersistenceGateway::open_in_memory(&test_config()).expect("open");
        let pet = PetEngine::new(&timing()).expect("engine");
        let mut snap = pet.snapshot();
        snap.version = 99;
        saves.save_snapshot(&slot("1"), &snap).expect("save");

        let err = saves.load_snapshot(&slot("1")).expect_err("too new");
        assert!(matches!(err, PetError::CorruptSave { .. }));
    }

    #[tokio::test]
    async fn dead_pet_loads_dead() {
        let saves = PersistenceGateway::open_in_memory(&test_config()).expect("open");
        let pet = PetEngine::new(&timing()).expect("engine");
        pet.set_attribute(Attribute::Health, 0);
        saves.save(&pet, &slot("1")).expect("save");

        let loaded = saves.load(&slot("1"), &timing()).expect("load");
        assert_eq!(loaded.lifecycle(), LifecycleState::Dead);
        assert!(!loaded.timers().decay);
    }

    #[tokio::test(start_paused = true)]
    async fn unstarted_save_loads_live() {
        let saves = PersistenceGateway::open_in_memory(&test_config()).expect("open");
        let pet = PetEngine::new(&timing()).expect("engine");
        pet.set_attribute(Attribute::Hunger, 90);
        saves.save(&pet, &slot("1")).expect("save");
        assert!(!saves.load_snapshot(&slot("1")).expect("snapshot").started);

        let loaded = saves.load(&slot("1"), &timing()).expect("load");
        assert!(loaded.is_started());
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(loaded.stats().decay_ticks, 1);
        assert_eq!(loaded.health(), 95);
    }

    #[tokio::test]
    async fn file_based_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("pets.db");
        let pet = PetEngine::new(&timing()).expect("engine");
        pet.set_name("Pip");

        {
            let saves = PersistenceGateway::open(&db_path, &test_config()).expect("open");
            saves.save(&pet, &slot("3")).expect("save");
        }

        let saves = PersistenceGateway::open(&db_path, &test_config()).expect("reopen");
        assert_eq!(saves.db_path(), db_path.as_path());
        let loaded = saves.load(&slot("3"), &timing()).expect("load");
        assert_eq!(loaded.name(), "Pip");
    }

    #[tokio::test(start_paused = true)]
    async fn autosave_writes_periodically_and_stops() {
        let saves = Arc::new(PersistenceGateway::open_in_memory(&test_config()).expect("open"));
        let pet = PetEngine::new(&timing()).expect("engine");

        saves
            .start_autosave(&pet, slot("1"), Duration::from_secs(10))
            .expect("start");
        saves
            .start_autosave(&pet, slot("2"), Duration::from_secs(10))
            .expect("restart");
        assert_eq!(saves.autosave_slot(), Some(slot("2")));

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        // spawn_blocking runs on a real thread; give it a moment to land.
        for _ in 0..100 {
            if saves.load_snapshot(&slot("2")).is_ok() {
                break;
            }
            tokio::task::yield_now().await;
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(saves.load_snapshot(&slot("2")).is_ok());
        assert!(saves.load_snapshot(&slot("1")).expect_err("replaced").is_not_found());

        saves.stop_autosave();
        saves.stop_autosave();
        assert!(saves.autosave_slot().is_none());
    }

    #[test]
    fn crc32_basic() {
        // Known test vector: CRC-32 of "123456789" = 0xCBF43926
        let crc = crc32_compute(b"123456789");
        assert_eq!(crc, 0xCBF4_3926);
    }
}
