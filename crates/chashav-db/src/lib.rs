//! Storage layer for the chashav cycle tracker.
//!
//! Persists entries, kavuahs and the halachic settings using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`: an instance can be moved between threads but needs external
//! synchronization to be shared.
//!
//! # Schema
//!
//! Entries store the absolute day ordinal plus a night/day flag; the derived
//! haflaga is never persisted, it is recalculated on load. Kavuah rows
//! reference their setting entry by id and carry the historical numeric type
//! code (see [`chashav_core::KavuahType`]); settings are one JSON blob.

use std::path::Path;

use rusqlite::{Connection, params};
use thiserror::Error;

use chashav_core::{Entry, EntryList, JewishDate, Kavuah, KavuahType, NightDay, Onah, Settings};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A kavuah cannot be saved before its setting entry has been saved.
    #[error("the kavuah's setting entry has no id; save the entry first")]
    UnsavedSettingEntry,
    /// A stored kavuah row carries a type code this version does not know.
    #[error("kavuah {id}: {source}")]
    UnknownKavuahType {
        id: i64,
        #[source]
        source: chashav_core::CoreError,
    },
    /// The persisted settings blob failed to parse.
    #[error("invalid settings blob: {0}")]
    SettingsParse(#[from] serde_json::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A kavuah row before its setting entry is resolved.
struct KavuahRow {
    id: i64,
    type_code: i64,
    setting_entry_id: i64,
    special_number: i32,
    cancels_onah_beinunis: bool,
    active: bool,
    ignored: bool,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            -- Entries table: one row per recorded onah
            -- date_abs: absolute day ordinal of the Jewish date
            -- is_day_period: 0 = night, 1 = day
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date_abs INTEGER NOT NULL,
                is_day_period INTEGER NOT NULL,
                ignore_for_flagged_dates INTEGER NOT NULL DEFAULT 0,
                ignore_for_kavuah INTEGER NOT NULL DEFAULT 0,
                comments TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date_abs, is_day_period);

            -- Kavuah rows keep the historical numeric type code (1..256)
            CREATE TABLE IF NOT EXISTS kavuahs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kavuah_type INTEGER NOT NULL,
                setting_entry_id INTEGER NOT NULL,
                special_number INTEGER NOT NULL,
                cancels_onah_beinunis INTEGER NOT NULL DEFAULT 1,
                active INTEGER NOT NULL DEFAULT 1,
                ignored INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (setting_entry_id) REFERENCES entries(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Saves an entry, inserting or updating by id. A newly inserted entry
    /// gets its id assigned in place. Returns the id.
    pub fn save_entry(&mut self, entry: &mut Entry) -> Result<i64, DbError> {
        if let Some(id) = entry.id {
            self.conn.execute(
                "
                UPDATE entries
                SET date_abs = ?, is_day_period = ?, ignore_for_flagged_dates = ?,
                    ignore_for_kavuah = ?, comments = ?
                WHERE id = ?
                ",
                params![
                    entry.date().abs(),
                    entry.night_day() == NightDay::Day,
                    entry.ignore_for_flagged_dates,
                    entry.ignore_for_kavuah,
                    entry.comments,
                    id,
                ],
            )?;
            Ok(id)
        } else {
            self.conn.execute(
                "
                INSERT INTO entries
                (date_abs, is_day_period, ignore_for_flagged_dates, ignore_for_kavuah, comments)
                VALUES (?, ?, ?, ?, ?)
                ",
                params![
                    entry.date().abs(),
                    entry.night_day() == NightDay::Day,
                    entry.ignore_for_flagged_dates,
                    entry.ignore_for_kavuah,
                    entry.comments,
                ],
            )?;
            let id = self.conn.last_insert_rowid();
            entry.id = Some(id);
            Ok(id)
        }
    }

    /// Deletes the entry with the given id; kavuahs set by it cascade.
    /// Returns whether a row was removed.
    pub fn delete_entry(&mut self, id: i64) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?", params![id])?;
        Ok(removed > 0)
    }

    /// Loads the full entry list in canonical order, with haflagas
    /// recalculated.
    pub fn load_entries(&self) -> Result<EntryList, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date_abs, is_day_period, ignore_for_flagged_dates, ignore_for_kavuah, comments
            FROM entries
            ORDER BY date_abs ASC, is_day_period ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let date_abs: i32 = row.get(1)?;
            let is_day: bool = row.get(2)?;
            let night_day = if is_day { NightDay::Day } else { NightDay::Night };
            let mut entry = Entry::new(Onah::new(JewishDate::from_abs(date_abs), night_day));
            entry.id = Some(row.get(0)?);
            entry.ignore_for_flagged_dates = row.get(3)?;
            entry.ignore_for_kavuah = row.get(4)?;
            entry.comments = row.get(5)?;
            Ok(entry)
        })?;
        let mut list = EntryList::new();
        for row in rows {
            list.add(row?);
        }
        list.calculate_haflagas();
        Ok(list)
    }

    /// Saves a kavuah, inserting or updating by id. The setting entry must
    /// already be saved.
    pub fn save_kavuah(&mut self, kavuah: &mut Kavuah) -> Result<i64, DbError> {
        let Some(setting_entry_id) = kavuah.setting_entry.id else {
            return Err(DbError::UnsavedSettingEntry);
        };
        if let Some(id) = kavuah.id {
            self.conn.execute(
                "
                UPDATE kavuahs
                SET kavuah_type = ?, setting_entry_id = ?, special_number = ?,
                    cancels_onah_beinunis = ?, active = ?, ignored = ?
                WHERE id = ?
                ",
                params![
                    kavuah.kavuah_type.code(),
                    setting_entry_id,
                    kavuah.special_number,
                    kavuah.cancels_onah_beinunis,
                    kavuah.active,
                    kavuah.ignored,
                    id,
                ],
            )?;
            Ok(id)
        } else {
            self.conn.execute(
                "
                INSERT INTO kavuahs
                (kavuah_type, setting_entry_id, special_number, cancels_onah_beinunis, active, ignored)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
                params![
                    kavuah.kavuah_type.code(),
                    setting_entry_id,
                    kavuah.special_number,
                    kavuah.cancels_onah_beinunis,
                    kavuah.active,
                    kavuah.ignored,
                ],
            )?;
            let id = self.conn.last_insert_rowid();
            kavuah.id = Some(id);
            Ok(id)
        }
    }

    /// Deletes the kavuah with the given id. Returns whether a row was
    /// removed.
    pub fn delete_kavuah(&mut self, id: i64) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM kavuahs WHERE id = ?", params![id])?;
        Ok(removed > 0)
    }

    /// Loads all kavuahs, resolving each setting entry from the given list.
    ///
    /// A row whose setting entry is missing from the list is skipped with a
    /// warning rather than failing the whole load; an unknown type code is an
    /// error.
    pub fn load_kavuahs(&self, entries: &EntryList) -> Result<Vec<Kavuah>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, kavuah_type, setting_entry_id, special_number,
                   cancels_onah_beinunis, active, ignored
            FROM kavuahs
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(KavuahRow {
                id: row.get(0)?,
                type_code: row.get(1)?,
                setting_entry_id: row.get(2)?,
                special_number: row.get(3)?,
                cancels_onah_beinunis: row.get(4)?,
                active: row.get(5)?,
                ignored: row.get(6)?,
            })
        })?;

        let mut kavuahs = Vec::new();
        for row in rows {
            let row = row?;
            let kavuah_type = KavuahType::from_code(row.type_code)
                .map_err(|source| DbError::UnknownKavuahType { id: row.id, source })?;
            let Some(setting_entry) = entries
                .iter()
                .find(|e| e.id == Some(row.setting_entry_id))
                .cloned()
            else {
                tracing::warn!(
                    kavuah_id = row.id,
                    setting_entry_id = row.setting_entry_id,
                    "kavuah references a missing setting entry; skipping"
                );
                continue;
            };
            kavuahs.push(Kavuah {
                kavuah_type,
                setting_entry,
                special_number: row.special_number,
                cancels_onah_beinunis: row.cancels_onah_beinunis,
                active: row.active,
                ignored: row.ignored,
                id: Some(row.id),
            });
        }
        Ok(kavuahs)
    }

    /// Loads the settings, falling back to defaults when none were saved.
    pub fn load_settings(&self) -> Result<Settings, DbError> {
        let blob: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = 'settings'",
                [],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        match blob {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Settings::default()),
        }
    }

    /// Persists the settings as one JSON blob.
    pub fn save_settings(&mut self, settings: &Settings) -> Result<(), DbError> {
        let blob = serde_json::to_string(settings)?;
        self.conn.execute(
            "
            INSERT INTO settings (key, value) VALUES ('settings', ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            ",
            params![blob],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_abs(abs: i32, night_day: NightDay) -> Entry {
        Entry::new(Onah::new(JewishDate::from_abs(abs), night_day))
    }

    #[test]
    fn entry_round_trip_assigns_id_and_recalculates_haflagas() {
        let mut db = Database::open_in_memory().unwrap();
        let mut first = entry_abs(737_000, NightDay::Night);
        let mut second = entry_abs(737_030, NightDay::Day);
        second.comments = "traveling".into();
        db.save_entry(&mut first).unwrap();
        db.save_entry(&mut second).unwrap();
        assert!(first.has_id());

        let list = db.load_entries().unwrap();
        assert_eq!(list.len(), 2);
        let real = list.real_entry_list();
        assert_eq!(real[0].haflaga, None);
        assert_eq!(real[1].haflaga, Some(30));
        assert_eq!(real[1].comments, "traveling");
    }

    #[test]
    fn entries_load_in_canonical_order() {
        let mut db = Database::open_in_memory().unwrap();
        // Saved out of order; night must come back before day.
        db.save_entry(&mut entry_abs(737_010, NightDay::Day)).unwrap();
        db.save_entry(&mut entry_abs(737_000, NightDay::Day)).unwrap();
        db.save_entry(&mut entry_abs(737_000, NightDay::Night)).unwrap();

        let list = db.load_entries().unwrap();
        let keys: Vec<_> = list
            .iter()
            .map(|e| (e.date().abs(), e.night_day()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (737_000, NightDay::Night),
                (737_000, NightDay::Day),
                (737_010, NightDay::Day),
            ]
        );
    }

    #[test]
    fn entry_update_by_id() {
        let mut db = Database::open_in_memory().unwrap();
        let mut entry = entry_abs(737_000, NightDay::Night);
        db.save_entry(&mut entry).unwrap();
        entry.ignore_for_kavuah = true;
        entry.comments = "amended".into();
        db.save_entry(&mut entry).unwrap();

        let list = db.load_entries().unwrap();
        assert_eq!(list.len(), 1);
        let loaded = list.get(0).unwrap();
        assert!(loaded.ignore_for_kavuah);
        assert_eq!(loaded.comments, "amended");
    }

    #[test]
    fn delete_entry_reports_and_cascades() {
        let mut db = Database::open_in_memory().unwrap();
        let mut entry = entry_abs(737_000, NightDay::Night);
        let id = db.save_entry(&mut entry).unwrap();
        let mut kavuah = Kavuah::new(KavuahType::Haflagah, entry, 30).unwrap();
        db.save_kavuah(&mut kavuah).unwrap();

        assert!(db.delete_entry(id).unwrap());
        assert!(!db.delete_entry(id).unwrap());
        let list = db.load_entries().unwrap();
        assert!(db.load_kavuahs(&list).unwrap().is_empty());
    }

    #[test]
    fn kavuah_round_trip_preserves_the_row() {
        let mut db = Database::open_in_memory().unwrap();
        let mut entry = entry_abs(737_000, NightDay::Day);
        db.save_entry(&mut entry).unwrap();

        let mut kavuah = Kavuah::new(KavuahType::DilugDayOfMonth, entry, -3).unwrap();
        kavuah.cancels_onah_beinunis = false;
        kavuah.active = false;
        kavuah.ignored = true;
        db.save_kavuah(&mut kavuah).unwrap();

        let list = db.load_entries().unwrap();
        let loaded = db.load_kavuahs(&list).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].kavuah_type, KavuahType::DilugDayOfMonth);
        assert_eq!(loaded[0].special_number, -3);
        assert!(!loaded[0].cancels_onah_beinunis);
        assert!(!loaded[0].active);
        assert!(loaded[0].ignored);
        assert_eq!(loaded[0].id, kavuah.id);
        assert_eq!(loaded[0].setting_entry.id, kavuah.setting_entry.id);
    }

    #[test]
    fn kavuah_requires_saved_setting_entry() {
        let mut db = Database::open_in_memory().unwrap();
        let unsaved = entry_abs(737_000, NightDay::Night);
        let mut kavuah = Kavuah::new(KavuahType::Haflagah, unsaved, 30).unwrap();
        assert!(matches!(
            db.save_kavuah(&mut kavuah),
            Err(DbError::UnsavedSettingEntry)
        ));
    }

    #[test]
    fn settings_round_trip_and_default() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_settings().unwrap(), Settings::default());

        let settings = Settings {
            keep_thirty_one: false,
            number_months_ahead_to_warn: 6,
            ..Settings::default()
        };
        db.save_settings(&settings).unwrap();
        assert_eq!(db.load_settings().unwrap(), settings);

        // Saving again overwrites in place.
        db.save_settings(&Settings::default()).unwrap();
        assert_eq!(db.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn init_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db.init().unwrap();
    }
}
