//! SQLite storage backend for the tip catalogue

use super::traits::{OpenStore, StorageError, StorageResult, TipStore};
use crate::tip::{
    Benefits, Category, ContentRecord, CounterKind, Difficulty, Implementation, TipContent, TipId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

/// Records inserted per transaction by [`SqliteTipStore::import_records`]
pub const IMPORT_BATCH_SIZE: usize = 50;

/// A batch that failed to import
#[derive(Debug, Clone, Serialize)]
pub struct ImportBatchError {
    /// 0-based batch index
    pub batch: usize,
    pub message: String,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<ImportBatchError>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// SQLite-backed tip store
///
/// Tables: `tips` (one row per tip, `position` preserves catalogue order)
/// and `tip_includes` (the ordered "what's included" items).
/// Thread-safe via internal mutex on the connection.
pub struct SqliteTipStore {
    conn: Mutex<Connection>,
}

const SELECT_TIPS: &str = "SELECT id, category, subcategory, difficulty, title, subtitle, description,
        read_time, primary_benefit, secondary_benefit, tertiary_benefit,
        implementation_time, frequency, cost, tags_json, view_count, download_count,
        created_at, updated_at
     FROM tips";

/// Raw `tips` row before enum and date parsing
struct TipRow {
    id: String,
    category: String,
    subcategory: Option<String>,
    difficulty: String,
    title: String,
    subtitle: String,
    description: String,
    read_time: i64,
    benefits: [String; 3],
    implementation: [Option<String>; 3],
    tags_json: String,
    view_count: i64,
    download_count: i64,
    created_at: String,
    updated_at: String,
}

impl SqliteTipStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tips (
                position INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                category TEXT NOT NULL,
                subcategory TEXT,
                difficulty TEXT NOT NULL,
                title TEXT NOT NULL,
                subtitle TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                read_time INTEGER NOT NULL DEFAULT 0,
                primary_benefit TEXT NOT NULL DEFAULT '',
                secondary_benefit TEXT NOT NULL DEFAULT '',
                tertiary_benefit TEXT NOT NULL DEFAULT '',
                implementation_time TEXT,
                frequency TEXT,
                cost TEXT,
                tags_json TEXT NOT NULL DEFAULT '[]',
                view_count INTEGER NOT NULL DEFAULT 0 CHECK (view_count >= 0),
                download_count INTEGER NOT NULL DEFAULT 0 CHECK (download_count >= 0),
                status TEXT NOT NULL DEFAULT 'published',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tips_category ON tips(category);
            CREATE INDEX IF NOT EXISTS idx_tips_status ON tips(status);

            CREATE TABLE IF NOT EXISTS tip_includes (
                tip_id TEXT NOT NULL,
                item TEXT NOT NULL,
                order_index INTEGER NOT NULL,
                PRIMARY KEY (tip_id, order_index),
                FOREIGN KEY (tip_id) REFERENCES tips(id) ON DELETE CASCADE
            );

            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn parse_date(raw: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| StorageError::DateParse(e.to_string()))
    }

    fn row_to_record(row: TipRow, includes: Vec<String>) -> StorageResult<ContentRecord> {
        let invalid = |reason: String| StorageError::InvalidRecord {
            id: row.id.clone(),
            reason,
        };
        let category: Category = row.category.parse().map_err(|e| invalid(format!("{}", e)))?;
        let difficulty: Difficulty =
            row.difficulty.parse().map_err(|e| invalid(format!("{}", e)))?;

        let [primary, secondary, tertiary] = row.benefits;
        let implementation = match row.implementation {
            [None, None, None] => None,
            [time, frequency, cost] => Some(Implementation {
                time: time.unwrap_or_default(),
                frequency: frequency.unwrap_or_default(),
                cost: cost.unwrap_or_default(),
            }),
        };

        let mut record = ContentRecord {
            id: TipId::from_string(row.id),
            category,
            subcategory: row.subcategory,
            difficulty,
            content: TipContent {
                title: row.title,
                subtitle: row.subtitle,
                description: row.description,
                whats_included: includes,
                read_time: row.read_time.max(0) as u32,
                benefits: Benefits {
                    primary,
                    secondary,
                    tertiary,
                },
            },
            tags: serde_json::from_str(&row.tags_json)?,
            implementation,
            view_count: row.view_count.max(0) as u64,
            download_count: row.download_count.max(0) as u64,
            created_at: Self::parse_date(&row.created_at)?,
            updated_at: Self::parse_date(&row.updated_at)?,
        };
        record.normalize_timestamps();
        Ok(record)
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TipRow> {
        Ok(TipRow {
            id: row.get(0)?,
            category: row.get(1)?,
            subcategory: row.get(2)?,
            difficulty: row.get(3)?,
            title: row.get(4)?,
            subtitle: row.get(5)?,
            description: row.get(6)?,
            read_time: row.get(7)?,
            benefits: [row.get(8)?, row.get(9)?, row.get(10)?],
            implementation: [row.get(11)?, row.get(12)?, row.get(13)?],
            tags_json: row.get(14)?,
            view_count: row.get(15)?,
            download_count: row.get(16)?,
            created_at: row.get(17)?,
            updated_at: row.get(18)?,
        })
    }

    fn load_includes(conn: &Connection) -> StorageResult<HashMap<String, Vec<String>>> {
        let mut stmt =
            conn.prepare("SELECT tip_id, item FROM tip_includes ORDER BY tip_id, order_index")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut includes: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let (tip_id, item) = row?;
            includes.entry(tip_id).or_default().push(item);
        }
        Ok(includes)
    }

    fn insert_record(tx: &Transaction<'_>, record: &ContentRecord) -> StorageResult<()> {
        let implementation = record.implementation.as_ref();
        tx.execute(
            r#"
            INSERT INTO tips (id, category, subcategory, difficulty, title, subtitle, description,
                read_time, primary_benefit, secondary_benefit, tertiary_benefit,
                implementation_time, frequency, cost, tags_json, view_count, download_count,
                created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                record.id.as_str(),
                record.category.as_str(),
                record.subcategory,
                record.difficulty.as_str(),
                record.content.title,
                record.content.subtitle,
                record.content.description,
                record.content.read_time,
                record.content.benefits.primary,
                record.content.benefits.secondary,
                record.content.benefits.tertiary,
                implementation.map(|i| i.time.as_str()),
                implementation.map(|i| i.frequency.as_str()),
                implementation.map(|i| i.cost.as_str()),
                serde_json::to_string(&record.tags)?,
                record.view_count as i64,
                record.download_count as i64,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;

        for (index, item) in record.content.whats_included.iter().enumerate() {
            tx.execute(
                "INSERT INTO tip_includes (tip_id, item, order_index) VALUES (?1, ?2, ?3)",
                params![record.id.as_str(), item, index as i64],
            )?;
        }
        Ok(())
    }

    /// Insert records in transactions of [`IMPORT_BATCH_SIZE`].
    ///
    /// A failing batch is rolled back and recorded in the report; later
    /// batches still run.
    pub fn import_records(&self, records: &[ContentRecord]) -> StorageResult<ImportReport> {
        let mut conn = self.conn.lock().unwrap();
        let mut report = ImportReport::default();

        for (batch, chunk) in records.chunks(IMPORT_BATCH_SIZE).enumerate() {
            let tx = conn.transaction()?;
            let outcome = chunk
                .iter()
                .try_for_each(|record| Self::insert_record(&tx, record));

            match outcome {
                Ok(()) => {
                    tx.commit()?;
                    report.imported += chunk.len();
                }
                Err(e) => {
                    warn!(batch, error = %e, "tip import batch failed");
                    // Dropping the transaction rolls it back
                    drop(tx);
                    report.errors.push(ImportBatchError {
                        batch,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            imported = report.imported,
            failed_batches = report.errors.len(),
            "tip import finished"
        );
        Ok(report)
    }

    /// Load a single tip regardless of status
    pub fn load_record(&self, id: &TipId) -> StorageResult<Option<ContentRecord>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_TIPS),
                params![id.as_str()],
                Self::read_row,
            )
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut stmt =
            conn.prepare("SELECT item FROM tip_includes WHERE tip_id = ?1 ORDER BY order_index")?;
        let includes = stmt
            .query_map(params![id.as_str()], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Self::row_to_record(row, includes)?))
    }

    /// Change a tip's publication status (`published`, `draft`, `archived`)
    pub fn set_status(&self, id: &TipId, status: &str) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute(
            "UPDATE tips SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.as_str(), status, Utc::now().to_rfc3339()],
        )?;
        Ok(rows > 0)
    }

    /// Number of tips stored, any status
    pub fn count(&self) -> StorageResult<usize> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM tips", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl OpenStore for SqliteTipStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl TipStore for SqliteTipStore {
    fn load_initial_records(&self) -> StorageResult<Vec<ContentRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut includes = Self::load_includes(&conn)?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE status = 'published' ORDER BY position",
            SELECT_TIPS
        ))?;
        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let items = includes.remove(&row.id).unwrap_or_default();
                Self::row_to_record(row, items)
            })
            .collect()
    }

    fn persist_increment(&self, id: &TipId, kind: CounterKind) -> StorageResult<()> {
        let column = match kind {
            CounterKind::View => "view_count",
            CounterKind::Download => "download_count",
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE tips SET {col} = {col} + 1, updated_at = ?2 WHERE id = ?1",
                col = column
            ),
            params![id.as_str(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
