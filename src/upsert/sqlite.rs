use crate::model::UpsertError;
use crate::upsert::{ProductRow, Upserter};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Mutex, MutexGuard};

/// Local relational sink: one SQLite file, one table per target name.
pub struct SqliteUpserter {
    conn: Mutex<Connection>,
}

impl SqliteUpserter {
    /// Opens (or creates) the database file.
    pub fn new(db_path: &str) -> Result<Self, UpsertError> {
        Ok(Self::with_connection(Connection::open(db_path)?))
    }

    pub fn in_memory() -> Result<Self, UpsertError> {
        Ok(Self::with_connection(Connection::open_in_memory()?))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // a poisoned lock only means another upsert panicked mid-statement
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates the products table under `table` if it does not exist yet.
    fn ensure_table(conn: &Connection, table: &str) -> Result<(), UpsertError> {
        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                product_id TEXT,
                variant_id TEXT,
                product_title TEXT,
                vendor TEXT,
                price REAL NOT NULL,
                size TEXT,
                color TEXT,
                length TEXT,
                inseam INTEGER,
                available INTEGER NOT NULL,
                image_url TEXT,
                product_url TEXT,
                variant_title TEXT,
                description TEXT,
                primary_category TEXT,
                subcategory TEXT,
                loaded_at TEXT NOT NULL
            );
            "
        ))?;
        Ok(())
    }

    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize, UpsertError> {
        validate_table(table)?;
        let conn = self.lock();
        Self::ensure_table(&conn, table)?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    /// Fetches a stored row by surrogate id.
    pub fn get_row(&self, table: &str, id: &str) -> Result<Option<ProductRow>, UpsertError> {
        validate_table(table)?;
        let conn = self.lock();
        Self::ensure_table(&conn, table)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, product_id, variant_id, product_title, vendor, price, size, color,
                    length, inseam, available, image_url, product_url, variant_title,
                    description, primary_category, subcategory
             FROM {} WHERE id = ?1",
            table
        ))?;
        let mut rows = stmt.query(params![id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(ProductRow {
            id: row.get(0)?,
            product_id: row.get(1)?,
            variant_id: row.get(2)?,
            product_title: row.get(3)?,
            vendor: row.get(4)?,
            price: row.get(5)?,
            size: row.get(6)?,
            color: row.get(7)?,
            length: row.get(8)?,
            inseam: row.get(9)?,
            available: row.get(10)?,
            image_url: row.get(11)?,
            product_url: row.get(12)?,
            variant_title: row.get(13)?,
            description: row.get(14)?,
            primary_category: row.get(15)?,
            subcategory: row.get(16)?,
        }))
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn validate_table(table: &str) -> Result<(), UpsertError> {
    let valid = !table.is_empty()
        && !table.starts_with(|c: char| c.is_ascii_digit())
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(UpsertError::InvalidTable(table.to_string()))
    }
}

#[async_trait::async_trait]
impl Upserter for SqliteUpserter {
    async fn upsert(&self, table: &str, row: &ProductRow) -> Result<(), UpsertError> {
        validate_table(table)?;
        let conn = self.lock();
        Self::ensure_table(&conn, table)?;
        conn.execute(
            &format!(
                "INSERT INTO {} (
                    id, product_id, variant_id, product_title, vendor, price, size, color,
                    length, inseam, available, image_url, product_url, variant_title,
                    description, primary_category, subcategory, loaded_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
                ON CONFLICT(id) DO UPDATE SET
                    product_id = excluded.product_id,
                    variant_id = excluded.variant_id,
                    product_title = excluded.product_title,
                    vendor = excluded.vendor,
                    price = excluded.price,
                    size = excluded.size,
                    color = excluded.color,
                    length = excluded.length,
                    inseam = excluded.inseam,
                    available = excluded.available,
                    image_url = excluded.image_url,
                    product_url = excluded.product_url,
                    variant_title = excluded.variant_title,
                    description = excluded.description,
                    primary_category = excluded.primary_category,
                    subcategory = excluded.subcategory,
                    loaded_at = excluded.loaded_at",
                table
            ),
            params![
                &row.id,
                &row.product_id,
                &row.variant_id,
                &row.product_title,
                &row.vendor,
                &row.price,
                &row.size,
                &row.color,
                &row.length,
                &row.inseam,
                &row.available,
                &row.image_url,
                &row.product_url,
                &row.variant_title,
                &row.description,
                &row.primary_category,
                &row.subcategory,
                &Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
