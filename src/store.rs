use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::error::{Error, Result};
use crate::model::db::{Entry, NewEntry};

/// Access to the `entries` table. Every method runs exactly one statement.
#[derive(Clone)]
pub struct Store {
    pool: AnyPool,
}

impl Store {
    pub fn new(pool: AnyPool) -> Self {
        Store { pool }
    }

    /// An in-memory SQLite database only lives as long as its connection, so
    /// such a store is pinned to one connection that is never reaped.
    pub async fn connect(db_conn: &str) -> Result<Self> {
        let options = if is_in_memory(db_conn) {
            AnyPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new()
        };

        let pool = options.connect(db_conn).await.map_err(Error::from)?;

        Ok(Store::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(&self.pool).await.map_err(Error::from)
    }

    pub async fn close(&self) {
        self.pool.close().await
    }

    pub async fn list(&self) -> Result<Vec<Entry>> {
        sqlx::query_as::<_, Entry>(
            "SELECT entry_id, title, notes, photo_url FROM entries ORDER BY entry_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)
    }

    pub async fn get(&self, entry_id: i64) -> Result<Option<Entry>> {
        sqlx::query_as::<_, Entry>(
            "SELECT entry_id, title, notes, photo_url FROM entries WHERE entry_id = $1",
        )
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)
    }

    pub async fn insert(&self, entry: &NewEntry) -> Result<Entry> {
        sqlx::query_as::<_, Entry>(
            "INSERT INTO entries (title, notes, photo_url) VALUES ($1, $2, $3) \
             RETURNING entry_id, title, notes, photo_url",
        )
        .bind(entry.title.clone())
        .bind(entry.notes.clone())
        .bind(entry.photo_url.clone())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::from)
    }

    /// Overwrites all three fields. `None` if no entry has that id.
    pub async fn update(&self, entry_id: i64, entry: &NewEntry) -> Result<Option<Entry>> {
        sqlx::query_as::<_, Entry>(
            "UPDATE entries SET title = $1, notes = $2, photo_url = $3 WHERE entry_id = $4 \
             RETURNING entry_id, title, notes, photo_url",
        )
        .bind(entry.title.clone())
        .bind(entry.notes.clone())
        .bind(entry.photo_url.clone())
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)
    }

    pub async fn delete(&self, entry_id: i64) -> Result<Option<Entry>> {
        sqlx::query_as::<_, Entry>(
            "DELETE FROM entries WHERE entry_id = $1 RETURNING entry_id, title, notes, photo_url",
        )
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)
    }
}

pub fn is_in_memory(db_conn: &str) -> bool {
    db_conn.starts_with("sqlite::memory:") || db_conn.contains("mode=memory")
}

#[cfg(test)]
pub async fn memory_store() -> Store {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();
    store
}
