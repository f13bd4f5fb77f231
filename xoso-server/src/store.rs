use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use xoso_db::db::migrate;
use xoso_db::rusqlite::Connection;

/// Shared SQLite handle. Every closure runs on the blocking pool so request
/// tasks never hold the lock across an await point.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn new(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| anyhow!("Kết nối cơ sở dữ liệu bị khóa"))?;
            f(&guard)
        })
        .await?
    }
}
