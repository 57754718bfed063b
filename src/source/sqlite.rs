use crate::db::Db;
use crate::model::Table;
use crate::source::TableSource;
use crate::Result;

/// Reads the table that `pcpi import` stored in the SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    db: Db,
}

impl SqliteSource {
    pub(crate) fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl TableSource for SqliteSource {
    async fn load(&mut self) -> Result<Table> {
        self.db.load_table().await
    }
}
