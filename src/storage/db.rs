use std::path::Path;

use anyhow::anyhow;
use rusqlite::Connection;

use crate::{
    config::Database,
    storage::{error::StorageError, schema},
};

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open(path)
}

pub fn open(config: &Database) -> Result<rusqlite::Connection, StorageError> {
    let db = if config.in_memory {
        open_in_memory()?
    } else {
        let path = config.path.as_deref().ok_or_else(|| {
            StorageError::Internal(anyhow!("database.path is required unless in_memory is set"))
        })?;
        log::debug!("opening tag database at {}", path.display());
        open_from_file(path)?
    };
    schema::init(&db)?;
    Ok(db)
}
