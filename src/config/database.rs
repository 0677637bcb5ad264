//! Database configuration for the saved-draft store.
//!
//! Handles the `SQLite` connection and creates tables from the entity
//! definitions with `Schema::create_table_from_entity`, so the schema always
//! matches the Rust structs.

use crate::entities::SavedRound;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::{Path, PathBuf};
use tracing::info;

/// Used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/slicewise.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling
/// back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory holding a file-backed `SQLite` database, if the URL names one.
#[must_use]
pub fn database_dir(database_url: &str) -> Option<PathBuf> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Connects to the database named by [`get_database_url`], creating the
/// database directory first when needed.
///
/// # Errors
/// Returns an error if the directory cannot be created or the connection
/// cannot be established.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = database_dir(&database_url) {
        std::fs::create_dir_all(&dir)?;
    }
    info!(%database_url, "Connecting to draft store");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the `saved_rounds` table if it does not exist yet.
///
/// # Errors
/// Returns an error if the schema statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut saved_round_table = schema.create_table_from_entity(SavedRound);
    saved_round_table.if_not_exists();

    db.execute(builder.build(&saved_round_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SavedRoundModel;
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<SavedRoundModel> = SavedRound::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[test]
    fn test_database_dir() {
        assert_eq!(
            database_dir(DEFAULT_DATABASE_URL),
            Some(PathBuf::from("data"))
        );
        assert_eq!(database_dir("sqlite://drafts.sqlite"), None);
        assert_eq!(database_dir("sqlite::memory:"), None);
        assert_eq!(database_dir("postgres://localhost/db"), None);
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
