//! services/api/src/adapters/store.rs
//!
//! The flat-file implementation of the `CollectionStore` port. Each instance
//! owns one pretty-printed JSON array file under the data directory and is
//! the only writer of that file.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

use bookstore_core::error::{CoreError, CoreResult};
use bookstore_core::ports::CollectionStore;

/// A JSON-array-on-disk collection of `T`.
pub struct JsonFileCollection<T> {
    name: String,
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// A collection named `name`, backed by `<data_dir>/<name>.json`.
    pub fn new(data_dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: data_dir.join(format!("{name}.json")),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the data directory and an empty `[]` file if either is
    /// missing, so the first `load` always has something to read.
    async fn ensure_initialized(&self) -> CoreResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| self.storage_err("create data directory", e))?;
        }
        if fs::try_exists(&self.path)
            .await
            .map_err(|e| self.storage_err("probe file", e))?
        {
            return Ok(());
        }
        fs::write(&self.path, "[]")
            .await
            .map_err(|e| self.storage_err("initialize file", e))?;
        debug!(collection = %self.name, "collection file initialized");
        Ok(())
    }

    /// Copies the current file bytes to `<backup_dir>/<name>-<timestamp>.json`.
    ///
    /// The timestamp is ISO-8601 with `:` and `.` swapped for `-` to stay
    /// filesystem-safe.
    pub async fn snapshot(&self, backup_dir: &Path) -> CoreResult<PathBuf> {
        self.ensure_initialized().await?;
        fs::create_dir_all(backup_dir)
            .await
            .map_err(|e| self.storage_err("create backup directory", e))?;

        let timestamp = Utc::now().to_rfc3339().replace([':', '.'], "-");
        let dest = backup_dir.join(format!("{}-{timestamp}.json", self.name));
        fs::copy(&self.path, &dest)
            .await
            .map_err(|e| self.storage_err("snapshot file", e))?;
        Ok(dest)
    }

    fn storage_err(&self, action: &str, err: std::io::Error) -> CoreError {
        CoreError::Storage(format!(
            "failed to {action} for collection '{}' at {}: {err}",
            self.name,
            self.path.display()
        ))
    }
}

#[async_trait]
impl<T> CollectionStore<T> for JsonFileCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> CoreResult<Vec<T>> {
        self.ensure_initialized().await?;
        let data = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.storage_err("read file", e))?;

        // Read availability over strictness: content that is not a valid
        // array degrades to an empty collection instead of failing the
        // operation. Write failures are never swallowed like this.
        match serde_json::from_str::<Vec<T>>(&data) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    collection = %self.name,
                    error = %e,
                    "stored content is not a valid collection, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, records: &[T]) -> CoreResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| self.storage_err("create data directory", e))?;
        }

        // The whole collection is encoded in memory before the file is
        // touched, so an encode failure leaves the previous content intact.
        let json = serde_json::to_string_pretty(records).map_err(|e| {
            CoreError::Storage(format!(
                "failed to encode collection '{}': {e}",
                self.name
            ))
        })?;

        fs::write(&self.path, json)
            .await
            .map_err(|e| self.storage_err("write file", e))?;
        debug!(collection = %self.name, records = records.len(), "collection saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_core::domain::Book;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn book(title: &str) -> Book {
        let now = Utc::now();
        Book {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author: "Author".to_string(),
            genre: "Genre".to_string(),
            published_year: 2000,
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn first_load_materializes_an_empty_file() {
        let tmp = TempDir::new().unwrap();
        let store: JsonFileCollection<Book> =
            JsonFileCollection::new(&tmp.path().join("nested"), "books");

        let records = store.load().await.unwrap();
        assert!(records.is_empty());

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "[]");
    }

    #[tokio::test]
    async fn load_after_save_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store: JsonFileCollection<Book> = JsonFileCollection::new(tmp.path(), "books");

        let records = vec![book("Dune"), book("Hyperion")];
        store.save(&records).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, records[0].id);
        assert_eq!(loaded[1].title, "Hyperion");
    }

    #[tokio::test]
    async fn files_are_pretty_printed_with_camel_case_keys() {
        let tmp = TempDir::new().unwrap();
        let store: JsonFileCollection<Book> = JsonFileCollection::new(tmp.path(), "books");
        store.save(&[book("Dune")]).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.contains("\"publishedYear\""));
        assert!(raw.contains("\"userId\""));
    }

    #[tokio::test]
    async fn corrupt_content_degrades_to_an_empty_collection() {
        let tmp = TempDir::new().unwrap();
        let store: JsonFileCollection<Book> = JsonFileCollection::new(tmp.path(), "books");
        std::fs::write(store.path(), "{ not an array").unwrap();

        let records = store.load().await.unwrap();
        assert!(records.is_empty());

        // A non-array but valid JSON value degrades the same way.
        std::fs::write(store.path(), "{\"a\": 1}").unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn snapshot_copies_bytes_under_a_timestamped_name() {
        let tmp = TempDir::new().unwrap();
        let store: JsonFileCollection<Book> = JsonFileCollection::new(tmp.path(), "books");
        store.save(&[book("Dune")]).await.unwrap();

        let backup_dir = tmp.path().join("backups");
        let dest = store.snapshot(&backup_dir).await.unwrap();

        let name = dest.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("books-"), "got {name}");
        assert!(name.ends_with(".json"));
        assert!(!name.contains(':'));

        let original = std::fs::read_to_string(store.path()).unwrap();
        let copied = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(original, copied);
    }

    #[tokio::test]
    async fn unwritable_target_surfaces_a_storage_error() {
        let tmp = TempDir::new().unwrap();
        // Using a regular file where the data directory should be makes
        // create_dir_all fail.
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let store: JsonFileCollection<Book> = JsonFileCollection::new(&blocker, "books");
        let err = store.save(&[book("Dune")]).await.unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)), "got {err:?}");
    }
}
