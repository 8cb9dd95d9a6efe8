//! crates/bookstore_core/src/services/mod.rs
//!
//! The record services: one generic CRUD policy applied to the users and
//! books collections, each parameterized by its own uniqueness and ownership
//! rules. All business rules live here; storage and crypto stay behind the
//! ports.

pub mod books;
pub mod users;

pub use books::BookService;
pub use users::UserService;

// Test doubles shared by the service test modules.
#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::error::CoreResult;
    use crate::ports::{CollectionStore, PasswordHasher};

    /// An in-memory stand-in for the flat-file store.
    pub struct MemoryStore<T> {
        records: Mutex<Vec<T>>,
    }

    impl<T> MemoryStore<T> {
        pub fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl<T: Clone + Send + Sync> CollectionStore<T> for MemoryStore<T> {
        async fn load(&self) -> CoreResult<Vec<T>> {
            Ok(self.records.lock().await.clone())
        }

        async fn save(&self, records: &[T]) -> CoreResult<()> {
            *self.records.lock().await = records.to_vec();
            Ok(())
        }
    }

    /// A transparent "hasher" so tests can assert digests without argon2.
    pub struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plaintext: &str) -> CoreResult<String> {
            Ok(format!("hashed:{plaintext}"))
        }

        fn verify(&self, plaintext: &str, digest: &str) -> bool {
            digest == format!("hashed:{plaintext}")
        }
    }
}
