//! crates/bookstore_core/src/services/books.rs
//!
//! The record service for the books collection: validation, the
//! case-insensitive (title, author) uniqueness rule, the ownership rule for
//! mutation, and filtered, paginated listing.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Book, BookDraft, BookFilter, Page};
use crate::error::{CoreError, CoreResult};
use crate::ports::CollectionStore;

/// Page size bounds applied to every list request.
const MIN_PER_PAGE: usize = 1;
const MAX_PER_PAGE: usize = 50;
pub const DEFAULT_PER_PAGE: usize = 10;

const MAX_TITLE_LEN: usize = 200;
const MAX_AUTHOR_LEN: usize = 100;
const MAX_GENRE_LEN: usize = 50;
const MIN_YEAR: i32 = 1000;

/// CRUD policy over the books collection.
///
/// Like [`super::UserService`], every operation holds the collection lock
/// for its whole load-check-mutate-save cycle; a concurrent create cannot
/// overwrite another's append.
pub struct BookService {
    store: Arc<dyn CollectionStore<Book>>,
    lock: Mutex<()>,
}

impl BookService {
    pub fn new(store: Arc<dyn CollectionStore<Book>>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Lists books matching `filter`, then slices out the requested page.
    ///
    /// Filtering always precedes pagination; the page metadata describes the
    /// filtered set, not the whole collection.
    pub async fn list(
        &self,
        filter: &BookFilter,
        page: usize,
        per_page: usize,
    ) -> CoreResult<Page<Book>> {
        let _guard = self.lock.lock().await;

        let page = page.max(1);
        let per_page = per_page.clamp(MIN_PER_PAGE, MAX_PER_PAGE);

        let books = self.store.load().await?;
        let filtered: Vec<Book> = books.into_iter().filter(|b| matches(b, filter)).collect();

        let total = filtered.len();
        let total_pages = total.div_ceil(per_page);
        // The offset saturates: an absurd page number yields an empty page,
        // not an overflow.
        let items = filtered
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Ok(Page {
            items,
            page,
            per_page,
            total,
            total_pages,
        })
    }

    /// Unpaginated search. At least one filter must be present.
    pub async fn search(&self, filter: &BookFilter) -> CoreResult<Vec<Book>> {
        if filter.is_empty() {
            return Err(CoreError::Validation(vec![
                "At least one search parameter is required (genre, author, title, or year)"
                    .to_string(),
            ]));
        }

        let _guard = self.lock.lock().await;
        let books = self.store.load().await?;
        Ok(books.into_iter().filter(|b| matches(b, filter)).collect())
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Book> {
        let _guard = self.lock.lock().await;
        let books = self.store.load().await?;
        books
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| CoreError::NotFound("Book not found".to_string()))
    }

    /// Creates a book owned by `owner`.
    ///
    /// Validation and the uniqueness check both happen before anything is
    /// written; a rejected candidate leaves the collection untouched.
    pub async fn create(&self, draft: &BookDraft, owner: Uuid) -> CoreResult<Book> {
        let _guard = self.lock.lock().await;

        let candidate = validate(draft)?;
        let mut books = self.store.load().await?;

        if books
            .iter()
            .any(|b| same_title_and_author(b, &candidate.title, &candidate.author))
        {
            return Err(CoreError::Conflict(
                "A book with this title by this author already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4(),
            title: candidate.title,
            author: candidate.author,
            genre: candidate.genre,
            published_year: candidate.published_year,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };

        books.push(book.clone());
        self.store.save(&books).await?;
        Ok(book)
    }

    /// Replaces the book in place, keeping its id, owner and creation time.
    ///
    /// Fails with `NotFound` when the id is unknown and with `Ownership`
    /// when `requester` is not the stored owner - distinct errors, checked
    /// in that order.
    pub async fn update(&self, id: Uuid, draft: &BookDraft, requester: Uuid) -> CoreResult<Book> {
        let _guard = self.lock.lock().await;

        let candidate = validate(draft)?;
        let mut books = self.store.load().await?;

        let idx = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| CoreError::NotFound("Book not found".to_string()))?;

        if books[idx].user_id != requester {
            return Err(CoreError::Ownership(
                "You can only update books that you added".to_string(),
            ));
        }

        // Uniqueness re-check excludes the record being updated.
        if books
            .iter()
            .any(|b| b.id != id && same_title_and_author(b, &candidate.title, &candidate.author))
        {
            return Err(CoreError::Conflict(
                "A book with this title by this author already exists".to_string(),
            ));
        }

        let book = &mut books[idx];
        book.title = candidate.title;
        book.author = candidate.author;
        book.genre = candidate.genre;
        book.published_year = candidate.published_year;
        book.updated_at = Utc::now();

        let updated = book.clone();
        self.store.save(&books).await?;
        Ok(updated)
    }

    /// Removes the book and returns it. Same existence and ownership checks
    /// as [`Self::update`].
    pub async fn delete(&self, id: Uuid, requester: Uuid) -> CoreResult<Book> {
        let _guard = self.lock.lock().await;

        let mut books = self.store.load().await?;
        let idx = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| CoreError::NotFound("Book not found".to_string()))?;

        if books[idx].user_id != requester {
            return Err(CoreError::Ownership(
                "You can only delete books that you added".to_string(),
            ));
        }

        let removed = books.remove(idx);
        self.store.save(&books).await?;
        Ok(removed)
    }

    /// All books created by `user_id`, in insertion order.
    pub async fn owned_by(&self, user_id: Uuid) -> CoreResult<Vec<Book>> {
        let _guard = self.lock.lock().await;
        let books = self.store.load().await?;
        Ok(books.into_iter().filter(|b| b.user_id == user_id).collect())
    }
}

//=========================================================================================
// Filtering and Validation
//=========================================================================================

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// Unicode-aware, like the filter matching: "Café" and "CAFÉ" are the same
// title.
fn same_title_and_author(book: &Book, title: &str, author: &str) -> bool {
    book.title.to_lowercase() == title.to_lowercase()
        && book.author.to_lowercase() == author.to_lowercase()
}

/// Conjunction of all present filters.
fn matches(book: &Book, filter: &BookFilter) -> bool {
    if let Some(title) = &filter.title {
        if !contains_ci(&book.title, title) {
            return false;
        }
    }
    if let Some(author) = &filter.author {
        if !contains_ci(&book.author, author) {
            return false;
        }
    }
    if let Some(genre) = &filter.genre {
        if !contains_ci(&book.genre, genre) {
            return false;
        }
    }
    if let Some(year) = filter.year {
        if book.published_year != year {
            return false;
        }
    }
    true
}

/// A draft that passed validation, with text fields trimmed.
struct ValidBook {
    title: String,
    author: String,
    genre: String,
    published_year: i32,
}

/// Checks every field constraint and reports all violations together.
fn validate(draft: &BookDraft) -> Result<ValidBook, CoreError> {
    let mut errors = Vec::new();

    let title = draft.title.trim();
    if title.is_empty() {
        errors.push("Title is required".to_string());
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(format!("Title must be less than {MAX_TITLE_LEN} characters"));
    }

    let author = draft.author.trim();
    if author.is_empty() {
        errors.push("Author is required".to_string());
    } else if author.chars().count() > MAX_AUTHOR_LEN {
        errors.push(format!(
            "Author name must be less than {MAX_AUTHOR_LEN} characters"
        ));
    }

    let genre = draft.genre.trim();
    if genre.is_empty() {
        errors.push("Genre is required".to_string());
    } else if genre.chars().count() > MAX_GENRE_LEN {
        errors.push(format!("Genre must be less than {MAX_GENRE_LEN} characters"));
    }

    let current_year = Utc::now().year();
    let published_year = match draft.published_year {
        None => {
            errors.push("Published year is required".to_string());
            0
        }
        Some(year) if year < MIN_YEAR || year > current_year => {
            errors.push(format!(
                "Published year must be between {MIN_YEAR} and {current_year}"
            ));
            year
        }
        Some(year) => year,
    };

    if !errors.is_empty() {
        return Err(CoreError::Validation(errors));
    }

    Ok(ValidBook {
        title: title.to_string(),
        author: author.to_string(),
        genre: genre.to_string(),
        published_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MemoryStore;

    fn service() -> BookService {
        BookService::new(Arc::new(MemoryStore::new()))
    }

    fn draft(title: &str, author: &str, genre: &str, year: i32) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            published_year: Some(year),
        }
    }

    #[tokio::test]
    async fn create_trims_fields_and_assigns_owner() {
        let svc = service();
        let owner = Uuid::new_v4();
        let book = svc
            .create(&draft("  Dune ", " Herbert ", " SciFi ", 1965), owner)
            .await
            .unwrap();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.genre, "SciFi");
        assert_eq!(book.user_id, owner);
        assert_eq!(svc.get(book.id).await.unwrap().id, book.id);
    }

    #[tokio::test]
    async fn duplicate_title_author_pair_conflicts_even_across_owners() {
        let svc = service();
        svc.create(&draft("Dune", "Herbert", "SciFi", 1965), Uuid::new_v4())
            .await
            .unwrap();

        let err = svc
            .create(&draft("DUNE", "herbert", "Fantasy", 1970), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn validation_collects_every_violation() {
        let svc = service();
        let bad = BookDraft {
            title: "   ".to_string(),
            author: "a".repeat(101),
            genre: String::new(),
            published_year: Some(999),
        };

        let err = svc.create(&bad, Uuid::new_v4()).await.unwrap_err();
        match err {
            CoreError::Validation(violations) => {
                assert_eq!(violations.len(), 4, "got {violations:?}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        // Nothing was written.
        let page = svc.list(&BookFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn future_year_is_rejected() {
        let svc = service();
        let next_year = Utc::now().year() + 1;
        let err = svc
            .create(&draft("T", "A", "G", next_year), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn update_enforces_existence_then_ownership() {
        let svc = service();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let book = svc
            .create(&draft("Dune", "Herbert", "SciFi", 1965), owner)
            .await
            .unwrap();

        let err = svc
            .update(Uuid::new_v4(), &draft("X", "Y", "Z", 2000), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        let err = svc
            .update(book.id, &draft("X", "Y", "Z", 2000), other)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Ownership(_)));

        let updated = svc
            .update(book.id, &draft("Dune Messiah", "Herbert", "SciFi", 1969), owner)
            .await
            .unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.created_at, book.created_at);
        assert!(updated.updated_at >= book.updated_at);
    }

    #[tokio::test]
    async fn update_uniqueness_check_excludes_the_record_itself() {
        let svc = service();
        let owner = Uuid::new_v4();
        let book = svc
            .create(&draft("Dune", "Herbert", "SciFi", 1965), owner)
            .await
            .unwrap();

        // Re-saving the same title/author over itself is not a conflict.
        svc.update(book.id, &draft("Dune", "Herbert", "Classic", 1965), owner)
            .await
            .unwrap();

        let second = svc
            .create(&draft("Hyperion", "Simmons", "SciFi", 1989), owner)
            .await
            .unwrap();
        let err = svc
            .update(second.id, &draft("Dune", "Herbert", "SciFi", 1989), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record_and_checks_ownership() {
        let svc = service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let book = svc
            .create(&draft("Dune", "Herbert", "SciFi", 1965), owner)
            .await
            .unwrap();

        let err = svc.delete(book.id, stranger).await.unwrap_err();
        assert!(matches!(err, CoreError::Ownership(_)));

        let removed = svc.delete(book.id, owner).await.unwrap();
        assert_eq!(removed.id, book.id);

        let err = svc.get(book.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn filters_are_conjunctive_case_insensitive_substrings() {
        let svc = service();
        let owner = Uuid::new_v4();
        svc.create(&draft("Dune", "Herbert", "SciFi", 1965), owner)
            .await
            .unwrap();
        svc.create(&draft("Hyperion", "Simmons", "SciFi", 1989), owner)
            .await
            .unwrap();

        let filter = BookFilter {
            genre: Some("scifi".to_string()),
            author: Some("HERB".to_string()),
            ..Default::default()
        };
        let found = svc.search(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Dune");

        let filter = BookFilter {
            year: Some(1989),
            ..Default::default()
        };
        let found = svc.search(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Hyperion");
    }

    #[tokio::test]
    async fn search_requires_at_least_one_parameter() {
        let svc = service();
        let err = svc.search(&BookFilter::default()).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn pages_reconstruct_the_filtered_set_in_order() {
        let svc = service();
        let owner = Uuid::new_v4();
        for i in 0..23 {
            svc.create(&draft(&format!("Book {i}"), "Same Author", "G", 2000), owner)
                .await
                .unwrap();
        }

        let filter = BookFilter {
            author: Some("same".to_string()),
            ..Default::default()
        };
        let per_page = 10;
        let first = svc.list(&filter, 1, per_page).await.unwrap();
        assert_eq!(first.total, 23);
        assert_eq!(first.total_pages, 3);

        let mut seen = Vec::new();
        for page in 1..=first.total_pages {
            let p = svc.list(&filter, page, per_page).await.unwrap();
            seen.extend(p.items.into_iter().map(|b| b.title));
        }
        let expected: Vec<String> = (0..23).map(|i| format!("Book {i}")).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn page_and_size_are_clamped() {
        let svc = service();
        let owner = Uuid::new_v4();
        for i in 0..60 {
            svc.create(&draft(&format!("B{i}"), &format!("A{i}"), "G", 2000), owner)
                .await
                .unwrap();
        }

        let page = svc.list(&BookFilter::default(), 0, 500).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 50);
        assert_eq!(page.items.len(), 50);

        let page = svc.list(&BookFilter::default(), 2, 0).await.unwrap();
        assert_eq!(page.per_page, 1);
        assert_eq!(page.items[0].title, "B1");
    }

    #[tokio::test]
    async fn absurd_page_numbers_yield_an_empty_page() {
        let svc = service();
        let owner = Uuid::new_v4();
        for i in 0..3 {
            svc.create(&draft(&format!("B{i}"), &format!("A{i}"), "G", 2000), owner)
                .await
                .unwrap();
        }

        let page = svc
            .list(&BookFilter::default(), usize::MAX, 10)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, usize::MAX);
    }

    #[tokio::test]
    async fn uniqueness_is_case_insensitive_beyond_ascii() {
        let svc = service();
        let owner = Uuid::new_v4();
        svc.create(&draft("Café", "Émile Zola", "Fiction", 1880), owner)
            .await
            .unwrap();

        let err = svc
            .create(&draft("CAFÉ", "ÉMILE ZOLA", "Fiction", 1880), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)), "got {err:?}");

        // The update path uses the same predicate.
        let other = svc
            .create(&draft("Germinal", "Émile Zola", "Fiction", 1885), owner)
            .await
            .unwrap();
        let err = svc
            .update(other.id, &draft("CAFÉ", "émile zola", "Fiction", 1885), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn owned_by_only_returns_the_users_books() {
        let svc = service();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        svc.create(&draft("Dune", "Herbert", "SciFi", 1965), a)
            .await
            .unwrap();
        svc.create(&draft("Hyperion", "Simmons", "SciFi", 1989), b)
            .await
            .unwrap();

        let mine = svc.owned_by(a).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Dune");
    }
}
