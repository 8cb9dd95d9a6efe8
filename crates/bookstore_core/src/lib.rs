pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use domain::{Book, BookDraft, BookFilter, Claims, Page, User, UserProfile};
pub use error::{AuthError, CoreError, CoreResult};
pub use ports::{CollectionStore, PasswordHasher, TokenService};
pub use services::{BookService, UserService};
