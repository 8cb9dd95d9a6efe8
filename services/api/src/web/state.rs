//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use bookstore_core::ports::TokenService;
use bookstore_core::services::{BookService, UserService};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all
/// handlers.
///
/// The record services own their collection locks, so a single instance of
/// each must be shared by every request - cloning a service would split the
/// serialization discipline it provides.
pub struct AppState {
    pub users: UserService,
    pub books: BookService,
    pub tokens: Arc<dyn TokenService>,
    pub config: Arc<Config>,
}
