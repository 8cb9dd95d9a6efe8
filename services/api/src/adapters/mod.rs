pub mod password;
pub mod store;
pub mod token;

pub use password::Argon2Hasher;
pub use store::JsonFileCollection;
pub use token::JwtTokenService;
