pub mod db;
pub mod google;
pub mod password;

pub use db::DbAdapter;
pub use google::GoogleIdentityAdapter;
pub use medilog_core::memory::{InMemoryDatabase, InMemoryKeyValueStore};
pub use password::Argon2Hasher;
