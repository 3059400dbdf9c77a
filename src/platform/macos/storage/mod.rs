//! Storage for macOS.
//!
//! Persists the directory grant in NSUserDefaults as security-scoped
//! bookmark data.

pub mod bookmarks;
pub mod preferences;

pub use bookmarks::SecurityScopedBookmarks;
pub use preferences::UserDefaultsTokenStore;
