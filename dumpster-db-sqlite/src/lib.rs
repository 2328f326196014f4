//! SQLite backend for the quote repository.
//!
//! ```rust,no_run
//! use dumpster_core::db::RepositoryRegistry;
//! use dumpster_db_sqlite::SqliteRepositoryFactory;
//!
//! let mut registry = RepositoryRegistry::new();
//! registry.register(Box::new(SqliteRepositoryFactory));
//! ```

pub mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
