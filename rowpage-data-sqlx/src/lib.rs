//! # rowpage-data-sqlx: SQLx backend for rowpage-data
//!
//! This crate provides the [SQLx](https://github.com/launchbadge/sqlx)-specific
//! [`Executor`](rowpage_data::Executor) for rowpage's
//! [`GenericRepository`](rowpage_data::GenericRepository), a row adapter that
//! decodes driver rows into [`SqlValue`](rowpage_data::SqlValue)s, and error
//! bridging.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxExecutor`] | Executor holding an `sqlx::Pool<DB>`; batches run in one transaction |
//! | [`SqlxRow`] | Exposes a driver row through [`rowpage_data::Row`] |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Feature flags
//!
//! | Feature    | Driver | Placeholders |
//! |------------|--------|--------------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` | `?` |
//! | `postgres` | PostgreSQL via `sqlx/postgres` | `$1` |
//! | `mysql`    | MySQL / MariaDB via `sqlx/mysql` | `?` |
//!
//! # Quick start
//!
//! ```ignore
//! use rowpage_data::{GenericRepository, LimitOffset};
//! use rowpage_data_sqlx::SqlxExecutor;
//!
//! let pool = SqlitePool::connect("sqlite::memory:").await?;
//! let repo = GenericRepository::new(SqlxExecutor::new(pool), LimitOffset);
//!
//! let users = repo
//!     .query_all_paged("SELECT * FROM users", &[], &pageable, &mapper)
//!     .await;
//! ```

pub mod error;
pub mod executor;
pub mod row;

pub use error::{SqlxErrorExt, SqlxResult};
pub use executor::SqlxExecutor;
pub use row::SqlxRow;

/// Repository over an SQLite pool.
#[cfg(feature = "sqlite")]
pub type SqliteRepository = rowpage_data::GenericRepository<SqlxExecutor<sqlx::Sqlite>>;

/// Repository over a PostgreSQL pool.
#[cfg(feature = "postgres")]
pub type PgRepository = rowpage_data::GenericRepository<SqlxExecutor<sqlx::Postgres>>;

/// Repository over a MySQL / MariaDB pool.
#[cfg(feature = "mysql")]
pub type MySqlRepository = rowpage_data::GenericRepository<SqlxExecutor<sqlx::MySql>>;

/// Re-exports of the most commonly used types from both `rowpage-data` and this crate.
pub mod prelude {
    pub use crate::{SqlxErrorExt, SqlxExecutor, SqlxRow};
    pub use rowpage_data::prelude::*;
}
