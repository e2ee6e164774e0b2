//! # rowpage-data: driver-independent SQL repository layer
//!
//! Application code hands the [`GenericRepository`] plain SQL, bind values and
//! a [`RowMapper`]; the repository appends the pagination clause of its
//! [`PaginationStrategy`], runs the statement through an [`Executor`] and
//! returns an [`Envelope`] that can be reshaped with `sort_by`, `map_items`
//! and `to_page`.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`GenericRepository`] | Query / update / batch operations over an executor |
//! | [`PaginationStrategy`] | Per-dialect pagination ([`LimitOffset`], [`RowNumWindow`]) |
//! | [`Envelope`] | Pass/fail result with chainable converters |
//! | [`Pageable`], [`Page`] | Page request and page result |
//! | [`Row`], [`RowMapper`], [`Entity`] | Row access and row-to-value mapping |
//! | [`MapperRegistry`] | Type -> mapper table built at startup |
//! | [`SqlSource`] | SQL text lookup by code |
//! | [`DataConfig`] | YAML configuration (dialect, SQL texts) |
//!
//! Backends such as `rowpage-data-sqlx` implement [`Executor`] and [`Row`].

pub mod config;
pub mod convert;
pub mod dialect;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod ident;
pub mod mapper;
pub mod named;
pub mod page;
pub mod query;
pub mod repository;
pub mod row;
pub mod sql_source;
pub mod value;

pub use config::DataConfig;
pub use dialect::{DialectKind, LimitOffset, PaginationStrategy, RowNumWindow};
pub use envelope::Envelope;
pub use error::{DataError, ErrorKind};
pub use executor::{BatchBinder, Executor, FnBinder};
pub use mapper::{Entity, EntityMapper, MapperRegistry, RowMapper};
pub use named::{NamedParams, NamedValue, PlaceholderStyle};
pub use page::{Direction, Order, Page, Pageable, Sort};
pub use repository::GenericRepository;
pub use row::{Row, RowExt, ValueRow};
pub use sql_source::{MapSqlSource, SqlSource};
pub use value::{FromSqlValue, SqlType, SqlValue};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        DataError, Entity, Envelope, GenericRepository, NamedParams, Order, Page, Pageable, Row,
        RowExt, RowMapper, Sort, SqlValue,
    };
}
