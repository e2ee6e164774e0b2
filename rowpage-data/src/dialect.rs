//! Per-dialect pagination clauses.
//!
//! A [`PaginationStrategy`] turns a [`Pageable`] into the SQL that wraps or
//! follows a caller's base query. The repository composes the base SQL and
//! only ever calls [`PaginationStrategy::paginate`]; adding an engine means
//! adding a strategy, never touching the repository.

use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::ident::{check_identifier, quote_identifier};
use crate::page::{Pageable, Sort};

pub trait PaginationStrategy: Send + Sync {
    /// SQL placed before the base query. Empty for engines that paginate with
    /// a trailing clause only.
    fn prefix(&self, pageable: &Pageable) -> String;

    /// SQL placed after the base query.
    fn postfix(&self, pageable: &Pageable) -> String;

    /// Wrap `base_sql` with this dialect's pagination.
    ///
    /// Sort columns are validated first; without any sort column the row
    /// order, and therefore page content, is not guaranteed to be stable.
    fn paginate(&self, base_sql: &str, pageable: &Pageable) -> Result<String, DataError> {
        for order in pageable.sort().orders() {
            check_identifier(&order.property, "sort column")?;
        }
        let prefix = self.prefix(pageable);
        let postfix = self.postfix(pageable);
        tracing::debug!(prefix = %prefix, postfix = %postfix, "Pagination clause");
        Ok(format!("{prefix}{base_sql}{postfix}"))
    }
}

fn append_order_by(sql: &mut String, sort: &Sort, quote: bool) {
    if sort.is_empty() {
        return;
    }
    sql.push_str(" ORDER BY ");
    let clauses: Vec<_> = sort
        .orders()
        .iter()
        .map(|order| {
            let column = if quote {
                quote_identifier(&order.property)
            } else {
                order.property.clone()
            };
            format!("{column} {}", order.direction.as_sql())
        })
        .collect();
    sql.push_str(&clauses.join(", "));
}

/// `ORDER BY ... LIMIT n OFFSET m` (PostgreSQL, MariaDB, MySQL, SQLite).
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitOffset;

impl PaginationStrategy for LimitOffset {
    fn prefix(&self, _pageable: &Pageable) -> String {
        String::new()
    }

    fn postfix(&self, pageable: &Pageable) -> String {
        let mut sql = String::new();
        append_order_by(&mut sql, pageable.sort(), false);
        let _ = write!(sql, " LIMIT {} OFFSET {}", pageable.size(), pageable.offset());
        sql
    }
}

/// Default alias of the derived table wrapped by [`RowNumWindow`].
pub const DEFAULT_ROWNUM_ALIAS: &str = "pagination_table";

/// `ROWNUM` window over a wrapped subquery, for engines without
/// `LIMIT`/`OFFSET` (Oracle).
///
/// The base query is wrapped as
/// `SELECT alias.*, ROWNUM FROM ( base ORDER BY "col" dir ) alias WHERE ...`.
/// Sort columns are quoted to keep their case.
#[derive(Debug, Clone)]
pub struct RowNumWindow {
    alias: String,
}

impl Default for RowNumWindow {
    fn default() -> Self {
        Self {
            alias: DEFAULT_ROWNUM_ALIAS.to_string(),
        }
    }
}

impl RowNumWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom alias for the wrapped subquery.
    pub fn with_alias(alias: &str) -> Result<Self, DataError> {
        check_identifier(alias, "table alias")?;
        Ok(Self {
            alias: alias.to_string(),
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl PaginationStrategy for RowNumWindow {
    fn prefix(&self, _pageable: &Pageable) -> String {
        format!("SELECT {}.*, ROWNUM FROM ( ", self.alias)
    }

    fn postfix(&self, pageable: &Pageable) -> String {
        let mut sql = String::new();
        append_order_by(&mut sql, pageable.sort(), true);
        let _ = write!(
            sql,
            " ) {} WHERE ROWNUM >= {} AND ROWNUM < {}",
            self.alias,
            pageable.offset(),
            pageable.end()
        );
        sql
    }
}

/// The closed set of supported pagination dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DialectKind {
    LimitOffset,
    RowNum,
}

impl DialectKind {
    /// Build the strategy for this dialect.
    ///
    /// `rownum_alias` only applies to [`DialectKind::RowNum`].
    pub fn strategy(
        self,
        rownum_alias: Option<&str>,
    ) -> Result<Arc<dyn PaginationStrategy>, DataError> {
        Ok(match self {
            DialectKind::LimitOffset => Arc::new(LimitOffset),
            DialectKind::RowNum => match rownum_alias {
                Some(alias) => Arc::new(RowNumWindow::with_alias(alias)?),
                None => Arc::new(RowNumWindow::new()),
            },
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DialectKind::LimitOffset => "limit-offset",
            DialectKind::RowNum => "rownum",
        }
    }
}

impl FromStr for DialectKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(DataError::contract("no pagination dialect configured")),
            "limit-offset" | "postgres" | "postgresql" | "mariadb" | "mysql" | "sqlite" => {
                Ok(DialectKind::LimitOffset)
            }
            "rownum" | "oracle" => Ok(DialectKind::RowNum),
            other => Err(DataError::contract(format!(
                "unknown pagination dialect: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for DialectKind {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DialectKind> for String {
    fn from(kind: DialectKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for DialectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Order;

    fn users_page() -> Pageable {
        Pageable::sorted(2, 10, Sort::by([Order::asc("name")])).unwrap()
    }

    #[test]
    fn limit_offset_example() {
        let sql = LimitOffset.paginate("SELECT * FROM users", &users_page()).unwrap();
        assert_eq!(sql, "SELECT * FROM users ORDER BY name ASC LIMIT 10 OFFSET 20");
    }

    #[test]
    fn limit_offset_without_sort() {
        let sql = LimitOffset
            .paginate("SELECT * FROM users", &Pageable::new(0, 5).unwrap())
            .unwrap();
        assert_eq!(sql, "SELECT * FROM users LIMIT 5 OFFSET 0");
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn limit_offset_multiple_columns() {
        let page = Pageable::sorted(
            1,
            3,
            Sort::by([Order::desc("created_at"), Order::asc("id")]),
        )
        .unwrap();
        assert_eq!(
            LimitOffset.postfix(&page),
            " ORDER BY created_at DESC, id ASC LIMIT 3 OFFSET 3"
        );
    }

    #[test]
    fn rownum_example() {
        let sql = RowNumWindow::new()
            .paginate("SELECT * FROM users", &users_page())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT pagination_table.*, ROWNUM FROM ( SELECT * FROM users ORDER BY \"name\" ASC ) pagination_table WHERE ROWNUM >= 20 AND ROWNUM < 30"
        );
    }

    #[test]
    fn rownum_window_bounds() {
        for (page, size) in [(0u64, 1u64), (0, 25), (3, 7), (10, 100)] {
            let pageable = Pageable::new(page, size).unwrap();
            let postfix = RowNumWindow::new().postfix(&pageable);
            assert!(postfix.ends_with(&format!(
                "WHERE ROWNUM >= {} AND ROWNUM < {}",
                page * size,
                (page + 1) * size
            )));
            assert!(!postfix.contains("ORDER BY"));
        }
    }

    #[test]
    fn rownum_custom_alias() {
        let strategy = RowNumWindow::with_alias("w").unwrap();
        let page = Pageable::new(0, 2).unwrap();
        assert_eq!(strategy.prefix(&page), "SELECT w.*, ROWNUM FROM ( ");
        assert!(RowNumWindow::with_alias("w x").is_err());
    }

    #[test]
    fn invalid_sort_column_is_rejected() {
        let page = Pageable::sorted(0, 10, Sort::by([Order::asc("name; DROP TABLE x")])).unwrap();
        let err = LimitOffset.paginate("SELECT 1", &page).unwrap_err();
        assert!(matches!(err, DataError::Contract(_)));
    }

    #[test]
    fn dialect_names() {
        assert_eq!("postgres".parse::<DialectKind>().unwrap(), DialectKind::LimitOffset);
        assert_eq!("MariaDB".parse::<DialectKind>().unwrap(), DialectKind::LimitOffset);
        assert_eq!("oracle".parse::<DialectKind>().unwrap(), DialectKind::RowNum);
        assert!(matches!("".parse::<DialectKind>(), Err(DataError::Contract(_))));
        assert!("db2".parse::<DialectKind>().is_err());
    }

    #[test]
    fn strategy_from_kind() {
        let page = Pageable::new(1, 4).unwrap();
        let strategy = DialectKind::RowNum.strategy(Some("pt")).unwrap();
        assert_eq!(strategy.prefix(&page), "SELECT pt.*, ROWNUM FROM ( ");
        let strategy = DialectKind::LimitOffset.strategy(None).unwrap();
        assert_eq!(strategy.postfix(&page), " LIMIT 4 OFFSET 4");
    }
}
