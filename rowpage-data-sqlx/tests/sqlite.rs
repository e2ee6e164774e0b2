use chrono::{NaiveDate, NaiveDateTime};
use rowpage_data::prelude::*;
use rowpage_data::{ErrorKind, FnBinder, LimitOffset, MapperRegistry, SqlType};
use rowpage_data_sqlx::{SqliteRepository, SqlxExecutor};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
    active: bool,
    created_at: NaiveDateTime,
}

impl Entity for User {
    fn from_row(row: &dyn Row) -> Result<Self, DataError> {
        Ok(User {
            id: row.require_i64("id")?,
            name: row.require_string("name")?,
            email: row.opt_string("email")?,
            active: row.require_bool("active")?,
            created_at: row.require_timestamp("created_at")?,
        })
    }
}

fn ts(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

async fn setup() -> SqliteRepository {
    // One connection: every `sqlite::memory:` connection is its own database.
    let pool: SqlitePool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            email TEXT,
            active BOOLEAN NOT NULL,
            created_at DATETIME NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    let repo = GenericRepository::new(SqlxExecutor::new(pool), LimitOffset)
        .with_mappers(MapperRegistry::builder().register::<User>().build());

    let seed = [
        ("dave", Some("dave@example.com"), true),
        ("alice", Some("alice@example.com"), true),
        ("carol", None, false),
        ("bob", Some("bob@example.com"), true),
        ("erin", None, true),
    ];
    let binder = FnBinder::new(seed.len(), |i| {
        let (name, email, active) = seed[i];
        Ok(vec![
            SqlValue::from(name),
            SqlValue::from(email),
            SqlValue::from(active),
            SqlValue::from(ts(i as u32 + 1)),
        ])
    });
    let inserted = repo
        .execute_batch(
            "INSERT INTO users (name, email, active, created_at) VALUES (?, ?, ?, ?)",
            &binder,
        )
        .await;
    assert_eq!(inserted.into_result().unwrap(), 5);
    repo
}

#[tokio::test]
async fn find_all_decodes_every_column_type() {
    let repo = setup().await;
    let users = repo
        .find_all::<User>("SELECT * FROM users ORDER BY id", &[])
        .await
        .into_result()
        .unwrap();
    assert_eq!(users.len(), 5);
    assert_eq!(
        users[0],
        User {
            id: 1,
            name: "dave".into(),
            email: Some("dave@example.com".into()),
            active: true,
            created_at: ts(1),
        }
    );
    assert_eq!(users[2].email, None);
    assert!(!users[2].active);
}

#[tokio::test]
async fn paged_query_returns_requested_slice() {
    let repo = setup().await;
    let pageable = Pageable::sorted(1, 2, Sort::by([Order::asc("name")])).unwrap();
    let page = repo
        .find_all_paged::<User>("SELECT * FROM users", &[], &pageable)
        .await
        .to_page_counted(pageable.clone(), || {
            repo.count("SELECT COUNT(*) FROM users", &[])
        })
        .await
        .into_result()
        .unwrap();

    let names: Vec<_> = page.content().iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["carol", "dave"]);
    assert_eq!(page.total_elements(), 5);
    assert_eq!(page.total_pages(), 3);
    assert!(page.has_next());
}

#[tokio::test]
async fn last_page_may_be_short() {
    let repo = setup().await;
    let pageable = Pageable::sorted(2, 2, Sort::by([Order::desc("id")])).unwrap();
    let users = repo
        .find_all_paged::<User>("SELECT * FROM users", &[], &pageable)
        .await
        .into_result()
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, 1);
}

#[tokio::test]
async fn column_in_query() {
    let repo = setup().await;
    let users = repo
        .find_all_in::<User, _>(
            "SELECT * FROM users WHERE id IN (:ids) ORDER BY id",
            "ids",
            [2i64, 4, 99],
        )
        .await
        .into_result()
        .unwrap();
    let ids: Vec<_> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, [2, 4]);
}

#[tokio::test]
async fn named_params_and_scalars() {
    let repo = setup().await;
    let params = NamedParams::new()
        .bind("active", true)
        .bind_list("names", ["alice", "bob", "carol"]);
    let count = repo
        .execute_scalar::<i64>(
            "SELECT COUNT(*) FROM users WHERE active = :active AND name IN (:names)",
            &params,
        )
        .await;
    assert_eq!(count.into_result().unwrap(), 2);

    let email = repo
        .execute_scalar::<Option<String>>(
            "SELECT email FROM users WHERE name = :name",
            &NamedParams::new().bind("name", "carol"),
        )
        .await;
    assert_eq!(email.into_result().unwrap(), None);

    let missing = repo
        .execute_scalar::<Option<i64>>(
            "SELECT id FROM users WHERE name = :name",
            &NamedParams::new().bind("name", "zed"),
        )
        .await;
    assert_eq!(missing.into_result().unwrap(), None);
}

#[tokio::test]
async fn scalar_requires_single_row_and_column() {
    let repo = setup().await;
    let many_rows = repo
        .execute_scalar::<i64>("SELECT id FROM users", &NamedParams::new())
        .await;
    assert!(matches!(
        many_rows.cause(),
        Some(DataError::IncorrectResultSize { expected: 1, actual: 5 })
    ));

    let many_columns = repo
        .execute_scalar::<i64>(
            "SELECT id, name FROM users WHERE id = :id",
            &NamedParams::new().bind("id", 2i64),
        )
        .await;
    assert!(matches!(
        many_columns.cause(),
        Some(DataError::IncorrectColumnCount { expected: 1, actual: 2 })
    ));

    let optional = repo
        .query_scalar::<Option<i64>>(
            "SELECT id FROM users WHERE active = ?",
            &[SqlValue::Bool(true)],
        )
        .await;
    assert_eq!(optional.cause().unwrap().kind(), ErrorKind::Execution);

    let single = repo
        .execute_scalar::<i64>(
            "SELECT id FROM users WHERE name = :name",
            &NamedParams::new().bind("name", "bob"),
        )
        .await;
    assert_eq!(single.into_result().unwrap(), 4);
}

#[tokio::test]
async fn update_binds_typed_null() {
    let repo = setup().await;
    let updated = repo
        .execute_update(
            "UPDATE users SET email = ? WHERE active = ?",
            &[SqlValue::Null(SqlType::Text), SqlValue::Bool(true)],
        )
        .await;
    assert_eq!(updated.into_result().unwrap(), 4);

    let remaining = repo
        .count("SELECT COUNT(*) FROM users WHERE email IS NOT NULL", &[])
        .await;
    assert_eq!(remaining.into_result().unwrap(), 0);
}

#[tokio::test]
async fn failed_batch_rolls_back() {
    let repo = setup().await;
    let rows = vec![
        vec![
            SqlValue::from("frank"),
            SqlValue::from(None::<String>),
            SqlValue::from(true),
            SqlValue::from(ts(9)),
        ],
        vec![
            SqlValue::from("alice"),
            SqlValue::from(None::<String>),
            SqlValue::from(true),
            SqlValue::from(ts(9)),
        ],
    ];
    let result = repo
        .execute_batch(
            "INSERT INTO users (name, email, active, created_at) VALUES (?, ?, ?, ?)",
            &rows,
        )
        .await;
    assert_eq!(result.cause().unwrap().kind(), ErrorKind::Execution);

    let frank = repo
        .count("SELECT COUNT(*) FROM users WHERE name = 'frank'", &[])
        .await;
    assert_eq!(frank.into_result().unwrap(), 0);
}

#[tokio::test]
async fn prefixed_columns_and_missing_columns() {
    let repo = setup().await;
    let mapper = |row: &dyn Row| row.columns_starting_with("created");
    let found = repo
        .query_one(
            "SELECT id, created_at AS created_on, name AS created_by FROM users WHERE id = ?",
            &[SqlValue::Int(3)],
            &mapper,
        )
        .await
        .into_result()
        .unwrap()
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found["created_by"], SqlValue::Text("carol".into()));

    let missing = repo
        .query_all(
            "SELECT id FROM users",
            &[],
            &|row: &dyn Row| row.require_string("nickname"),
        )
        .await;
    assert!(matches!(missing.cause(), Some(DataError::ColumnNotFound(c)) if c == "nickname"));
}

#[tokio::test]
async fn malformed_sql_is_an_error_envelope() {
    let repo = setup().await;
    let result = repo.find_all::<User>("SELEC * FROM users", &[]).await;
    assert!(result.is_error());
    assert_eq!(result.cause().unwrap().kind(), ErrorKind::Execution);

    let result = repo
        .query_all_paged(
            "SELECT * FROM users",
            &[],
            &Pageable::sorted(0, 2, Sort::by([Order::asc("name; DROP TABLE users")])).unwrap(),
            &|row: &dyn Row| row.require_i64("id"),
        )
        .await;
    assert_eq!(result.cause().unwrap().kind(), ErrorKind::Contract);
}
