use crate::config::{DatabaseConfig, DbType as ConfigDbType};
use crate::db::{AuthorStore, BookStore, DatabaseError};
use std::sync::Arc;

#[cfg(feature = "postgres")]
use crate::db::postgres::{PostgresAuthorStore, PostgresBookStore};
#[cfg(feature = "postgres")]
use diesel::pg::PgConnection;
#[cfg(feature = "postgres")]
use diesel::r2d2::{self, ConnectionManager};

#[cfg(feature = "postgres")]
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[cfg(feature = "sqlite")]
use crate::db::sqlite::{SqliteAuthorStore, SqliteBookStore};
#[cfg(feature = "sqlite")]
use diesel::Connection;
#[cfg(feature = "sqlite")]
use diesel::sqlite::SqliteConnection;

#[cfg(any(feature = "postgres", feature = "sqlite"))]
use diesel::RunQueryDsl;

#[derive(Clone)]
pub struct DatabaseManager {
    #[cfg(feature = "postgres")]
    postgres_pool: Option<Pool>,
    #[cfg(feature = "sqlite")]
    sqlite_path: Option<String>,
    author_store: Arc<dyn AuthorStore>,
    book_store: Arc<dyn BookStore>,
    db_type: DbType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbType {
    Postgres,
    Sqlite,
}

impl From<ConfigDbType> for DbType {
    fn from(value: ConfigDbType) -> Self {
        match value {
            ConfigDbType::Postgres => DbType::Postgres,
            ConfigDbType::Sqlite => DbType::Sqlite,
        }
    }
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let db_type = DbType::from(config.db_type());

        match db_type {
            #[cfg(feature = "postgres")]
            DbType::Postgres => {
                let manager =
                    ConnectionManager::<PgConnection>::new(config.connection_string());

                let pool = r2d2::Pool::builder()
                    .max_size(config.max_connections().unwrap_or(10))
                    .min_idle(Some(config.min_connections().unwrap_or(1)))
                    .build(manager)
                    .map_err(|e| DatabaseError::Connection(e.to_string()))?;

                let author_store = Arc::new(PostgresAuthorStore::new(pool.clone()));
                let book_store = Arc::new(PostgresBookStore::new(pool.clone()));

                Ok(Self {
                    postgres_pool: Some(pool),
                    #[cfg(feature = "sqlite")]
                    sqlite_path: None,
                    author_store,
                    book_store,
                    db_type,
                })
            }
            #[cfg(feature = "sqlite")]
            DbType::Sqlite => {
                let path = config.sqlite_path().ok_or_else(|| {
                    DatabaseError::Connection("missing sqlite database path".to_string())
                })?;
                let path_arc = Arc::new(path.clone());

                let author_store = Arc::new(SqliteAuthorStore::new(path_arc.clone()));
                let book_store = Arc::new(SqliteBookStore::new(path_arc));

                Ok(Self {
                    #[cfg(feature = "postgres")]
                    postgres_pool: None,
                    sqlite_path: Some(path),
                    author_store,
                    book_store,
                    db_type,
                })
            }
            #[cfg(not(feature = "postgres"))]
            DbType::Postgres => Err(DatabaseError::Connection(
                "PostgreSQL support is not compiled in".to_string(),
            )),
            #[cfg(not(feature = "sqlite"))]
            DbType::Sqlite => Err(DatabaseError::Connection(
                "SQLite support is not compiled in".to_string(),
            )),
        }
    }

    /// Creates the two tables if they do not exist yet. Idempotent; this is
    /// schema bootstrap, not a migration framework.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        match self.db_type {
            #[cfg(feature = "postgres")]
            DbType::Postgres => {
                let pool = self.postgres_pool.as_ref().ok_or_else(|| {
                    DatabaseError::Schema("postgres pool not initialized".to_string())
                })?;
                Self::ensure_schema_postgres(pool).await
            }
            #[cfg(feature = "sqlite")]
            DbType::Sqlite => {
                let path = self.sqlite_path.as_ref().ok_or_else(|| {
                    DatabaseError::Schema("sqlite path not initialized".to_string())
                })?;
                Self::ensure_schema_sqlite(path).await
            }
            #[cfg(not(feature = "postgres"))]
            DbType::Postgres => Err(DatabaseError::Schema(
                "PostgreSQL support is not compiled in".to_string(),
            )),
            #[cfg(not(feature = "sqlite"))]
            DbType::Sqlite => Err(DatabaseError::Schema(
                "SQLite support is not compiled in".to_string(),
            )),
        }
    }

    #[cfg(feature = "postgres")]
    async fn ensure_schema_postgres(pool: &Pool) -> Result<(), DatabaseError> {
        let pool = pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::Connection(e.to_string()))?;

            let statements = [
                r#"
                CREATE TABLE IF NOT EXISTS authors (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS books (
                    id BIGSERIAL PRIMARY KEY,
                    title TEXT NOT NULL,
                    author_id BIGINT NOT NULL REFERENCES authors(id) ON DELETE CASCADE
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_books_author_id ON books(author_id)",
            ];

            for statement in statements {
                diesel::sql_query(statement)
                    .execute(&mut conn)
                    .map_err(|e| DatabaseError::Schema(e.to_string()))?;
            }

            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::Schema(format!("schema task failed: {e}")))?
    }

    #[cfg(feature = "sqlite")]
    async fn ensure_schema_sqlite(path: &str) -> Result<(), DatabaseError> {
        let path = path.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = SqliteConnection::establish(&path)
                .map_err(|e| DatabaseError::Connection(e.to_string()))?;

            let statements = [
                r#"
                CREATE TABLE IF NOT EXISTS authors (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS books (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_books_author_id ON books(author_id)",
            ];

            for statement in statements {
                diesel::sql_query(statement)
                    .execute(&mut conn)
                    .map_err(|e| DatabaseError::Schema(e.to_string()))?;
            }

            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::Schema(format!("schema task failed: {e}")))?
    }

    pub fn author_store(&self) -> Arc<dyn AuthorStore> {
        self.author_store.clone()
    }

    pub fn book_store(&self) -> Arc<dyn BookStore> {
        self.book_store.clone()
    }

    pub fn db_type(&self) -> DbType {
        self.db_type
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use tempfile::NamedTempFile;

    use super::DatabaseManager;
    use crate::config::DatabaseConfig;

    fn sqlite_config(file: &NamedTempFile) -> DatabaseConfig {
        DatabaseConfig {
            url: None,
            conn_string: None,
            filename: Some(file.path().to_string_lossy().to_string()),
            max_connections: Some(1),
            min_connections: Some(1),
        }
    }

    async fn open_manager(file: &NamedTempFile) -> DatabaseManager {
        let manager = DatabaseManager::new(&sqlite_config(file))
            .await
            .expect("db manager");
        manager.ensure_schema().await.expect("schema");
        manager
    }

    #[tokio::test]
    async fn new_author_starts_with_no_books() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let created = manager
            .author_store()
            .create_author("Iris Murdoch")
            .await
            .expect("create author");
        assert!(created.id > 0);

        let fetched = manager
            .author_store()
            .get_author_by_id(created.id)
            .await
            .expect("query author")
            .expect("author exists");
        assert_eq!(fetched.name, "Iris Murdoch");

        let books = manager
            .book_store()
            .list_books_by_author(created.id)
            .await
            .expect("list books");
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn created_book_is_listed_under_its_author() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let author = manager
            .author_store()
            .create_author("Ursula K. Le Guin")
            .await
            .expect("create author");
        let book = manager
            .book_store()
            .create_book("The Dispossessed", author.id)
            .await
            .expect("create book");
        assert_eq!(book.author_id, author.id);

        let books = manager
            .book_store()
            .list_books_by_author(author.id)
            .await
            .expect("list books");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, book.id);
        assert_eq!(books[0].title, "The Dispossessed");
    }

    #[tokio::test]
    async fn book_with_unknown_author_is_rejected() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let result = manager.book_store().create_book("Orphan", 9999).await;
        assert!(result.is_err());

        let count = manager.book_store().count_books().await.expect("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn deleting_author_cascades_to_books() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let author = manager
            .author_store()
            .create_author("Terry Pratchett")
            .await
            .expect("create author");
        let first = manager
            .book_store()
            .create_book("Mort", author.id)
            .await
            .expect("create first book");
        let second = manager
            .book_store()
            .create_book("Small Gods", author.id)
            .await
            .expect("create second book");

        manager
            .author_store()
            .delete_author(author.id)
            .await
            .expect("delete author");

        let gone_author = manager
            .author_store()
            .get_author_by_id(author.id)
            .await
            .expect("query author");
        assert!(gone_author.is_none());

        for id in [first.id, second.id] {
            let gone = manager
                .book_store()
                .get_book_by_id(id)
                .await
                .expect("query book");
            assert!(gone.is_none());
        }

        let count = manager.book_store().count_books().await.expect("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn updating_book_title_keeps_author_reference() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let author = manager
            .author_store()
            .create_author("Italo Calvino")
            .await
            .expect("create author");
        let book = manager
            .book_store()
            .create_book("Invisible Cites", author.id)
            .await
            .expect("create book");

        manager
            .book_store()
            .update_book_title(book.id, "Invisible Cities")
            .await
            .expect("update title");

        let updated = manager
            .book_store()
            .get_book_by_id(book.id)
            .await
            .expect("query book")
            .expect("book exists");
        assert_eq!(updated.title, "Invisible Cities");
        assert_eq!(updated.author_id, author.id);
    }

    #[tokio::test]
    async fn author_rename_persists() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let author = manager
            .author_store()
            .create_author("J. Tolkien")
            .await
            .expect("create author");

        manager
            .author_store()
            .update_author_name(author.id, "J. R. R. Tolkien")
            .await
            .expect("rename author");

        let renamed = manager
            .author_store()
            .get_author_by_id(author.id)
            .await
            .expect("query author")
            .expect("author exists");
        assert_eq!(renamed.name, "J. R. R. Tolkien");
    }

    #[tokio::test]
    async fn deleting_book_leaves_author_intact() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let author = manager
            .author_store()
            .create_author("Octavia Butler")
            .await
            .expect("create author");
        let book = manager
            .book_store()
            .create_book("Kindred", author.id)
            .await
            .expect("create book");

        manager
            .book_store()
            .delete_book(book.id)
            .await
            .expect("delete book");

        let still_there = manager
            .author_store()
            .get_author_by_id(author.id)
            .await
            .expect("query author");
        assert!(still_there.is_some());

        let books = manager
            .book_store()
            .list_books_by_author(author.id)
            .await
            .expect("list books");
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_read_as_absent() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let author = manager
            .author_store()
            .get_author_by_id(42)
            .await
            .expect("query author");
        assert!(author.is_none());

        let book = manager
            .book_store()
            .get_book_by_id(42)
            .await
            .expect("query book");
        assert!(book.is_none());
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let file = NamedTempFile::new().expect("temp sqlite file");
        let manager = open_manager(&file).await;

        let author = manager
            .author_store()
            .create_author("Stanislaw Lem")
            .await
            .expect("create author");
        let book = manager
            .book_store()
            .create_book("Solaris", author.id)
            .await
            .expect("create book");

        let reopened = open_manager(&file).await;

        let persisted = reopened
            .book_store()
            .get_book_by_id(book.id)
            .await
            .expect("query book")
            .expect("book exists after reopen");
        assert_eq!(persisted.title, "Solaris");
        assert_eq!(persisted.author_id, author.id);
    }
}
