use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::schema_sqlite::{authors, books};

use super::{
    DatabaseError,
    models::{Author, Book},
};

diesel::define_sql_function! {
    fn last_insert_rowid() -> BigInt;
}

// SQLite uses i32 for INTEGER (primary keys), but we want to keep i64 in our API
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = authors)]
struct DbAuthor {
    id: i32,
    name: String,
}

impl DbAuthor {
    fn to_author(&self) -> Author {
        Author {
            id: self.id as i64,
            name: self.name.clone(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = authors)]
struct NewAuthor<'a> {
    name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
struct DbBook {
    id: i32,
    title: String,
    author_id: i32,
}

impl DbBook {
    fn to_book(&self) -> Book {
        Book {
            id: self.id as i64,
            title: self.title.clone(),
            author_id: self.author_id as i64,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = books)]
struct NewBook<'a> {
    title: &'a str,
    author_id: i32,
}

// SQLite only enforces REFERENCES clauses (and their ON DELETE CASCADE)
// when the pragma is enabled on the connection.
fn establish_connection(path: &str) -> Result<SqliteConnection, DatabaseError> {
    let mut conn = SqliteConnection::establish(path)
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;
    Ok(conn)
}

pub struct SqliteAuthorStore {
    db_path: Arc<String>,
}

impl SqliteAuthorStore {
    pub fn new(db_path: Arc<String>) -> Self {
        Self { db_path }
    }
}

#[async_trait]
impl super::AuthorStore for SqliteAuthorStore {
    async fn get_author_by_id(&self, id: i64) -> Result<Option<Author>, DatabaseError> {
        let id = id as i32;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let row = authors::table
                .filter(authors::id.eq(id))
                .select(DbAuthor::as_select())
                .first::<DbAuthor>(&mut conn)
                .optional()?;
            Ok(row.map(|a| a.to_author()))
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn list_authors(&self) -> Result<Vec<Author>, DatabaseError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let rows = authors::table
                .order(authors::id.asc())
                .select(DbAuthor::as_select())
                .load::<DbAuthor>(&mut conn)?;
            Ok(rows.iter().map(|a| a.to_author()).collect())
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn create_author(&self, name: &str) -> Result<Author, DatabaseError> {
        let name = name.to_string();
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let new_author = NewAuthor { name: &name };
            diesel::insert_into(authors::table)
                .values(&new_author)
                .execute(&mut conn)?;
            let id = diesel::select(last_insert_rowid()).get_result::<i64>(&mut conn)?;
            Ok(Author { id, name })
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn update_author_name(&self, id: i64, name: &str) -> Result<(), DatabaseError> {
        let name = name.to_string();
        let id = id as i32;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            diesel::update(authors::table.filter(authors::id.eq(id)))
                .set(authors::name.eq(name))
                .execute(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn delete_author(&self, id: i64) -> Result<(), DatabaseError> {
        let id = id as i32;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            diesel::delete(authors::table.filter(authors::id.eq(id))).execute(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn count_authors(&self) -> Result<i64, DatabaseError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let count = authors::table.count().get_result(&mut conn)?;
            Ok(count)
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }
}

pub struct SqliteBookStore {
    db_path: Arc<String>,
}

impl SqliteBookStore {
    pub fn new(db_path: Arc<String>) -> Self {
        Self { db_path }
    }
}

#[async_trait]
impl super::BookStore for SqliteBookStore {
    async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>, DatabaseError> {
        let id = id as i32;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let row = books::table
                .filter(books::id.eq(id))
                .select(DbBook::as_select())
                .first::<DbBook>(&mut conn)
                .optional()?;
            Ok(row.map(|b| b.to_book()))
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn list_books(&self) -> Result<Vec<Book>, DatabaseError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let rows = books::table
                .order(books::id.asc())
                .select(DbBook::as_select())
                .load::<DbBook>(&mut conn)?;
            Ok(rows.iter().map(|b| b.to_book()).collect())
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn list_books_by_author(&self, author_id: i64) -> Result<Vec<Book>, DatabaseError> {
        let author_id = author_id as i32;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let rows = books::table
                .filter(books::author_id.eq(author_id))
                .order(books::id.asc())
                .select(DbBook::as_select())
                .load::<DbBook>(&mut conn)?;
            Ok(rows.iter().map(|b| b.to_book()).collect())
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn create_book(&self, title: &str, author_id: i64) -> Result<Book, DatabaseError> {
        let title = title.to_string();
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let new_book = NewBook {
                title: &title,
                author_id: author_id as i32,
            };
            diesel::insert_into(books::table)
                .values(&new_book)
                .execute(&mut conn)?;
            let id = diesel::select(last_insert_rowid()).get_result::<i64>(&mut conn)?;
            Ok(Book {
                id,
                title,
                author_id,
            })
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn update_book_title(&self, id: i64, title: &str) -> Result<(), DatabaseError> {
        let title = title.to_string();
        let id = id as i32;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            diesel::update(books::table.filter(books::id.eq(id)))
                .set(books::title.eq(title))
                .execute(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn delete_book(&self, id: i64) -> Result<(), DatabaseError> {
        let id = id as i32;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            diesel::delete(books::table.filter(books::id.eq(id))).execute(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }

    async fn count_books(&self) -> Result<i64, DatabaseError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&db_path)?;
            let count = books::table.count().get_result(&mut conn)?;
            Ok(count)
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
    }
}
