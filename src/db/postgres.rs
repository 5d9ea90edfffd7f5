use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::db::manager::Pool;
use crate::db::schema::{authors, books};

use super::{
    DatabaseError,
    models::{Author, Book},
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = authors)]
struct DbAuthor {
    id: i64,
    name: String,
}

impl From<DbAuthor> for Author {
    fn from(value: DbAuthor) -> Self {
        Self {
            id: value.id,
            name: value.name,
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
    id: i64,
    title: String,
    author_id: i64,
}

impl From<DbBook> for Book {
    fn from(value: DbBook) -> Self {
        Self {
            id: value.id,
            title: value.title,
            author_id: value.author_id,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = books)]
struct NewBook<'a> {
    title: &'a str,
    author_id: i64,
}

async fn with_connection<T, F>(pool: Pool, operation: F) -> Result<T, DatabaseError>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> Result<T, DatabaseError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        operation(&mut conn)
    })
    .await
    .map_err(|e| DatabaseError::Query(format!("database task failed: {e}")))?
}

pub struct PostgresAuthorStore {
    pool: Pool,
}

impl PostgresAuthorStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl super::AuthorStore for PostgresAuthorStore {
    async fn get_author_by_id(&self, id: i64) -> Result<Option<Author>, DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            let row = authors::table
                .filter(authors::id.eq(id))
                .select(DbAuthor::as_select())
                .first::<DbAuthor>(conn)
                .optional()?;
            Ok(row.map(Author::from))
        })
        .await
    }

    async fn list_authors(&self) -> Result<Vec<Author>, DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            let rows = authors::table
                .order(authors::id.asc())
                .select(DbAuthor::as_select())
                .load::<DbAuthor>(conn)?;
            Ok(rows.into_iter().map(Author::from).collect())
        })
        .await
    }

    async fn create_author(&self, name: &str) -> Result<Author, DatabaseError> {
        let name = name.to_string();
        with_connection(self.pool.clone(), move |conn| {
            let new_author = NewAuthor { name: &name };
            let row = diesel::insert_into(authors::table)
                .values(&new_author)
                .get_result::<DbAuthor>(conn)?;
            Ok(Author::from(row))
        })
        .await
    }

    async fn update_author_name(&self, id: i64, name: &str) -> Result<(), DatabaseError> {
        let name = name.to_string();
        with_connection(self.pool.clone(), move |conn| {
            diesel::update(authors::table.filter(authors::id.eq(id)))
                .set(authors::name.eq(name))
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn delete_author(&self, id: i64) -> Result<(), DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            diesel::delete(authors::table.filter(authors::id.eq(id))).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn count_authors(&self) -> Result<i64, DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            let count = authors::table.count().get_result(conn)?;
            Ok(count)
        })
        .await
    }
}

pub struct PostgresBookStore {
    pool: Pool,
}

impl PostgresBookStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl super::BookStore for PostgresBookStore {
    async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>, DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            let row = books::table
                .filter(books::id.eq(id))
                .select(DbBook::as_select())
                .first::<DbBook>(conn)
                .optional()?;
            Ok(row.map(Book::from))
        })
        .await
    }

    async fn list_books(&self) -> Result<Vec<Book>, DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            let rows = books::table
                .order(books::id.asc())
                .select(DbBook::as_select())
                .load::<DbBook>(conn)?;
            Ok(rows.into_iter().map(Book::from).collect())
        })
        .await
    }

    async fn list_books_by_author(&self, author_id: i64) -> Result<Vec<Book>, DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            let rows = books::table
                .filter(books::author_id.eq(author_id))
                .order(books::id.asc())
                .select(DbBook::as_select())
                .load::<DbBook>(conn)?;
            Ok(rows.into_iter().map(Book::from).collect())
        })
        .await
    }

    async fn create_book(&self, title: &str, author_id: i64) -> Result<Book, DatabaseError> {
        let title = title.to_string();
        with_connection(self.pool.clone(), move |conn| {
            let new_book = NewBook {
                title: &title,
                author_id,
            };
            let row = diesel::insert_into(books::table)
                .values(&new_book)
                .get_result::<DbBook>(conn)?;
            Ok(Book::from(row))
        })
        .await
    }

    async fn update_book_title(&self, id: i64, title: &str) -> Result<(), DatabaseError> {
        let title = title.to_string();
        with_connection(self.pool.clone(), move |conn| {
            diesel::update(books::table.filter(books::id.eq(id)))
                .set(books::title.eq(title))
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn delete_book(&self, id: i64) -> Result<(), DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            diesel::delete(books::table.filter(books::id.eq(id))).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn count_books(&self) -> Result<i64, DatabaseError> {
        with_connection(self.pool.clone(), move |conn| {
            let count = books::table.count().get_result(conn)?;
            Ok(count)
        })
        .await
    }
}
