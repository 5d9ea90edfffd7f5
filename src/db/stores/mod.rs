use async_trait::async_trait;

use super::DatabaseError;
use super::models::{Author, Book};

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn get_author_by_id(&self, id: i64) -> Result<Option<Author>, DatabaseError>;
    async fn list_authors(&self) -> Result<Vec<Author>, DatabaseError>;
    async fn create_author(&self, name: &str) -> Result<Author, DatabaseError>;
    async fn update_author_name(&self, id: i64, name: &str) -> Result<(), DatabaseError>;
    async fn delete_author(&self, id: i64) -> Result<(), DatabaseError>;
    async fn count_authors(&self) -> Result<i64, DatabaseError>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>, DatabaseError>;
    async fn list_books(&self) -> Result<Vec<Book>, DatabaseError>;
    async fn list_books_by_author(&self, author_id: i64) -> Result<Vec<Book>, DatabaseError>;
    async fn create_book(&self, title: &str, author_id: i64) -> Result<Book, DatabaseError>;
    async fn update_book_title(&self, id: i64, title: &str) -> Result<(), DatabaseError>;
    async fn delete_book(&self, id: i64) -> Result<(), DatabaseError>;
    async fn count_books(&self) -> Result<i64, DatabaseError>;
}
