use salvo::prelude::*;

use crate::web::handlers::{
    authors::{create_author, delete_author, get_author, list_authors, update_author},
    books::{create_book, delete_book, get_book, list_books, update_book},
    health::{get_status, health_check},
};

pub fn create_router() -> Router {
    Router::new()
        .push(Router::with_path("health").get(health_check))
        .push(Router::with_path("status").get(get_status))
        .push(
            Router::with_path("authors")
                .get(list_authors)
                .post(create_author),
        )
        .push(
            Router::with_path("authors/{id}")
                .get(get_author)
                .put(update_author)
                .delete(delete_author),
        )
        .push(
            Router::with_path("books")
                .get(list_books)
                .post(create_book),
        )
        .push(
            Router::with_path("books/{id}")
                .get(get_book)
                .put(update_book)
                .delete(delete_book),
        )
}
