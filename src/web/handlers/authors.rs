use salvo::prelude::*;
use serde::Deserialize;
use serde_json::json;

use crate::db::{Author, DatabaseError};
use crate::web::web_state;

use super::{render_db_error, render_error};

#[derive(Debug, Deserialize)]
struct AuthorPayload {
    name: String,
}

async fn author_with_books(author: &Author) -> Result<serde_json::Value, DatabaseError> {
    let books = web_state()
        .db_manager
        .book_store()
        .list_books_by_author(author.id)
        .await?;
    let summaries: Vec<_> = books
        .iter()
        .map(|b| json!({ "id": b.id, "title": b.title }))
        .collect();
    Ok(json!({ "id": author.id, "name": author.name, "books": summaries }))
}

#[handler]
pub async fn list_authors(res: &mut Response) {
    let authors = match web_state().db_manager.author_store().list_authors().await {
        Ok(authors) => authors,
        Err(err) => {
            render_db_error(res, &err);
            return;
        }
    };

    let mut payload = Vec::with_capacity(authors.len());
    for author in &authors {
        match author_with_books(author).await {
            Ok(value) => payload.push(value),
            Err(err) => {
                render_db_error(res, &err);
                return;
            }
        }
    }

    res.render(Json(payload));
}

#[handler]
pub async fn create_author(req: &mut Request, res: &mut Response) {
    let payload = match req.parse_json::<AuthorPayload>().await {
        Ok(payload) => payload,
        Err(_) => {
            render_error(res, StatusCode::BAD_REQUEST, "missing name field");
            return;
        }
    };
    if payload.name.is_empty() {
        render_error(res, StatusCode::BAD_REQUEST, "name must not be empty");
        return;
    }

    match web_state()
        .db_manager
        .author_store()
        .create_author(&payload.name)
        .await
    {
        Ok(author) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(author));
        }
        Err(err) => render_db_error(res, &err),
    }
}

#[handler]
pub async fn get_author(req: &mut Request, res: &mut Response) {
    let id = match req.param::<i64>("id") {
        Some(v) if v > 0 => v,
        _ => {
            render_error(res, StatusCode::BAD_REQUEST, "invalid author id");
            return;
        }
    };

    match web_state()
        .db_manager
        .author_store()
        .get_author_by_id(id)
        .await
    {
        Ok(Some(author)) => match author_with_books(&author).await {
            Ok(value) => res.render(Json(value)),
            Err(err) => render_db_error(res, &err),
        },
        Ok(None) => render_error(res, StatusCode::NOT_FOUND, "author not found"),
        Err(err) => render_db_error(res, &err),
    }
}

#[handler]
pub async fn update_author(req: &mut Request, res: &mut Response) {
    let id = match req.param::<i64>("id") {
        Some(v) if v > 0 => v,
        _ => {
            render_error(res, StatusCode::BAD_REQUEST, "invalid author id");
            return;
        }
    };
    let payload = match req.parse_json::<AuthorPayload>().await {
        Ok(payload) => payload,
        Err(_) => {
            render_error(res, StatusCode::BAD_REQUEST, "missing name field");
            return;
        }
    };
    if payload.name.is_empty() {
        render_error(res, StatusCode::BAD_REQUEST, "name must not be empty");
        return;
    }

    let author_store = web_state().db_manager.author_store();

    match author_store.get_author_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            render_error(res, StatusCode::NOT_FOUND, "author not found");
            return;
        }
        Err(err) => {
            render_db_error(res, &err);
            return;
        }
    }

    match author_store.update_author_name(id, &payload.name).await {
        Ok(()) => res.render(Json(json!({ "id": id, "name": payload.name }))),
        Err(err) => render_db_error(res, &err),
    }
}

#[handler]
pub async fn delete_author(req: &mut Request, res: &mut Response) {
    let id = match req.param::<i64>("id") {
        Some(v) if v > 0 => v,
        _ => {
            render_error(res, StatusCode::BAD_REQUEST, "invalid author id");
            return;
        }
    };

    let author_store = web_state().db_manager.author_store();

    match author_store.get_author_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            render_error(res, StatusCode::NOT_FOUND, "author not found");
            return;
        }
        Err(err) => {
            render_db_error(res, &err);
            return;
        }
    }

    // Dependent books go with the author via the store's cascade constraint.
    match author_store.delete_author(id).await {
        Ok(()) => res.render(Json(json!({ "message": "author deleted" }))),
        Err(err) => render_db_error(res, &err),
    }
}
