use salvo::prelude::*;
use serde::Deserialize;
use serde_json::json;

use crate::web::web_state;

use super::{render_db_error, render_error};

#[derive(Debug, Deserialize)]
struct CreateBookPayload {
    title: String,
    author_id: i64,
}

#[derive(Debug, Deserialize)]
struct UpdateBookPayload {
    title: String,
}

#[handler]
pub async fn list_books(res: &mut Response) {
    match web_state().db_manager.book_store().list_books().await {
        Ok(books) => res.render(Json(books)),
        Err(err) => render_db_error(res, &err),
    }
}

#[handler]
pub async fn create_book(req: &mut Request, res: &mut Response) {
    let payload = match req.parse_json::<CreateBookPayload>().await {
        Ok(payload) => payload,
        Err(_) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                "missing title or author_id field",
            );
            return;
        }
    };
    if payload.title.is_empty() {
        render_error(res, StatusCode::BAD_REQUEST, "title must not be empty");
        return;
    }
    if payload.author_id <= 0 {
        render_error(res, StatusCode::BAD_REQUEST, "invalid author id");
        return;
    }

    // An unknown author_id is rejected by the store's foreign-key constraint.
    match web_state()
        .db_manager
        .book_store()
        .create_book(&payload.title, payload.author_id)
        .await
    {
        Ok(book) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(book));
        }
        Err(err) => render_db_error(res, &err),
    }
}

#[handler]
pub async fn get_book(req: &mut Request, res: &mut Response) {
    let id = match req.param::<i64>("id") {
        Some(v) if v > 0 => v,
        _ => {
            render_error(res, StatusCode::BAD_REQUEST, "invalid book id");
            return;
        }
    };

    match web_state().db_manager.book_store().get_book_by_id(id).await {
        Ok(Some(book)) => res.render(Json(book)),
        Ok(None) => render_error(res, StatusCode::NOT_FOUND, "book not found"),
        Err(err) => render_db_error(res, &err),
    }
}

#[handler]
pub async fn update_book(req: &mut Request, res: &mut Response) {
    let id = match req.param::<i64>("id") {
        Some(v) if v > 0 => v,
        _ => {
            render_error(res, StatusCode::BAD_REQUEST, "invalid book id");
            return;
        }
    };
    let payload = match req.parse_json::<UpdateBookPayload>().await {
        Ok(payload) => payload,
        Err(_) => {
            render_error(res, StatusCode::BAD_REQUEST, "missing title field");
            return;
        }
    };
    if payload.title.is_empty() {
        render_error(res, StatusCode::BAD_REQUEST, "title must not be empty");
        return;
    }

    let book_store = web_state().db_manager.book_store();

    let book = match book_store.get_book_by_id(id).await {
        Ok(Some(book)) => book,
        Ok(None) => {
            render_error(res, StatusCode::NOT_FOUND, "book not found");
            return;
        }
        Err(err) => {
            render_db_error(res, &err);
            return;
        }
    };

    match book_store.update_book_title(id, &payload.title).await {
        Ok(()) => res.render(Json(json!({
            "id": id,
            "title": payload.title,
            "author_id": book.author_id,
        }))),
        Err(err) => render_db_error(res, &err),
    }
}

#[handler]
pub async fn delete_book(req: &mut Request, res: &mut Response) {
    let id = match req.param::<i64>("id") {
        Some(v) if v > 0 => v,
        _ => {
            render_error(res, StatusCode::BAD_REQUEST, "invalid book id");
            return;
        }
    };

    let book_store = web_state().db_manager.book_store();

    match book_store.get_book_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            render_error(res, StatusCode::NOT_FOUND, "book not found");
            return;
        }
        Err(err) => {
            render_db_error(res, &err);
            return;
        }
    }

    match book_store.delete_book(id).await {
        Ok(()) => res.render(Json(json!({ "message": "book deleted" }))),
        Err(err) => render_db_error(res, &err),
    }
}
