use salvo::prelude::*;
use serde_json::json;

use crate::web::web_state;

use super::render_db_error;

#[handler]
pub async fn health_check(res: &mut Response) {
    res.render(Json(json!({ "status": "ok" })));
}

#[handler]
pub async fn get_status(res: &mut Response) {
    let state = web_state();
    let uptime_seconds = state.started_at.elapsed().as_secs();

    let authors = state.db_manager.author_store().count_authors().await;
    let books = state.db_manager.book_store().count_books().await;

    match (authors, books) {
        (Ok(authors), Ok(books)) => {
            res.render(Json(json!({
                "status": "running",
                "uptime_seconds": uptime_seconds,
                "version": env!("CARGO_PKG_VERSION"),
                "backend": format!("{:?}", state.db_manager.db_type()).to_lowercase(),
                "authors": authors,
                "books": books,
            })));
        }
        (Err(err), _) | (_, Err(err)) => render_db_error(res, &err),
    }
}
