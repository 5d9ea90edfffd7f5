use salvo::prelude::*;
use serde_json::json;

pub mod authors;
pub mod books;
pub mod health;

pub(crate) fn render_error(res: &mut Response, status: StatusCode, message: &str) {
    res.status_code(status);
    res.render(Json(json!({ "error": message })));
}

pub(crate) fn render_db_error(res: &mut Response, err: &crate::db::DatabaseError) {
    render_error(
        res,
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("database error: {}", err),
    );
}
