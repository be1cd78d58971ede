//! # Certificate Service Module
//!
//! Routes under `/api/certificates`:
//! - `GET ""`: every certificate with its participant and template name, newest first.
//! - `POST /delete`: batch delete of certificate files and rows.

mod delete;
mod files;
mod list;

pub(crate) use files::remove_certificate_file;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/certificates";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/delete", post().to(delete::process))
}
