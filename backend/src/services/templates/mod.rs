//! # Template Service Module
//!
//! Routes under `/api/templates`. Templates are created and edited with
//! `multipart/form-data` requests carrying:
//! - `template_name`: unique display name, also used to name the stored image.
//! - `fields_config`: JSON object mapping field names to draw specs. Blank means `{}`.
//! - `template_image`: PNG or JPEG base image. Required on create, optional on edit.
//!
//! Every field is validated before anything is written, so a rejected request
//! leaves neither a file nor a row behind.
//!
//! # Registered Routes:
//!
//! *   **`GET ""`**: every template.
//! *   **`POST ""`**: create a template, `201 Created` with the stored `Template`.
//!     A name that is already taken is `409 Conflict`.
//! *   **`POST /delete`**: batch delete. A template still referenced by
//!     certificates is reported as a failed item and left untouched.
//! *   **`GET /{id}`**: one template.
//! *   **`POST /{id}`**: edit name, layout and optionally the image. A replaced
//!     image file is removed from disk.

mod create;
mod delete;
mod edit;
mod get;
mod list;
mod upload;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/templates";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(create::process))
        .route("/delete", post().to(delete::process))
        .route("/{template_id:\\d+}", get().to(get::process))
        .route("/{template_id:\\d+}", post().to(edit::process))
}
