//! # Participant Service Module
//!
//! Routes under `/api/participants`:
//! - `GET ""`: every participant, ordered by name.
//! - `POST ""`: manual entry of one participant (JSON `NewParticipant`).
//! - `POST /upload`: roster import from a CSV file (multipart part `csvfile`).
//! - `POST /delete`: batch delete; each participant's certificates (files and
//!   rows) are removed before the participant row.

mod add;
mod delete;
mod list;
mod upload;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/participants";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(add::process))
        .route("/upload", post().to(upload::process))
        .route("/delete", post().to(delete::process))
}
