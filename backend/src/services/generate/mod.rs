//! # Generation Service Module
//!
//! `POST /api/generate` renders one template for a selection of participants.
//! Each participant is an independent item: a missing participant or a failed
//! render is reported in the `BatchReport` and the batch moves on. A
//! certificate row is written only after its image has been saved.

mod batch;

use actix_web::web::{post, resource};
use actix_web::Resource;

const API_PATH: &str = "/api/generate";

pub fn configure_routes() -> Resource {
    resource(API_PATH).route(post().to(batch::process))
}
