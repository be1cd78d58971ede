//! HTTP services. Each sub-module owns one API scope and exposes a
//! `configure_routes()` that `main.rs` mounts on the application.

pub mod certificates;
pub mod downloads;
pub mod form;
pub mod generate;
pub mod participants;
pub mod templates;

use crate::error::Result;
use actix_web::web;

/// Runs a unit of blocking work (SQLite, image and file I/O) on actix's
/// blocking thread pool and flattens the cancellation error into ours.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(work).await?
}
