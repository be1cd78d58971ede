//! # Download Service Module
//!
//! - `GET /download/{filename}`: the stored certificate PNG as an attachment.
//! - `GET /download_pdf/{filename}`: the same image converted to a one-page PDF,
//!   served as `{stem}.pdf`.
//!
//! `filename` must be a bare file name; it is only ever resolved inside the
//! certificates directory. Anything else is `404 Not Found`.

mod file;
mod pdf;

use crate::error::{Error, Result};
use actix_web::web::{get, resource};
use actix_web::Resource;
use std::path::{Path, PathBuf};

pub fn configure_routes() -> Vec<Resource> {
    vec![
        resource("/download/{filename}").route(get().to(file::process)),
        resource("/download_pdf/{filename}").route(get().to(pdf::process)),
    ]
}

/// Resolves a requested download to an existing file inside `certs_dir`.
pub(crate) fn resolve_download(certs_dir: &Path, filename: &str) -> Result<PathBuf> {
    let not_found = || Error::not_found(format!("Certificate file '{filename}'"));

    let is_bare = !filename.is_empty()
        && !filename.contains(['/', '\\'])
        && Path::new(filename).file_name().is_some_and(|name| name == filename);
    if !is_bare {
        return Err(not_found());
    }

    let path = certs_dir.join(filename);
    if path.is_file() {
        Ok(path)
    } else {
        Err(not_found())
    }
}
