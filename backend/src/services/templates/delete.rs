use crate::error::{Error, Result};
use crate::services::blocking;
use crate::state::AppState;
use crate::storage::{certificates, templates};
use actix_web::{web, HttpResponse};
use common::model::batch::BatchReport;
use common::requests::DeleteRequest;
use log::{error, info, warn};
use rusqlite::Connection;

pub async fn process(state: web::Data<AppState>, request: web::Json<DeleteRequest>) -> Result<HttpResponse> {
    let ids = request.into_inner().ids;
    if ids.is_empty() {
        return Err(Error::validation("No templates selected for deletion."));
    }

    let db = state.db.clone();
    let report = blocking(move || {
        let conn = db.connect()?;
        let mut report = BatchReport::new();
        for id in ids {
            let outcome = delete_template(&conn, id);
            if let Err(e) = &outcome {
                error!("Could not delete template {id}: {e}");
            }
            report.record(id, outcome);
        }
        Ok(report)
    })
    .await?;

    info!("Deleted {} templates, {} failed", report.succeeded, report.failed);
    Ok(HttpResponse::Ok().json(report))
}

/// Deletes a template and its image unless certificates still reference it.
fn delete_template(conn: &Connection, id: i64) -> Result<String> {
    let template = templates::get(conn, id)?.ok_or_else(|| Error::not_found(format!("Template {id}")))?;

    let in_use = certificates::count_for_template(conn, id)?;
    if in_use > 0 {
        return Err(Error::conflict(format!(
            "Cannot delete template '{}' because {in_use} certificates are using it. Please delete those certificates first.",
            template.name
        )));
    }

    templates::delete(conn, id)?;
    match std::fs::remove_file(&template.file_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Template {id} deleted but its image {} was kept: {e}", template.file_path),
    }
    Ok(format!("Template '{}' deleted.", template.name))
}
