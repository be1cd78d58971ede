use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::render::render_certificate;
use crate::services::blocking;
use crate::services::certificates::remove_certificate_file;
use crate::state::AppState;
use crate::storage::{certificates, participants, templates};
use actix_web::{web, HttpResponse};
use common::model::batch::BatchReport;
use common::model::template::Template;
use common::requests::GenerateRequest;
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::Path;

pub async fn process(state: web::Data<AppState>, request: web::Json<GenerateRequest>) -> Result<HttpResponse> {
    let GenerateRequest {
        participant_ids,
        template_id,
    } = request.into_inner();
    let template_id = match template_id {
        Some(id) if !participant_ids.is_empty() => id,
        _ => return Err(Error::validation("Please select at least one participant and a template.")),
    };

    let state = state.into_inner();
    let report = blocking(move || {
        let conn = state.db.connect()?;
        generate_batch(
            &conn,
            state.certificates_dir(),
            &state.config.render,
            template_id,
            &participant_ids,
        )
    })
    .await?;

    info!(
        "Generated {} certificates with template {template_id}, {} failed",
        report.succeeded, report.failed
    );
    Ok(HttpResponse::Ok().json(report))
}

/// Renders `template_id` for every id in `participant_ids`, in order.
///
/// Fails as a whole only when the template itself does not exist.
pub fn generate_batch(
    conn: &Connection,
    certs_dir: &Path,
    settings: &RenderConfig,
    template_id: i64,
    participant_ids: &[i64],
) -> Result<BatchReport> {
    let template = templates::get(conn, template_id)?.ok_or_else(|| Error::not_found(format!("Template {template_id}")))?;

    let mut report = BatchReport::new();
    for &participant_id in participant_ids {
        let outcome = generate_one(conn, certs_dir, settings, &template, participant_id);
        if let Err(e) = &outcome {
            error!("Certificate for participant {participant_id} failed: {e}");
        }
        report.record(participant_id, outcome);
    }
    Ok(report)
}

fn generate_one(
    conn: &Connection,
    certs_dir: &Path,
    settings: &RenderConfig,
    template: &Template,
    participant_id: i64,
) -> Result<String> {
    let participant =
        participants::get(conn, participant_id)?.ok_or_else(|| Error::not_found(format!("Participant {participant_id}")))?;

    let path = render_certificate(&participant, template, certs_dir, settings)?;

    if let Err(e) = certificates::insert(conn, participant.id, template.id, &path) {
        if let Err(cleanup) = remove_certificate_file(certs_dir, &path) {
            warn!("Could not remove orphaned certificate {path}: {cleanup}");
        }
        return Err(e);
    }

    Ok(format!("Certificate generated for {}.", participant.name))
}
