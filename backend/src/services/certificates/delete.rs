use super::remove_certificate_file;
use crate::error::{Error, Result};
use crate::services::blocking;
use crate::state::AppState;
use crate::storage::certificates;
use actix_web::{web, HttpResponse};
use common::model::batch::BatchReport;
use common::requests::DeleteRequest;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;

pub async fn process(state: web::Data<AppState>, request: web::Json<DeleteRequest>) -> Result<HttpResponse> {
    let ids = request.into_inner().ids;
    if ids.is_empty() {
        return Err(Error::validation("Please select at least one certificate."));
    }

    let state = state.into_inner();
    let report = blocking(move || {
        let conn = state.db.connect()?;
        let mut report = BatchReport::new();
        for id in ids {
            let outcome = delete_certificate(&conn, state.certificates_dir(), id);
            if let Err(e) = &outcome {
                error!("Could not delete certificate {id}: {e}");
            }
            report.record(id, outcome);
        }
        Ok(report)
    })
    .await?;

    info!("Deleted {} certificates, {} failed", report.succeeded, report.failed);
    Ok(HttpResponse::Ok().json(report))
}

fn delete_certificate(conn: &Connection, certs_dir: &Path, id: i64) -> Result<String> {
    let certificate = certificates::get(conn, id)?.ok_or_else(|| Error::not_found(format!("Certificate {id}")))?;
    remove_certificate_file(certs_dir, &certificate.generated_file_path)?;
    certificates::delete(conn, id)?;
    Ok(format!("Certificate {id} deleted."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::temp_state;
    use actix_web::{test as actix_test, App};
    use common::model::certificate::CertificateListing;

    #[actix_web::test]
    async fn deletes_files_and_rows() {
        let (_dir, state) = temp_state();
        let file = state.certificates_dir().join("Ada_Demo_1_x.png");
        std::fs::write(&file, b"png").unwrap();
        let id = certificates::insert(&state.db.connect().unwrap(), 1, 1, &file.to_string_lossy()).unwrap();

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(super::super::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/certificates/delete")
            .set_json(DeleteRequest { ids: vec![id, 42] })
            .to_request();
        let report: BatchReport = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert!(report.items[1].message().contains("not found"));
        assert!(!file.exists());

        let req = actix_test::TestRequest::get().uri("/api/certificates").to_request();
        let listing: Vec<CertificateListing> = actix_test::call_and_read_body_json(&app, req).await;
        assert!(listing.is_empty());
    }

    #[actix_web::test]
    async fn empty_selection_is_rejected() {
        let (_dir, state) = temp_state();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(super::super::configure_routes()),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/api/certificates/delete")
            .set_json(DeleteRequest::default())
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 400);
    }
}
