use super::resolve_download;
use crate::error::Result;
use crate::state::AppState;
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web;

pub async fn process(state: web::Data<AppState>, filename: web::Path<String>) -> Result<NamedFile> {
    let filename = filename.into_inner();
    let path = resolve_download(state.certificates_dir(), &filename)?;

    let file = NamedFile::open_async(&path).await?.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
    });
    Ok(file)
}

#[cfg(test)]
mod tests {
    use crate::state::testing::temp_state;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, web, App};

    #[actix_web::test]
    async fn serves_certificate_as_attachment() {
        let (_dir, state) = temp_state();
        std::fs::write(state.certificates_dir().join("Ada_Demo_1_x.png"), b"\x89PNG").unwrap();
        std::fs::write(state.db.path().with_file_name("secret.txt"), b"secret").unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(super::super::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/download/Ada_Demo_1_x.png").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("Ada_Demo_1_x.png"));

        for uri in ["/download/..%2Fsecret.txt", "/download/missing.png", "/download/..%5Csecret.txt"] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
