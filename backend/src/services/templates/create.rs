use super::upload::{TemplateUpload, IMAGE_FIELD};
use crate::error::{Error, Result};
use crate::services::blocking;
use crate::services::form::read_multipart;
use crate::state::AppState;
use crate::storage::templates;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::template::Template;
use log::{info, warn};

pub async fn process(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    let form = read_multipart(payload, state.config.server.max_upload_bytes).await?;
    if !form.has_file_part(IMAGE_FIELD) {
        return Err(Error::validation("No template image file part."));
    }
    if form.file(IMAGE_FIELD).is_none() {
        return Err(Error::validation("No selected file for template image."));
    }
    let upload = TemplateUpload::from_form(form, state.templates_dir())?;

    let db = state.db.clone();
    let template = blocking(move || create_template(&db.connect()?, upload)).await?;

    info!("Template '{}' added with id {}", template.name, template.id);
    Ok(HttpResponse::Created().json(template))
}

fn create_template(conn: &rusqlite::Connection, upload: TemplateUpload) -> Result<Template> {
    let TemplateUpload {
        name,
        fields_config,
        image,
    } = upload;
    let image = image.ok_or_else(|| Error::validation("No selected file for template image."))?;
    let file_path = image.stored_path();

    if templates::find_id_by_name(conn, &name)?.is_some() {
        return Err(Error::conflict(format!("Template '{name}' already exists.")));
    }
    if templates::find_id_by_file_path(conn, &file_path)?.is_some() {
        return Err(Error::conflict(format!(
            "Another template already stores its image at {file_path}. Please choose a different name."
        )));
    }

    image.write()?;
    let id = match templates::insert(conn, &name, &file_path, &fields_config) {
        Ok(id) => id,
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_file(&image.path) {
                warn!("Could not remove template image {file_path}: {cleanup}");
            }
            return Err(if e.is_unique_violation() {
                Error::conflict(format!("Template '{name}' already exists."))
            } else {
                e
            });
        }
    };

    Ok(Template {
        id,
        name,
        file_path,
        fields_config,
    })
}

#[cfg(test)]
mod tests {
    use super::super::upload::testing::png_bytes;
    use crate::services::form::testing::{body, content_type, Part};
    use crate::state::testing::temp_state;
    use crate::storage::templates;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, web, App};
    use common::model::template::{Align, Template};

    const LAYOUT: &str = r#"{"name": {"x": 100, "y": 50, "align": "center"}}"#;

    fn request(parts: &[Part<'_>]) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/api/templates")
            .insert_header((header::CONTENT_TYPE, content_type()))
            .set_payload(body(parts))
    }

    #[actix_web::test]
    async fn creates_template_and_image() {
        let (_dir, state) = temp_state();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(super::super::configure_routes()),
        )
        .await;
        let png = png_bytes();

        let req = request(&[
            Part::Text("template_name", "Gold Award"),
            Part::Text("fields_config", LAYOUT),
            Part::File("template_image", "gold.png", &png),
        ])
        .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Template = actix_test::read_body_json(resp).await;

        assert_eq!(created.name, "Gold Award");
        assert!(created.file_path.ends_with("Gold_Award.png"));
        assert!(std::path::Path::new(&created.file_path).exists());
        assert_eq!(created.fields_config.get("name").unwrap().align(), Align::Center);

        let stored = templates::get(&state.db.connect().unwrap(), created.id).unwrap().unwrap();
        assert_eq!(stored, created);

        // Same name again is a conflict.
        let req = request(&[
            Part::Text("template_name", "Gold Award"),
            Part::File("template_image", "other.png", &png),
        ])
        .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn invalid_requests_write_nothing() {
        let (_dir, state) = temp_state();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(super::super::configure_routes()),
        )
        .await;
        let png = png_bytes();

        let cases: Vec<Vec<Part<'_>>> = vec![
            vec![Part::Text("template_name", "Gold")],
            vec![Part::Text("template_name", "Gold"), Part::File("template_image", "", b"")],
            vec![Part::Text("template_name", " "), Part::File("template_image", "g.png", &png)],
            vec![
                Part::Text("template_name", "Gold"),
                Part::Text("fields_config", "{not json"),
                Part::File("template_image", "g.png", &png),
            ],
            vec![Part::Text("template_name", "Gold"), Part::File("template_image", "g.bmp", &png)],
        ];
        for parts in cases {
            let resp = actix_test::call_service(&app, request(&parts).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        assert!(templates::list(&state.db.connect().unwrap()).unwrap().is_empty());
        assert_eq!(std::fs::read_dir(state.templates_dir()).unwrap().count(), 0);
    }
}
