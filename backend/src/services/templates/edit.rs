use super::upload::TemplateUpload;
use crate::error::{Error, Result};
use crate::services::blocking;
use crate::services::form::read_multipart;
use crate::state::AppState;
use crate::storage::templates;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::template::Template;
use log::{info, warn};
use rusqlite::Connection;

pub async fn process(
    state: web::Data<AppState>,
    template_id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let template_id = template_id.into_inner();
    let form = read_multipart(payload, state.config.server.max_upload_bytes).await?;
    let upload = TemplateUpload::from_form(form, state.templates_dir())?;

    let db = state.db.clone();
    let template = blocking(move || edit_template(&db.connect()?, template_id, upload)).await?;

    info!("Template '{}' ({}) updated", template.name, template.id);
    Ok(HttpResponse::Ok().json(template))
}

fn edit_template(conn: &Connection, id: i64, upload: TemplateUpload) -> Result<Template> {
    let current = templates::get(conn, id)?.ok_or_else(|| Error::not_found(format!("Template {id}")))?;

    if templates::find_id_by_name(conn, &upload.name)?.is_some_and(|other| other != id) {
        return Err(Error::conflict(format!("Template '{}' already exists.", upload.name)));
    }

    let new_image = match &upload.image {
        None => None,
        Some(image) => {
            let new_path = image.stored_path();
            if templates::find_id_by_file_path(conn, &new_path)?.is_some_and(|other| other != id) {
                return Err(Error::conflict(format!(
                    "Another template already stores its image at {new_path}. Please choose a different name."
                )));
            }
            image.write()?;
            Some(new_path)
        }
    };
    let file_path = new_image.clone().unwrap_or_else(|| current.file_path.clone());
    // Only one of the two files survives: the new one once the row points at it, the old one otherwise.
    let moved = new_image.is_some() && file_path != current.file_path;

    if let Err(e) = templates::update(conn, id, &upload.name, &file_path, &upload.fields_config) {
        if moved {
            remove_image(&file_path);
        }
        return Err(e);
    }
    if moved {
        remove_image(&current.file_path);
    }

    Ok(Template {
        id,
        name: upload.name,
        file_path,
        fields_config: upload.fields_config,
    })
}

fn remove_image(path: &str) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove template image {path}: {e}"),
    }
}
