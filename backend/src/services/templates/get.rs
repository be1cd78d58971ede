use crate::error::{Error, Result};
use crate::services::blocking;
use crate::state::AppState;
use crate::storage::templates;
use actix_web::{web, HttpResponse};

pub async fn process(state: web::Data<AppState>, template_id: web::Path<i64>) -> Result<HttpResponse> {
    let template_id = template_id.into_inner();
    let db = state.db.clone();
    let template = blocking(move || {
        templates::get(&db.connect()?, template_id)?.ok_or_else(|| Error::not_found(format!("Template {template_id}")))
    })
    .await?;
    Ok(HttpResponse::Ok().json(template))
}

#[cfg(test)]
mod tests {
    use crate::state::testing::temp_state;
    use crate::storage::templates;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
    use common::model::template::{FieldsConfig, Template};

    #[actix_web::test]
    async fn fetches_one_or_404() {
        let (_dir, state) = temp_state();
        let layout = FieldsConfig::from_json(r#"{"name": {"x": 1, "y": 2}}"#).unwrap();
        let id = templates::insert(&state.db.connect().unwrap(), "Gold", "t/Gold.png", &layout).unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(super::super::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::get().uri(&format!("/api/templates/{id}")).to_request();
        let template: Template = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(template.fields_config, layout);

        let req = actix_test::TestRequest::get().uri("/api/templates/999").to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = actix_test::TestRequest::get().uri("/api/templates").to_request();
        let all: Vec<Template> = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.len(), 1);
    }
}
