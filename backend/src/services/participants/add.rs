use crate::error::{Error, Result};
use crate::services::blocking;
use crate::state::AppState;
use crate::storage::participants;
use actix_web::{web, HttpResponse};
use common::model::custom_fields::CustomFields;
use common::model::participant::NewParticipant;
use log::info;

pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<NewParticipant>,
) -> Result<HttpResponse> {
    let participant = normalize(payload.into_inner())?;
    let db = state.db.clone();
    let created = blocking(move || {
        let conn = db.connect()?;
        let id = participants::insert(&conn, &participant)?;
        participants::get(&conn, id)?.ok_or_else(|| Error::not_found(format!("Participant {id}")))
    })
    .await?;

    info!("Added participant {} ({})", created.name, created.id);
    Ok(HttpResponse::Created().json(created))
}

/// Validates a manual entry and trims it into the stored shape.
pub(crate) fn normalize(input: NewParticipant) -> Result<NewParticipant> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Name is required."));
    }
    let event = input.event.trim().to_string();
    if event.is_empty() {
        return Err(Error::validation("Event is required."));
    }
    let date = input.date.trim().to_string();
    if date.is_empty() {
        return Err(Error::validation("Date is required."));
    }
    let optional = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(NewParticipant {
        name,
        email: optional(input.email),
        event,
        position: optional(input.position),
        date,
        custom_fields: CustomFields::from_pairs(input.custom_fields.iter()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::temp_state;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use common::model::participant::Participant;
    use serde_json::json;

    #[test]
    fn normalize_requires_core_fields() {
        let missing_name = NewParticipant {
            name: "  ".to_string(),
            event: "Demo".to_string(),
            date: "2024-01-01".to_string(),
            ..Default::default()
        };
        assert!(matches!(normalize(missing_name), Err(Error::Validation(_))));

        let missing_event = NewParticipant {
            name: "Ada".to_string(),
            date: "2024-01-01".to_string(),
            ..Default::default()
        };
        assert!(normalize(missing_event).is_err());
    }

    #[test]
    fn normalize_trims_and_drops_blanks() {
        let mut custom = CustomFields::new();
        custom.insert(" award ", " Gold ");
        custom.insert("note", " ");
        let np = normalize(NewParticipant {
            name: " Ada ".to_string(),
            email: Some("   ".to_string()),
            event: "Demo".to_string(),
            position: Some(" Speaker".to_string()),
            date: "2024-01-01".to_string(),
            custom_fields: custom,
        })
        .unwrap();
        assert_eq!(np.name, "Ada");
        assert_eq!(np.email, None);
        assert_eq!(np.position.as_deref(), Some("Speaker"));
        assert_eq!(np.custom_fields.get("award"), Some("Gold"));
        assert_eq!(np.custom_fields.len(), 1);
    }

    #[actix_web::test]
    async fn add_then_list() {
        let (_dir, state) = temp_state();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(super::super::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/participants")
            .set_json(json!({
                "name": "Ada",
                "event": "Demo",
                "date": "2024-01-01",
                "custom_fields": {"award": "Gold"}
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Participant = actix_test::read_body_json(resp).await;
        assert_eq!(created.custom_fields.get("award"), Some("Gold"));

        let req = actix_test::TestRequest::post()
            .uri("/api/participants")
            .set_json(json!({"name": "", "event": "Demo", "date": "2024-01-01"}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = actix_test::TestRequest::get().uri("/api/participants").to_request();
        let all: Vec<Participant> = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Ada");
    }
}
