use crate::error::Error;
use crate::services::blocking;
use crate::state::AppState;
use crate::storage::templates;
use actix_web::{web, HttpResponse};

pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let db = state.db.clone();
    let all = blocking(move || templates::list(&db.connect()?)).await?;
    Ok(HttpResponse::Ok().json(all))
}
