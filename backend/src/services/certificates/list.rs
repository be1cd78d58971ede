use crate::error::Error;
use crate::services::blocking;
use crate::state::AppState;
use crate::storage::certificates;
use actix_web::{web, HttpResponse};

pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let db = state.db.clone();
    let listing = blocking(move || certificates::list(&db.connect()?)).await?;
    Ok(HttpResponse::Ok().json(listing))
}
