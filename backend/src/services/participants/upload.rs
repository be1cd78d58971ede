//! Roster import from CSV.
//!
//! The header row is trimmed and lower-cased. `name` is mandatory; `email`,
//! `event`, `position` and `date` map onto participant columns and every other
//! header becomes a custom field captured for each row.

use crate::error::{Error, Result};
use crate::services::blocking;
use crate::services::form::read_multipart;
use crate::state::AppState;
use crate::storage::participants;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::custom_fields::CustomFields;
use common::model::participant::NewParticipant;
use common::requests::ImportSummary;
use csv::ReaderBuilder;
use log::info;

const FILE_FIELD: &str = "csvfile";

pub async fn process(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    let mut form = read_multipart(payload, state.config.server.max_upload_bytes).await?;
    if !form.has_file_part(FILE_FIELD) {
        return Err(Error::validation("No file part in the request."));
    }
    let file = form
        .take_file(FILE_FIELD)
        .ok_or_else(|| Error::validation("No selected file."))?;
    if !file.filename.to_ascii_lowercase().ends_with(".csv") {
        return Err(Error::validation("Invalid file type. Please upload a .csv file."));
    }

    let db = state.db.clone();
    let inserted = blocking(move || {
        let roster = parse_roster(&file.bytes)?;
        participants::insert_all(&db.connect()?, &roster)
    })
    .await?;

    info!("Imported {inserted} participants from CSV");
    Ok(HttpResponse::Ok().json(ImportSummary { inserted }))
}

/// Column positions of the standard attributes found in the header.
#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    email: Option<usize>,
    event: Option<usize>,
    position: Option<usize>,
    date: Option<usize>,
    custom: Vec<(String, usize)>,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Self {
        let mut columns = Columns::default();
        for (index, cell) in header.iter().enumerate() {
            let title = cell.trim().to_lowercase();
            match title.as_str() {
                "name" => columns.name = Some(index),
                "email" => columns.email = Some(index),
                "event" => columns.event = Some(index),
                "position" => columns.position = Some(index),
                "date" => columns.date = Some(index),
                "" => {}
                _ => columns.custom.push((title, index)),
            }
        }
        columns
    }
}

/// Parses a CSV roster into participants ready to insert.
pub fn parse_roster(bytes: &[u8]) -> Result<Vec<NewParticipant>> {
    let text = std::str::from_utf8(bytes).map_err(|_| Error::validation("CSV file is not valid UTF-8."))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(Error::validation("CSV file is empty.")),
    };
    let columns = Columns::from_header(&header);
    if columns.name.is_none() {
        return Err(Error::validation("CSV must contain 'name' column."));
    }

    let mut roster = Vec::new();
    for record in records {
        let record = record?;
        if record.is_empty() {
            continue;
        }
        let cell = |index: Option<usize>| index.and_then(|i| record.get(i));
        let required = |index: Option<usize>| cell(index).unwrap_or_default().to_string();
        let custom_fields: CustomFields = columns
            .custom
            .iter()
            .filter_map(|(title, i)| record.get(*i).map(|value| (title.clone(), value.to_string())))
            .collect();

        roster.push(NewParticipant {
            name: required(columns.name),
            email: cell(columns.email).map(str::to_string),
            event: required(columns.event),
            position: cell(columns.position).map(str::to_string),
            date: required(columns.date),
            custom_fields,
        });
    }
    Ok(roster)
}
