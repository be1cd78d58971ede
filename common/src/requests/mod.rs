use serde::{Deserialize, Serialize};

/// Request payload for `POST /api/generate`: render `template_id` once for each
/// selected participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub participant_ids: Vec<i64>,
    pub template_id: Option<i64>,
}

/// Request payload for the batch delete endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// Response of the CSV roster import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub inserted: usize,
}
