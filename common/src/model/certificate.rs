use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A generated certificate image and the participant/template pair it was
/// rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: i64,
    pub participant_id: i64,
    pub template_id: i64,
    /// Path of the PNG on disk. Unique across all certificates.
    pub generated_file_path: String,
    pub created_at: NaiveDateTime,
}

/// Row of the certificates overview, joined with the participant and template names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateListing {
    pub id: i64,
    pub participant_name: String,
    pub template_name: String,
    pub generated_file_path: String,
    pub created_at: NaiveDateTime,
}
