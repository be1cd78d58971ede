//! Data model shared by the certificate service handlers: participants,
//! templates and their field layouts, generated certificates, and the request
//! and response payloads of the HTTP API.

pub mod model;
pub mod requests;
