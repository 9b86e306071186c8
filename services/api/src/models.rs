//! API models for request and response payloads

use serde::Serialize;

pub mod group;
pub mod schedule;

/// Response carrying the id of a created resource
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}
