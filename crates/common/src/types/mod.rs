use serde::Serialize;

/// Health check payload returned by `/health`.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}
