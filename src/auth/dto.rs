use serde::Deserialize;

/// Request body for `authenticate`.
#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub code: Option<String>,
}
