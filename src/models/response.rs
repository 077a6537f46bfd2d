use serde::Deserialize;

/// Envelope returned by the HTTP client for a successful call (spec §4.2).
#[derive(Debug, Clone, Deserialize)]
pub struct Response<T> {
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

fn default_status_code() -> u16 {
    200
}
