use jiff::Timestamp;
use linkhop_core::{Allocation, Mapping};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub long_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_code: String,
}

impl From<Allocation> for ShortenResponse {
    fn from(allocation: Allocation) -> Self {
        Self {
            short_url: allocation.short_url,
            short_code: allocation.short_code.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingResponse {
    pub short_code: String,
    pub long_url: String,
    pub click_count: u64,
    pub created_at: Timestamp,
}

impl From<Mapping> for MappingResponse {
    fn from(mapping: Mapping) -> Self {
        Self {
            short_code: mapping.short_code.to_string(),
            long_url: mapping.long_url,
            click_count: mapping.click_count,
            created_at: mapping.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
