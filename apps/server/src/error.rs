use std::io::Error as IoError;

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use sitewatch_service::config::ConfigError;
use sitewatch_service::{ProbeError, StoreError};
use thiserror::Error;

/// Startup failures; any of these ends the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Probe(#[from] ProbeError),
}

/// Per-request failures, answered with a plain-text 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to fetch statuses: {0}")]
    Read(#[from] StoreError),
    #[error("Failed to encode statuses: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}
