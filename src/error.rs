// src/error.rs
use crate::{storage::StorageError, validation::ValidationMessages};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

pub const NOT_FOUND_MESSAGE: &str = "Siswa Tidak Ditemukan";
const SERVER_ERROR_MESSAGE: &str = "Terjadi kesalahan pada server";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validasi gagal")]
    Validation(ValidationMessages),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());
        match self {
            AppError::Validation(messages) => res.json(messages),
            AppError::NotFound => res.json(json!({ "error": NOT_FOUND_MESSAGE })),
            AppError::BadRequest(msg) => res.json(json!({ "error": msg })),
            AppError::Database(_) | AppError::Storage(_) => {
                log::error!("{}", self);
                res.json(json!({ "error": SERVER_ERROR_MESSAGE }))
            }
        }
    }
}
