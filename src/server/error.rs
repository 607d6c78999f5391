//! HTTP mapping for gallery errors
//!
//! Client errors carry their message; server errors are logged in full and
//! reported with a short, fixed detail. File removal failures are kept apart
//! from database failures.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

use crate::error::GalleryError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for GalleryError {
    fn status_code(&self) -> StatusCode {
        match self {
            GalleryError::NotFound(_) => StatusCode::NOT_FOUND,
            GalleryError::InvalidRating(_)
            | GalleryError::MissingRating
            | GalleryError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            e if e.is_client_error() => e.to_string(),
            GalleryError::Storage(_) => "Database error.".to_string(),
            GalleryError::FileRemoval { .. } => "Failed to delete image file.".to_string(),
            _ => "Internal server error.".to_string(),
        };

        if !self.is_client_error() {
            error!(error = %self, "request failed");
        }

        HttpResponse::build(self.status_code()).json(ErrorBody { detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use std::path::PathBuf;

    async fn detail(err: GalleryError) -> (StatusCode, String) {
        let response = err.error_response();
        let status = response.status();
        let body = to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, value["detail"].as_str().unwrap().to_string())
    }

    #[actix_web::test]
    async fn test_not_found() {
        let (status, detail) = detail(GalleryError::NotFound(7)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(detail, "Image not found");
    }

    #[actix_web::test]
    async fn test_invalid_rating() {
        let (status, detail) = detail(GalleryError::InvalidRating(6)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(detail.contains("between 0 and 5"));
    }

    #[actix_web::test]
    async fn test_file_and_database_failures_differ() {
        let (file_status, file_detail) = detail(GalleryError::FileRemoval {
            path: PathBuf::from("/images/a.png"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        })
        .await;
        let (db_status, db_detail) =
            detail(GalleryError::Storage(rusqlite::Error::InvalidQuery)).await;

        assert_eq!(file_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(file_detail, db_detail);
        assert!(!file_detail.contains("/images/a.png"));
    }
}
