// Statica - static website hosting over HTTP, powered by Pulumi
// Copyright (C) 2025 Statica Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use statica_engine::SiteError;
use std::fmt;

/// Application error type that includes context for better debugging
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {}", self.message, details)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full error with details
        tracing::error!(
            status = ?self.status,
            message = %self.message,
            details = ?self.details,
            "Request failed"
        );

        // Clients get the message alone, as a JSON error body
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<SiteError> for AppError {
    fn from(err: SiteError) -> Self {
        let message = err.to_string();
        let (status, details) = match &err {
            SiteError::AlreadyExists(_) | SiteError::ConcurrentUpdate(_) => {
                (StatusCode::CONFLICT, None)
            }
            SiteError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            SiteError::DeployFailed { source, .. }
            | SiteError::ReadFailed { source, .. }
            | SiteError::DestroyFailed { source, .. }
            | SiteError::CleanupFailed { source, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(format!("{source:?}")))
            }
            SiteError::ListFailed(source) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(format!("{source:?}")))
            }
            SiteError::MissingOutput { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let error = Self::new(status, message);
        match details {
            Some(details) => error.with_details(details),
            None => error,
        }
    }
}
