use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Licensing service error variants.
///
/// Verification refusals (unknown key, expired, device mismatch) are not errors;
/// see [`crate::domain::types::VerificationResult`].
#[derive(Debug, thiserror::Error)]
pub enum LicensingServiceError {
    #[error("license not found")]
    LicenseNotFound,
    #[error("signature not found")]
    SignatureNotFound,
    #[error("signature already exists")]
    SignatureAlreadyExists,
    #[error("no definitions generated yet")]
    DefinitionsNotFound,
    #[error("username already exists")]
    AdminAlreadyExists,
    #[error("duration must be a positive number of days")]
    InvalidDuration,
    #[error("invalid device id")]
    InvalidDeviceId,
    #[error("license key is required")]
    MissingLicenseKey,
    #[error("invalid hash")]
    InvalidHash,
    #[error("invalid patterns")]
    InvalidPatterns,
    #[error("missing data")]
    MissingData,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl LicensingServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LicenseNotFound => "LICENSE_NOT_FOUND",
            Self::SignatureNotFound => "SIGNATURE_NOT_FOUND",
            Self::SignatureAlreadyExists => "SIGNATURE_ALREADY_EXISTS",
            Self::DefinitionsNotFound => "DEFINITIONS_NOT_FOUND",
            Self::AdminAlreadyExists => "ADMIN_ALREADY_EXISTS",
            Self::InvalidDuration => "INVALID_DURATION",
            Self::InvalidDeviceId => "INVALID_DEVICE_ID",
            Self::MissingLicenseKey => "MISSING_LICENSE_KEY",
            Self::InvalidHash => "INVALID_HASH",
            Self::InvalidPatterns => "INVALID_PATTERNS",
            Self::MissingData => "MISSING_DATA",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for LicensingServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::LicenseNotFound | Self::SignatureNotFound | Self::DefinitionsNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::SignatureAlreadyExists | Self::AdminAlreadyExists => StatusCode::CONFLICT,
            Self::InvalidDuration
            | Self::InvalidDeviceId
            | Self::MissingLicenseKey
            | Self::InvalidHash
            | Self::InvalidPatterns
            | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer already records method/uri/status; only the 500 root cause is logged here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
