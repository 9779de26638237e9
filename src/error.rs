//! Error types and HTTP status mapping

use thiserror::Error;

/// Result type alias for STS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error with HTTP status code mapping for the REST boundary
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("already exists: {message}")]
    AlreadyExists { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("tenant mismatch: {message}")]
    TenantMismatch { message: String },

    #[error("failed to decode token: {message}")]
    DecodeFailure { message: String },

    #[error("failed to parse arn: {message}")]
    ParseFailure { message: String },

    #[error("provider not found: {message}")]
    ProviderNotFound { message: String },

    #[error("invalid audience: {message}")]
    AudienceInvalid { message: String },

    #[error("invalid signature: {message}")]
    SignatureInvalid { message: String },

    #[error("token expired: {message}")]
    TokenExpired { message: String },

    #[error("unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("i/o error: {message}")]
    Io { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn tenant_mismatch(message: impl Into<String>) -> Self {
        Self::TenantMismatch {
            message: message.into(),
        }
    }

    pub fn decode_failure(message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            message: message.into(),
        }
    }

    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::ParseFailure {
            message: message.into(),
        }
    }

    pub fn provider_not_found(message: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            message: message.into(),
        }
    }

    pub fn audience_invalid(message: impl Into<String>) -> Self {
        Self::AudienceInvalid {
            message: message.into(),
        }
    }

    pub fn signature_invalid(message: impl Into<String>) -> Self {
        Self::SignatureInvalid {
            message: message.into(),
        }
    }

    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::TokenExpired {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::DecodeFailure { .. } => 400,
            Self::ParseFailure { .. } => 400,
            Self::AudienceInvalid { .. } => 403,
            Self::SignatureInvalid { .. } => 403,
            Self::TokenExpired { .. } => 403,
            Self::TenantMismatch { .. } => 403,
            Self::Unauthenticated { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::ProviderNotFound { .. } => 404,
            Self::AlreadyExists { .. } => 409,
            Self::Io { .. } => 500,
            Self::Internal { .. } => 500,
            Self::Storage { .. } => 502,
        }
    }

    /// Get the error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound { .. } => "not_found",
            Self::TenantMismatch { .. } => "tenant_mismatch",
            Self::DecodeFailure { .. } => "decode_failure",
            Self::ParseFailure { .. } => "parse_failure",
            Self::ProviderNotFound { .. } => "provider_not_found",
            Self::AudienceInvalid { .. } => "audience_invalid",
            Self::SignatureInvalid { .. } => "signature_invalid",
            Self::TokenExpired { .. } => "token_expired",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Io { .. } => "io_error",
            Self::Storage { .. } => "storage_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}
