use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("private key is not a valid PKCS8 RSA key: {0}")]
    KeyInvalid(String),

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown project '{0}'")]
    UnknownProject(String),

    #[error("unknown list '{list}' in project '{project}'")]
    UnknownList { project: String, list: String },

    #[error("no service account credential configured: {0}")]
    MissingCredential(String),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("sheet '{0}' not found in spreadsheet")]
    SheetNotFound(String),

    #[error("spreadsheet not found: {0}")]
    NotFound(String),

    #[error("failed to read values: {0}")]
    ReadFailed(String),

    #[error("failed to append values: {0}")]
    AppendFailed(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Google Sheets API error: {0}")]
    Sheet(#[from] SheetError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Taxonomy branch of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "auth_error",
            AppError::Config(_) => "config_error",
            AppError::Sheet(_) => "sheet_error",
            AppError::Validation(_) | AppError::Serialization(_) => "validation_error",
            AppError::Io(_) => "io_error",
        }
    }

    /// Specific failure within the branch.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Auth(AuthError::KeyInvalid(_)) => "key_invalid",
            AppError::Auth(AuthError::TokenExchangeFailed(_)) => "token_exchange_failed",
            AppError::Config(ConfigError::UnknownProject(_)) => "unknown_project",
            AppError::Config(ConfigError::UnknownList { .. }) => "unknown_list",
            AppError::Config(ConfigError::MissingCredential(_)) => "missing_credential",
            AppError::Config(ConfigError::Invalid(_)) => "invalid_config",
            AppError::Sheet(SheetError::SheetNotFound(_)) => "sheet_not_found",
            AppError::Sheet(SheetError::NotFound(_)) => "not_found",
            AppError::Sheet(SheetError::ReadFailed(_)) => "read_failed",
            AppError::Sheet(SheetError::AppendFailed(_)) => "append_failed",
            AppError::Validation(_) | AppError::Serialization(_) => "malformed_payload",
            AppError::Io(_) => "io",
        }
    }

    /// Error text without the branch prefix, carrying remote detail verbatim.
    pub fn detail(&self) -> String {
        match self {
            AppError::Auth(e) => e.to_string(),
            AppError::Config(e) => e.to_string(),
            AppError::Sheet(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Serialization(e) => e.to_string(),
            AppError::Io(e) => e.to_string(),
        }
    }
}

/// Uniform failure result handed back to callers at the flow boundary.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorReport {
    pub ok: bool,
    pub kind: &'static str,
    pub code: &'static str,
    pub detail: String,
}

impl From<&AppError> for ErrorReport {
    fn from(e: &AppError) -> Self {
        ErrorReport {
            ok: false,
            kind: e.kind(),
            code: e.code(),
            detail: e.detail(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
