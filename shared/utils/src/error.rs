use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for document analysis.
///
/// Every failure is terminal for the current request; there are no
/// retries anywhere in the pipeline. Native text-layer failures never
/// appear here: they are swallowed inside the hybrid extractor and
/// treated as zero-length text.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AnalysisError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Unreadable document: {message}")]
    UnreadableDocument { message: String },

    #[error("Unprocessable content: {message}")]
    UnprocessableContent { message: String },

    #[error("External tool error: {tool} - {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AnalysisError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unreadable_document(message: impl Into<String>) -> Self {
        Self::UnreadableDocument {
            message: message.into(),
        }
    }

    pub fn unprocessable_content(message: impl Into<String>) -> Self {
        Self::UnprocessableContent {
            message: message.into(),
        }
    }

    pub fn external_tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::UnreadableDocument { .. } => "UNREADABLE_DOCUMENT",
            Self::UnprocessableContent { .. } => "UNPROCESSABLE_CONTENT",
            Self::ExternalTool { .. } => "EXTERNAL_TOOL_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::UnreadableDocument { .. } => 422,
            Self::UnprocessableContent { .. } => 422,
            Self::ExternalTool { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }

    /// Caller-facing message. Internal and external-tool failures are
    /// reported opaquely so infrastructure detail never leaks.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::UnreadableDocument { message } => message.clone(),
            Self::UnprocessableContent { message } => message.clone(),
            Self::ExternalTool { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                "Erro interno ao processar o documento.".to_string()
            }
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    #[serde(rename = "detail")]
    pub detail: String,
}

impl From<AnalysisError> for ErrorResponse {
    fn from(error: AnalysisError) -> Self {
        Self {
            code: error.error_code().to_string(),
            detail: error.public_message(),
        }
    }
}
