//! Client error taxonomy.
//!
//! Every asynchronous boundary converts its failure into a `ClientError`
//! before it reaches presentation code.

use std::time::Duration;

use thiserror::Error;

use crate::api::ApiError;

/// Generic message when the server gave none.
pub const GENERIC_NETWORK_MESSAGE: &str = "서버와 통신하는 중 오류가 발생했습니다.";
/// Shown when an analysis response carries no id.
pub const MISSING_RESULT_MESSAGE: &str = "분석 결과를 받지 못했습니다.";
/// Shown when the results view cannot load a result.
pub const RESULT_UNAVAILABLE_MESSAGE: &str = "분석 결과를 불러올 수 없습니다.";

/// Client-detected input problems. Never sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("파일을 선택해주세요.")]
    NoFile,

    #[error("PDF 파일만 업로드 가능합니다.")]
    NotPdf,

    #[error("파일이 비어있습니다.")]
    EmptyFile,

    #[error("파일을 읽을 수 없습니다: {0}")]
    Unreadable(String),

    /// A submission is already pending.
    #[error("분석이 이미 진행 중입니다.")]
    Busy,
}

/// Errors surfaced to presentation code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    #[error("요청 시간이 초과되었습니다 ({}초).", .after.as_secs())]
    Timeout { after: Duration },

    #[error("{message}")]
    ResultUnavailable { id: String, message: String },
}

impl ClientError {
    /// Localized text shown to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Results view failure for `id`, keeping the underlying cause in the log only.
    pub fn unavailable(id: &str, cause: &ClientError) -> Self {
        tracing::warn!("Result {} unavailable: {}", id, cause);
        ClientError::ResultUnavailable {
            id: id.to_string(),
            message: RESULT_UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Timeout { after } => ClientError::Timeout { after },
            ApiError::Network { status, message } => ClientError::Network {
                status,
                message: message.unwrap_or_else(|| GENERIC_NETWORK_MESSAGE.to_string()),
            },
            ApiError::Decode { status, detail } => {
                tracing::debug!("Undecodable response ({}): {}", status, detail);
                ClientError::Network {
                    status: Some(status),
                    message: GENERIC_NETWORK_MESSAGE.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_preferred() {
        let err: ClientError = ApiError::Network {
            status: Some(500),
            message: Some("PDF 파싱 실패".to_string()),
        }
        .into();
        assert_eq!(err.user_message(), "PDF 파싱 실패");
    }

    #[test]
    fn test_generic_message_fallback() {
        let err: ClientError = ApiError::Network {
            status: None,
            message: None,
        }
        .into();
        assert_eq!(err.user_message(), GENERIC_NETWORK_MESSAGE);
    }

    #[test]
    fn test_timeout_is_distinct() {
        let err: ClientError = ApiError::Timeout {
            after: Duration::from_secs(120),
        }
        .into();
        assert!(matches!(err, ClientError::Timeout { .. }));
        assert!(err.user_message().contains("120"));
    }

    #[test]
    fn test_validation_wraps() {
        let err: ClientError = ValidationError::NotPdf.into();
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "PDF 파일만 업로드 가능합니다.");
    }
}
