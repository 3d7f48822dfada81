use thiserror::Error;

/// Typed errors surfaced by the engine.
///
/// Upstream failures are scoped to the single frame or report request that
/// hit them; they never tear down the owning session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("analysis already active on connection {connection}")]
    AlreadyActive { connection: String },

    #[error("no active analysis session on connection {connection}")]
    NoActiveSession { connection: String },

    #[error("inference service unavailable: {message}")]
    Upstream { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "RoomSession",
            id: id.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Stable machine-readable code carried by live-protocol error events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyActive { .. } => "already_active",
            Self::NoActiveSession { .. } => "no_active_session",
            Self::Upstream { .. } => "upstream_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(EngineError::validation("x").code(), "validation_error");
        assert_eq!(EngineError::session_not_found("abc").code(), "not_found");
        assert_eq!(
            EngineError::NoActiveSession {
                connection: "c".into()
            }
            .code(),
            "no_active_session"
        );
        assert_eq!(EngineError::upstream("down").code(), "upstream_unavailable");
    }
}
