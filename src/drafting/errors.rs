use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction service still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("malformed extraction response: {0}")]
    Malformed(String),

    #[error("extraction service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("extraction blocked: {0}")]
    Blocked(String),

    #[error("extraction client misconfigured: {0}")]
    Config(String),
}

impl ExtractionError {
    /// HTTP 429 or a provider `RESOURCE_EXHAUSTED` status.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            ExtractionError::Api { status, message } => {
                *status == 429 || message.contains("RESOURCE_EXHAUSTED")
            }
            _ => false,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExtractionError::Malformed(err.to_string())
        } else {
            ExtractionError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        let too_many = ExtractionError::Api {
            status: 429,
            message: "Too Many Requests".into(),
        };
        let exhausted = ExtractionError::Api {
            status: 503,
            message: "RESOURCE_EXHAUSTED: quota exceeded".into(),
        };
        let server = ExtractionError::Api {
            status: 500,
            message: "INTERNAL".into(),
        };

        assert!(too_many.is_rate_limit());
        assert!(exhausted.is_rate_limit());
        assert!(!server.is_rate_limit());
        assert!(!ExtractionError::Malformed("x".into()).is_rate_limit());
    }

    #[test]
    fn test_rate_limited_message() {
        let err = ExtractionError::RateLimited { attempts: 4 };
        assert_eq!(
            err.to_string(),
            "extraction service still rate limited after 4 attempts"
        );
    }
}
