//! Error type for a single page fetch

use crate::http::StreamError;

/// Error from fetching one page of an API listing.
///
/// Wraps a network/HTTP error ([`StreamError`]), an undecodable response
/// body, or a local I/O error.
#[derive(Debug)]
pub enum FetchError {
    Stream(StreamError),
    Decode { offset: usize, message: String },
    Io(std::io::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(e) => write!(f, "{e}"),
            Self::Decode { offset, message } => {
                write!(f, "invalid page at offset {offset}: {message}")
            }
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stream(e) => Some(e),
            Self::Decode { .. } => None,
            Self::Io(e) => Some(e),
        }
    }
}

impl From<StreamError> for FetchError {
    fn from(e: StreamError) -> Self {
        Self::Stream(e)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Stream(e) => e.is_retryable(),
            // The server answered; asking again yields the same body
            Self::Decode { .. } => false,
            Self::Io(e) => e.kind() != std::io::ErrorKind::StorageFull,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    fn http_err(status: u16) -> StreamError {
        StreamError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn fetch_error_stream_404_not_retryable() {
        let err = FetchError::Stream(http_err(404));
        assert!(!err.is_retryable());
    }

    #[test]
    fn fetch_error_stream_502_retryable() {
        let err = FetchError::from(http_err(502));
        assert!(err.is_retryable());
    }

    #[test]
    fn fetch_error_decode_not_retryable() {
        let err = FetchError::Decode {
            offset: 25,
            message: "expected value".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(
            format!("{err}"),
            "invalid page at offset 25: expected value"
        );
    }

    #[test]
    fn fetch_error_io_storage_full_not_retryable() {
        let err = FetchError::Io(std::io::Error::new(ErrorKind::StorageFull, "disk full"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn fetch_error_io_other_retryable() {
        let err = FetchError::from(std::io::Error::new(ErrorKind::BrokenPipe, "pipe"));
        assert!(err.is_retryable());
    }

    #[test]
    fn fetch_error_display_io() {
        let err = FetchError::Io(std::io::Error::new(ErrorKind::NotFound, "not found"));
        assert!(format!("{err}").contains("IO:"));
    }
}
