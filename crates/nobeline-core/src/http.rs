//! Blocking JSON-over-HTTP access backed by a shared async client.
//!
//! Uses async reqwest internally with `tokio::time::timeout` for stall
//! detection, but presents a sync interface so the pagination loop stays a
//! plain loop.

use std::io;
use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("nobeline/", env!("CARGO_PKG_VERSION"));

/// Error types for HTTP operations
#[derive(Debug)]
pub enum StreamError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// I/O error (including read timeouts)
    Io(std::io::Error),
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for StreamError {}

impl StreamError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::Io(_) => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            // 408/429 = back off and ask again, 5xx = server side hiccup,
            // no status = connection level failure
            Self::Http { status, .. } => match status {
                None => true,
                Some(408 | 429) => true,
                Some(s) => *s >= 500,
            },
            Self::Io(e) => e.kind() != io::ErrorKind::StorageFull,
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Process-wide HTTP tuning, set once from CLI/config at startup.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Maximum time to wait for a full response
    pub read_timeout: Duration,
    /// Retry attempts for transient failures
    pub max_retries: u32,
    /// Pause between consecutive page requests
    pub page_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(30),
            max_retries: 3,
            page_delay: Duration::from_millis(200),
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install the global HTTP configuration. Only the first call wins.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::debug!("HTTP config already set, ignoring override");
    }
}

/// Current HTTP configuration (defaults if never set).
pub fn http_config() -> &'static HttpConfig {
    HTTP_CONFIG.get_or_init(HttpConfig::default)
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP GET `url` with `query` parameters and return the body as text.
///
/// Non-2xx responses become [`StreamError::Http`] with the status code.
/// The whole exchange is bounded by [`HttpConfig::read_timeout`].
pub fn get_text(url: &str, query: &[(String, String)]) -> Result<String, StreamError> {
    let timeout = http_config().read_timeout;

    SHARED_RUNTIME.handle().block_on(async {
        let request = async {
            let response = http_client()
                .get(url)
                .query(query)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?
                .error_for_status()?;
            response.text().await
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result.map_err(|e| StreamError::from_reqwest(&e)),
            Err(_) => Err(StreamError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no response within {}s", timeout.as_secs()),
            ))),
        }
    })
}
