//! Default values used when neither the config file nor the environment
//! sets a field.

/// Local backend address.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Answers stream for a while; the request timeout covers the whole body.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_LOG_LEVEL: &str = "info";
