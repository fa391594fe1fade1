//! Error types for the traffic-shield service

/// Errors that can occur in the traffic-shield service
#[derive(Debug, thiserror::Error)]
pub enum TrafficShieldError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Dashboard error: {0}")]
    Dashboard(String),
}

/// Result type alias for traffic-shield operations
pub type Result<T> = std::result::Result<T, TrafficShieldError>;
