use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `artificer`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ArtificerError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Action gateway / remote game API ────────────────────────────────
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),

    // ── Fatal in-game action failure ────────────────────────────────────
    #[error("action: {0}")]
    Action(#[from] ActionError),

    // ── Planning / replanning oracle ────────────────────────────────────
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Gateway (transport-level) errors ───────────────────────────────────────

/// Failures of the HTTP transport itself, as opposed to structured in-game
/// failures the server reports inside a well-formed response body.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("response from {endpoint} could not be decoded: {message}")]
    Decode { endpoint: String, message: String },

    #[error("game API token not set (set ARTIFICER_TOKEN or edit config.toml)")]
    MissingToken,
}

// ─── Fatal action errors ────────────────────────────────────────────────────

/// A domain failure the default recovery policy classifies as fatal. These
/// unwind the control loop immediately; the replanner is never consulted.
#[derive(Debug, Error)]
#[error("{action} failed with code {code}: {message}")]
pub struct ActionError {
    pub action: String,
    pub code: i32,
    pub message: String,
}

// ─── Oracle errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{role} oracle request failed: {message}")]
    Request { role: &'static str, message: String },

    #[error("{role} oracle returned malformed output: {message}")]
    Malformed { role: &'static str, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ArtificerError>;
