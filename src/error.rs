//! Error types shared by the gateway, engine and stores

use thiserror::Error;

/// Exchange response code for "insufficient margin"
pub const CODE_INSUFFICIENT_MARGIN: i64 = 20003;

/// Exchange response code for "price above the maximum buy price"
pub const CODE_PRICE_LIMIT: i64 = 30014;

/// Failures talking to the exchange
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network failure, timeout, non-2xx status or undecodable body
    #[error("transport failure: {0}")]
    Transport(String),

    /// The exchange answered with a non-zero code
    #[error("exchange rejected request (code {code}): {msg}")]
    Rejected { code: i64, msg: String },

    #[error("missing API credentials: {0}")]
    MissingCredentials(&'static str),
}

impl GatewayError {
    pub fn rejection_code(&self) -> Option<i64> {
        match self {
            GatewayError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_insufficient_margin(&self) -> bool {
        self.rejection_code() == Some(CODE_INSUFFICIENT_MARGIN)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(format!("invalid JSON: {}", err))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Invalid ladder bounds or shape
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("bounds must satisfy lowest_buy < highest_buy < highest_sell (got {lowest_buy} / {highest_buy} / {highest_sell})")]
    InvalidBounds {
        lowest_buy: String,
        highest_buy: String,
        highest_sell: String,
    },

    #[error("total_levels must be >= 4 (got {0})")]
    TooFewLevels(usize),

    #[error("buy_fraction must be in (0, 1) (got {0})")]
    InvalidBuyFraction(f64),
}

/// Reasons a tick ends without producing a result
#[derive(Debug, Error)]
pub enum TickError {
    #[error("price cap unavailable for {0}; tick aborted")]
    CapUnavailable(String),

    /// The plan was built for another instrument than the configured one
    #[error("plan is for {plan} but config trades {config}; run make-plan or configure --symbol {plan}")]
    SymbolMismatch { plan: String, config: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("plan store is locked by another process ({0})")]
    Locked(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn yaml(path: &std::path::Path, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.display().to_string(),
            source,
        }
    }
}
