//! Custom error types for the node monitor
//!
//! Each collaborator boundary has its own error enum so callers can branch on
//! the kind of failure (e.g. a refused connection) instead of parsing text.

use std::fmt;

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Configuration parsing error
    ParseError { reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },
}

/// Errors returned by the node JSON-RPC client
#[derive(Debug, Clone, PartialEq)]
pub enum NodeError {
    /// The node refused (or could not accept) the TCP connection
    ConnectionRefused { endpoint: String },

    /// Request timed out
    Timeout { endpoint: String, method: String },

    /// Any other transport-level failure
    Transport { endpoint: String, reason: String },

    /// Node answered with a non-success HTTP status
    Http { status: u16, method: String },

    /// Node answered with a JSON-RPC error object
    Rpc { code: i64, message: String },

    /// Response could not be decoded
    InvalidResponse { method: String, reason: String },

    /// Node has no block at the requested height
    BlockNotFound { number: u64 },
}

/// Errors returned by the block explorer client
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerError {
    /// Explorer could not be reached
    Transport { url: String, reason: String },

    /// Explorer answered with a non-success HTTP status
    Http { status: u16 },

    /// Response could not be decoded
    InvalidResponse { reason: String },
}

/// Failure of a single connection attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectError {
    /// Chain identity could not be queried
    Node(NodeError),

    /// Node reported a chain outside the supported set
    UnsupportedChain(String),

    /// Explorer client for the resolved chain could not be built
    Explorer(ExplorerError),
}

/// Errors returned by the service registry client
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Registry agent could not be reached
    Transport { address: String, reason: String },

    /// Registry rejected the registration
    Rejected { status: u16, body: String },
}

impl NodeError {
    /// True when the failure means the node's transport is down
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, NodeError::ConnectionRefused { .. })
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::ConnectionRefused { endpoint } => {
                write!(f, "Connection refused by node at {}", endpoint)
            }
            NodeError::Timeout { endpoint, method } => {
                write!(f, "Timeout while calling {} on {}", method, endpoint)
            }
            NodeError::Transport { endpoint, reason } => {
                write!(f, "Request to {} failed: {}", endpoint, reason)
            }
            NodeError::Http { status, method } => {
                write!(f, "HTTP error {} from node on {}", status, method)
            }
            NodeError::Rpc { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            NodeError::InvalidResponse { method, reason } => {
                write!(f, "Invalid response to {}: {}", method, reason)
            }
            NodeError::BlockNotFound { number } => {
                write!(f, "Block {} not found", number)
            }
        }
    }
}

impl fmt::Display for ExplorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorerError::Transport { url, reason } => {
                write!(f, "Explorer request to {} failed: {}", url, reason)
            }
            ExplorerError::Http { status } => {
                write!(f, "Explorer returned HTTP {}", status)
            }
            ExplorerError::InvalidResponse { reason } => {
                write!(f, "Invalid explorer response: {}", reason)
            }
        }
    }
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::Node(e) => write!(f, "{}", e),
            ConnectError::UnsupportedChain(chain) => write!(
                f,
                "Chain {} not found. 'kovan' and 'foundation' are the only valid options",
                chain
            ),
            ConnectError::Explorer(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Transport { address, reason } => {
                write!(f, "Failed to reach registry at {}: {}", address, reason)
            }
            RegistryError::Rejected { status, body } => {
                write!(f, "Registry rejected registration ({}): {}", status, body)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for NodeError {}
impl std::error::Error for ExplorerError {}
impl std::error::Error for ConnectError {}
impl std::error::Error for RegistryError {}

impl From<NodeError> for ConnectError {
    fn from(err: NodeError) -> Self {
        ConnectError::Node(err)
    }
}
