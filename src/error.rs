use crate::{
    client::{Direction, State},
    protocol::{AuthMethod, Reply},
};

/// The library's error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("connect({addr}): {source}")]
    Transport {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connect({0}): timed out")]
    ConnectTimeout(String),

    #[error("{0} is not a valid IPv4 address")]
    InvalidInterface(String),
    #[error("At least one authentication method must be registered")]
    NoAuthMethods,
    #[error("{0} too long: {1} bytes, at most 255 allowed")]
    FieldTooLong(&'static str, usize),
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Soft-timeout while {0}")]
    SoftTimeout(Direction),
    #[error("Hard-timeout while {0}")]
    HardTimeout(Direction),
    #[error("Writing short {0} bytes")]
    ShortWrite(usize),

    #[error("Invalid SOCKS version: {0:#x}")]
    InvalidVersion(u8),
    #[error("Short reply: expected {expected} bytes, received {received}")]
    ShortReply { expected: usize, received: usize },
    #[error("Server does not accept any client method")]
    NoAcceptableMethods,
    #[error("Server method {0} not available to client")]
    MethodUnavailable(AuthMethod),

    #[error("Proxy rejected CONNECT: {0}")]
    Rejected(Reply),

    #[error("Unable to resolve {0}")]
    Resolve(String),

    #[error("Invalid authentication version of subnegotiation: {0:#x}")]
    InvalidAuthSubnegotiation(u8),
    #[error("Unsuccessful login, authentication status: {0:#x}")]
    InvalidAuthStatus(u8),

    #[error("Dead socket")]
    NotConnected,
    #[error("Operation not allowed in state {0}")]
    InvalidState(State),
}

impl Error {
    /// Whether the error was caused by an expired connect or I/O deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::SoftTimeout(_) | Error::HardTimeout(_) | Error::ConnectTimeout(_))
    }
}

/// The library's `Result` type alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
