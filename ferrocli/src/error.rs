//! Error types for ferrocli.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for ferrocli operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Stream engine errors that the driver did not remap
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session-level errors (login, enable, command execution)
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Device profile errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// The device output collected up to the point of failure, if any.
    pub fn data(&self) -> Option<&str> {
        match self {
            Error::Channel(e) => e.data(),
            Error::Driver(e) => e.data(),
            Error::Config(_) => None,
        }
    }

    /// The command that led to this error, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Error::Driver(e) => e.command(),
            _ => None,
        }
    }

    pub fn is_not_connected(&self) -> bool {
        matches!(self, Error::Driver(DriverError::NotConnected { .. }))
    }

    pub fn is_unexpected_result(&self) -> bool {
        matches!(self, Error::Driver(DriverError::UnexpectedResult { .. }))
    }

    pub fn is_login_failed(&self) -> bool {
        matches!(self, Error::Driver(DriverError::LoginFailed { .. }))
    }

    pub fn is_enable_failed(&self) -> bool {
        matches!(self, Error::Driver(DriverError::EnableFailed { .. }))
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, Error::Driver(DriverError::Disconnected { .. }))
    }

    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::Driver(DriverError::CiscoCommandError { .. }))
    }
}

/// Stream engine errors.
///
/// This is the closed set of outcomes a pattern wait can fail with. The
/// driver matches on it explicitly; `Timeout` and `ConnectionLost` are the
/// two kinds it remaps, everything else surfaces unchanged.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// None of the awaited patterns matched before the deadline
    #[error("Expected one of {expecting:?} within {timeout:?}, got {data:?}")]
    Timeout {
        timeout: Duration,
        expecting: Vec<String>,
        data: String,
    },

    /// The remote end closed the stream before any pattern matched
    #[error("Connection lost while expecting one of {expecting:?}, got {data:?}")]
    ConnectionLost { expecting: Vec<String>, data: String },

    /// Write attempted after end of stream
    #[error("Channel closed")]
    Closed,

    /// I/O error on the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ChannelError {
    /// The data accumulated before the failure, if any.
    pub fn data(&self) -> Option<&str> {
        match self {
            ChannelError::Timeout { data, .. } | ChannelError::ConnectionLost { data, .. } => {
                Some(data)
            }
            _ => None,
        }
    }

    /// The patterns that were being awaited, if any.
    pub fn expecting(&self) -> &[String] {
        match self {
            ChannelError::Timeout { expecting, .. }
            | ChannelError::ConnectionLost { expecting, .. } => expecting,
            _ => &[],
        }
    }
}

/// Session errors: the outcome taxonomy of login, enable and command runs.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The session is already known to be closed; nothing was sent
    #[error("Not connected to {device} at the moment")]
    NotConnected { device: String, command: String },

    /// The expected pattern never showed up and the stream stayed open
    #[error("Did not get what we expected. Expected: {expected:?}, got {data:?}")]
    UnexpectedResult {
        command: Option<String>,
        expected: Vec<String>,
        data: String,
    },

    /// The password prompt appeared but the login prompt did not follow
    #[error("Failed to log in to {device}")]
    LoginFailed { device: String, data: String },

    /// The enable password prompt or the privileged prompt never showed up
    #[error("Failed to enter privileged EXEC mode on {device}")]
    EnableFailed { device: String, data: String },

    /// The remote end closed the connection during a command
    #[error("Command '{command}' resulted in a disconnection")]
    Disconnected { command: String, data: String },

    /// The command ran but the device reported an error banner
    #[error(
        "An error was reported by the device \"{device}\" while running the command \"{command}\"\n{error}"
    )]
    CiscoCommandError {
        device: String,
        command: String,
        /// The banner as extracted from the output.
        error: String,
        /// The output with the banner removed.
        output: String,
    },
}

impl DriverError {
    /// The device output collected up to the point of failure.
    pub fn data(&self) -> Option<&str> {
        match self {
            DriverError::NotConnected { .. } => None,
            DriverError::UnexpectedResult { data, .. }
            | DriverError::LoginFailed { data, .. }
            | DriverError::EnableFailed { data, .. }
            | DriverError::Disconnected { data, .. } => Some(data),
            DriverError::CiscoCommandError { output, .. } => Some(output),
        }
    }

    /// The command that led to this error.
    pub fn command(&self) -> Option<&str> {
        match self {
            DriverError::NotConnected { command, .. }
            | DriverError::Disconnected { command, .. }
            | DriverError::CiscoCommandError { command, .. } => Some(command),
            DriverError::UnexpectedResult { command, .. } => command.as_deref(),
            DriverError::LoginFailed { .. } | DriverError::EnableFailed { .. } => None,
        }
    }
}

/// Device profile and derivation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field required by the requested operation is not set
    #[error("Missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A pattern field does not compile
    #[error("Invalid pattern for '{field}': {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    /// A derivation hook could not produce its value
    #[error("Failed to derive '{field}': {message}")]
    Hook { field: &'static str, message: String },

    /// The configuration document could not be parsed
    #[error("Failed to parse device configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias using ferrocli's Error.
pub type Result<T> = std::result::Result<T, Error>;
