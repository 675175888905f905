//! Error types for netlink operations.
//!
//! Each protocol layer has its own error enum; [`Error`] wraps them so the
//! public API only ever returns one type.

use std::io;
use std::time::Duration;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Socket-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to create netlink socket: {0}")]
    SocketCreation(#[source] io::Error),

    #[error("failed to bind netlink socket: {0}")]
    Bind(#[source] io::Error),

    #[error("failed to send netlink message: {0}")]
    Send(#[source] io::Error),

    #[error("failed to receive netlink message: {0}")]
    Receive(#[source] io::Error),

    #[error("failed to change membership of multicast group {group}: {source}")]
    Membership {
        group: u32,
        #[source]
        source: io::Error,
    },

    /// Datagram was larger than the receive buffer and got cut off.
    #[error("netlink datagram of {len} bytes exceeds {capacity}-byte receive buffer")]
    Truncated { len: usize, capacity: usize },
}

impl TransportError {
    /// The OS errno behind this failure, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::SocketCreation(e) | Self::Bind(e) | Self::Send(e) | Self::Receive(e) => {
                e.raw_os_error()
            }
            Self::Membership { source, .. } => source.raw_os_error(),
            Self::Truncated { .. } => Some(libc::EMSGSIZE),
        }
    }
}

/// Netlink message header framing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    /// Fewer bytes than a header remain at `offset`.
    #[error("truncated message at offset {offset}")]
    Truncated { offset: usize },

    /// Header at `offset` declares an impossible length.
    #[error("invalid message length {length} at offset {offset}")]
    InvalidLength { offset: usize, length: usize },

    /// Payload too short for the sub-header it must carry.
    #[error("{what} too short: need {expected} bytes, got {actual}")]
    ShortPayload {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// TLV attribute decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// Declared length overruns the buffer (or undercuts the header).
    #[error("malformed attribute at offset {offset}")]
    Malformed { offset: usize },

    /// Attribute would not fit the 16-bit length field.
    #[error("attribute too long: {len} bytes")]
    TooLong { len: usize },

    /// A required field was not present in the attribute stream.
    #[error("field not found: {0}")]
    FieldNotFound(&'static str),

    /// Payload size does not fit the field's codec.
    #[error("field {name} corrupted: expected {expected} bytes, got {actual}")]
    ValueCorrupted {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A decoded field held a different kind of value than requested.
    #[error("field {name} has unexpected value kind")]
    UnexpectedValue { name: &'static str },

    /// String payload was not valid UTF-8.
    #[error("field {name} is not valid UTF-8")]
    InvalidString { name: &'static str },
}

/// Generic Netlink protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The controller could not resolve a family (e.g. module not loaded).
    /// `errno` is positive.
    #[error("unknown generic netlink family: {name} (errno {errno})")]
    UnknownFamily { name: String, errno: i32 },

    /// Kernel returned an error message.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// Positive errno value.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Response carried a command we did not ask for.
    #[error("unexpected command in response: expected {expected}, got {actual}")]
    UnexpectedCommand { expected: u8, actual: u8 },

    /// Family does not expose the multicast group we need.
    #[error("family {family} has no multicast group {group:?}")]
    MissingMulticastGroup { family: String, group: String },
}

/// Scan workflow failures.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// No completion event arrived before the deadline.
    #[error("scan timed out after {0:?}")]
    TimedOut(Duration),

    /// Adapter cannot scan (EOPNOTSUPP).
    #[error("interface does not support scanning")]
    NotSupported,

    /// A scan is already running on the device (EBUSY).
    #[error("a scan is already in progress")]
    AlreadyInProgress,

    /// Kernel aborted the scan (NL80211_CMD_SCAN_ABORTED).
    #[error("scan aborted on interface {ifindex}")]
    Aborted { ifindex: u32 },

    /// Kernel rejected a scan command.
    #[error("scan command {command} failed: {message} (errno {errno})")]
    Kernel {
        command: u8,
        errno: i32,
        message: String,
    },
}

impl ScanError {
    /// Map a (negative) kernel errno returned for `command`.
    pub fn from_errno(errno: i32, command: u8) -> Self {
        match -errno {
            libc::EOPNOTSUPP => Self::NotSupported,
            libc::EBUSY => Self::AlreadyInProgress,
            e => Self::Kernel {
                command,
                errno: e,
                message: io::Error::from_raw_os_error(e).to_string(),
            },
        }
    }
}

/// Errors that can occur during netlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Interface not found.
    #[error("interface not found: {name}")]
    InterfaceNotFound {
        /// The interface name that was not found.
        name: String,
    },

    /// Invalid user-supplied value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Other I/O error (sysfs reads and similar).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a kernel error from a (negative) errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        ProtocolError::Kernel {
            errno: -errno,
            message,
        }
        .into()
    }

    /// Get the (positive) errno value if this error carries one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Protocol(ProtocolError::Kernel { errno, .. })
            | Self::Protocol(ProtocolError::UnknownFamily { errno, .. })
            | Self::Scan(ScanError::Kernel { errno, .. }) => Some(*errno),
            Self::Scan(ScanError::NotSupported) => Some(libc::EOPNOTSUPP),
            Self::Scan(ScanError::AlreadyInProgress) => Some(libc::EBUSY),
            Self::Transport(e) => e.raw_os_error(),
            Self::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, unknown family, ...).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::InterfaceNotFound { .. } | Self::Protocol(ProtocolError::UnknownFamily { .. }) => {
                true
            }
            _ => matches!(self.errno(), Some(libc::ENOENT | libc::ENODEV)),
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.errno(), Some(libc::EPERM | libc::EACCES))
    }

    /// Check if this is a "device busy" error (EBUSY).
    pub fn is_busy(&self) -> bool {
        self.errno() == Some(libc::EBUSY)
    }

    /// Check if the scan deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Scan(ScanError::TimedOut(_)))
    }
}
