//! Error taxonomy for tag resolution and tree assembly.
//!
//! Resolution errors are always fatal to the single `resolve` call. Build
//! errors are split by the caller: per-item failures (one actuator, one alarm)
//! become diagnostics, device-level failures abort the device.

use crate::device::ProtocolFamily;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown tag key '{0}'")]
    UnknownTagKey(String),

    #[error("tag '{key}' has no address format for protocol {family}")]
    UnsupportedProtocolForTag { key: String, family: ProtocolFamily },

    #[error("tag '{key}' references {{{placeholder}}} but no value was supplied")]
    IncompleteAddressContext { key: String, placeholder: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("device '{0}' is not configured")]
    UnknownDevice(String),

    #[error("unsupported actuator type '{0}'")]
    UnsupportedActuatorType(String),

    #[error("protocol {0} has no driver")]
    UnsupportedProtocolFamily(ProtocolFamily),

    #[error("malformed alarm path '{path}': {reason}")]
    MalformedAlarmPath { path: String, reason: String },

    #[error("no rows for {0}")]
    EmptyGroup(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors raised while loading or validating a tag template table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("tag table row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("tag '{key}' ({family}) uses unknown placeholder {{{placeholder}}}")]
    UnknownPlaceholder {
        key: String,
        family: ProtocolFamily,
        placeholder: String,
    },

    #[error("duplicate tag key '{0}'")]
    DuplicateKey(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
