//! Plugin error types and their NPAPI result codes.

use std::fmt;

use thiserror::Error;

use crate::instance::InstanceHandle;

/// An NPAPI `NPError` value as exchanged with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NpErrorCode(pub i16);

impl NpErrorCode {
    pub const NO_ERROR: Self = Self(0);
    pub const GENERIC_ERROR: Self = Self(1);
    pub const INVALID_INSTANCE_ERROR: Self = Self(2);
    pub const INVALID_FUNCTABLE_ERROR: Self = Self(3);
    pub const MODULE_LOAD_FAILED_ERROR: Self = Self(4);
    pub const OUT_OF_MEMORY_ERROR: Self = Self(5);
    pub const INVALID_PLUGIN_ERROR: Self = Self(6);
    pub const INVALID_PLUGIN_DIR_ERROR: Self = Self(7);
    pub const INCOMPATIBLE_VERSION_ERROR: Self = Self(8);
    pub const INVALID_PARAM: Self = Self(9);

    pub fn is_ok(self) -> bool {
        self == Self::NO_ERROR
    }

    fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "NPERR_NO_ERROR",
            1 => "NPERR_GENERIC_ERROR",
            2 => "NPERR_INVALID_INSTANCE_ERROR",
            3 => "NPERR_INVALID_FUNCTABLE_ERROR",
            4 => "NPERR_MODULE_LOAD_FAILED_ERROR",
            5 => "NPERR_OUT_OF_MEMORY_ERROR",
            6 => "NPERR_INVALID_PLUGIN_ERROR",
            7 => "NPERR_INVALID_PLUGIN_DIR_ERROR",
            8 => "NPERR_INCOMPATIBLE_VERSION_ERROR",
            9 => "NPERR_INVALID_PARAM",
            _ => return None,
        })
    }
}

impl fmt::Display for NpErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "NPError {}", self.0),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("host rejected instance configuration: {0}")]
    HostRejectedConfiguration(NpErrorCode),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("unknown property: {0}")]
    UnknownProperty(i32),

    #[error("plugin module is not initialized")]
    NotInitialized,

    #[error("invalid instance: {0}")]
    InvalidInstance(InstanceHandle),

    #[error("incompatible host: {0}")]
    IncompatibleHost(String),

    #[error("invalid MIME description: {0}")]
    InvalidDescriptor(String),
}

impl PluginError {
    /// The code reported to the host for this error.
    ///
    /// A rejected configuration hands back the host's own code unchanged.
    pub fn np_error(&self) -> NpErrorCode {
        match self {
            Self::HostRejectedConfiguration(code) => *code,
            Self::UnsupportedOperation(_) => NpErrorCode::GENERIC_ERROR,
            Self::UnknownProperty(_) | Self::InvalidDescriptor(_) => NpErrorCode::INVALID_PARAM,
            Self::NotInitialized => NpErrorCode::INVALID_FUNCTABLE_ERROR,
            Self::InvalidInstance(_) => NpErrorCode::INVALID_INSTANCE_ERROR,
            Self::IncompatibleHost(_) => NpErrorCode::INCOMPATIBLE_VERSION_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Display messages ──────────────────────────────────────────────

    #[test]
    fn test_display_host_rejected() {
        let err = PluginError::HostRejectedConfiguration(NpErrorCode::INVALID_PARAM);
        assert_eq!(
            err.to_string(),
            "host rejected instance configuration: NPERR_INVALID_PARAM (9)"
        );
    }

    #[test]
    fn test_display_unsupported() {
        let err = PluginError::UnsupportedOperation("windowed rendering");
        assert_eq!(err.to_string(), "unsupported operation: windowed rendering");
    }

    #[test]
    fn test_display_unknown_property() {
        let err = PluginError::UnknownProperty(14);
        assert_eq!(err.to_string(), "unknown property: 14");
    }

    #[test]
    fn test_display_invalid_instance() {
        let err = PluginError::InvalidInstance(InstanceHandle(0x10));
        assert_eq!(err.to_string(), "invalid instance: 0x10");
    }

    #[test]
    fn test_display_unnamed_code() {
        assert_eq!(NpErrorCode(-3).to_string(), "NPError -3");
    }

    // ── Result codes ──────────────────────────────────────────────────

    #[test]
    fn test_host_code_passes_through_verbatim() {
        let err = PluginError::HostRejectedConfiguration(NpErrorCode(42));
        assert_eq!(err.np_error(), NpErrorCode(42));
    }

    #[test]
    fn test_taxonomy_codes() {
        assert_eq!(
            PluginError::UnsupportedOperation("x").np_error(),
            NpErrorCode::GENERIC_ERROR
        );
        assert_eq!(
            PluginError::UnknownProperty(99).np_error(),
            NpErrorCode::INVALID_PARAM
        );
        assert_eq!(
            PluginError::NotInitialized.np_error(),
            NpErrorCode::INVALID_FUNCTABLE_ERROR
        );
        assert_eq!(
            PluginError::InvalidInstance(InstanceHandle(1)).np_error(),
            NpErrorCode::INVALID_INSTANCE_ERROR
        );
        assert_eq!(
            PluginError::IncompatibleHost("table too small".into()).np_error(),
            NpErrorCode::INCOMPATIBLE_VERSION_ERROR
        );
    }

    #[test]
    fn test_no_error_is_ok() {
        assert!(NpErrorCode::NO_ERROR.is_ok());
        assert!(!NpErrorCode::GENERIC_ERROR.is_ok());
    }

    // ── Error trait source chain ──────────────────────────────────────

    #[test]
    fn test_error_source_is_none() {
        use std::error::Error;
        let err = PluginError::NotInitialized;
        assert!(err.source().is_none());
    }
}
