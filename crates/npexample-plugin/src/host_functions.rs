//! Services the host exposes to the plugin.
//!
//! The plugin consumes exactly two: setting an instance property and
//! reporting a status line. [`HostFunctions`] is the seam; the C ABI backs
//! it with the browser's `NPNetscapeFuncs`, tests back it with a fake.

use std::sync::Arc;

use crate::error::{NpErrorCode, PluginError};
use crate::instance::InstanceHandle;

/// Status line reported when an instance comes up.
pub const GREETING: &str = "Hello, world!";

/// A per-instance setting the plugin asks the host to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceSetting {
    /// `NPPVpluginWindowBool`: whether the instance wants its own window.
    Windowed(bool),
}

impl InstanceSetting {
    /// The NPAPI `NPPVariable` this setting is sent as.
    pub fn variable(&self) -> i32 {
        match self {
            Self::Windowed(_) => 3,
        }
    }
}

/// The host's function table, as far as this plugin uses it.
pub trait HostFunctions: Send + Sync {
    /// Apply a setting to an instance. An `Err` carries the host's code.
    fn set_value(
        &self,
        instance: InstanceHandle,
        setting: InstanceSetting,
    ) -> Result<(), NpErrorCode>;

    /// Show a status message for an instance.
    fn status(&self, instance: InstanceHandle, message: &str);
}

/// Shared handle to the host's services, held by the module for its whole
/// lifetime.
#[derive(Clone)]
pub struct HostContext {
    host: Arc<dyn HostFunctions>,
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext").finish_non_exhaustive()
    }
}

impl HostContext {
    pub fn new(host: Arc<dyn HostFunctions>) -> Self {
        Self { host }
    }

    /// Ask the host to run `instance` without a native window.
    pub fn make_windowless(&self, instance: InstanceHandle) -> Result<(), PluginError> {
        self.host
            .set_value(instance, InstanceSetting::Windowed(false))
            .map_err(|code| {
                tracing::warn!(
                    instance = %instance,
                    code = %code,
                    "host refused windowless mode"
                );
                PluginError::HostRejectedConfiguration(code)
            })
    }

    pub fn report_status(&self, instance: InstanceHandle, message: &str) {
        tracing::debug!(instance = %instance, status = message, "reporting status");
        self.host.status(instance, message);
    }
}
