//! The operations the plugin publishes to the host.
//!
//! In NPAPI these are the `NPPluginFuncs` slots the host calls back into.
//! [`PluginFuncs`] has one method per slot the plugin fills; the C ABI
//! binds each slot to a thin shim that forwards here.

use std::ffi::CStr;

use crate::error::PluginError;
use crate::events::PlatformEvent;
use crate::instance::{CreationArgs, InstanceHandle, InstanceMode, SavedData};

/// Property identifiers the host may query (`NPPVariable`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginVariable {
    NameString,
    DescriptionString,
    Other(i32),
}

impl From<i32> for PluginVariable {
    fn from(raw: i32) -> Self {
        match raw {
            1 => Self::NameString,
            2 => Self::DescriptionString,
            other => Self::Other(other),
        }
    }
}

impl PluginVariable {
    pub fn raw(self) -> i32 {
        match self {
            Self::NameString => 1,
            Self::DescriptionString => 2,
            Self::Other(raw) => raw,
        }
    }
}

/// Delivery mode acknowledged for a new stream (`NP_NORMAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Normal,
}

impl StreamType {
    pub fn raw(self) -> u16 {
        match self {
            Self::Normal => 1,
        }
    }
}

/// What the host says about a native window. Never used: the plugin is
/// windowless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowDescriptor {
    pub window: usize,
    pub width: u32,
    pub height: u32,
}

/// One method per entry-point slot.
pub trait PluginFuncs {
    /// `newp`: bring up an instance.
    fn new_instance(
        &self,
        mime_type: &str,
        instance: InstanceHandle,
        mode: InstanceMode,
        args: &CreationArgs,
    ) -> Result<(), PluginError>;

    /// `destroy`: tear an instance down.
    fn destroy(&self, instance: InstanceHandle) -> Result<Option<SavedData>, PluginError>;

    /// `newstream`: acknowledge a stream without reading it.
    fn new_stream(
        &self,
        instance: InstanceHandle,
        mime_type: &str,
    ) -> Result<StreamType, PluginError>;

    /// `destroystream`: acknowledge the end of a stream.
    fn destroy_stream(&self, instance: InstanceHandle, reason: i16) -> Result<(), PluginError>;

    /// `setwindow`: windowed operation is not supported.
    fn set_window(
        &self,
        instance: InstanceHandle,
        window: &WindowDescriptor,
    ) -> Result<(), PluginError>;

    /// `getvalue`: look up a plugin property.
    fn get_value(
        &self,
        instance: InstanceHandle,
        variable: PluginVariable,
    ) -> Result<&'static CStr, PluginError>;

    /// `event`: returns whether the event was handled.
    fn handle_event(&self, instance: InstanceHandle, event: &PlatformEvent) -> bool;
}
