//! npexample plugin core
//!
//! Host-agnostic half of a windowless NPAPI plugin. The browser drives the
//! plugin through a fixed lifecycle (initialize, create instance, deliver
//! events, destroy instance, shut down); this crate implements that
//! lifecycle against two injected capabilities: the host's function table
//! ([`HostFunctions`]) and its graphics service ([`GraphicsBackend`]).
//! The C ABI lives in the `npexample-ffi` crate.

pub mod descriptor;
pub mod entry;
pub mod error;
pub mod events;
pub mod host_functions;
pub mod instance;
pub mod registry;
pub mod render;

pub use descriptor::{
    describe, format_mime_description, parse_mime_description, supported_mime_types, MimeType,
    MIME_DESCRIPTION, MIME_DESCRIPTION_C, PLUGIN_DESCRIPTION, PLUGIN_NAME,
};
pub use entry::{PluginFuncs, PluginVariable, StreamType, WindowDescriptor};
pub use error::{NpErrorCode, PluginError};
pub use events::{DisplayHandle, DrawableHandle, ExposeEvent, PlatformEvent, RawExpose, Rect};
pub use host_functions::{HostContext, HostFunctions, InstanceSetting, GREETING};
pub use instance::{CreationArgs, InstanceHandle, InstanceMode, InstanceState, SavedData};
pub use registry::{plugin_property, ModuleSlot, PluginModule};
pub use render::{
    Colormap, DrawOutcome, GcHandle, GraphicsBackend, Pixel, Renderer, Rgb, SkipReason,
};
