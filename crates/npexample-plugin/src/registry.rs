//! Plugin module and instance registry.
//!
//! `PluginModule` is the loaded plugin: it owns the host context, the
//! renderer, and the set of live instances, and implements every entry
//! point. `ModuleSlot` is the process-wide place the C ABI keeps it between
//! `NP_Initialize` and `NP_Shutdown`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::{Arc, PoisonError, RwLock};

use crate::descriptor::{PLUGIN_DESCRIPTION, PLUGIN_NAME};
use crate::entry::{PluginFuncs, PluginVariable, StreamType, WindowDescriptor};
use crate::error::PluginError;
use crate::events::PlatformEvent;
use crate::host_functions::{HostContext, HostFunctions, GREETING};
use crate::instance::{CreationArgs, InstanceHandle, InstanceMode, InstanceState, SavedData};
use crate::render::{DrawOutcome, GraphicsBackend, Renderer};

/// Look up a plugin property. Needs no instance and no initialization.
pub fn plugin_property(variable: PluginVariable) -> Result<&'static CStr, PluginError> {
    match variable {
        PluginVariable::NameString => Ok(PLUGIN_NAME),
        PluginVariable::DescriptionString => Ok(PLUGIN_DESCRIPTION),
        PluginVariable::Other(raw) => Err(PluginError::UnknownProperty(raw)),
    }
}

// ─── Module ─────────────────────────────────────────────────────────────

/// The loaded plugin.
///
/// An instance is `Active` while it has an entry in `instances`; absent
/// handles are either not yet created or already destroyed, and both are
/// refused the same way.
pub struct PluginModule {
    host: HostContext,
    renderer: Renderer,
    /// Active instances indexed by host handle.
    instances: RwLock<HashMap<InstanceHandle, InstanceState>>,
}

impl std::fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginModule")
            .field("active_instances", &self.active_instances())
            .finish_non_exhaustive()
    }
}

impl PluginModule {
    pub fn new(host: Arc<dyn HostFunctions>, backend: Arc<dyn GraphicsBackend>) -> Self {
        Self {
            host: HostContext::new(host),
            renderer: Renderer::new(backend),
            instances: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_active(&self, instance: InstanceHandle) -> bool {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&instance)
    }

    pub fn instance_state(&self, instance: InstanceHandle) -> Option<InstanceState> {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&instance)
            .copied()
    }

    pub fn active_instances(&self) -> usize {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl PluginFuncs for PluginModule {
    fn new_instance(
        &self,
        mime_type: &str,
        instance: InstanceHandle,
        mode: InstanceMode,
        args: &CreationArgs,
    ) -> Result<(), PluginError> {
        // Reserve the handle under one write lock; the host call below runs
        // without it held.
        match self
            .instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(instance)
        {
            Entry::Occupied(_) => {
                tracing::warn!(instance = %instance, "instance created twice");
                return Err(PluginError::InvalidInstance(instance));
            }
            Entry::Vacant(slot) => {
                slot.insert(InstanceState::windowless());
            }
        }

        for (name, value) in args.iter() {
            tracing::debug!(instance = %instance, name, value, "creation argument");
        }

        if let Err(err) = self.host.make_windowless(instance) {
            self.instances
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&instance);
            return Err(err);
        }

        tracing::info!(
            instance = %instance,
            mime_type,
            mode = ?mode,
            "instance created"
        );

        self.host.report_status(instance, GREETING);
        Ok(())
    }

    fn destroy(&self, instance: InstanceHandle) -> Result<Option<SavedData>, PluginError> {
        let removed = self
            .instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&instance);

        match removed {
            Some(_) => tracing::info!(instance = %instance, "instance destroyed"),
            None => tracing::debug!(instance = %instance, "destroy for inactive instance"),
        }

        Ok(None)
    }

    fn new_stream(
        &self,
        instance: InstanceHandle,
        mime_type: &str,
    ) -> Result<StreamType, PluginError> {
        tracing::debug!(instance = %instance, mime_type, "stream opened, ignoring data");
        Ok(StreamType::Normal)
    }

    fn destroy_stream(&self, instance: InstanceHandle, reason: i16) -> Result<(), PluginError> {
        tracing::debug!(instance = %instance, reason, "stream closed");
        Ok(())
    }

    fn set_window(
        &self,
        instance: InstanceHandle,
        window: &WindowDescriptor,
    ) -> Result<(), PluginError> {
        if self.is_active(instance) {
            tracing::debug!(instance = %instance, ?window, "refusing native window");
        } else {
            tracing::debug!(instance = %instance, "set_window for inactive instance");
        }
        Err(PluginError::UnsupportedOperation("windowed rendering"))
    }

    fn get_value(
        &self,
        instance: InstanceHandle,
        variable: PluginVariable,
    ) -> Result<&'static CStr, PluginError> {
        plugin_property(variable).inspect_err(|_| {
            tracing::debug!(instance = %instance, variable = variable.raw(), "unknown property");
        })
    }

    fn handle_event(&self, instance: InstanceHandle, event: &PlatformEvent) -> bool {
        let PlatformEvent::GraphicsExpose(expose) = event else {
            return false;
        };

        if !self.is_active(instance) {
            tracing::debug!(instance = %instance, "expose for inactive instance");
            return false;
        }

        if let DrawOutcome::Skipped(reason) = self.renderer.draw_expose(expose) {
            tracing::debug!(instance = %instance, ?reason, "expose not painted");
        }
        true
    }
}

// ─── Process-wide slot ──────────────────────────────────────────────────

/// Holds the loaded module between initialize and shutdown.
///
/// Written by `initialize`/`shutdown` only; every other entry point takes a
/// read lock just long enough to clone the `Arc`.
pub struct ModuleSlot {
    module: RwLock<Option<Arc<PluginModule>>>,
}

impl Default for ModuleSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleSlot {
    pub const fn new() -> Self {
        Self {
            module: RwLock::new(None),
        }
    }

    /// Install a module. Returns `false` (and keeps the existing module) if
    /// one is already loaded.
    pub fn initialize(
        &self,
        host: Arc<dyn HostFunctions>,
        backend: Arc<dyn GraphicsBackend>,
    ) -> bool {
        let mut slot = self.module.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            tracing::warn!("plugin initialized twice, keeping the existing module");
            return false;
        }
        *slot = Some(Arc::new(PluginModule::new(host, backend)));
        tracing::info!("plugin initialized");
        true
    }

    /// The loaded module, or `NotInitialized`.
    pub fn get(&self) -> Result<Arc<PluginModule>, PluginError> {
        self.module
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PluginError::NotInitialized)
    }

    pub fn is_loaded(&self) -> bool {
        self.module
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop the module and with it the host context. Returns `false` if
    /// nothing was loaded.
    pub fn shutdown(&self) -> bool {
        let taken = self
            .module
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(module) = taken else {
            tracing::debug!("shutdown without a loaded module");
            return false;
        };

        let leftover = module.active_instances();
        if leftover > 0 {
            tracing::warn!(instances = leftover, "shutdown with instances still active");
        }
        tracing::info!("plugin shut down");
        true
    }
}
