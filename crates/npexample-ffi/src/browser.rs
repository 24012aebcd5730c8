//! [`HostFunctions`] backed by the browser's `NPNetscapeFuncs` table.

use std::ffi::{c_void, CString};
use std::mem::{offset_of, size_of};

use npexample_plugin::{HostFunctions, InstanceHandle, InstanceSetting, NpErrorCode, PluginError};

use crate::npapi::{NPNetscapeFuncs, NPN_SetValueProcPtr, NPN_StatusProcPtr, NPP};

/// The browser callbacks the plugin uses, copied out of the table handed to
/// `NP_Initialize`.
#[derive(Debug, Clone, Copy)]
pub struct BrowserFuncs {
    status: NPN_StatusProcPtr,
    set_value: NPN_SetValueProcPtr,
}

impl BrowserFuncs {
    /// Validate and copy the browser's table.
    ///
    /// # Safety
    ///
    /// `funcs` must be null or point to a browser function table whose first
    /// `size` bytes are readable.
    pub unsafe fn from_raw(funcs: *const NPNetscapeFuncs) -> Result<Self, PluginError> {
        let Some(table) = funcs.as_ref() else {
            return Err(PluginError::IncompatibleHost(
                "no browser function table".to_string(),
            ));
        };

        let needed = offset_of!(NPNetscapeFuncs, setvalue) + size_of::<usize>();
        if usize::from(table.size) < needed {
            return Err(PluginError::IncompatibleHost(format!(
                "browser function table is {} bytes, need at least {needed}",
                table.size
            )));
        }

        match (table.status, table.setvalue) {
            (Some(status), Some(set_value)) => Ok(Self { status, set_value }),
            _ => Err(PluginError::IncompatibleHost(
                "browser does not provide status and setvalue".to_string(),
            )),
        }
    }
}

fn npp(instance: InstanceHandle) -> NPP {
    instance.0 as NPP
}

impl HostFunctions for BrowserFuncs {
    fn set_value(
        &self,
        instance: InstanceHandle,
        setting: InstanceSetting,
    ) -> Result<(), NpErrorCode> {
        let value = match setting {
            // NPPVpluginWindowBool is passed by value in the pointer slot.
            InstanceSetting::Windowed(windowed) => usize::from(windowed) as *mut c_void,
        };
        // SAFETY: the pointer came from the browser's table and the instance
        // handle is the NPP the browser gave us for this call chain.
        let code = unsafe { (self.set_value)(npp(instance), setting.variable(), value) };
        let code = NpErrorCode(code);
        if code.is_ok() {
            Ok(())
        } else {
            Err(code)
        }
    }

    fn status(&self, instance: InstanceHandle, message: &str) {
        let Ok(message) = CString::new(message) else {
            tracing::warn!(instance = %instance, "status message contains NUL, not sent");
            return;
        };
        // SAFETY: as above; the browser copies the string before returning.
        unsafe { (self.status)(npp(instance), message.as_ptr()) };
    }
}
