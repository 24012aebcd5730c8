//! npexample NPAPI plugin library
//!
//! The shared object a browser loads. Exports the five `NP_*` module
//! functions, fills the browser's `NPPluginFuncs` with `NPP_*` shims, and
//! wires the browser's function table and libX11 into the host-agnostic
//! core in `npexample-plugin`.

pub mod browser;
pub mod config;
pub mod entry_points;
pub mod guard;
pub mod logging;
pub mod npapi;
pub mod xlib;

use std::ffi::{c_char, c_void};
use std::sync::{Arc, Once};

use npexample_plugin::{plugin_property, NpErrorCode, PluginVariable, MIME_DESCRIPTION_C};

use crate::browser::BrowserFuncs;
use crate::config::LogConfig;
use crate::entry_points::{publish_entry_points, write_string_value, MODULE};
use crate::guard::guard_with_default;
use crate::npapi::{NPError, NPNetscapeFuncs, NPPVariable, NPPluginFuncs};
use crate::xlib::XlibBackend;

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        let config = LogConfig::from_env();
        if !logging::init(&config) {
            tracing::debug!("global subscriber already installed, keeping it");
        }
    });
}

/// The MIME types this plugin handles, in NPAPI descriptor form.
#[no_mangle]
pub extern "C" fn NP_GetMIMEDescription() -> *const c_char {
    guard_with_default("NP_GetMIMEDescription", std::ptr::null(), || {
        MIME_DESCRIPTION_C.as_ptr()
    })
}

/// Plugin-level property query; works before `NP_Initialize`.
///
/// # Safety
///
/// `value` must be null or point to writable storage for a `char*`.
#[no_mangle]
pub unsafe extern "C" fn NP_GetValue(
    _future: *mut c_void,
    variable: NPPVariable,
    value: *mut c_void,
) -> NPError {
    guard_with_default("NP_GetValue", NpErrorCode::GENERIC_ERROR.0, || {
        if value.is_null() {
            return NpErrorCode::INVALID_PARAM.0;
        }
        write_string_value(plugin_property(PluginVariable::from(variable)), value)
    })
}

/// Fill the browser's plugin function table.
///
/// # Safety
///
/// `plugin_funcs` must be null or point to a writable `NPPluginFuncs`.
#[no_mangle]
pub unsafe extern "C" fn NP_GetEntryPoints(plugin_funcs: *mut NPPluginFuncs) -> NPError {
    guard_with_default("NP_GetEntryPoints", NpErrorCode::GENERIC_ERROR.0, || {
        let Some(funcs) = plugin_funcs.as_mut() else {
            tracing::error!("NP_GetEntryPoints called with a null table");
            return NpErrorCode::INVALID_FUNCTABLE_ERROR.0;
        };
        publish_entry_points(funcs);
        NpErrorCode::NO_ERROR.0
    })
}

/// Load the plugin: keep the browser's callbacks and publish entry points.
///
/// # Safety
///
/// `browser_funcs` must be null or point to the browser's function table,
/// valid until `NP_Shutdown`. `plugin_funcs` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn NP_Initialize(
    browser_funcs: *const NPNetscapeFuncs,
    plugin_funcs: *mut NPPluginFuncs,
) -> NPError {
    guard_with_default("NP_Initialize", NpErrorCode::GENERIC_ERROR.0, || {
        init_logging();

        let browser = match BrowserFuncs::from_raw(browser_funcs) {
            Ok(browser) => browser,
            Err(err) => {
                tracing::error!(error = %err, "refusing to initialize");
                return err.np_error().0;
            }
        };

        if let Some(funcs) = plugin_funcs.as_mut() {
            publish_entry_points(funcs);
        }

        MODULE.initialize(Arc::new(browser), Arc::new(XlibBackend::new()));
        NpErrorCode::NO_ERROR.0
    })
}

/// Unload the plugin, dropping the browser's callbacks.
#[no_mangle]
pub extern "C" fn NP_Shutdown() -> NPError {
    guard_with_default("NP_Shutdown", NpErrorCode::GENERIC_ERROR.0, || {
        MODULE.shutdown();
        NpErrorCode::NO_ERROR.0
    })
}
