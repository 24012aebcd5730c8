//! NPAPI C types used at the plugin boundary.
//!
//! Layouts follow `npapi.h` / `npfunctions.h`. Only the prefix of the
//! browser's function table that the plugin reads is declared; the browser
//! reports the full size in `size`.

#![allow(non_camel_case_types, non_snake_case)]

use std::ffi::{c_char, c_int, c_void};

pub type NPError = i16;
pub type NPReason = i16;
pub type NPBool = u8;
pub type NPMIMEType = *mut c_char;
pub type NPPVariable = c_int;

pub const NPPV_PLUGIN_NAME_STRING: NPPVariable = 1;
pub const NPPV_PLUGIN_DESCRIPTION_STRING: NPPVariable = 2;
pub const NPPV_PLUGIN_WINDOW_BOOL: NPPVariable = 3;

pub const K_NP_EVENT_NOT_HANDLED: i16 = 0;
pub const K_NP_EVENT_HANDLED: i16 = 1;

/// Host-side instance record. The plugin only ever uses its address.
#[repr(C)]
pub struct NPP_t {
    pub pdata: *mut c_void,
    pub ndata: *mut c_void,
}

pub type NPP = *mut NPP_t;

#[repr(C)]
pub struct NPSavedData {
    pub len: i32,
    pub buf: *mut c_void,
}

#[repr(C)]
pub struct NPRect {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
}

#[repr(C)]
pub struct NPWindow {
    pub window: *mut c_void,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub clipRect: NPRect,
    pub ws_info: *mut c_void,
    pub type_: c_int,
}

/// Opaque; streams are acknowledged without being read.
#[repr(C)]
pub struct NPStream {
    _private: [u8; 0],
}

pub type NPP_NewProcPtr = unsafe extern "C" fn(
    plugin_type: NPMIMEType,
    instance: NPP,
    mode: u16,
    argc: i16,
    argn: *mut *mut c_char,
    argv: *mut *mut c_char,
    saved: *mut NPSavedData,
) -> NPError;
pub type NPP_DestroyProcPtr =
    unsafe extern "C" fn(instance: NPP, save: *mut *mut NPSavedData) -> NPError;
pub type NPP_SetWindowProcPtr =
    unsafe extern "C" fn(instance: NPP, window: *mut NPWindow) -> NPError;
pub type NPP_NewStreamProcPtr = unsafe extern "C" fn(
    instance: NPP,
    mime_type: NPMIMEType,
    stream: *mut NPStream,
    seekable: NPBool,
    stype: *mut u16,
) -> NPError;
pub type NPP_DestroyStreamProcPtr =
    unsafe extern "C" fn(instance: NPP, stream: *mut NPStream, reason: NPReason) -> NPError;
pub type NPP_HandleEventProcPtr = unsafe extern "C" fn(instance: NPP, event: *mut c_void) -> i16;
pub type NPP_GetValueProcPtr =
    unsafe extern "C" fn(instance: NPP, variable: NPPVariable, value: *mut c_void) -> NPError;

/// Slot the plugin leaves unset.
pub type UnusedProcPtr = Option<unsafe extern "C" fn()>;

/// The plugin's entry-point table, allocated by the browser.
#[repr(C)]
pub struct NPPluginFuncs {
    pub size: u16,
    pub version: u16,
    pub newp: Option<NPP_NewProcPtr>,
    pub destroy: Option<NPP_DestroyProcPtr>,
    pub setwindow: Option<NPP_SetWindowProcPtr>,
    pub newstream: Option<NPP_NewStreamProcPtr>,
    pub destroystream: Option<NPP_DestroyStreamProcPtr>,
    pub asfile: UnusedProcPtr,
    pub writeready: UnusedProcPtr,
    pub write: UnusedProcPtr,
    pub print: UnusedProcPtr,
    pub event: Option<NPP_HandleEventProcPtr>,
    pub urlnotify: UnusedProcPtr,
    pub javaClass: *mut c_void,
    pub getvalue: Option<NPP_GetValueProcPtr>,
    pub setvalue: UnusedProcPtr,
    pub gotfocus: UnusedProcPtr,
    pub lostfocus: UnusedProcPtr,
    pub urlredirectnotify: UnusedProcPtr,
    pub clearsitedata: UnusedProcPtr,
    pub getsiteswithdata: UnusedProcPtr,
    pub didComposite: UnusedProcPtr,
}

pub type NPN_StatusProcPtr = unsafe extern "C" fn(instance: NPP, message: *const c_char);
pub type NPN_SetValueProcPtr =
    unsafe extern "C" fn(instance: NPP, variable: NPPVariable, value: *mut c_void) -> NPError;

/// Leading part of the browser's function table, up to `setvalue`.
#[repr(C)]
pub struct NPNetscapeFuncs {
    pub size: u16,
    pub version: u16,
    pub geturl: UnusedProcPtr,
    pub posturl: UnusedProcPtr,
    pub requestread: UnusedProcPtr,
    pub newstream: UnusedProcPtr,
    pub write: UnusedProcPtr,
    pub destroystream: UnusedProcPtr,
    pub status: Option<NPN_StatusProcPtr>,
    pub uagent: UnusedProcPtr,
    pub memalloc: UnusedProcPtr,
    pub memfree: UnusedProcPtr,
    pub memflush: UnusedProcPtr,
    pub reloadplugins: UnusedProcPtr,
    pub getJavaEnv: UnusedProcPtr,
    pub getJavaPeer: UnusedProcPtr,
    pub geturlnotify: UnusedProcPtr,
    pub posturlnotify: UnusedProcPtr,
    pub getvalue: UnusedProcPtr,
    pub setvalue: Option<NPN_SetValueProcPtr>,
}
