//! `NPP_*` shims bound into the plugin's entry-point table.
//!
//! Each shim converts raw NPAPI arguments into core types, forwards to the
//! loaded [`PluginModule`](npexample_plugin::PluginModule) through
//! [`PluginFuncs`], and turns the result back into an `NPError`.

use std::ffi::{c_char, c_void, CStr};

use npexample_plugin::{
    CreationArgs, InstanceHandle, InstanceMode, ModuleSlot, NpErrorCode, PluginError,
    PluginFuncs, PluginVariable, WindowDescriptor,
};

use crate::guard::guard_with_default;
use crate::npapi::{
    NPBool, NPError, NPMIMEType, NPPVariable, NPPluginFuncs, NPReason, NPSavedData, NPStream,
    NPWindow, K_NP_EVENT_HANDLED, K_NP_EVENT_NOT_HANDLED, NPP,
};
use crate::xlib;

/// The loaded module, between `NP_Initialize` and `NP_Shutdown`.
pub(crate) static MODULE: ModuleSlot = ModuleSlot::new();

/// Held by every test that loads or unloads `MODULE`.
#[cfg(test)]
pub(crate) fn lock_module_for_test() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

const GENERIC: NPError = NpErrorCode::GENERIC_ERROR.0;

/// Bind the seven entry points the plugin implements. Other slots are left
/// as the browser set them.
pub fn publish_entry_points(funcs: &mut NPPluginFuncs) {
    funcs.newp = Some(npp_new);
    funcs.destroy = Some(npp_destroy);
    funcs.setwindow = Some(npp_setwindow);
    funcs.newstream = Some(npp_newstream);
    funcs.destroystream = Some(npp_destroystream);
    funcs.getvalue = Some(npp_getvalue);
    funcs.event = Some(npp_handle_event);
}

// ─── Argument conversion ────────────────────────────────────────────────

fn instance_handle(instance: NPP) -> Option<InstanceHandle> {
    (!instance.is_null()).then(|| InstanceHandle(instance as usize))
}

/// Copy a C string the browser owns; null reads as empty.
unsafe fn lossy(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Collect `<embed>`/`<object>` attributes. Entries with a null name are
/// skipped; a null value reads as empty.
unsafe fn creation_args(
    argc: i16,
    argn: *mut *mut c_char,
    argv: *mut *mut c_char,
) -> CreationArgs {
    let Ok(count) = usize::try_from(argc) else {
        return CreationArgs::new();
    };
    if argn.is_null() || argv.is_null() {
        return CreationArgs::new();
    }
    (0..count)
        .filter_map(|i| {
            let name = *argn.add(i);
            if name.is_null() {
                return None;
            }
            Some((lossy(name), lossy(*argv.add(i))))
        })
        .collect()
}

fn error_code(result: Result<(), PluginError>) -> NPError {
    match result {
        Ok(()) => NpErrorCode::NO_ERROR.0,
        Err(err) => err.np_error().0,
    }
}

// ─── Shims ──────────────────────────────────────────────────────────────

unsafe extern "C" fn npp_new(
    plugin_type: NPMIMEType,
    instance: NPP,
    mode: u16,
    argc: i16,
    argn: *mut *mut c_char,
    argv: *mut *mut c_char,
    _saved: *mut NPSavedData,
) -> NPError {
    guard_with_default("NPP_New", GENERIC, || {
        let Some(handle) = instance_handle(instance) else {
            return NpErrorCode::INVALID_INSTANCE_ERROR.0;
        };
        let mime_type = lossy(plugin_type);
        let args = creation_args(argc, argn, argv);
        error_code(MODULE.get().and_then(|module| {
            module.new_instance(&mime_type, handle, InstanceMode::from(mode), &args)
        }))
    })
}

unsafe extern "C" fn npp_destroy(instance: NPP, save: *mut *mut NPSavedData) -> NPError {
    guard_with_default("NPP_Destroy", GENERIC, || {
        if !save.is_null() {
            *save = std::ptr::null_mut();
        }
        let Some(handle) = instance_handle(instance) else {
            return NpErrorCode::INVALID_INSTANCE_ERROR.0;
        };
        error_code(MODULE.get().and_then(|module| module.destroy(handle).map(|_| ())))
    })
}

unsafe extern "C" fn npp_setwindow(instance: NPP, window: *mut NPWindow) -> NPError {
    guard_with_default("NPP_SetWindow", GENERIC, || {
        let Some(handle) = instance_handle(instance) else {
            return NpErrorCode::INVALID_INSTANCE_ERROR.0;
        };
        let descriptor = window
            .as_ref()
            .map(|w| WindowDescriptor {
                window: w.window as usize,
                width: w.width,
                height: w.height,
            })
            .unwrap_or_default();
        error_code(
            MODULE
                .get()
                .and_then(|module| module.set_window(handle, &descriptor)),
        )
    })
}

unsafe extern "C" fn npp_newstream(
    instance: NPP,
    mime_type: NPMIMEType,
    _stream: *mut NPStream,
    _seekable: NPBool,
    stype: *mut u16,
) -> NPError {
    guard_with_default("NPP_NewStream", GENERIC, || {
        let Some(handle) = instance_handle(instance) else {
            return NpErrorCode::INVALID_INSTANCE_ERROR.0;
        };
        let mime_type = lossy(mime_type);
        let result = MODULE
            .get()
            .and_then(|module| module.new_stream(handle, &mime_type));
        match result {
            Ok(stream_type) => {
                if !stype.is_null() {
                    *stype = stream_type.raw();
                }
                NpErrorCode::NO_ERROR.0
            }
            Err(err) => err.np_error().0,
        }
    })
}

unsafe extern "C" fn npp_destroystream(
    instance: NPP,
    _stream: *mut NPStream,
    reason: NPReason,
) -> NPError {
    guard_with_default("NPP_DestroyStream", GENERIC, || {
        let Some(handle) = instance_handle(instance) else {
            return NpErrorCode::INVALID_INSTANCE_ERROR.0;
        };
        error_code(
            MODULE
                .get()
                .and_then(|module| module.destroy_stream(handle, reason)),
        )
    })
}

unsafe extern "C" fn npp_getvalue(
    instance: NPP,
    variable: NPPVariable,
    value: *mut c_void,
) -> NPError {
    guard_with_default("NPP_GetValue", GENERIC, || {
        let Some(handle) = instance_handle(instance) else {
            return NpErrorCode::INVALID_INSTANCE_ERROR.0;
        };
        if value.is_null() {
            return NpErrorCode::INVALID_PARAM.0;
        }
        let result = MODULE
            .get()
            .and_then(|module| module.get_value(handle, PluginVariable::from(variable)));
        write_string_value(result, value)
    })
}

/// Store a property string through the host's `char**` output.
pub(crate) unsafe fn write_string_value(
    result: Result<&'static CStr, PluginError>,
    value: *mut c_void,
) -> NPError {
    match result {
        Ok(text) => {
            *value.cast::<*const c_char>() = text.as_ptr();
            NpErrorCode::NO_ERROR.0
        }
        Err(err) => err.np_error().0,
    }
}

unsafe extern "C" fn npp_handle_event(instance: NPP, event: *mut c_void) -> i16 {
    guard_with_default("NPP_HandleEvent", K_NP_EVENT_NOT_HANDLED, || {
        let Some(handle) = instance_handle(instance) else {
            return K_NP_EVENT_NOT_HANDLED;
        };
        if event.is_null() {
            return K_NP_EVENT_NOT_HANDLED;
        }
        let Ok(module) = MODULE.get() else {
            return K_NP_EVENT_NOT_HANDLED;
        };
        let event = xlib::decode_event(event);
        if module.handle_event(handle, &event) {
            K_NP_EVENT_HANDLED
        } else {
            K_NP_EVENT_NOT_HANDLED
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use npexample_plugin::{
        Colormap, DisplayHandle, DrawableHandle, GcHandle, GraphicsBackend, HostFunctions,
        InstanceSetting, Pixel, Rect, Rgb,
    };
    use x11_dl::xlib as x;

    fn empty_table() -> NPPluginFuncs {
        // SAFETY: every field is an integer, a raw pointer or a nullable fn pointer.
        unsafe { std::mem::zeroed() }
    }

    #[test]
    fn test_publish_fills_exactly_seven_slots() {
        let mut funcs = empty_table();
        funcs.size = std::mem::size_of::<NPPluginFuncs>() as u16;
        publish_entry_points(&mut funcs);

        assert!(funcs.newp.is_some());
        assert!(funcs.destroy.is_some());
        assert!(funcs.setwindow.is_some());
        assert!(funcs.newstream.is_some());
        assert!(funcs.destroystream.is_some());
        assert!(funcs.getvalue.is_some());
        assert!(funcs.event.is_some());

        assert!(funcs.asfile.is_none());
        assert!(funcs.writeready.is_none());
        assert!(funcs.write.is_none());
        assert!(funcs.print.is_none());
        assert!(funcs.urlnotify.is_none());
        assert!(funcs.setvalue.is_none());
        assert!(funcs.javaClass.is_null());
        assert_eq!(funcs.size as usize, std::mem::size_of::<NPPluginFuncs>());
    }

    #[test]
    fn test_publish_is_idempotent() {
        let mut first = empty_table();
        publish_entry_points(&mut first);
        let mut second = empty_table();
        publish_entry_points(&mut second);
        publish_entry_points(&mut second);

        assert_eq!(first.newp.map(|f| f as usize), second.newp.map(|f| f as usize));
        assert_eq!(first.event.map(|f| f as usize), second.event.map(|f| f as usize));
    }

    #[test]
    fn test_null_instances_are_rejected() {
        let invalid = NpErrorCode::INVALID_INSTANCE_ERROR.0;
        let null: NPP = std::ptr::null_mut();
        let no_args: *mut *mut c_char = std::ptr::null_mut();
        unsafe {
            assert_eq!(
                npp_new(std::ptr::null_mut(), null, 1, 0, no_args, no_args, std::ptr::null_mut()),
                invalid
            );
            assert_eq!(npp_setwindow(null, std::ptr::null_mut()), invalid);
            assert_eq!(npp_destroystream(null, std::ptr::null_mut(), 0), invalid);
            assert_eq!(npp_handle_event(null, std::ptr::null_mut()), K_NP_EVENT_NOT_HANDLED);
        }
    }

    #[test]
    fn test_destroy_clears_saved_data() {
        let mut saved = 0x1 as *mut NPSavedData;
        unsafe { npp_destroy(std::ptr::null_mut(), &mut saved) };
        assert!(saved.is_null());
    }

    #[test]
    fn test_write_string_value_writes_through() {
        let mut out: *const c_char = std::ptr::null();
        let code = unsafe {
            write_string_value(Ok(c"example"), (&mut out as *mut *const c_char).cast())
        };
        assert_eq!(code, 0);
        assert_eq!(unsafe { CStr::from_ptr(out) }, c"example");

        let mut out: *const c_char = std::ptr::null();
        let code = unsafe {
            write_string_value(
                Err(PluginError::UnknownProperty(99)),
                (&mut out as *mut *const c_char).cast(),
            )
        };
        assert_eq!(code, NpErrorCode::INVALID_PARAM.0);
        assert!(out.is_null());
    }

    #[test]
    fn test_creation_args_skip_null_names() {
        let names = [c"src".as_ptr(), std::ptr::null(), c"width".as_ptr()];
        let values = [c"demo.npx".as_ptr(), c"ignored".as_ptr(), std::ptr::null()];
        let args = unsafe {
            creation_args(
                3,
                names.as_ptr() as *mut *mut c_char,
                values.as_ptr() as *mut *mut c_char,
            )
        };
        assert_eq!(args.len(), 2);
        assert_eq!(args.get("SRC"), Some("demo.npx"));
        assert_eq!(args.get("width"), Some(""));

        let none = unsafe { creation_args(-1, std::ptr::null_mut(), std::ptr::null_mut()) };
        assert!(none.is_empty());
    }

    // ── Full lifecycle through the shims ──────────────────────────────

    #[derive(Default)]
    struct Host {
        statuses: Mutex<Vec<(InstanceHandle, String)>>,
    }

    impl HostFunctions for Host {
        fn set_value(&self, _: InstanceHandle, _: InstanceSetting) -> Result<(), NpErrorCode> {
            Ok(())
        }
        fn status(&self, instance: InstanceHandle, message: &str) {
            self.statuses
                .lock()
                .unwrap()
                .push((instance, message.to_string()));
        }
    }

    #[derive(Default)]
    struct Fills(Mutex<Vec<Rect>>);

    impl GraphicsBackend for Fills {
        fn default_colormap(&self, _: DisplayHandle) -> Colormap {
            Colormap(1)
        }
        fn alloc_color(&self, _: DisplayHandle, _: Colormap, color: Rgb) -> Option<Pixel> {
            Some(Pixel(u64::from(color.red)))
        }
        fn free_color(&self, _: DisplayHandle, _: Colormap, _: Pixel) {}
        fn create_gc(
            &self,
            _: DisplayHandle,
            _: DrawableHandle,
            _: Pixel,
            _: Pixel,
        ) -> Option<GcHandle> {
            Some(GcHandle(1))
        }
        fn free_gc(&self, _: DisplayHandle, _: GcHandle) {}
        fn fill_rectangle(&self, _: DisplayHandle, _: DrawableHandle, _: GcHandle, rect: Rect) {
            self.0.lock().unwrap().push(rect);
        }
    }

    fn expose_event(x: i32, y: i32, width: i32, height: i32) -> x::XEvent {
        // SAFETY: XEvent is a plain-data union; all-zero is a valid value.
        let mut event: x::XEvent = unsafe { std::mem::zeroed() };
        event.graphics_expose = x::XGraphicsExposeEvent {
            type_: x::GraphicsExpose,
            serial: 0,
            send_event: 0,
            display: 0xd15 as *mut x::Display,
            drawable: 7,
            x,
            y,
            width,
            height,
            count: 0,
            major_code: 0,
            minor_code: 0,
        };
        event
    }

    #[test]
    fn test_shim_lifecycle() {
        let _module = lock_module_for_test();
        let mut record = crate::npapi::NPP_t {
            pdata: std::ptr::null_mut(),
            ndata: std::ptr::null_mut(),
        };
        let npp: NPP = &mut record;
        let handle = InstanceHandle(npp as usize);
        let mime = c"application/x-npexample".as_ptr() as NPMIMEType;
        let no_args: *mut *mut c_char = std::ptr::null_mut();
        let no_saved: *mut NPSavedData = std::ptr::null_mut();

        unsafe {
            // Before initialization.
            assert_eq!(
                npp_new(mime, npp, 1, 0, no_args, no_args, no_saved),
                NpErrorCode::INVALID_FUNCTABLE_ERROR.0
            );

            let host = Arc::new(Host::default());
            let fills = Arc::new(Fills::default());
            assert!(MODULE.initialize(host.clone(), fills.clone()));

            assert_eq!(npp_new(mime, npp, 1, 0, no_args, no_args, no_saved), 0);
            assert_eq!(
                *host.statuses.lock().unwrap(),
                [(handle, "Hello, world!".to_string())]
            );

            let mut stype = 0_u16;
            assert_eq!(npp_newstream(npp, mime, std::ptr::null_mut(), 0, &mut stype), 0);
            assert_eq!(stype, 1);
            assert_eq!(npp_destroystream(npp, std::ptr::null_mut(), 0), 0);

            assert_eq!(npp_setwindow(npp, std::ptr::null_mut()), NpErrorCode::GENERIC_ERROR.0);

            let mut out: *const c_char = std::ptr::null();
            let out_ptr = (&mut out as *mut *const c_char).cast();
            assert_eq!(npp_getvalue(npp, 2, out_ptr), 0);
            assert_eq!(CStr::from_ptr(out), c"Example plugin");
            assert_eq!(npp_getvalue(npp, 42, out_ptr), NpErrorCode::INVALID_PARAM.0);
            assert_eq!(npp_getvalue(npp, 1, std::ptr::null_mut()), NpErrorCode::INVALID_PARAM.0);

            let mut event = expose_event(1, 2, 3, 4);
            let event_ptr = (&mut event as *mut x::XEvent).cast();
            assert_eq!(npp_handle_event(npp, event_ptr), K_NP_EVENT_HANDLED);
            assert_eq!(*fills.0.lock().unwrap(), [Rect::new(1, 2, 3, 4)]);

            let mut saved = no_saved;
            assert_eq!(npp_destroy(npp, &mut saved), 0);
            assert!(saved.is_null());
            assert_eq!(npp_handle_event(npp, event_ptr), K_NP_EVENT_NOT_HANDLED);
            assert_eq!(fills.0.lock().unwrap().len(), 1);

            assert!(MODULE.shutdown());
            assert_eq!(npp_handle_event(npp, event_ptr), K_NP_EVENT_NOT_HANDLED);
        }
    }
}
