//! Xlib-backed graphics service and X11 event decoding.
//!
//! libX11 is opened at runtime with `x11-dl` the first time a draw needs
//! it. The browser has already loaded it into the process, so this only
//! resolves symbols; if it cannot be opened, colour allocation fails and
//! every draw is skipped.

use std::ffi::{c_int, c_uint, c_ulong, c_void};
use std::sync::OnceLock;

use npexample_plugin::{
    Colormap, DisplayHandle, DrawableHandle, GcHandle, GraphicsBackend, Pixel, PlatformEvent,
    RawExpose, Rect, Rgb,
};
use x11_dl::xlib;

/// Resolved libX11 entry points.
struct LoadedXlib(xlib::Xlib);

// SAFETY: the table only holds function pointers into libX11 and the
// library handle, neither of which is tied to a thread.
unsafe impl Send for LoadedXlib {}
unsafe impl Sync for LoadedXlib {}

/// [`GraphicsBackend`] over the browser's Xlib connection.
#[derive(Default)]
pub struct XlibBackend {
    lib: OnceLock<Option<LoadedXlib>>,
}

impl std::fmt::Debug for XlibBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlibBackend")
            .field("loaded", &self.lib.get().map(Option::is_some))
            .finish()
    }
}

fn display_ptr(display: DisplayHandle) -> *mut xlib::Display {
    display.0 as *mut xlib::Display
}

fn coord(value: u32) -> c_int {
    c_int::try_from(value).unwrap_or(c_int::MAX)
}

impl XlibBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn xlib(&self) -> Option<&xlib::Xlib> {
        self.lib
            .get_or_init(|| match xlib::Xlib::open() {
                Ok(lib) => Some(LoadedXlib(lib)),
                Err(err) => {
                    tracing::error!(error = %err, "could not load libX11, drawing disabled");
                    None
                }
            })
            .as_ref()
            .map(|loaded| &loaded.0)
    }
}

// SAFETY (all methods): display and drawable come from the event the
// browser is currently dispatching, so both are live for the call.
impl GraphicsBackend for XlibBackend {
    fn default_colormap(&self, display: DisplayHandle) -> Colormap {
        let Some(x) = self.xlib() else {
            return Colormap(0);
        };
        let dpy = display_ptr(display);
        let cmap = unsafe {
            let screen = (x.XDefaultScreen)(dpy);
            (x.XDefaultColormap)(dpy, screen)
        };
        Colormap(u64::from(cmap))
    }

    fn alloc_color(
        &self,
        display: DisplayHandle,
        colormap: Colormap,
        color: Rgb,
    ) -> Option<Pixel> {
        let x = self.xlib()?;
        let mut xcolor = xlib::XColor {
            pixel: 0,
            red: color.red,
            green: color.green,
            blue: color.blue,
            flags: 0,
            pad: 0,
        };
        let status = unsafe {
            (x.XAllocColor)(display_ptr(display), colormap.0 as c_ulong, &mut xcolor)
        };
        (status != 0).then(|| Pixel(u64::from(xcolor.pixel)))
    }

    fn free_color(&self, display: DisplayHandle, colormap: Colormap, pixel: Pixel) {
        let Some(x) = self.xlib() else {
            return;
        };
        let mut pixels = [pixel.0 as c_ulong];
        unsafe {
            (x.XFreeColors)(
                display_ptr(display),
                colormap.0 as c_ulong,
                pixels.as_mut_ptr(),
                1,
                0,
            );
        }
    }

    fn create_gc(
        &self,
        display: DisplayHandle,
        drawable: DrawableHandle,
        foreground: Pixel,
        background: Pixel,
    ) -> Option<GcHandle> {
        let x = self.xlib()?;
        // SAFETY: XGCValues is plain data; only the masked fields are read.
        let mut values: xlib::XGCValues = unsafe { std::mem::zeroed() };
        values.foreground = foreground.0 as c_ulong;
        values.background = background.0 as c_ulong;
        let mask = (xlib::GCForeground | xlib::GCBackground) as c_ulong;
        let gc = unsafe {
            (x.XCreateGC)(
                display_ptr(display),
                drawable.0 as xlib::Drawable,
                mask,
                &mut values,
            )
        };
        (!gc.is_null()).then(|| GcHandle(gc as usize))
    }

    fn free_gc(&self, display: DisplayHandle, gc: GcHandle) {
        let Some(x) = self.xlib() else {
            return;
        };
        unsafe {
            (x.XFreeGC)(display_ptr(display), gc.0 as xlib::GC);
        }
    }

    fn fill_rectangle(
        &self,
        display: DisplayHandle,
        drawable: DrawableHandle,
        gc: GcHandle,
        rect: Rect,
    ) {
        let Some(x) = self.xlib() else {
            return;
        };
        unsafe {
            (x.XFillRectangle)(
                display_ptr(display),
                drawable.0 as xlib::Drawable,
                gc.0 as xlib::GC,
                coord(rect.x),
                coord(rect.y),
                rect.width as c_uint,
                rect.height as c_uint,
            );
        }
    }
}

/// Decode the `XEvent` the browser passes to `NPP_HandleEvent`.
///
/// # Safety
///
/// `event` must be non-null and point to a complete `XEvent`.
pub unsafe fn decode_event(event: *const c_void) -> PlatformEvent {
    let event = &*event.cast::<xlib::XEvent>();
    PlatformEvent::decode(event.get_type(), || {
        let expose = event.graphics_expose;
        RawExpose {
            display: expose.display as usize,
            drawable: u64::from(expose.drawable),
            x: expose.x,
            y: expose.y,
            width: expose.width,
            height: expose.height,
        }
    })
}
