//! Shared test fixtures: a scriptable host and an in-memory canvas.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use npexample_plugin::{
    Colormap, DisplayHandle, DrawableHandle, ExposeEvent, GcHandle, GraphicsBackend,
    HostFunctions, InstanceHandle, InstanceSetting, NpErrorCode, Pixel, PlatformEvent,
    PluginModule, Rect, Rgb,
};

// ─── Fake host ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    SetValue(InstanceHandle, InstanceSetting),
    Status(InstanceHandle, String),
}

/// Records every call; rejects settings with `reject_with` when set.
#[derive(Default)]
pub struct FakeHost {
    calls: Mutex<Vec<HostCall>>,
    reject_with: Mutex<Option<NpErrorCode>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(code: NpErrorCode) -> Arc<Self> {
        let host = Self::default();
        *host.reject_with.lock().unwrap() = Some(code);
        Arc::new(host)
    }

    pub fn accept_settings(&self) {
        *self.reject_with.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<(InstanceHandle, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::Status(h, msg) => Some((h, msg)),
                HostCall::SetValue(..) => None,
            })
            .collect()
    }
}

impl HostFunctions for FakeHost {
    fn set_value(
        &self,
        instance: InstanceHandle,
        setting: InstanceSetting,
    ) -> Result<(), NpErrorCode> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::SetValue(instance, setting));
        match *self.reject_with.lock().unwrap() {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }

    fn status(&self, instance: InstanceHandle, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Status(instance, message.to_string()));
    }
}

// ─── In-memory canvas ───────────────────────────────────────────────────

/// Packed 0xRRGGBB value for an X11 16-bit colour.
pub fn pack(color: Rgb) -> u32 {
    (u32::from(color.red >> 8) << 16) | (u32::from(color.green >> 8) << 8) | u32::from(color.blue >> 8)
}

pub const UNTOUCHED: u32 = 0x00_12_34_56;

#[derive(Default)]
struct CanvasState {
    pixels: Vec<u32>,
    live_colors: usize,
    live_gcs: HashMap<usize, u32>,
    next_gc: usize,
    colors_available: Option<usize>,
    fail_gc: bool,
}

/// A `width`×`height` drawable that records fills, clipped to its bounds,
/// and counts live colour and GC allocations.
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    state: Mutex<CanvasState>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            width,
            height,
            state: Mutex::new(CanvasState {
                pixels: vec![UNTOUCHED; (width * height) as usize],
                ..Default::default()
            }),
        })
    }

    /// Allow only `n` more colour allocations.
    pub fn limit_colors(&self, n: usize) {
        self.state.lock().unwrap().colors_available = Some(n);
    }

    pub fn fail_gc(&self) {
        self.state.lock().unwrap().fail_gc = true;
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.state.lock().unwrap().pixels[(y * self.width + x) as usize]
    }

    pub fn snapshot(&self) -> Vec<u32> {
        self.state.lock().unwrap().pixels.clone()
    }

    pub fn live_colors(&self) -> usize {
        self.state.lock().unwrap().live_colors
    }

    pub fn live_gcs(&self) -> usize {
        self.state.lock().unwrap().live_gcs.len()
    }

    pub fn expose(&self, rect: Rect) -> PlatformEvent {
        PlatformEvent::GraphicsExpose(ExposeEvent {
            display: DisplayHandle(0xd15),
            drawable: DrawableHandle(1),
            rect,
        })
    }
}

impl GraphicsBackend for Canvas {
    fn default_colormap(&self, _display: DisplayHandle) -> Colormap {
        Colormap(0x20)
    }

    fn alloc_color(
        &self,
        _display: DisplayHandle,
        _colormap: Colormap,
        color: Rgb,
    ) -> Option<Pixel> {
        let mut state = self.state.lock().unwrap();
        if let Some(available) = state.colors_available.as_mut() {
            if *available == 0 {
                return None;
            }
            *available -= 1;
        }
        state.live_colors += 1;
        Some(Pixel(u64::from(pack(color))))
    }

    fn free_color(&self, _display: DisplayHandle, _colormap: Colormap, _pixel: Pixel) {
        let mut state = self.state.lock().unwrap();
        state.live_colors = state
            .live_colors
            .checked_sub(1)
            .expect("colour freed twice");
    }

    fn create_gc(
        &self,
        _display: DisplayHandle,
        _drawable: DrawableHandle,
        foreground: Pixel,
        _background: Pixel,
    ) -> Option<GcHandle> {
        let mut state = self.state.lock().unwrap();
        if state.fail_gc {
            return None;
        }
        state.next_gc += 1;
        let id = state.next_gc;
        state.live_gcs.insert(id, foreground.0 as u32);
        Some(GcHandle(id))
    }

    fn free_gc(&self, _display: DisplayHandle, gc: GcHandle) {
        let removed = self.state.lock().unwrap().live_gcs.remove(&gc.0);
        assert!(removed.is_some(), "unknown GC freed");
    }

    fn fill_rectangle(
        &self,
        _display: DisplayHandle,
        _drawable: DrawableHandle,
        gc: GcHandle,
        rect: Rect,
    ) {
        let mut state = self.state.lock().unwrap();
        let color = *state.live_gcs.get(&gc.0).expect("fill with a freed GC");
        let right = rect.right().min(u64::from(self.width)) as u32;
        let bottom = rect.bottom().min(u64::from(self.height)) as u32;
        for y in rect.y..bottom {
            for x in rect.x..right {
                state.pixels[(y * self.width + x) as usize] = color;
            }
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

pub fn module(host: &Arc<FakeHost>, canvas: &Arc<Canvas>) -> PluginModule {
    PluginModule::new(host.clone(), canvas.clone())
}
