//! Platform events delivered by the host.
//!
//! The host hands over an untyped event whose first field is a kind tag.
//! Only `GraphicsExpose` is recognized; everything else becomes
//! [`PlatformEvent::Unrecognized`] and is left for the host's default
//! handling.

/// X11 event type tag for `GraphicsExpose`.
pub const GRAPHICS_EXPOSE: i32 = 13;

/// Host display connection (an Xlib `Display*`), borrowed for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub usize);

impl DisplayHandle {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Host drawable (an X11 `Drawable` id), borrowed for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableHandle(pub u64);

/// A dirty region in drawable coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from signed event fields; any negative value is
    /// rejected.
    pub fn from_signed(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        Some(Self {
            x: u32::try_from(x).ok()?,
            y: u32::try_from(y).ok()?,
            width: u32::try_from(width).ok()?,
            height: u32::try_from(height).ok()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && py >= self.y
            && u64::from(px) < self.right()
            && u64::from(py) < self.bottom()
    }
}

/// A request to repaint `rect` of `drawable` on `display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposeEvent {
    pub display: DisplayHandle,
    pub drawable: DrawableHandle,
    pub rect: Rect,
}

/// The fields of an expose event as the platform lays them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawExpose {
    pub display: usize,
    pub drawable: u64,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// An event from the host, discriminated by its kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    GraphicsExpose(ExposeEvent),
    Unrecognized { kind: i32 },
}

impl PlatformEvent {
    /// Interpret an event tag, reading the expose payload only when the tag
    /// says there is one.
    ///
    /// An expose with a null display or negative geometry is treated as
    /// unrecognized.
    pub fn decode(kind: i32, expose: impl FnOnce() -> RawExpose) -> Self {
        if kind != GRAPHICS_EXPOSE {
            return Self::Unrecognized { kind };
        }

        let raw = expose();
        let display = DisplayHandle(raw.display);
        let rect = Rect::from_signed(raw.x, raw.y, raw.width, raw.height);
        match rect {
            Some(rect) if !display.is_null() => Self::GraphicsExpose(ExposeEvent {
                display,
                drawable: DrawableHandle(raw.drawable),
                rect,
            }),
            _ => {
                tracing::debug!(?raw, "malformed expose event");
                Self::Unrecognized { kind }
            }
        }
    }

    pub fn kind(&self) -> i32 {
        match self {
            Self::GraphicsExpose(_) => GRAPHICS_EXPOSE,
            Self::Unrecognized { kind } => *kind,
        }
    }
}
