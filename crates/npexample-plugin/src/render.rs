//! Expose-driven rendering.
//!
//! Every draw acquires a colormap, two colours and a graphics context from
//! the host's graphics service, fills the exposed rectangle, and gives the
//! colours and context back before returning. Release is tied to guard
//! drops so early returns cannot leak host resources.

use std::sync::Arc;

use crate::events::{DisplayHandle, DrawableHandle, ExposeEvent, Rect};

// ─── Handles ────────────────────────────────────────────────────────────

/// Host colormap id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colormap(pub u64);

/// An allocated colour cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel(pub u64);

/// Host graphics context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GcHandle(pub usize);

/// A colour in 16-bit-per-channel X11 terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const RED: Self = Self::new(0xffff, 0, 0);

    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }
}

// ─── Graphics service ───────────────────────────────────────────────────

/// The host's 2D graphics service (Xlib on X11).
///
/// Display and drawable are borrowed from the triggering event; colours and
/// graphics contexts handed out here must be returned through the matching
/// `free_*` call.
pub trait GraphicsBackend: Send + Sync {
    /// Default colormap of the display's default screen.
    fn default_colormap(&self, display: DisplayHandle) -> Colormap;

    /// Allocate a read-only colour cell; `None` when the colormap is full
    /// or the service is unavailable.
    fn alloc_color(&self, display: DisplayHandle, colormap: Colormap, color: Rgb)
        -> Option<Pixel>;

    fn free_color(&self, display: DisplayHandle, colormap: Colormap, pixel: Pixel);

    fn create_gc(
        &self,
        display: DisplayHandle,
        drawable: DrawableHandle,
        foreground: Pixel,
        background: Pixel,
    ) -> Option<GcHandle>;

    fn free_gc(&self, display: DisplayHandle, gc: GcHandle);

    fn fill_rectangle(
        &self,
        display: DisplayHandle,
        drawable: DrawableHandle,
        gc: GcHandle,
        rect: Rect,
    );
}

// ─── Scoped resources ───────────────────────────────────────────────────

/// A colour cell freed on drop.
struct ColorAllocation<'a> {
    backend: &'a dyn GraphicsBackend,
    display: DisplayHandle,
    colormap: Colormap,
    pixel: Pixel,
}

impl<'a> ColorAllocation<'a> {
    fn alloc(
        backend: &'a dyn GraphicsBackend,
        display: DisplayHandle,
        colormap: Colormap,
        color: Rgb,
    ) -> Option<Self> {
        let pixel = backend.alloc_color(display, colormap, color)?;
        Some(Self {
            backend,
            display,
            colormap,
            pixel,
        })
    }
}

impl Drop for ColorAllocation<'_> {
    fn drop(&mut self) {
        self.backend
            .free_color(self.display, self.colormap, self.pixel);
    }
}

/// A graphics context freed on drop.
struct GraphicsContext<'a> {
    backend: &'a dyn GraphicsBackend,
    display: DisplayHandle,
    gc: GcHandle,
}

impl<'a> GraphicsContext<'a> {
    fn create(
        backend: &'a dyn GraphicsBackend,
        display: DisplayHandle,
        drawable: DrawableHandle,
        foreground: &ColorAllocation<'_>,
        background: &ColorAllocation<'_>,
    ) -> Option<Self> {
        let gc = backend.create_gc(display, drawable, foreground.pixel, background.pixel)?;
        Some(Self {
            backend,
            display,
            gc,
        })
    }
}

impl Drop for GraphicsContext<'_> {
    fn drop(&mut self) {
        self.backend.free_gc(self.display, self.gc);
    }
}

// ─── Renderer ───────────────────────────────────────────────────────────

/// Why a draw did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyRect,
    ColorUnavailable,
    NoGraphicsContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Painted,
    Skipped(SkipReason),
}

/// Fills exposed rectangles in a fixed two-colour palette.
#[derive(Clone)]
pub struct Renderer {
    backend: Arc<dyn GraphicsBackend>,
    foreground: Rgb,
    background: Rgb,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("foreground", &self.foreground)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(backend: Arc<dyn GraphicsBackend>) -> Self {
        Self {
            backend,
            foreground: Rgb::RED,
            background: Rgb::BLACK,
        }
    }

    /// Repaint the region named by an expose event.
    pub fn draw_expose(&self, event: &ExposeEvent) -> DrawOutcome {
        self.draw(event.drawable, event.display, event.rect)
    }

    /// Fill `rect` of `drawable` with the foreground colour.
    ///
    /// Colour or context shortfalls make this a no-op; a missed repaint is
    /// cosmetic.
    pub fn draw(&self, drawable: DrawableHandle, display: DisplayHandle, rect: Rect) -> DrawOutcome {
        if rect.is_empty() {
            return DrawOutcome::Skipped(SkipReason::EmptyRect);
        }

        let backend = self.backend.as_ref();
        let colormap = backend.default_colormap(display);

        // Declaration order matters: the context must drop before the colours.
        let Some(background) = ColorAllocation::alloc(backend, display, colormap, self.background)
        else {
            tracing::warn!(color = ?self.background, "could not allocate background colour");
            return DrawOutcome::Skipped(SkipReason::ColorUnavailable);
        };
        let Some(foreground) = ColorAllocation::alloc(backend, display, colormap, self.foreground)
        else {
            tracing::warn!(color = ?self.foreground, "could not allocate foreground colour");
            return DrawOutcome::Skipped(SkipReason::ColorUnavailable);
        };
        let Some(gc) =
            GraphicsContext::create(backend, display, drawable, &foreground, &background)
        else {
            tracing::warn!("could not create graphics context");
            return DrawOutcome::Skipped(SkipReason::NoGraphicsContext);
        };

        backend.fill_rectangle(display, drawable, gc.gc, rect);
        tracing::trace!(
            drawable = drawable.0,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "filled exposed rectangle"
        );

        DrawOutcome::Painted
    }
}
