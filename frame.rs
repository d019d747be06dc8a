//! Per-frame driver: clear, advance, redraw.

use rand::Rng;

use crate::surface::Surface;
use crate::ParticleField;

/// Owns the field and runs one frame at a time.
///
/// Resize requests are only recorded; the rebuild happens at the start of
/// the next frame so a step never runs against a half-built field.
pub struct FrameLoop<R> {
    field: ParticleField<R>,
    pending_resize: Option<(u32, u32)>,
    paused: bool,
    frames: u64,
}

impl<R: Rng> FrameLoop<R> {
    pub fn new(field: ParticleField<R>) -> Self {
        Self {
            field,
            pending_resize: None,
            paused: false,
            frames: 0,
        }
    }

    /// Latest request wins when several arrive between frames.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }

    pub fn frame<S: Surface>(&mut self, surface: &mut S) -> Result<(), S::Error> {
        // CHANGE: Pending resize applied before anything else
        // REASON: step() must only ever see a complete field
        if let Some((width, height)) = self.pending_resize.take() {
            self.field.on_resize(width, height);
        }

        surface.clear()?;
        if !self.paused {
            self.field.step();
        }
        self.field.render(surface)?;

        self.frames += 1;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn field(&self) -> &ParticleField<R> {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField<R> {
        &mut self.field
    }
}
