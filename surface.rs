//! The drawing interface the particle field renders through.
//!
//! Shapes are always given in local coordinates; the surface maps them to
//! device pixels with its current transform, the same way a 2D canvas
//! context does.

use heapless::Vec;

/// Depth of the `save`/`restore` stack.
pub const TRANSFORM_DEPTH: usize = 8;

/// 8-bit color with straight (non-premultiplied) alpha.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
            ..self
        }
    }

    /// Composites this color over an opaque background.
    pub fn over(self, background: (u8, u8, u8)) -> (u8, u8, u8) {
        let a = u16::from(self.a);
        let mix = |fg: u8, bg: u8| ((u16::from(fg) * a + u16::from(bg) * (255 - a) + 127) / 255) as u8;
        (
            mix(self.r, background.0),
            mix(self.g, background.1),
            mix(self.b, background.2),
        )
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D affine transform: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// Applies a translation in local space.
    pub fn translated(self, x: f32, y: f32) -> Self {
        Self {
            e: self.a * x + self.c * y + self.e,
            f: self.b * x + self.d * y + self.f,
            ..self
        }
    }

    /// Applies a rotation in local space. Positive angles turn clockwise on
    /// a y-down surface.
    pub fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = (libm::sinf(angle), libm::cosf(angle));
        Self {
            a: self.a * cos + self.c * sin,
            b: self.b * cos + self.d * sin,
            c: self.c * cos - self.a * sin,
            d: self.d * cos - self.b * sin,
            ..self
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// `None` for a singular transform.
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

/// Current transform plus the saved ones, shared by every surface backend.
#[derive(Clone, Debug, Default)]
pub struct TransformStack {
    current: Affine,
    saved: Vec<Affine, TRANSFORM_DEPTH>,
}

impl TransformStack {
    pub fn current(&self) -> Affine {
        self.current
    }

    // CHANGE: Bounded save stack
    // REASON: no_std, no heap for transform state
    pub fn save(&mut self) {
        if self.saved.push(self.current).is_err() {
            tracing::warn!("transform stack full, save ignored");
        }
    }

    /// Pops the last saved transform, falling back to identity when nothing
    /// was saved.
    pub fn restore(&mut self) {
        self.current = self.saved.pop().unwrap_or(Affine::IDENTITY);
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.current = self.current.translated(x, y);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.current = self.current.rotated(angle);
    }

    pub fn reset(&mut self) {
        self.current = Affine::IDENTITY;
        self.saved.clear();
    }
}

/// A 2D pixel surface with a canvas-style transform stack.
pub trait Surface {
    type Error;

    /// Width and height in device pixels.
    fn size(&self) -> (u32, u32);

    fn is_degenerate(&self) -> bool {
        let (w, h) = self.size();
        w == 0 || h == 0
    }

    /// Wipes the whole surface and resets the transform.
    fn clear(&mut self) -> Result<(), Self::Error>;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, angle: f32);

    /// Filled circle centered on the local origin.
    fn fill_circle(&mut self, radius: f32, color: Rgba) -> Result<(), Self::Error>;

    /// Filled axis-aligned (in local space) ellipse centered on the origin.
    fn fill_ellipse(&mut self, radius_x: f32, radius_y: f32, color: Rgba) -> Result<(), Self::Error>;

    /// Quadratic Bézier stroke from `from` to `to` bending toward `control`.
    fn stroke_quadratic(
        &mut self,
        from: Point,
        control: Point,
        to: Point,
        color: Rgba,
        width: u32,
    ) -> Result<(), Self::Error>;
}

/// Point `t` along a quadratic Bézier.
pub fn quadratic_point(from: Point, control: Point, to: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point {
        x: u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
        y: u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
    }
}
