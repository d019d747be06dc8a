//! `Surface` over any embedded-graphics draw target.
//!
//! Rotated shapes are filled by scanning their device-space bounding box and
//! mapping each pixel center back into the shape's local frame. Targets
//! can't be read back, so translucent colors are composited over the
//! canvas background rather than over what is already on screen.

use embedded_graphics::{
    draw_target::{DrawTarget, DrawTargetExt},
    geometry::{Dimensions, Point as PixelPoint},
    pixelcolor::{Rgb888, RgbColor},
    primitives::{Line, Primitive, PrimitiveStyle},
    Drawable, Pixel,
};

use crate::surface::{quadratic_point, Point, Rgba, Surface, TransformStack};

/// Line segments used to approximate a quadratic curve.
const CURVE_SEGMENTS: usize = 8;

pub struct Canvas<'a, D> {
    target: &'a mut D,
    background: Rgb888,
    transforms: TransformStack,
}

impl<'a, D> Canvas<'a, D>
where
    D: DrawTarget<Color = Rgb888>,
{
    pub fn new(target: &'a mut D, background: Rgb888) -> Self {
        Self {
            target,
            background,
            transforms: TransformStack::default(),
        }
    }

    fn shade(&self, color: Rgba) -> Rgb888 {
        let bg = (self.background.r(), self.background.g(), self.background.b());
        let (r, g, b) = color.over(bg);
        Rgb888::new(r, g, b)
    }

    fn fill_oval(&mut self, radius_x: f32, radius_y: f32, color: Rgba) -> Result<(), D::Error> {
        if !(radius_x > 0.0 && radius_y > 0.0) {
            return Ok(());
        }
        let t = self.transforms.current();
        let Some(inv) = t.inverse() else {
            return Ok(());
        };

        let center = t.apply(Point::default());
        let half_w = libm::sqrtf((t.a * radius_x) * (t.a * radius_x) + (t.c * radius_y) * (t.c * radius_y));
        let half_h = libm::sqrtf((t.b * radius_x) * (t.b * radius_x) + (t.d * radius_y) * (t.d * radius_y));

        let area = self.target.bounding_box();
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let x0 = (libm::floorf(center.x - half_w) as i32).max(area.top_left.x);
        let x1 = (libm::ceilf(center.x + half_w) as i32).min(bottom_right.x);
        let y0 = (libm::floorf(center.y - half_h) as i32).max(area.top_left.y);
        let y1 = (libm::ceilf(center.y + half_h) as i32).min(bottom_right.y);

        // PERF: Pixels streamed straight into draw_iter, no buffer
        let fill = self.shade(color);
        let pixels = (y0..=y1)
            .flat_map(move |py| (x0..=x1).map(move |px| (px, py)))
            .filter_map(move |(px, py)| {
                let local = inv.apply(Point::new(px as f32 + 0.5, py as f32 + 0.5));
                let (nx, ny) = (local.x / radius_x, local.y / radius_y);
                (nx * nx + ny * ny <= 1.0).then_some(Pixel(PixelPoint::new(px, py), fill))
            });

        self.target.draw_iter(pixels)
    }
}

fn to_pixel(p: Point) -> PixelPoint {
    PixelPoint::new(libm::roundf(p.x) as i32, libm::roundf(p.y) as i32)
}

impl<D> Surface for Canvas<'_, D>
where
    D: DrawTarget<Color = Rgb888>,
{
    type Error = D::Error;

    fn size(&self) -> (u32, u32) {
        let size = self.target.bounding_box().size;
        (size.width, size.height)
    }

    fn clear(&mut self) -> Result<(), D::Error> {
        self.transforms.reset();
        self.target.clear(self.background)
    }

    fn save(&mut self) {
        self.transforms.save();
    }

    fn restore(&mut self) {
        self.transforms.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.transforms.translate(x, y);
    }

    fn rotate(&mut self, angle: f32) {
        self.transforms.rotate(angle);
    }

    fn fill_circle(&mut self, radius: f32, color: Rgba) -> Result<(), D::Error> {
        self.fill_oval(radius, radius, color)
    }

    fn fill_ellipse(&mut self, radius_x: f32, radius_y: f32, color: Rgba) -> Result<(), D::Error> {
        self.fill_oval(radius_x, radius_y, color)
    }

    fn stroke_quadratic(
        &mut self,
        from: Point,
        control: Point,
        to: Point,
        color: Rgba,
        width: u32,
    ) -> Result<(), D::Error> {
        let t = self.transforms.current();
        let style = PrimitiveStyle::with_stroke(self.shade(color), width.max(1));
        let area = self.target.bounding_box();
        let mut clipped = self.target.clipped(&area);

        let mut last = to_pixel(t.apply(from));
        for i in 1..=CURVE_SEGMENTS {
            let s = i as f32 / CURVE_SEGMENTS as f32;
            let next = to_pixel(t.apply(quadratic_point(from, control, to, s)));
            Line::new(last, next).into_styled(style).draw(&mut clipped)?;
            last = next;
        }
        Ok(())
    }
}
