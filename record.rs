//! A surface that keeps a log of draw calls instead of touching pixels.

use heapless::Vec;
use thiserror::Error;

use crate::surface::{Affine, Point, Rgba, Surface, TransformStack};

/// One recorded drawing operation, with the transform that was in effect.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    Circle {
        transform: Affine,
        radius: f32,
        color: Rgba,
    },
    Ellipse {
        transform: Affine,
        radius_x: f32,
        radius_y: f32,
        color: Rgba,
    },
    Quadratic {
        transform: Affine,
        from: Point,
        control: Point,
        to: Point,
        color: Rgba,
        width: u32,
    },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    #[error("command log full after {0} entries")]
    Full(usize),
}

/// Records up to `N` commands for a `width` x `height` surface.
pub struct Recorder<const N: usize> {
    width: u32,
    height: u32,
    transforms: TransformStack,
    commands: Vec<DrawCommand, N>,
}

impl<const N: usize> Recorder<N> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            transforms: TransformStack::default(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drops the log, keeping the surface size.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.transforms.reset();
    }

    pub fn transform(&self) -> Affine {
        self.transforms.current()
    }

    fn record(&mut self, command: DrawCommand) -> Result<(), RecordError> {
        self.commands.push(command).map_err(|_| RecordError::Full(N))
    }
}

impl<const N: usize> Surface for Recorder<N> {
    type Error = RecordError;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) -> Result<(), RecordError> {
        self.transforms.reset();
        self.record(DrawCommand::Clear)
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

    fn fill_circle(&mut self, radius: f32, color: Rgba) -> Result<(), RecordError> {
        let transform = self.transforms.current();
        self.record(DrawCommand::Circle { transform, radius, color })
    }

    fn fill_ellipse(&mut self, radius_x: f32, radius_y: f32, color: Rgba) -> Result<(), RecordError> {
        let transform = self.transforms.current();
        self.record(DrawCommand::Ellipse { transform, radius_x, radius_y, color })
    }

    fn stroke_quadratic(
        &mut self,
        from: Point,
        control: Point,
        to: Point,
        color: Rgba,
        width: u32,
    ) -> Result<(), RecordError> {
        let transform = self.transforms.current();
        self.record(DrawCommand::Quadratic { transform, from, control, to, color, width })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParticleField, ParticleKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn field(width: u32, height: u32) -> ParticleField<ChaCha8Rng> {
        ParticleField::new(width, height, ChaCha8Rng::seed_from_u64(42))
    }

    #[test]
    fn render_twice_records_the_same_commands() {
        let f = field(800, 600);
        let mut first: Recorder<256> = Recorder::new(800, 600);
        let mut second: Recorder<256> = Recorder::new(800, 600);
        f.render(&mut first).expect("fits");
        f.render(&mut second).expect("fits");
        assert!(!first.commands().is_empty());
        assert_eq!(first.commands(), second.commands());
        assert_eq!(first.transform(), Affine::IDENTITY);
    }

    #[test]
    fn stars_are_circles_and_beans_are_ellipse_plus_crease() {
        let f = field(800, 600);
        let (stars, beans) = f.census();
        let mut rec: Recorder<256> = Recorder::new(800, 600);
        f.render(&mut rec).expect("fits");

        let circles = rec.commands().iter().filter(|c| matches!(c, DrawCommand::Circle { .. })).count();
        let ellipses = rec.commands().iter().filter(|c| matches!(c, DrawCommand::Ellipse { .. })).count();
        let creases = rec.commands().iter().filter(|c| matches!(c, DrawCommand::Quadratic { .. })).count();
        assert_eq!(circles, stars);
        assert_eq!(ellipses, beans);
        assert_eq!(creases, beans);
    }

    #[test]
    fn shapes_are_drawn_at_the_particle_with_its_rotation() {
        let f = field(800, 600);
        let mut rec: Recorder<256> = Recorder::new(800, 600);
        f.render(&mut rec).expect("fits");

        let mut commands = rec.commands().iter();
        for p in f.particles() {
            let expected = Affine::IDENTITY.translated(p.x, p.y).rotated(p.angle);
            match (p.kind, commands.next()) {
                (ParticleKind::Star, Some(DrawCommand::Circle { transform, radius, .. })) => {
                    assert_eq!(*transform, expected);
                    assert_eq!(*radius, p.size);
                }
                (ParticleKind::Bean, Some(DrawCommand::Ellipse { transform, radius_x, radius_y, color })) => {
                    assert_eq!(*transform, expected);
                    assert_eq!((*radius_x, *radius_y), (p.size * 2.0, p.size * 1.2));
                    assert_eq!(*color, f.settings().bean_color);
                    match commands.next() {
                        Some(DrawCommand::Quadratic { from, control, to, color, .. }) => {
                            assert_eq!(*from, Point::new(-p.size, 0.0));
                            assert_eq!(*control, Point::new(0.0, -p.size / 2.0));
                            assert_eq!(*to, Point::new(p.size, 0.0));
                            assert_eq!(*color, f.settings().crease_color);
                        }
                        other => panic!("expected crease, got {other:?}"),
                    }
                }
                (kind, other) => panic!("{kind:?} drew {other:?}"),
            }
        }
        assert!(commands.next().is_none());
    }

    #[test]
    fn zero_area_surface_records_nothing() {
        let f = field(800, 600);
        let mut rec: Recorder<8> = Recorder::new(0, 600);
        assert_eq!(f.render(&mut rec), Ok(()));
        assert!(rec.commands().is_empty());
    }

    #[test]
    fn overflow_is_reported() {
        let f = field(800, 600);
        let mut rec: Recorder<4> = Recorder::new(800, 600);
        assert_eq!(f.render(&mut rec), Err(RecordError::Full(4)));
        // restore still ran for the failing particle
        assert_eq!(rec.transform(), Affine::IDENTITY);
    }
}
