//! bean-field - falling stars and coffee beans
//! no_std compatible; the particle pool is the only allocation

#![no_std]

// CHANGE: Particle pool lives in an alloc Vec
// REASON: Population must track floor(width / spacing) for any viewport
extern crate alloc;

use alloc::vec::Vec;
use core::f32::consts::TAU;

use rand::Rng;

#[cfg(feature = "embedded-graphics")]
pub mod canvas;
pub mod frame;
pub mod record;
pub mod settings;
pub mod surface;

#[cfg(feature = "embedded-graphics")]
pub use canvas::Canvas;
pub use frame::FrameLoop;
pub use record::{DrawCommand, RecordError, Recorder};
pub use settings::{Settings, SettingsError};
pub use surface::{Affine, Point, Rgba, Surface};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Star,
    Bean,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub fall_speed: f32,
    /// Radians.
    pub angle: f32,
    /// Radians per frame.
    pub spin: f32,
    pub kind: ParticleKind,
    pub color: Rgba,
}

impl Particle {
    /// Rolls every attribute. `y` is left to the caller: spread across the
    /// viewport on first fill, `respawn_y` afterwards.
    pub fn spawn<R: Rng>(rng: &mut R, settings: &Settings, width: u32, y: f32) -> Self {
        let x = uniform(rng, 0.0, width as f32);
        let size = uniform(rng, settings.min_size, settings.max_size);
        let fall_speed = uniform(rng, settings.min_fall_speed, settings.max_fall_speed);
        let angle = uniform(rng, 0.0, TAU);
        let spin = uniform(rng, -settings.max_spin, settings.max_spin);
        let (kind, color) = if rng.gen::<f32>() < settings.bean_chance {
            (ParticleKind::Bean, settings.bean_color)
        } else {
            let alpha = uniform(rng, settings.star_min_alpha, settings.star_max_alpha);
            (ParticleKind::Star, Rgba::WHITE.with_alpha(alpha))
        };

        Self {
            x,
            y,
            size,
            fall_speed,
            angle,
            spin,
            kind,
            color,
        }
    }

    /// Draws the particle rotated about its own position, leaving the
    /// surface transform as it found it.
    pub fn draw<S: Surface>(&self, surface: &mut S, settings: &Settings) -> Result<(), S::Error> {
        surface.save();
        surface.translate(self.x, self.y);
        surface.rotate(self.angle);

        let drawn = match self.kind {
            ParticleKind::Star => surface.fill_circle(self.size, self.color),
            ParticleKind::Bean => surface
                .fill_ellipse(self.size * 2.0, self.size * 1.2, self.color)
                .and_then(|()| {
                    surface.stroke_quadratic(
                        Point::new(-self.size, 0.0),
                        Point::new(0.0, -self.size / 2.0),
                        Point::new(self.size, 0.0),
                        settings.crease_color,
                        settings.crease_width,
                    )
                }),
        };

        surface.restore();
        drawn
    }
}

/// `min + u * (max - min)` with `u` in `[0, 1)`; equal bounds yield `min`.
fn uniform<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    // The multiply can round up to `max` for u just below 1.
    let value = min + rng.gen::<f32>() * (max - min);
    if value >= max && max > min {
        min
    } else {
        value
    }
}

/// Set of falling particles sized to a viewport.
///
/// The field owns its random source so a seeded generator makes every frame
/// reproducible.
pub struct ParticleField<R> {
    particles: Vec<Particle>,
    width: u32,
    height: u32,
    rng: R,
    settings: Settings,
}

impl<R: Rng> ParticleField<R> {
    /// Field with default settings, filled for a `width` x `height` viewport.
    pub fn new(width: u32, height: u32, rng: R) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            width,
            height,
            rng,
            settings: Settings::default(),
        };
        field.initialize(width, height);
        field
    }

    pub fn with_settings(width: u32, height: u32, rng: R, settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut field = Self {
            particles: Vec::new(),
            width,
            height,
            rng,
            settings,
        };
        field.initialize(width, height);
        Ok(field)
    }

    /// Replaces the population with `floor(width / spacing)` fresh particles
    /// spread over the full height.
    pub fn initialize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.particles.clear();

        let count = (width / self.settings.spacing) as usize;
        self.particles.reserve(count);

        for _ in 0..count {
            let y = if height == 0 {
                0.0
            } else {
                uniform(&mut self.rng, 0.0, height as f32)
            };
            let particle = Particle::spawn(&mut self.rng, &self.settings, width, y);
            self.particles.push(particle);
        }

        tracing::debug!(width, height, count, "particle field initialized");
    }

    /// Discards the population and starts over at the new size.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.initialize(width, height);
    }

    /// Advances every particle one frame, respawning the ones that fell past
    /// the bottom edge.
    pub fn step(&mut self) {
        let bottom = self.height as f32;
        for p in self.particles.iter_mut() {
            p.y += p.fall_speed;
            p.angle += p.spin;

            if p.y > bottom {
                *p = Particle::spawn(&mut self.rng, &self.settings, self.width, self.settings.respawn_y);
            }
        }
    }

    /// Draws every particle. A zero-area surface draws nothing.
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        if surface.is_degenerate() {
            return Ok(());
        }
        for p in &self.particles {
            p.draw(surface, &self.settings)?;
        }
        Ok(())
    }

    /// New settings apply from the next spawn on; live particles keep their
    /// rolled attributes.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.settings = settings;
        tracing::debug!("particle settings updated");
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(stars, beans)` currently in the field.
    pub fn census(&self) -> (usize, usize) {
        let beans = self.particles.iter().filter(|p| p.kind == ParticleKind::Bean).count();
        (self.particles.len() - beans, beans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    type TestField = ParticleField<ChaCha8Rng>;

    fn field(width: u32, height: u32) -> TestField {
        ParticleField::new(width, height, ChaCha8Rng::seed_from_u64(7))
    }

    #[test]
    fn initialize_sizes_by_width() {
        assert_eq!(field(800, 600).len(), 80);
        assert_eq!(field(809, 600).len(), 80);
        assert_eq!(field(9, 600).len(), 0);
    }

    #[test]
    fn initial_particles_spread_over_height() {
        let f = field(800, 600);
        assert!(f.particles().iter().all(|p| (0.0..600.0).contains(&p.y)));
        assert!(f.particles().iter().all(|p| (0.0..800.0).contains(&p.x)));
    }

    #[test]
    fn resize_rebuilds_the_field() {
        let mut f = field(800, 600);
        for _ in 0..50 {
            f.step();
        }
        f.on_resize(400, 300);
        assert_eq!(f.len(), 40);
        assert_eq!((f.width(), f.height()), (400, 300));
        assert!(f.particles().iter().all(|p| (0.0..300.0).contains(&p.y)));
        assert!(f.particles().iter().all(|p| p.y != -20.0));
    }

    #[test]
    fn wide_viewports_get_the_full_population() {
        assert_eq!(field(6400, 600).len(), 640);
        assert_eq!(field(7680, 1080).len(), 768);

        let mut f = field(400, 300);
        f.on_resize(10_240, 300);
        assert_eq!(f.len(), 1024);
    }

    #[test]
    fn zero_height_starts_at_top() {
        let f = field(100, 0);
        assert_eq!(f.len(), 10);
        assert!(f.particles().iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn fall_accumulates_until_respawn() {
        // Tall viewport: max speed 1.5 over 100 frames never reaches the bottom.
        let mut f = field(500, 100_000);
        let before: Vec<Particle> = f.particles().iter().copied().collect();
        for p in f.particles_mut() {
            p.y = 0.0;
        }
        let k = 100;
        for _ in 0..k {
            f.step();
        }
        for (now, then) in f.particles().iter().zip(before.iter()) {
            let expected = k as f32 * then.fall_speed;
            assert!((now.y - expected).abs() < 1e-3, "{} vs {}", now.y, expected);
            assert_eq!(now.size, then.size);
            assert_eq!(now.fall_speed, then.fall_speed);
            assert_eq!(now.kind, then.kind);
        }
    }

    #[test]
    fn y_never_decreases_between_respawns() {
        let mut f = field(300, 50);
        for _ in 0..500 {
            let before: Vec<f32> = f.particles().iter().map(|p| p.y).collect();
            f.step();
            for (p, y0) in f.particles().iter().zip(before.iter()) {
                assert!(p.y >= *y0 || p.y == f.settings().respawn_y);
            }
        }
    }

    #[test]
    fn particles_below_the_edge_respawn_above() {
        let mut f = field(800, 600);
        for p in f.particles_mut() {
            p.y = 600.5;
        }
        f.step();
        assert_eq!(f.len(), 80);
        for p in f.particles() {
            assert_eq!(p.y, -20.0);
            assert!((0.0..800.0).contains(&p.x));
        }
    }

    #[test]
    fn size_and_speed_stay_positive() {
        let mut f = field(1000, 40);
        for _ in 0..2_000 {
            f.step();
            for p in f.particles() {
                assert!(p.size > 0.0 && p.fall_speed > 0.0);
                assert!((1.0..4.0).contains(&p.size));
                assert!((0.5..1.5).contains(&p.fall_speed));
            }
        }
    }

    #[test]
    fn bean_share_converges_to_a_fifth() {
        let settings = Settings::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let total = 100_000;
        let beans = (0..total)
            .filter(|_| Particle::spawn(&mut rng, &settings, 800, settings.respawn_y).kind == ParticleKind::Bean)
            .count();
        let share = beans as f64 / total as f64;
        assert!((share - 0.2).abs() < 0.01, "bean share {share}");
    }

    #[test]
    fn colors_follow_kind() {
        let settings = Settings::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..1_000 {
            let p = Particle::spawn(&mut rng, &settings, 800, 0.0);
            match p.kind {
                ParticleKind::Bean => assert_eq!(p.color, settings.bean_color),
                ParticleKind::Star => {
                    assert_eq!((p.color.r, p.color.g, p.color.b), (255, 255, 255));
                    assert!((51..=179).contains(&p.color.a));
                }
            }
        }
    }

    #[test]
    fn same_seed_same_field() {
        let mut a = field(640, 480);
        let mut b = field(640, 480);
        for _ in 0..300 {
            a.step();
            b.step();
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn update_settings_applies_on_respawn() {
        let mut f = field(200, 10);
        let all_beans = Settings { bean_chance: 1.0, ..Settings::default() };
        f.update_settings(all_beans).expect("valid settings");
        for p in f.particles_mut() {
            p.y = 11.0;
        }
        f.step();
        assert_eq!(f.census(), (0, 20));

        let bad = Settings { spacing: 0, ..Settings::default() };
        assert_eq!(f.update_settings(bad), Err(SettingsError::ZeroSpacing));
        assert_eq!(f.settings().bean_chance, 1.0);
    }

    #[test]
    fn with_settings_rejects_invalid() {
        let bad = Settings { min_size: -1.0, ..Settings::default() };
        assert!(TestField::with_settings(800, 600, ChaCha8Rng::seed_from_u64(0), bad).is_err());
    }
}
