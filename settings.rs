//! Tunable parameters for the particle field.

use thiserror::Error;

use crate::surface::Rgba;

/// Everything that shapes how particles are spawned and drawn.
///
/// Defaults reproduce the page background: a star or bean every ten pixels
/// of width, drifting down at half a pixel to one and a half pixels a frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Settings {
    // Population
    /// Horizontal pixels per particle; `count = floor(width / spacing)`.
    pub spacing: u32,
    /// Probability that a spawned particle is a bean rather than a star.
    pub bean_chance: f32,

    // Shape
    pub min_size: f32,
    pub max_size: f32,

    // Motion
    pub min_fall_speed: f32,
    pub max_fall_speed: f32,
    /// Spin is drawn from `[-max_spin, max_spin)` radians per frame.
    pub max_spin: f32,
    /// Where respawned particles re-enter, above the top edge.
    pub respawn_y: f32,

    // Colors
    pub star_min_alpha: f32,
    pub star_max_alpha: f32,
    pub bean_color: Rgba,
    pub crease_color: Rgba,
    pub crease_width: u32,
}

// COMPAT: Defaults match the live page background
impl Default for Settings {
    fn default() -> Self {
        Self {
            spacing: 10,
            bean_chance: 0.2,
            min_size: 1.0,
            max_size: 4.0,
            min_fall_speed: 0.5,
            max_fall_speed: 1.5,
            max_spin: 0.05,
            respawn_y: -20.0,
            star_min_alpha: 0.2,
            star_max_alpha: 0.7,
            bean_color: Rgba::opaque(0x6f, 0x4e, 0x37),
            crease_color: Rgba::opaque(0x3e, 0x2b, 0x1f),
            crease_width: 1,
        }
    }
}

/// Rejected settings.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SettingsError {
    #[error("particle spacing must be at least one pixel")]
    ZeroSpacing,
    #[error("bean chance {0} is outside [0, 1]")]
    BeanChance(f32),
    #[error("{name} range [{min}, {max}) must be positive and ordered")]
    Range {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("max spin {0} must be finite and non-negative")]
    Spin(f32),
}

impl Settings {
    /// Checks every range so spawning can never produce a non-positive
    /// size or fall speed.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.spacing == 0 {
            return Err(SettingsError::ZeroSpacing);
        }
        if !(0.0..=1.0).contains(&self.bean_chance) {
            return Err(SettingsError::BeanChance(self.bean_chance));
        }
        check_range("size", self.min_size, self.max_size, true)?;
        check_range("fall speed", self.min_fall_speed, self.max_fall_speed, true)?;
        check_range("star alpha", self.star_min_alpha, self.star_max_alpha, false)?;
        if self.star_max_alpha > 1.0 {
            return Err(SettingsError::Range {
                name: "star alpha",
                min: self.star_min_alpha,
                max: self.star_max_alpha,
            });
        }
        if !self.max_spin.is_finite() || self.max_spin < 0.0 {
            return Err(SettingsError::Spin(self.max_spin));
        }
        Ok(())
    }
}

fn check_range(name: &'static str, min: f32, max: f32, strictly_positive: bool) -> Result<(), SettingsError> {
    let lower_ok = if strictly_positive { min > 0.0 } else { min >= 0.0 };
    if lower_ok && min <= max && max.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::Range { name, min, max })
    }
}
