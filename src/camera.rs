use crate::config::Config;
use crate::raycast::{Boundary, RayHit};

/// Anything farther (or non-finite) is treated as "nothing visible".
const FAR: f32 = 1.0e6;
/// Stripe height used for rays that hit nothing.
pub const MIN_STRIPE_HEIGHT: f32 = 0.0;

#[inline]
fn visible(corrected_distance: f32) -> bool {
    corrected_distance.is_finite() && corrected_distance < FAR
}

/// `numerator / distance` for a visible distance. Zero or negative
/// distances (caster on a wall line) and overflow saturate at `f32::MAX`.
#[inline]
fn inverse_scaled(numerator: f32, distance: f32) -> f32 {
    if distance <= 0.0 {
        return f32::MAX;
    }
    (numerator / distance).min(f32::MAX)
}

/// One screen column ready for the render backend. Every field is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnProjection {
    /// False when the ray found no wall within the map.
    pub hit: bool,
    /// Fisheye-corrected distance; `f32::MAX` when `hit` is false.
    pub corrected_distance: f32,
    pub stripe_height: f32,
    /// Top of the stripe, (screen_height - stripe_height) / 2.
    pub top: f32,
    /// `k / corrected_distance`, zero for rays with no hit.
    pub depth_cue: f32,
    pub boundary: Boundary,
}

/// Maps ray distances to screen space for a fixed fov and screen size.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Distance to the projection plane, (screen_width / 2) / tan(fov / 2).
    pub plane_distance: f32,
    pub screen_height: f32,
    pub cell_size: f32,
    pub depth_cue_k: f32,
}

impl Camera {
    pub fn new(
        screen_width: f32,
        screen_height: f32,
        fov: f32,
        cell_size: f32,
        depth_cue_k: f32,
    ) -> Self {
        let mut camera = Self {
            plane_distance: 0.0,
            screen_height,
            cell_size,
            depth_cue_k,
        };
        camera.set_fov(screen_width, fov);
        camera
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.screen_width as f32,
            config.screen_height as f32,
            config.fov(),
            config.cell_size,
            config.depth_cue_constant,
        )
    }

    pub fn set_fov(&mut self, screen_width: f32, fov: f32) {
        self.plane_distance = 0.5 * screen_width / (0.5 * fov).tan();
    }

    #[inline]
    pub fn screen_center_y(&self) -> f32 {
        0.5 * self.screen_height
    }

    /// Height of a wall stripe at `corrected_distance`. Strictly
    /// decreasing over visible distances.
    #[inline]
    pub fn stripe_height(&self, corrected_distance: f32) -> f32 {
        if !visible(corrected_distance) {
            return MIN_STRIPE_HEIGHT;
        }
        inverse_scaled(self.cell_size * self.plane_distance, corrected_distance)
    }

    pub fn project_hit(&self, hit: &RayHit, heading: f32) -> ColumnProjection {
        let corrected = hit.distance * (hit.angle - heading).cos();
        let seen = visible(corrected);
        let stripe_height = self.stripe_height(corrected);
        let depth_cue = if seen {
            inverse_scaled(self.depth_cue_k, corrected)
        } else {
            0.0
        };
        ColumnProjection {
            hit: seen,
            corrected_distance: if seen { corrected } else { f32::MAX },
            stripe_height,
            top: (self.screen_height - stripe_height) * 0.5,
            depth_cue,
            boundary: hit.boundary,
        }
    }

    /// One projection per hit, same order.
    pub fn project(&self, hits: &[RayHit], heading: f32) -> Vec<ColumnProjection> {
        hits.iter().map(|hit| self.project_hit(hit, heading)).collect()
    }
}
