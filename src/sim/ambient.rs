//! Ambient particle field
//!
//! Slow drifting motes behind the cards. Purely cosmetic; wraps around the canvas.

use glam::Vec2;
use rand::{Rng, RngCore};

use super::state::Particle;
use crate::consts::REFERENCE_FRAME_MS;

/// Upward drift speed range (px per reference frame)
const DRIFT_MIN: f32 = 0.05;
const DRIFT_MAX: f32 = 0.35;
/// Twinkle angular speed (radians per ms)
const TWINKLE_SPEED: f32 = 0.002;

#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(count: usize, canvas: Vec2, rng: &mut dyn RngCore) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                pos: Vec2::new(rng.random::<f32>() * canvas.x, rng.random::<f32>() * canvas.y),
                vel: Vec2::new(
                    (rng.random::<f32>() - 0.5) * 0.2,
                    -(DRIFT_MIN + rng.random::<f32>() * (DRIFT_MAX - DRIFT_MIN)),
                ),
                size: 0.8 + rng.random::<f32>() * 1.8,
                phase: rng.random::<f32>() * std::f32::consts::TAU,
            })
            .collect();
        Self { particles }
    }

    pub fn update(&mut self, canvas: Vec2, dt_ms: f32) {
        let ratio = dt_ms / REFERENCE_FRAME_MS;
        for p in &mut self.particles {
            p.pos += p.vel * ratio;
            p.phase = (p.phase + dt_ms * TWINKLE_SPEED) % std::f32::consts::TAU;
            if canvas.x > 0.0 {
                p.pos.x = p.pos.x.rem_euclid(canvas.x);
            }
            if canvas.y > 0.0 {
                p.pos.y = p.pos.y.rem_euclid(canvas.y);
            }
        }
    }

    /// Opacity of a particle at its current twinkle phase
    pub fn alpha(particle: &Particle) -> f32 {
        0.15 + 0.35 * (0.5 + 0.5 * particle.phase.sin())
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
