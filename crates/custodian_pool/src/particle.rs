//! A particle system built on the shared-state pool.
//!
//! Each [`Particle`] owns its own [`Motion`] (extrinsic state) and holds a
//! [`SharedHandle`] to a [`ParticleKind`] (intrinsic state: color and sprite).
//! However many particles are added, only one `ParticleKind` exists per
//! distinct color/sprite pair.
//!
//! # Example
//!
//! ```
//! use custodian_pool::ParticleSystem;
//!
//! let mut system = ParticleSystem::new();
//! system.add_particle(10.0, 10.0, 1.0, 2.0, "red", "fire").unwrap();
//! system.add_particle(15.0, 12.0, 1.5, 2.2, "red", "fire").unwrap();
//! system.add_particle(30.0, 30.0, -1.0, 1.0, "blue", "water").unwrap();
//!
//! assert_eq!(system.particle_count(), 3);
//! assert_eq!(system.flyweight_count(), 2);
//! ```

use crate::error::PoolError;
use crate::flyweight::Flyweight;
use crate::key::IntrinsicKey;
use crate::pool::{SharedHandle, SharedPool, SharedState};
use core::fmt;

/// A 2D vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// Creates a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Per-particle extrinsic state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    /// Current position.
    pub position: Vec2,
    /// Displacement applied on every update.
    pub velocity: Vec2,
}

/// Intrinsic particle state shared by every particle of the same look.
#[derive(Debug, PartialEq, Eq)]
pub struct ParticleKind {
    color: String,
    sprite: String,
}

impl ParticleKind {
    /// Returns the color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Returns the sprite name.
    #[must_use]
    pub fn sprite(&self) -> &str {
        &self.sprite
    }
}

impl SharedState for ParticleKind {
    fn from_key(key: &IntrinsicKey) -> Self {
        let [color, sprite] = key.fields();
        tracing::debug!(%color, %sprite, "created particle kind");
        Self {
            color: color.to_string(),
            sprite: sprite.to_string(),
        }
    }
}

impl Flyweight for ParticleKind {
    type Extrinsic = Motion;

    fn operation(&self, motion: &Motion) -> String {
        format!(
            "Rendering {} {} at ({}, {}) with velocity ({}, {})",
            self.color,
            self.sprite,
            motion.position.x,
            motion.position.y,
            motion.velocity.x,
            motion.velocity.y
        )
    }
}

/// A lightweight context pairing extrinsic motion with a shared kind.
#[derive(Debug, Clone)]
pub struct Particle {
    motion: Motion,
    kind: SharedHandle<ParticleKind>,
}

impl Particle {
    /// Creates a particle.
    #[must_use]
    pub fn new(motion: Motion, kind: SharedHandle<ParticleKind>) -> Self {
        Self { motion, kind }
    }

    /// Advances the position by one velocity step.
    pub fn update(&mut self) {
        self.motion.position.x += self.motion.velocity.x;
        self.motion.position.y += self.motion.velocity.y;
    }

    /// Renders the particle through its shared kind.
    #[must_use]
    pub fn render(&self) -> String {
        self.kind.operation(&self.motion)
    }

    /// Returns the particle's extrinsic state.
    #[must_use]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Returns the shared kind handle.
    #[must_use]
    pub fn kind(&self) -> &SharedHandle<ParticleKind> {
        &self.kind
    }
}

/// Particle and shared-kind counts with the resulting savings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    /// Number of particles (contexts).
    pub particles: usize,
    /// Number of shared kinds.
    pub flyweights: usize,
    /// Percentage of intrinsic-state copies avoided by sharing.
    pub efficiency: f64,
}

impl fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} particles, {} flyweights, {:.1}% reduction",
            self.particles, self.flyweights, self.efficiency
        )
    }
}

/// Owns many particles and the pool their kinds are drawn from.
#[derive(Debug, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    kinds: SharedPool<ParticleKind>,
}

impl ParticleSystem {
    /// Creates an empty particle system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a particle, reusing the kind for `color`/`sprite` if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidKey`] if `color` or `sprite` is empty or
    /// contains the key separator. No particle is added in that case.
    pub fn add_particle(
        &mut self,
        x: f64,
        y: f64,
        velocity_x: f64,
        velocity_y: f64,
        color: &str,
        sprite: &str,
    ) -> Result<&Particle, PoolError> {
        let kind = self.kinds.get_shared_parts([color, sprite])?;
        let motion = Motion {
            position: Vec2::new(x, y),
            velocity: Vec2::new(velocity_x, velocity_y),
        };
        let index = self.particles.len();
        self.particles.push(Particle::new(motion, kind));
        Ok(&self.particles[index])
    }

    /// Advances every particle by one step.
    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
    }

    /// Renders every particle.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.particles.iter().map(Particle::render).collect()
    }

    /// Returns the particles in insertion order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Returns the number of particles.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Returns the number of distinct shared kinds.
    #[must_use]
    pub fn flyweight_count(&self) -> usize {
        self.kinds.count()
    }

    /// Returns the canonical keys of every shared kind.
    #[must_use]
    pub fn list_flyweights(&self) -> Vec<IntrinsicKey> {
        self.kinds.list()
    }

    /// Reports how much intrinsic state is being shared.
    #[must_use]
    pub fn memory_usage(&self) -> MemoryUsage {
        let particles = self.particle_count();
        let flyweights = self.flyweight_count();
        let efficiency = if particles == 0 {
            0.0
        } else {
            (1.0 - flyweights as f64 / particles as f64) * 100.0
        };

        MemoryUsage {
            particles,
            flyweights,
            efficiency,
        }
    }

    /// Removes every particle. Shared kinds stay pooled.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particles_share_kinds() {
        let mut system = ParticleSystem::new();
        system.add_particle(0.0, 0.0, 2.0, 1.0, "red", "fire").unwrap();
        system.add_particle(10.0, 10.0, -1.0, 2.0, "blue", "water").unwrap();
        system.add_particle(20.0, 20.0, 1.0, -1.0, "red", "fire").unwrap();

        let particles = system.particles();
        assert!(SharedHandle::ptr_eq(particles[0].kind(), particles[2].kind()));
        assert!(!SharedHandle::ptr_eq(particles[0].kind(), particles[1].kind()));
        assert_eq!(system.flyweight_count(), 2);
    }

    #[test]
    fn add_particle_returns_the_new_particle() {
        let mut system = ParticleSystem::new();
        system.add_particle(0.0, 0.0, 0.0, 0.0, "red", "fire").unwrap();

        let added = system
            .add_particle(3.0, 4.0, -1.0, 0.5, "blue", "water")
            .unwrap();
        assert_eq!(added.motion().position, Vec2::new(3.0, 4.0));
        assert_eq!(added.motion().velocity, Vec2::new(-1.0, 0.5));
        assert_eq!(added.kind().color(), "blue");
        assert_eq!(added.kind().sprite(), "water");
    }

    #[test]
    fn update_moves_by_velocity() {
        let mut system = ParticleSystem::new();
        system.add_particle(0.0, 0.0, 2.0, 1.0, "red", "fire").unwrap();

        system.update();
        system.update();

        assert_eq!(system.particles()[0].motion().position, Vec2::new(4.0, 2.0));
    }

    #[test]
    fn render_combines_intrinsic_and_extrinsic_state() {
        let mut system = ParticleSystem::new();
        system.add_particle(10.0, 10.0, 1.5, 2.0, "red", "fire").unwrap();

        assert_eq!(
            system.render(),
            vec!["Rendering red fire at (10, 10) with velocity (1.5, 2)"]
        );
    }

    #[test]
    fn invalid_kind_adds_nothing() {
        let mut system = ParticleSystem::new();
        let result = system.add_particle(0.0, 0.0, 0.0, 0.0, "", "fire");

        assert!(result.is_err());
        assert_eq!(system.particle_count(), 0);
        assert_eq!(system.flyweight_count(), 0);
    }

    #[test]
    fn memory_usage_reports_reduction() {
        let mut system = ParticleSystem::new();
        assert_eq!(system.memory_usage().efficiency, 0.0);

        for i in 0..4 {
            system
                .add_particle(f64::from(i), 0.0, 0.0, 0.0, "green", "leaf")
                .unwrap();
        }

        let usage = system.memory_usage();
        assert_eq!(usage.particles, 4);
        assert_eq!(usage.flyweights, 1);
        assert!((usage.efficiency - 75.0).abs() < f64::EPSILON);
        assert_eq!(usage.to_string(), "4 particles, 1 flyweights, 75.0% reduction");
    }

    #[test]
    fn clear_keeps_kinds() {
        let mut system = ParticleSystem::new();
        system.add_particle(0.0, 0.0, 0.0, 0.0, "red", "fire").unwrap();

        system.clear();

        assert_eq!(system.particle_count(), 0);
        assert_eq!(system.flyweight_count(), 1);
    }
}
