//! This module defines the properties and storage of collision events

use crate::{
    momentum::{self, Momentum},
    numeric::Float,
    particle::Particle,
};
use num_traits::Zero;
use std::fmt::Display;

/// Number of leading particles entering the invariant mass
pub const NUM_PAIR_PARTICLES: usize = 2;

/// Particles reconstructed from one collision record
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Event number, as recorded by the experiment
    id: i64,

    /// Particles, in input order
    particles: Vec<Particle>,

    /// Invariant mass of the leading pair, 0.0 until computed
    invariant_mass: Float,

    /// Truth that the cached invariant mass came from a negative
    /// mass-squared which was clamped to zero
    mass_clamped: bool,
}
//
impl Event {
    /// Create an event without any particle
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Event number
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Particles of the event, in insertion order
    pub fn particles(&self) -> &[Particle] {
        &self.particles[..]
    }

    /// Append a particle to the event
    pub fn add_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Compute, cache and return the invariant mass of the two leading
    /// particles
    ///
    /// Events with less than two particles have an invariant mass of 0.0.
    pub fn calculate_invariant_mass(&mut self) -> Float {
        (self.invariant_mass, self.mass_clamped) = match self.leading_pair_momentum() {
            Some(p_tot) => momentum::clamped_mass(&p_tot),
            None => (0., false),
        };
        self.invariant_mass
    }

    /// Last computed invariant mass (0.0 if never computed)
    pub fn invariant_mass(&self) -> Float {
        self.invariant_mass
    }

    /// Truth that the last computed invariant mass was clamped to zero
    /// because the input 4-momenta were inconsistent
    pub fn mass_clamped(&self) -> bool {
        self.mass_clamped
    }

    /// Total 4-momentum of the two leading particles, if present
    fn leading_pair_momentum(&self) -> Option<Momentum> {
        if self.particles.len() < NUM_PAIR_PARTICLES {
            return None;
        }
        let p_tot = self.particles[..NUM_PAIR_PARTICLES]
            .iter()
            .fold(Momentum::zero(), |acc, p| acc + p.momentum());
        Some(p_tot)
    }
}

impl Display for Event {
    /// Dump 4-momenta of the particles
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(fmt, "Event #{}", self.id)?;
        for (idx, particle) in self.particles.iter().enumerate() {
            writeln!(
                fmt,
                "{}\tE={}\tpx={}\tpy={}\tpz={}\tQ={:+}",
                idx + 1,
                particle.energy(),
                particle.px(),
                particle.py(),
                particle.pz(),
                particle.charge(),
            )?;
        }
        Ok(())
    }
}
