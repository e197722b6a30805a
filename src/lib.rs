//! Dimuon: a small explorer of particle collision events
//!
//!
//! # Introduction (for the physicist)
//!
//! This program looks at events recorded by a collider experiment in which two
//! muons were reconstructed, such as the CMS `Dimuon_DoubleMu` open data
//! sample. For each event, it computes the invariant mass of the muon pair,
//! which reveals the mass of the particle they may have been produced by. The
//! J/Psi, Upsilon and Z resonances show up as peaks in the mass spectrum.
//!
//! It can also follow the muon tracks through the solenoid magnet of the
//! detector, in which they curl according to their transverse momentum.
//!
//!
//! # Introduction (for the numerical guy)
//!
//! Invariant masses are a direct computation on 4-momenta. Tracks are
//! integrated with a fixed time step, rotating the transverse momentum by an
//! exact angle at each step, under the ultra-relativistic approximation v = p/E.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program is a pipeline:
//!
//! * read in parameters,
//! * load the events from a CSV table,
//! * compute the invariant mass of each event and integrate it into a
//!   histogram and per-resonance counters, possibly in parallel,
//! * propagate the tracks of one event of interest,
//! * then display / store the result.

#![warn(missing_docs)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod event;
pub mod histogram;
pub mod momentum;
pub mod numeric;
pub mod output;
pub mod particle;
pub mod repository;
pub mod resonance;
pub mod scheduling;
pub mod trajectory;

pub use crate::{
    error::{PhysicsError, RepositoryError},
    event::Event,
    particle::Particle,
    repository::EventRepository,
    resonance::{classify, Classification, Confidence, Resonance},
    trajectory::{DetectorVolume, Trajectory, MAGNETIC_MOMENTUM_CONVERSION},
};

/// We'll use eyre's type-erased result type at the application level
pub type Result<T> = eyre::Result<T>;
