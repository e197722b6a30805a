//! Propagation of charged tracks in the uniform axial field of the detector
//!
//! In a magnetic field B along the beam axis, the transverse momentum of a
//! charged particle rotates at the cyclotron rate ω = k·B·q/E while its
//! longitudinal momentum stays constant. Positions are advanced with the
//! ultra-relativistic velocity v = p/E (c = 1). The exact motion is a helix,
//! and since each step applies an exact rotation of the momentum, the only
//! discretization error is the polygonal approximation of that helix.
//!
//! All trajectory computations go through [`HelixIntegrator::integrate`],
//! which is parametrized by a predicate deciding where the track stops.

use crate::{
    error::PhysicsError,
    momentum::{Momentum, Position, E, X, Y, Z},
    numeric::Float,
};

use prefix_num_ops::real::*;

/// Conversion factor from B (Tesla) × R (meters) to p (GeV)
///
/// A track of transverse momentum pT (GeV) in a field B (T) has a curvature
/// radius R (m) such that pT = 0.3·B·R.
pub const MAGNETIC_MOMENTUM_CONVERSION: Float = 0.3;

/// Cylindrical detector volume, centered on the collision point and aligned
/// with the beam axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorVolume {
    /// Maximal transverse radius (m)
    pub radius: Float,

    /// Maximal distance from the collision point along the beam axis (m)
    pub half_length: Float,
}
//
impl DetectorVolume {
    /// Define a detector volume
    pub fn new(radius: Float, half_length: Float) -> Self {
        Self {
            radius,
            half_length,
        }
    }

    /// Truth that a point lies inside the detector
    pub fn contains(&self, pos: &Position) -> bool {
        let transverse_radius = sqrt(pos[X] * pos[X] + pos[Y] * pos[Y]);
        transverse_radius <= self.radius && abs(pos[Z]) <= self.half_length
    }
}

/// Kinematic state of a track being propagated
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackState {
    /// Current position (m)
    pub position: Position,

    /// Current 4-momentum (GeV), whose transverse part rotates over time
    pub momentum: Momentum,
}

/// Discretized path of a track
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    /// Recorded positions, in propagation order
    points: Vec<Position>,

    /// State of the track at the last recorded position
    end: TrackState,
}
//
impl Trajectory {
    /// Recorded positions
    pub fn points(&self) -> &[Position] {
        &self.points[..]
    }

    /// Number of recorded positions
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Truth that no position was recorded
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Final state of the track
    ///
    /// If no position was recorded, this is the initial state.
    pub fn end_state(&self) -> &TrackState {
        &self.end
    }

    /// Split the path into separate X, Y and Z coordinate sequences
    pub fn coordinates(&self) -> (Vec<Float>, Vec<Float>, Vec<Float>) {
        let xs = self.points.iter().map(|p| p[X]).collect();
        let ys = self.points.iter().map(|p| p[Y]).collect();
        let zs = self.points.iter().map(|p| p[Z]).collect();
        (xs, ys, zs)
    }
}

/// Fixed-step helix integrator for one particle in a uniform axial field
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HelixIntegrator {
    /// Time step
    dt: Float,

    /// Velocity factor 1/E
    inv_energy: Float,

    /// Cyclotron angular rate ω
    angular_rate: Float,

    /// Cosine of the per-step rotation angle ω·dt
    cos_dphi: Float,

    /// Sine of the per-step rotation angle ω·dt
    sin_dphi: Float,
}
//
impl HelixIntegrator {
    /// Prepare to propagate a particle of given charge and energy in a field
    /// of strength `b_field_z` (Tesla), with time step `dt`
    pub fn new(
        b_field_z: Float,
        dt: Float,
        charge: i32,
        energy: Float,
    ) -> Result<Self, PhysicsError> {
        if energy == 0. || !energy.is_finite() {
            return Err(PhysicsError::InvalidEnergy { energy });
        }
        let angular_rate = MAGNETIC_MOMENTUM_CONVERSION * b_field_z * (charge as Float) / energy;
        let (sin_dphi, cos_dphi) = (angular_rate * dt).sin_cos();
        Ok(Self {
            dt,
            inv_energy: 1. / energy,
            angular_rate,
            cos_dphi,
            sin_dphi,
        })
    }

    /// Cyclotron angular rate of the particle
    pub fn angular_rate(&self) -> Float {
        self.angular_rate
    }

    /// Advance a track state by one time step
    pub fn step(&self, state: &mut TrackState) {
        // The field only changes the direction of the transverse momentum
        let p = &mut state.momentum;
        let (px, py) = (p[X], p[Y]);
        p[X] = px * self.cos_dphi - py * self.sin_dphi;
        p[Y] = px * self.sin_dphi + py * self.cos_dphi;

        // dx = v·dt with v = p/E
        let velocity = p.fixed_rows::<3>(X) * self.inv_energy;
        state.position += velocity * self.dt;
    }

    /// Endless sequence of track states, starting with the initial state
    pub fn states(&self, start: TrackState) -> States {
        States {
            integrator: *self,
            next: start,
        }
    }

    /// Record up to `max_points` positions of a track, starting with its
    /// initial position, and stopping before the first position which
    /// `keep` rejects
    pub fn integrate(
        &self,
        start: TrackState,
        max_points: usize,
        mut keep: impl FnMut(&Position) -> bool,
    ) -> Trajectory {
        let mut points = Vec::with_capacity(max_points.min(MAX_PREALLOCATED_POINTS));
        let mut end = start;
        for state in self.states(start).take(max_points) {
            if !keep(&state.position) {
                break;
            }
            points.push(state.position);
            end = state;
        }
        debug_assert!(end.momentum[E] == start.momentum[E]);
        Trajectory { points, end }
    }
}

/// Upper bound on the storage allocated ahead of integration
const MAX_PREALLOCATED_POINTS: usize = 1 << 16;

/// Iterator over the successive states of a track, see
/// [`HelixIntegrator::states`]
#[derive(Clone, Debug)]
pub struct States {
    integrator: HelixIntegrator,
    next: TrackState,
}
//
impl Iterator for States {
    type Item = TrackState;

    fn next(&mut self) -> Option<TrackState> {
        let current = self.next;
        self.integrator.step(&mut self.next);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{momentum::four_momentum, numeric::floats::consts::PI};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn start(e: Float, px: Float, py: Float, pz: Float) -> TrackState {
        TrackState {
            position: Position::zeros(),
            momentum: four_momentum(e, px, py, pz),
        }
    }

    #[test]
    fn zero_energy_is_rejected() {
        assert_eq!(
            HelixIntegrator::new(3.8, 0.1, 1, 0.),
            Err(PhysicsError::InvalidEnergy { energy: 0. })
        );
        assert!(HelixIntegrator::new(3.8, 0.1, 1, Float::NAN).is_err());
    }

    #[test]
    fn angular_rate() {
        let integrator = HelixIntegrator::new(2., 0.1, -1, 6.).unwrap();
        assert_relative_eq!(integrator.angular_rate(), -0.1);
    }

    #[test]
    fn full_turn_closes_the_helix() {
        // ω = 0.3 · 1 · 1 / 3 = 0.1, and 100 steps of dt make a full turn
        let num_steps = 100;
        let dt = 2. * PI / (num_steps as Float) / 0.1;
        let integrator = HelixIntegrator::new(1., dt, 1, 3.).unwrap();
        let trajectory = integrator.integrate(start(3., 2., 0., 1.), num_steps + 1, |_| true);
        assert_eq!(trajectory.len(), num_steps + 1);

        // Rounding errors on the rotation angle pile up at each step
        let tolerance = 1000. * (num_steps as Float) * Float::EPSILON;
        let end = trajectory.end_state();
        assert_abs_diff_eq!(end.position[X], 0., epsilon = tolerance);
        assert_abs_diff_eq!(end.position[Y], 0., epsilon = tolerance);
        assert_relative_eq!(
            end.position[Z],
            (num_steps as Float) * dt / 3.,
            max_relative = tolerance
        );
        assert_relative_eq!(end.momentum[X], 2., max_relative = tolerance);
        assert_abs_diff_eq!(end.momentum[Y], 0., epsilon = tolerance);
    }

    #[test]
    fn transverse_momentum_is_conserved() {
        let num_states = 500;
        let tolerance = 10. * (num_states as Float) * Float::EPSILON;
        let integrator = HelixIntegrator::new(3.8, 0.05, 1, 5.).unwrap();
        for state in integrator.states(start(5., 3., -2., 1.)).take(num_states) {
            let p = state.momentum;
            assert_relative_eq!(p[X] * p[X] + p[Y] * p[Y], 13., max_relative = tolerance);
            assert_eq!(p[Z], 1.);
            assert_eq!(p[E], 5.);
        }
    }

    #[test]
    fn opposite_charges_bend_in_opposite_directions() {
        let first_step = |charge| {
            let integrator = HelixIntegrator::new(3.8, 0.1, charge, 10.).unwrap();
            let mut state = start(10., 10., 0., 0.);
            integrator.step(&mut state);
            state.position
        };
        let positive = first_step(1);
        let negative = first_step(-1);
        assert!(positive[Y] > 0.);
        assert!(negative[Y] < 0.);
        assert_relative_eq!(positive[Y], -negative[Y]);
        assert_relative_eq!(positive[X], negative[X]);
    }

    #[test]
    fn integration_stops_before_rejected_point() {
        let integrator = HelixIntegrator::new(0., 1., 1, 1.).unwrap();
        let trajectory = integrator.integrate(start(1., 1., 0., 0.), 100, |p| p[X] < 3.5);
        let xs = trajectory.coordinates().0;
        assert_eq!(xs, vec![0., 1., 2., 3.]);
        assert_eq!(trajectory.end_state().position[X], 3.);
    }

    #[test]
    fn rejected_start_gives_empty_path() {
        let integrator = HelixIntegrator::new(3.8, 0.1, 1, 1.).unwrap();
        let initial = start(1., 1., 0., 0.);
        let trajectory = integrator.integrate(initial, 100, |_| false);
        assert!(trajectory.is_empty());
        assert_eq!(*trajectory.end_state(), initial);
    }

    #[test]
    fn detector_volume_bounds() {
        let volume = DetectorVolume::new(5., 10.);
        assert!(volume.contains(&Position::new(3., 4., 0.)));
        assert!(volume.contains(&Position::new(0., 0., -10.)));
        assert!(!volume.contains(&Position::new(3., 4.1, 0.)));
        assert!(!volume.contains(&Position::new(0., 0., 10.5)));
    }
}
