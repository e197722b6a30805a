//! Reconstructed particles and their propagation through the detector

use crate::{
    error::PhysicsError,
    momentum::{self, four_momentum, Momentum, Position, E, X, Y, Z},
    numeric::Float,
    trajectory::{DetectorVolume, HelixIntegrator, TrackState, Trajectory},
};

/// Final-state particle, as measured by the detector
///
/// Propagation never modifies a particle: it yields a [`Trajectory`] whose
/// end state can be used to build a displaced particle with
/// [`Particle::moved_to`] if a path should be continued.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// 4-momentum (GeV)
    momentum: Momentum,

    /// Electric charge, in units of the elementary charge
    charge: i32,

    /// Position (m), at the collision point by default
    position: Position,
}
//
impl Particle {
    /// Build a particle located at the collision point
    pub fn new(e: Float, px: Float, py: Float, pz: Float, charge: i32) -> Self {
        Self {
            momentum: four_momentum(e, px, py, pz),
            charge,
            position: Position::zeros(),
        }
    }

    /// The same particle, at another position
    pub fn moved_to(self, position: Position) -> Self {
        Self { position, ..self }
    }

    /// Access the 4-momentum
    pub fn momentum(&self) -> &Momentum {
        &self.momentum
    }

    /// Energy (GeV)
    pub fn energy(&self) -> Float {
        self.momentum[E]
    }

    /// Momentum along X (GeV)
    pub fn px(&self) -> Float {
        self.momentum[X]
    }

    /// Momentum along Y (GeV)
    pub fn py(&self) -> Float {
        self.momentum[Y]
    }

    /// Momentum along Z (GeV)
    pub fn pz(&self) -> Float {
        self.momentum[Z]
    }

    /// Electric charge
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Current position (m)
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Rest mass, sqrt(max(0, E² - |p|²))
    pub fn mass(&self) -> Float {
        momentum::clamped_mass(&self.momentum).0
    }

    /// Simulate the path of the particle in an axial field `b_field_z`
    /// (Tesla) for `steps` time steps of duration `dt`
    ///
    /// The resulting trajectory has `steps + 1` points, starting with the
    /// current position of the particle.
    pub fn propagate(
        &self,
        b_field_z: Float,
        dt: Float,
        steps: usize,
    ) -> Result<Trajectory, PhysicsError> {
        let integrator = self.integrator(b_field_z, dt)?;
        Ok(integrator.integrate(self.track_state(), steps.saturating_add(1), |_| true))
    }

    /// Like `propagate`, but stop as soon as the particle leaves the
    /// cylinder of radius `radius_limit` and half-length `z_limit`
    ///
    /// At most `max_steps` points are recorded, and the first point found
    /// outside of the detector is not part of the path.
    pub fn propagate_bounded(
        &self,
        b_field_z: Float,
        dt: Float,
        max_steps: usize,
        radius_limit: Float,
        z_limit: Float,
    ) -> Result<Trajectory, PhysicsError> {
        let volume = DetectorVolume::new(radius_limit, z_limit);
        self.propagate_within(b_field_z, dt, max_steps, &volume)
    }

    /// Bounded propagation inside of a predefined detector volume
    pub fn propagate_within(
        &self,
        b_field_z: Float,
        dt: Float,
        max_steps: usize,
        volume: &DetectorVolume,
    ) -> Result<Trajectory, PhysicsError> {
        let integrator = self.integrator(b_field_z, dt)?;
        Ok(integrator.integrate(self.track_state(), max_steps, |pos| {
            volume.contains(pos)
        }))
    }

    /// Current kinematic state, as a starting point for propagation
    fn track_state(&self) -> TrackState {
        TrackState {
            position: self.position,
            momentum: self.momentum,
        }
    }

    /// Set up trajectory integration for this particle
    fn integrator(&self, b_field_z: Float, dt: Float) -> Result<HelixIntegrator, PhysicsError> {
        HelixIntegrator::new(b_field_z, dt, self.charge, self.energy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn mass_formula() {
        for &(e, px, py, pz) in &[
            (20., 3., 1., 2.),
            (18., -2., 0., 1.),
            (0.105, 0., 0., 0.),
            (1., 1., 0., 0.),
            (-7., 1., 2., 3.),
        ] {
            let p = Particle::new(e, px, py, pz, 1);
            let expected = Float::max(0., e * e - (px * px + py * py + pz * pz)).sqrt();
            assert_relative_eq!(p.mass(), expected);
        }
    }

    #[test]
    fn spacelike_mass_is_zero() {
        let p = Particle::new(1., 3., 4., 0., -1);
        assert_eq!(p.mass(), 0.);
    }

    #[test]
    fn mass_does_not_depend_on_position() {
        let p = Particle::new(20., 3., 1., 2., 1);
        let moved = p.clone().moved_to(Position::new(1., -2., 3.));
        assert_eq!(p.mass(), moved.mass());
    }

    #[test]
    fn zero_steps_gives_current_position() {
        let p = Particle::new(10., 1., 2., 3., 1).moved_to(Position::new(0.5, 0.25, -1.));
        let trajectory = p.propagate(3.8, 0.1, 0).unwrap();
        assert_eq!(trajectory.points(), &[Position::new(0.5, 0.25, -1.)]);
    }

    #[test]
    fn path_length_and_coordinates() {
        let p = Particle::new(10., 5., 0., 2., -1);
        let trajectory = p.propagate(3.8, 0.1, 25).unwrap();
        assert_eq!(trajectory.len(), 26);
        let (xs, ys, zs) = trajectory.coordinates();
        assert_eq!((xs.len(), ys.len(), zs.len()), (26, 26, 26));
        assert_eq!((xs[0], ys[0], zs[0]), (0., 0., 0.));
        assert_relative_eq!(zs[25], 0.5, max_relative = 100. * Float::EPSILON);
    }

    #[test]
    fn propagation_is_pure() {
        let p = Particle::new(10., 5., 0., 2., 1);
        let first = p.propagate(3.8, 0.1, 50).unwrap();
        let second = p.propagate(3.8, 0.1, 50).unwrap();
        assert_eq!(first, second);
        assert_eq!(*p.position(), Position::zeros());
        assert_eq!(p.px(), 5.);
        assert_eq!(p.py(), 0.);
    }

    #[test]
    fn continued_propagation_matches_single_run() {
        let p = Particle::new(10., 5., 1., 2., 1);
        let single = p.propagate(3.8, 0.1, 20).unwrap();

        let first = p.propagate(3.8, 0.1, 10).unwrap();
        let end = first.end_state();
        let resumed = Particle::new(
            end.momentum[E],
            end.momentum[X],
            end.momentum[Y],
            end.momentum[Z],
            p.charge(),
        )
        .moved_to(end.position);
        let second = resumed.propagate(3.8, 0.1, 10).unwrap();

        let expected = single.end_state().position;
        let actual = second.end_state().position;
        for i in 0..3 {
            assert_abs_diff_eq!(actual[i], expected[i], epsilon = 10. * Float::EPSILON);
        }
    }

    #[test]
    fn no_field_means_straight_line() {
        let p = Particle::new(10., 3., -4., 1., 1);
        let num_steps = 40;
        let trajectory = p.propagate(0., 0.5, num_steps).unwrap();
        let tolerance = 100. * (num_steps as Float) * Float::EPSILON;
        for (i, point) in trajectory.points().iter().enumerate() {
            let t = 0.5 * (i as Float);
            assert_abs_diff_eq!(point[X], 0.3 * t, epsilon = tolerance);
            assert_abs_diff_eq!(point[Y], -0.4 * t, epsilon = tolerance);
            assert_abs_diff_eq!(point[Z], 0.1 * t, epsilon = tolerance);
        }
        let end = trajectory.end_state().momentum;
        assert_eq!((end[X], end[Y]), (3., -4.));
    }

    #[test]
    fn neutral_particle_goes_straight() {
        let p = Particle::new(10., 3., -4., 1., 0);
        let end = p.propagate(3.8, 0.5, 40).unwrap().end_state().momentum;
        assert_eq!((end[X], end[Y]), (3., -4.));
    }

    #[test]
    fn zero_energy_is_a_domain_error() {
        let p = Particle::new(0., 1., 0., 0., 1);
        assert_eq!(
            p.propagate(3.8, 0.1, 10),
            Err(PhysicsError::InvalidEnergy { energy: 0. })
        );
        assert!(p.propagate_bounded(3.8, 0.1, 10, 9., 15.).is_err());
    }

    #[test]
    fn bounded_propagation_stays_inside() {
        let (radius, half_length) = (1.2, 4.);
        let volume = DetectorVolume::new(radius, half_length);
        for &(e, px, py, pz, q) in &[
            (20., 3., 1., 2., 1),
            (18., -2., 0., 1., -1),
            (50., 0., 1., 49., 1),
            (4., 0.5, 0.5, 0., -1),
        ] {
            let p = Particle::new(e, px, py, pz, q);
            let max_steps = 300;
            let trajectory = p.propagate_bounded(3.8, 0.1, max_steps, radius, half_length).unwrap();
            assert!(trajectory.len() <= max_steps);
            assert!(trajectory.points().iter().all(|pos| volume.contains(pos)));
        }
    }

    #[test]
    fn bounded_path_is_a_prefix_of_full_path() {
        let p = Particle::new(20., 3., 1., 2., 1);
        let full = p.propagate(3.8, 0.1, 1000).unwrap();
        let bounded = p.propagate_bounded(3.8, 0.1, 1000, 1.2, 8.).unwrap();
        assert!(bounded.len() < full.len());
        assert_eq!(bounded.points(), &full.points()[..bounded.len()]);
        let next = full.points()[bounded.len()];
        assert!(!DetectorVolume::new(1.2, 8.).contains(&next));
    }

    #[test]
    fn bounded_propagation_respects_step_cap() {
        // A slow, tightly curling track never leaves a large detector
        let p = Particle::new(5., 0.1, 0., 0., 1);
        let trajectory = p.propagate_bounded(3.8, 0.1, 42, 9., 15.).unwrap();
        assert_eq!(trajectory.len(), 42);
    }

    #[test]
    fn start_outside_detector_gives_empty_path() {
        let p = Particle::new(5., 1., 0., 0., 1).moved_to(Position::new(10., 0., 0.));
        let trajectory = p.propagate_bounded(3.8, 0.1, 100, 9., 15.).unwrap();
        assert!(trajectory.is_empty());
    }
}
