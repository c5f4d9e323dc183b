use serde::{Deserialize, Serialize};

use crate::{
    floating_type_mod::{FT, PI},
    V2,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuscleKind {
    LengthTensionVelocity,
    HillThreeElement,
}

/// Kinematic and temporal state of one muscle element, handed to the activation policy.
#[derive(Debug, Clone, Copy)]
pub struct MuscleState<'a> {
    pub kind: MuscleKind,
    // shortening speed |LF - LF_prev| / dt
    pub velocity: FT,
    pub length: FT,
    pub optimal_length: FT,
    pub force_scale: FT,
    pub hill_a: FT,
    pub hill_b: FT,
    pub max_force: FT,
    pub time: FT,
    pub master_position: V2,
    pub positions: &'a [V2],
}

/**
 * Maps the state of a muscle to the magnitude of its contractile force.
 *
 * Positive values pull master and slave towards each other.
 */
pub trait MuscleActivation: Sync {
    fn force_magnitude(&self, state: &MuscleState) -> FT;
}

impl<F> MuscleActivation for F
where
    F: Fn(&MuscleState) -> FT + Sync,
{
    fn force_magnitude(&self, state: &MuscleState) -> FT {
        self(state)
    }
}

/// Time course of the activation level `a(t)` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationWaveform {
    Constant(FT),

    // half sine pulse of length `duration` at the start of every period
    Pulsed { period: FT, duration: FT, phase: FT },
}

impl Default for ActivationWaveform {
    fn default() -> Self {
        ActivationWaveform::Constant(1.)
    }
}

impl ActivationWaveform {
    pub fn level(&self, time: FT) -> FT {
        match *self {
            ActivationWaveform::Constant(level) => level,
            ActivationWaveform::Pulsed {
                period,
                duration,
                phase,
            } => {
                if period <= 0. || duration <= 0. {
                    return 0.;
                }
                let tau = (time + phase).rem_euclid(period);
                if tau < duration {
                    (PI * tau / duration).sin()
                } else {
                    0.
                }
            }
        }
    }
}

/**
 * Force-length relation: Gaussian around the optimal length with width `force_scale`.
 */
pub fn force_length(length: FT, optimal_length: FT, force_scale: FT) -> FT {
    let s = (length / optimal_length - 1.) / force_scale;
    (-s * s).exp()
}

/**
 * Hill's force-velocity relation `(F + a)(v + b) = (Fmax + a) b`, normalized by `Fmax`.
 * Equals one for an isometric muscle and is clamped at zero for fast shortening.
 */
pub fn force_velocity(velocity: FT, hill_a: FT, hill_b: FT, max_force: FT) -> FT {
    ((hill_b - hill_a * velocity / max_force) / (hill_b + velocity)).max(0.)
}

/// `F = a(t) * Fmax * force_length * force_velocity`, for both muscle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HillActivation {
    pub waveform: ActivationWaveform,
}

impl MuscleActivation for HillActivation {
    fn force_magnitude(&self, state: &MuscleState) -> FT {
        let fl = force_length(state.length, state.optimal_length, state.force_scale);
        let fv = force_velocity(state.velocity, state.hill_a, state.hill_b, state.max_force);
        self.waveform.level(state.time) * state.max_force * fl * fv
    }
}

#[cfg(test)]
fn test_state(length: FT, velocity: FT, time: FT) -> MuscleState<'static> {
    MuscleState {
        kind: MuscleKind::LengthTensionVelocity,
        velocity,
        length,
        optimal_length: 1.,
        force_scale: 0.3,
        hill_a: 0.25,
        hill_b: 4.,
        max_force: 10.,
        time,
        master_position: crate::vec2f(0., 0.),
        positions: &[],
    }
}

#[test]
fn hill_activation_is_max_force_at_optimum() {
    let activation = HillActivation::default();
    approx::assert_relative_eq!(activation.force_magnitude(&test_state(1., 0., 0.)), 10., epsilon = 1e-12);

    // stretched or shortening muscles produce less force
    assert!(activation.force_magnitude(&test_state(1.2, 0., 0.)) < 10.);
    assert!(activation.force_magnitude(&test_state(1., 0.5, 0.)) < 10.);
    assert!(activation.force_magnitude(&test_state(1., 1e6, 0.)) == 0.);
}

#[test]
fn force_velocity_satisfies_hill_equation() {
    let (a, b, fmax) = (0.25, 4., 10.);
    for v in [0., 0.5, 1., 3.] {
        let f = fmax * force_velocity(v, a, b, fmax);
        approx::assert_relative_eq!((f + a) * (v + b), (fmax + a) * b, epsilon = 1e-10);
    }
}

#[test]
fn pulsed_waveform_test() {
    let w = ActivationWaveform::Pulsed {
        period: 1.,
        duration: 0.5,
        phase: 0.,
    };
    approx::assert_relative_eq!(w.level(0.25), 1., epsilon = 1e-12);
    approx::assert_relative_eq!(w.level(1.25), 1., epsilon = 1e-12);
    assert_eq!(w.level(0.75), 0.);
    assert_eq!(w.level(0.), 0.);
}

#[test]
fn closures_are_activation_policies() {
    fn policy(s: &MuscleState) -> FT {
        s.time * 2.
    }
    approx::assert_relative_eq!(policy.force_magnitude(&test_state(1., 0., 3.)), 6.);
}
