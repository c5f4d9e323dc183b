use crate::{
    error::{ElementKind, IbError, IbResult},
    force_model::Clock,
    lagrangian_points::LagrangianPoints,
    muscle_activation::{MuscleActivation, MuscleKind, MuscleState},
    structure::Structure,
    V2,
};

use super::{apply_pair, check_point_count, segment, unit_direction};

/**
 * Contractile muscle forces.
 *
 * The shortening speed is estimated from the previous positions, `v = |LF - LF_prev| / dt`.
 * The activation policy turns the muscle state into a force magnitude `Fm` which is applied
 * along the master->slave direction, `+Fm e` on the master and `-Fm e` on the slave.
 */
pub fn muscle_force_density<A: MuscleActivation + ?Sized>(
    structure: &Structure,
    kind: MuscleKind,
    points: &LagrangianPoints,
    clock: Clock,
    activation: &A,
) -> IbResult<Vec<V2>> {
    check_point_count(structure, points)?;
    if !(clock.dt > 0. && clock.dt.is_finite()) {
        return Err(IbError::InvalidParameter(format!(
            "muscle velocities need a positive timestep, got dt={}",
            clock.dt
        )));
    }

    let (table, element_kind) = match kind {
        MuscleKind::LengthTensionVelocity => (structure.muscles(), ElementKind::Muscle),
        MuscleKind::HillThreeElement => (structure.hill_muscles(), ElementKind::HillMuscle),
    };

    let positions = points.current_positions();
    let previous = points.previous_positions();
    let mut density = vec![V2::zeros(); positions.len()];

    for (i, muscle) in table.iter().enumerate() {
        let (diff, length) = segment(positions, muscle.master, muscle.slave);
        let e = unit_direction(diff, length, element_kind, i)?;
        let (_, previous_length) = segment(previous, muscle.master, muscle.slave);

        let state = MuscleState {
            kind,
            velocity: (length - previous_length).abs() / clock.dt,
            length,
            optimal_length: muscle.optimal_length,
            force_scale: muscle.force_scale,
            hill_a: muscle.hill_a,
            hill_b: muscle.hill_b,
            max_force: muscle.max_force,
            time: clock.time,
            master_position: positions[muscle.master.index()],
            positions,
        };
        let magnitude = activation.force_magnitude(&state);
        if !magnitude.is_finite() {
            return Err(IbError::InvalidParameter(format!(
                "muscle activation returned a non-finite force {} for {} #{}",
                magnitude,
                element_kind,
                i + 1
            )));
        }

        apply_pair(&mut density, muscle.master, muscle.slave, magnitude * e);
    }

    Ok(density)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        floating_type_mod::FT, muscle_activation::HillActivation, structure::ElementTables, structure::MuscleElement,
        vec2f, PointId,
    };
    use approx::assert_relative_eq;

    fn muscle(master: u32, slave: u32) -> MuscleElement {
        MuscleElement {
            master: PointId::from_one_based(master),
            slave: PointId::from_one_based(slave),
            optimal_length: 0.4,
            force_scale: 0.3,
            hill_a: 0.25,
            hill_b: 4.,
            max_force: 2.,
        }
    }

    fn muscle_structure(n: usize, muscles: Vec<MuscleElement>, hill_muscles: Vec<MuscleElement>) -> Structure {
        Structure::new(
            n,
            ElementTables {
                muscles,
                hill_muscles,
                ..Default::default()
            },
        )
        .unwrap()
    }

    const CLOCK: Clock = Clock { time: 0.1, dt: 1e-3 };

    #[test]
    fn muscle_pulls_points_together() {
        let points = LagrangianPoints::stationary(vec![vec2f(0.1, 0.5), vec2f(0.5, 0.5)]);
        let structure = muscle_structure(2, vec![muscle(1, 2)], vec![]);
        let density = muscle_force_density(
            &structure,
            MuscleKind::LengthTensionVelocity,
            &points,
            CLOCK,
            &HillActivation::default(),
        )
        .unwrap();

        // isometric at optimal length: full force along +x on the master
        assert_relative_eq!(density[0].x, 2., epsilon = 1e-12);
        assert_relative_eq!(density[1].x, -2., epsilon = 1e-12);
        assert_eq!(density[0].y, 0.);
    }

    #[test]
    fn muscle_velocity_from_previous_positions() {
        let points = LagrangianPoints::new(
            vec![vec2f(0., 0.), vec2f(0.3, 0.4)],
            vec![vec2f(0., 0.), vec2f(0.6, 0.8)],
        )
        .unwrap();
        let structure = muscle_structure(2, vec![], vec![muscle(1, 2)]);

        struct Recorder {
            seen: std::sync::Mutex<Vec<(MuscleKind, FT, FT, V2, usize)>>,
        }
        impl MuscleActivation for Recorder {
            fn force_magnitude(&self, s: &MuscleState) -> FT {
                let record = (s.kind, s.velocity, s.length, s.master_position, s.positions.len());
                self.seen.lock().unwrap().push(record);
                1.5
            }
        }

        let recorder = Recorder {
            seen: std::sync::Mutex::new(Vec::new()),
        };
        let density =
            muscle_force_density(&structure, MuscleKind::HillThreeElement, &points, CLOCK, &recorder).unwrap();

        let seen = recorder.seen.into_inner().unwrap();
        assert_eq!(seen.len(), 1);
        let (kind, velocity, length, master_position, num_positions) = seen[0];
        assert_eq!(kind, MuscleKind::HillThreeElement);
        assert_relative_eq!(velocity, 0.5 / 1e-3, epsilon = 1e-8);
        assert_relative_eq!(length, 0.5, epsilon = 1e-12);
        assert_eq!(master_position, vec2f(0., 0.));
        assert_eq!(num_positions, 2);

        assert_relative_eq!(density[0].x, 1.5 * 0.6, epsilon = 1e-12);
        assert_relative_eq!(density[0].y, 1.5 * 0.8, epsilon = 1e-12);
        assert_eq!(density[1], -density[0]);
    }

    #[test]
    fn muscle_kinds_read_their_own_table() {
        let points = LagrangianPoints::stationary(vec![vec2f(0.1, 0.5), vec2f(0.5, 0.5), vec2f(0.5, 0.9)]);
        let structure = muscle_structure(3, vec![muscle(1, 2)], vec![muscle(2, 3)]);
        let activation = HillActivation::default();

        let lt = muscle_force_density(&structure, MuscleKind::LengthTensionVelocity, &points, CLOCK, &activation)
            .unwrap();
        assert_eq!(lt[2], V2::zeros());

        let hill =
            muscle_force_density(&structure, MuscleKind::HillThreeElement, &points, CLOCK, &activation).unwrap();
        assert_eq!(hill[0], V2::zeros());
        assert!(hill[2].norm() > 0.);
    }

    #[test]
    fn zero_length_muscle_is_degenerate() {
        let points = LagrangianPoints::stationary(vec![vec2f(0.5, 0.5), vec2f(0.5, 0.5)]);
        let structure = muscle_structure(2, vec![muscle(1, 2)], vec![]);
        let result = muscle_force_density(
            &structure,
            MuscleKind::LengthTensionVelocity,
            &points,
            CLOCK,
            &HillActivation::default(),
        );
        assert!(matches!(
            result,
            Err(IbError::DegenerateGeometry {
                element: ElementKind::Muscle,
                element_index: 1
            })
        ));
    }

    #[test]
    fn muscle_requires_positive_timestep() {
        let points = LagrangianPoints::stationary(vec![vec2f(0.1, 0.5), vec2f(0.5, 0.5)]);
        let structure = muscle_structure(2, vec![muscle(1, 2)], vec![]);
        let clock = Clock { time: 0., dt: 0. };
        let result = muscle_force_density(
            &structure,
            MuscleKind::LengthTensionVelocity,
            &points,
            clock,
            &HillActivation::default(),
        );
        assert!(matches!(result, Err(IbError::InvalidParameter(_))));
    }

    #[test]
    fn non_finite_activation_is_rejected() {
        fn broken(_: &MuscleState) -> FT {
            FT::NAN
        }

        let points = LagrangianPoints::stationary(vec![vec2f(0.1, 0.5), vec2f(0.5, 0.5), vec2f(0.5, 0.9)]);
        let structure = muscle_structure(3, vec![], vec![muscle(1, 2), muscle(2, 3)]);
        match muscle_force_density(&structure, MuscleKind::HillThreeElement, &points, CLOCK, &broken) {
            Err(IbError::InvalidParameter(msg)) => assert!(msg.contains("hill muscle #1"), "{}", msg),
            other => panic!("expected invalid parameter, got {:?}", other),
        }
    }
}
