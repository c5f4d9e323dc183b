use crate::{
    error::{ElementKind, IbResult},
    lagrangian_points::LagrangianPoints,
    structure::Structure,
    V2,
};

use super::{apply_pair, check_point_count, segment, unit_direction};

/**
 * Linear springs: `F = k (d - L) e` with `e` the unit vector from master to slave.
 * The master receives `+F`, the slave `-F`.
 */
pub fn spring_force_density(structure: &Structure, points: &LagrangianPoints) -> IbResult<Vec<V2>> {
    check_point_count(structure, points)?;
    let positions = points.current_positions();
    let mut density = vec![V2::zeros(); positions.len()];

    for (i, spring) in structure.springs().iter().enumerate() {
        let (diff, length) = segment(positions, spring.master, spring.slave);
        let e = unit_direction(diff, length, ElementKind::Spring, i)?;
        let force = spring.stiffness * (length - spring.resting_length) * e;
        apply_pair(&mut density, spring.master, spring.slave, force);
    }

    Ok(density)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::IbError, floating_type_mod::FT, structure::ElementTables, structure::SpringElement, vec2f, PointId,
    };
    use approx::assert_relative_eq;

    fn spring(master: u32, slave: u32, stiffness: FT, resting_length: FT) -> SpringElement {
        SpringElement {
            master: PointId::from_one_based(master),
            slave: PointId::from_one_based(slave),
            stiffness,
            resting_length,
        }
    }

    fn structure(n: usize, springs: Vec<SpringElement>) -> Structure {
        Structure::new(
            n,
            ElementTables {
                springs,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn compressed_spring_pushes_points_apart() {
        let points = LagrangianPoints::stationary(vec![vec2f(0., 0.), vec2f(1., 0.)]);
        let density = spring_force_density(&structure(2, vec![spring(1, 2, 2.0, 1.5)]), &points).unwrap();

        assert_relative_eq!(density[0].x, -1.0);
        assert_relative_eq!(density[0].y, 0.0);
        assert_relative_eq!(density[1].x, 1.0);
        assert_relative_eq!(density[1].y, 0.0);
    }

    #[test]
    fn spring_at_rest_length_is_force_free() {
        let points = LagrangianPoints::stationary(vec![vec2f(0.2, 0.1), vec2f(0.5, 0.5)]);
        let density = spring_force_density(&structure(2, vec![spring(1, 2, 7.0, 0.5)]), &points).unwrap();
        assert!(density[0].norm() < 1e-14);
        assert!(density[1].norm() < 1e-14);
    }

    #[test]
    fn springs_obey_third_law() {
        let points = super::super::test_utils::random_points(20, 3);
        let springs: Vec<_> = (1..20).map(|i| spring(i, i + 1, 3.0 + i as FT, 0.05)).collect();
        let density = spring_force_density(&structure(20, springs), &points).unwrap();

        let total = density.iter().fold(V2::zeros(), |acc, f| acc + f);
        assert!(total.norm() < 1e-12, "net spring force {}", total);
    }

    #[test]
    fn zero_length_spring_is_degenerate() {
        let points = LagrangianPoints::stationary(vec![vec2f(0., 0.), vec2f(0.3, 0.3), vec2f(0.3, 0.3)]);
        let s = structure(3, vec![spring(1, 2, 1., 0.1), spring(2, 3, 1., 0.1)]);
        match spring_force_density(&s, &points) {
            Err(IbError::DegenerateGeometry {
                element,
                element_index,
            }) => {
                assert_eq!(element, ElementKind::Spring);
                assert_eq!(element_index, 2);
            }
            other => panic!("expected degenerate geometry, got {:?}", other),
        }
    }
}
