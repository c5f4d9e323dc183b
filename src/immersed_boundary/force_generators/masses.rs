use crate::{error::IbResult, lagrangian_points::LagrangianPoints, lagrangian_points::PointId, structure::Structure, V2};

use super::check_point_count;

/// Raw tether force of one mass point, consumed by the point mass dynamics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassForce {
    pub point: PointId,
    pub force: V2,
}

/**
 * Same tether law as targets. Also returns the force of every record in table order, because
 * mass points are integrated with inertia and need the raw force next to the density.
 */
pub fn mass_force_density(structure: &Structure, points: &LagrangianPoints) -> IbResult<(Vec<V2>, Vec<MassForce>)> {
    check_point_count(structure, points)?;
    let mut density = vec![V2::zeros(); points.len()];
    let mut raw = Vec::with_capacity(structure.masses().len());

    for mass in structure.masses() {
        let force = mass.stiffness * (mass.anchor - points.current(mass.point));
        density[mass.point.index()] += force;
        raw.push(MassForce {
            point: mass.point,
            force,
        });
    }

    Ok((density, raw))
}

#[test]
fn mass_force_is_reported_twice() {
    use crate::{structure::ElementTables, structure::MassElement, vec2f};

    let tables = ElementTables {
        masses: vec![MassElement {
            point: PointId::from_one_based(1),
            anchor: vec2f(1., 0.),
            stiffness: 1.,
            mass: 0.5,
        }],
        ..Default::default()
    };
    let structure = Structure::new(1, tables).unwrap();
    let points = LagrangianPoints::stationary(vec![vec2f(0., 0.)]);

    let (density, raw) = mass_force_density(&structure, &points).unwrap();
    assert_eq!(density[0], vec2f(1., 0.));
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].point, PointId::from_one_based(1));
    assert_eq!(raw[0].force, density[0]);
}
