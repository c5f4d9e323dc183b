use crate::{error::IbResult, lagrangian_points::LagrangianPoints, structure::Structure, V2};

use super::check_point_count;

/// Tether force `k (anchor - x)`. Anchors are not Lagrangian points, so there is no reaction.
pub fn target_force_density(structure: &Structure, points: &LagrangianPoints) -> IbResult<Vec<V2>> {
    check_point_count(structure, points)?;
    let mut density = vec![V2::zeros(); points.len()];
    for target in structure.targets() {
        density[target.point.index()] += target.stiffness * (target.anchor - points.current(target.point));
    }
    Ok(density)
}

#[test]
fn target_at_anchor_is_force_free() {
    use crate::{structure::ElementTables, structure::TargetElement, vec2f, PointId};

    let tables = ElementTables {
        targets: vec![
            TargetElement {
                point: PointId::from_one_based(1),
                anchor: vec2f(2., 3.),
                stiffness: 5.,
            },
            TargetElement {
                point: PointId::from_one_based(2),
                anchor: vec2f(1., 1.),
                stiffness: 2.,
            },
        ],
        ..Default::default()
    };
    let structure = Structure::new(2, tables).unwrap();
    let points = LagrangianPoints::stationary(vec![vec2f(2., 3.), vec2f(0.5, 1.5)]);

    let density = target_force_density(&structure, &points).unwrap();
    assert_eq!(density[0], vec2f(0., 0.));
    assert_eq!(density[1], vec2f(1., -1.));
}
