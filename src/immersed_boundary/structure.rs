use serde::{Deserialize, Serialize};

use crate::{
    error::{ElementKind, IbError, IbResult},
    floating_type_mod::FT,
    lagrangian_points::PointId,
    V2,
};

/// Linear spring between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringElement {
    pub master: PointId,
    pub slave: PointId,
    pub stiffness: FT,
    pub resting_length: FT,
}

/**
 * Bending element over three consecutive points.
 *
 * `curvature` is the target value of the discrete cross product
 * `(x3-x2)(y2-y1) - (y3-y2)(x2-x1)`, zero for a straight beam.
 */
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamElement {
    pub left: PointId,
    pub middle: PointId,
    pub right: PointId,
    pub stiffness: FT,
    pub curvature: FT,
}

/// Tethers a point to a fixed anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetElement {
    pub point: PointId,
    pub anchor: V2,
    pub stiffness: FT,
}

/// Target-like tether for a point that carries inertia.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassElement {
    pub point: PointId,
    pub anchor: V2,
    pub stiffness: FT,
    // only read by the point mass dynamics outside of the force computation
    pub mass: FT,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MuscleElement {
    pub master: PointId,
    pub slave: PointId,
    pub optimal_length: FT,
    // width of the force-length curve (SK)
    pub force_scale: FT,
    pub hill_a: FT,
    pub hill_b: FT,
    pub max_force: FT,
}

/**
 * Unvalidated element tables as they come from a structure file.
 * Every table may be empty.
 */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementTables {
    pub springs: Vec<SpringElement>,
    pub beams: Vec<BeamElement>,
    pub targets: Vec<TargetElement>,
    pub masses: Vec<MassElement>,
    // length-tension/force-velocity muscles
    pub muscles: Vec<MuscleElement>,
    // Hill three-element muscles
    pub hill_muscles: Vec<MuscleElement>,
}

/**
 * Element tables whose point handles have all been checked against the point count.
 *
 * Force generators index positions through these handles without further checks.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    num_points: usize,
    tables: ElementTables,
}

fn check_point(kind: ElementKind, element_index: usize, id: PointId, num_points: usize) -> IbResult<()> {
    if id.is_valid_for(num_points) {
        Ok(())
    } else {
        Err(IbError::Index {
            element: kind,
            element_index: element_index + 1,
            point: id.one_based(),
            num_points,
        })
    }
}

fn check_param(kind: ElementKind, element_index: usize, name: &str, value: FT, positive: bool) -> IbResult<()> {
    if !value.is_finite() || (positive && value <= 0.) {
        return Err(IbError::InvalidParameter(format!(
            "{} #{}: {} must be {}, got {}",
            kind,
            element_index + 1,
            name,
            if positive { "positive" } else { "finite" },
            value
        )));
    }
    Ok(())
}

fn check_muscles(kind: ElementKind, muscles: &[MuscleElement], num_points: usize) -> IbResult<()> {
    for (i, m) in muscles.iter().enumerate() {
        check_point(kind, i, m.master, num_points)?;
        check_point(kind, i, m.slave, num_points)?;
        check_param(kind, i, "optimal_length", m.optimal_length, true)?;
        check_param(kind, i, "force_scale", m.force_scale, true)?;
        check_param(kind, i, "hill_a", m.hill_a, false)?;
        check_param(kind, i, "hill_b", m.hill_b, true)?;
        check_param(kind, i, "max_force", m.max_force, true)?;
    }
    Ok(())
}

impl Structure {
    pub fn new(num_points: usize, tables: ElementTables) -> IbResult<Self> {
        for (i, s) in tables.springs.iter().enumerate() {
            check_point(ElementKind::Spring, i, s.master, num_points)?;
            check_point(ElementKind::Spring, i, s.slave, num_points)?;
            check_param(ElementKind::Spring, i, "stiffness", s.stiffness, false)?;
            check_param(ElementKind::Spring, i, "resting_length", s.resting_length, false)?;
        }

        for (i, b) in tables.beams.iter().enumerate() {
            check_point(ElementKind::Beam, i, b.left, num_points)?;
            check_point(ElementKind::Beam, i, b.middle, num_points)?;
            check_point(ElementKind::Beam, i, b.right, num_points)?;
            check_param(ElementKind::Beam, i, "stiffness", b.stiffness, false)?;
            check_param(ElementKind::Beam, i, "curvature", b.curvature, false)?;
        }

        for (i, t) in tables.targets.iter().enumerate() {
            check_point(ElementKind::Target, i, t.point, num_points)?;
            check_param(ElementKind::Target, i, "anchor.x", t.anchor.x, false)?;
            check_param(ElementKind::Target, i, "anchor.y", t.anchor.y, false)?;
            check_param(ElementKind::Target, i, "stiffness", t.stiffness, false)?;
        }

        for (i, m) in tables.masses.iter().enumerate() {
            check_point(ElementKind::Mass, i, m.point, num_points)?;
            check_param(ElementKind::Mass, i, "anchor.x", m.anchor.x, false)?;
            check_param(ElementKind::Mass, i, "anchor.y", m.anchor.y, false)?;
            check_param(ElementKind::Mass, i, "stiffness", m.stiffness, false)?;
            check_param(ElementKind::Mass, i, "mass", m.mass, true)?;
        }

        check_muscles(ElementKind::Muscle, &tables.muscles, num_points)?;
        check_muscles(ElementKind::HillMuscle, &tables.hill_muscles, num_points)?;

        Ok(Structure { num_points, tables })
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn tables(&self) -> &ElementTables {
        &self.tables
    }

    pub fn springs(&self) -> &[SpringElement] {
        &self.tables.springs
    }

    pub fn beams(&self) -> &[BeamElement] {
        &self.tables.beams
    }

    pub fn targets(&self) -> &[TargetElement] {
        &self.tables.targets
    }

    pub fn masses(&self) -> &[MassElement] {
        &self.tables.masses
    }

    pub fn muscles(&self) -> &[MuscleElement] {
        &self.tables.muscles
    }

    pub fn hill_muscles(&self) -> &[MuscleElement] {
        &self.tables.hill_muscles
    }
}

#[test]
fn structure_rejects_out_of_range_points() {
    let spring = |m: u32, s: u32| SpringElement {
        master: PointId::from_one_based(m),
        slave: PointId::from_one_based(s),
        stiffness: 1.,
        resting_length: 0.1,
    };

    let tables = ElementTables {
        springs: vec![spring(1, 2), spring(3, 4)],
        ..Default::default()
    };
    assert!(Structure::new(4, tables.clone()).is_ok());

    match Structure::new(3, tables) {
        Err(IbError::Index {
            element,
            element_index,
            point,
            num_points,
        }) => {
            assert_eq!(element, ElementKind::Spring);
            assert_eq!(element_index, 2);
            assert_eq!(point, 4);
            assert_eq!(num_points, 3);
        }
        other => panic!("unexpected {:?}", other),
    }

    let tables = ElementTables {
        targets: vec![TargetElement {
            point: PointId::from_one_based(0),
            anchor: crate::vec2f(0., 0.),
            stiffness: 1.,
        }],
        ..Default::default()
    };
    assert!(matches!(
        Structure::new(3, tables),
        Err(IbError::Index {
            element: ElementKind::Target,
            point: 0,
            ..
        })
    ));
}

#[test]
fn structure_rejects_invalid_muscle_parameters() {
    let tables = ElementTables {
        hill_muscles: vec![MuscleElement {
            master: PointId::from_one_based(1),
            slave: PointId::from_one_based(2),
            optimal_length: 0.,
            force_scale: 0.3,
            hill_a: 0.25,
            hill_b: 4.,
            max_force: 1.,
        }],
        ..Default::default()
    };
    let err = Structure::new(2, tables).unwrap_err();
    assert!(format!("{}", err).contains("hill muscle #1: optimal_length"));
}

#[test]
fn element_tables_from_yaml() {
    let yaml = "
springs:
  - { master: 1, slave: 2, stiffness: 2.0, resting_length: 1.5 }
targets:
  - { point: 2, anchor: [2.0, 3.0], stiffness: 5.0 }
";
    let tables: ElementTables = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(tables.springs.len(), 1);
    assert_eq!(tables.targets[0].anchor, crate::vec2f(2., 3.));
    assert!(tables.beams.is_empty());
    assert!(Structure::new(2, tables).is_ok());
}
