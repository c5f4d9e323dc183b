use serde::{Deserialize, Serialize};

use crate::{
    error::{IbError, IbResult},
    V2,
};

/**
 * Opaque handle of a Lagrangian point.
 *
 * Structure files number points from 1, which is also how a handle is serialized.
 * Handles are only checked against a point count when a `Structure` is built from them.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(u32);

impl PointId {
    pub fn from_one_based(id: u32) -> PointId {
        PointId(id)
    }

    pub fn from_index(index: usize) -> PointId {
        PointId(index as u32 + 1)
    }

    pub fn one_based(self) -> usize {
        self.0 as usize
    }

    /// 0-based storage offset. Only meaningful for validated handles.
    pub fn index(self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }

    pub fn is_valid_for(self, num_points: usize) -> bool {
        self.0 >= 1 && self.one_based() <= num_points
    }
}

/**
 * Current and previous-timestep positions of all Lagrangian points.
 *
 * The previous positions are only read by the muscle models (shortening velocity).
 */
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangianPoints {
    current: Vec<V2>,
    previous: Vec<V2>,
}

impl LagrangianPoints {
    pub fn new(current: Vec<V2>, previous: Vec<V2>) -> IbResult<Self> {
        if current.len() != previous.len() {
            return Err(IbError::PointCountMismatch {
                expected: current.len(),
                actual: previous.len(),
            });
        }
        Ok(LagrangianPoints { current, previous })
    }

    /// Points that did not move during the last timestep.
    pub fn stationary(current: Vec<V2>) -> Self {
        let previous = current.clone();
        LagrangianPoints { current, previous }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    // ids must come from a validated `Structure` of the same size
    pub(crate) fn current(&self, id: PointId) -> V2 {
        self.current[id.index()]
    }

    pub(crate) fn previous(&self, id: PointId) -> V2 {
        self.previous[id.index()]
    }

    pub fn current_positions(&self) -> &[V2] {
        &self.current
    }

    pub fn previous_positions(&self) -> &[V2] {
        &self.previous
    }
}

#[test]
fn point_id_numbering() {
    let id = PointId::from_one_based(1);
    assert_eq!(id.index(), 0);
    assert_eq!(PointId::from_index(4).one_based(), 5);
    assert!(id.is_valid_for(1));
    assert!(!PointId::from_one_based(0).is_valid_for(10));
    assert!(!PointId::from_one_based(11).is_valid_for(10));

    let parsed: Vec<PointId> = serde_yaml::from_str("[1, 2, 7]").unwrap();
    assert_eq!(parsed[2], PointId::from_one_based(7));
}

#[test]
fn lagrangian_points_require_matching_lengths() {
    use crate::vec2f;
    assert!(LagrangianPoints::new(vec![vec2f(0., 0.)], vec![]).is_err());
    let points = LagrangianPoints::stationary(vec![vec2f(1., 2.), vec2f(3., 4.)]);
    assert_eq!(points.previous(PointId::from_one_based(2)), vec2f(3., 4.));
}
