use crate::{
    concurrency::par_map_collect,
    error::{Axis, IbError, IbResult},
    floating_type_mod::FT,
    grid::{BoundaryKind, GridDescriptor},
    V2, IT,
};

/**
 * The `support` Eulerian node indices along one axis that a Lagrangian coordinate touches,
 * together with the signed offsets (Eulerian minus Lagrangian coordinate) of those nodes.
 *
 * Offsets are taken from the unwrapped node positions, so a window that straddles
 * the periodic seam still sees the true distance to every node.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct IndexWindow {
    pub indices: Vec<usize>,
    pub offsets: Vec<FT>,
}

impl IndexWindow {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, FT)> + '_ {
        self.indices.iter().cloned().zip(self.offsets.iter().cloned())
    }
}

/**
 * Finds the window of 0-based node indices around coordinate `x`.
 *
 * The window starts `support/2 - 1` nodes left of the node at or below `x`, so `x` always
 * lies between its two middle nodes. On a periodic axis `x` is first reduced to `[0, n h)`.
 * Returns `None` if `x` is not finite or, on a wall axis, if the window does not fit into `[0, n)`.
 */
pub fn one_dimensional_window(x: FT, n: usize, h: FT, support: usize, boundary: BoundaryKind) -> Option<IndexWindow> {
    if !x.is_finite() {
        return None;
    }

    // offsets only depend on the periodic image, so far away coordinates are folded back first
    let x = match boundary {
        BoundaryKind::Periodic => x.rem_euclid(n as FT * h),
        BoundaryKind::Wall => x,
    };

    let cell = (x / h).floor();
    if cell.abs() >= (IT::MAX / 4) as FT {
        return None;
    }

    let base = cell as IT;
    let half = (support / 2) as IT;
    let first = base - half + 1;
    let last = base + half;
    let n_it = n as IT;

    if boundary == BoundaryKind::Wall && (first < 0 || last >= n_it) {
        return None;
    }

    let mut indices = Vec::with_capacity(support);
    let mut offsets = Vec::with_capacity(support);
    for unwrapped in first..=last {
        indices.push(unwrapped.rem_euclid(n_it) as usize);
        offsets.push(unwrapped as FT * h - x);
    }

    Some(IndexWindow { indices, offsets })
}

/// Window for one coordinate of point `point_index` (0-based).
pub fn index_window(grid: &GridDescriptor, axis: Axis, point_index: usize, x: FT) -> IbResult<IndexWindow> {
    one_dimensional_window(
        x,
        grid.cells(axis),
        grid.spacing(axis),
        grid.support(),
        grid.boundary(axis),
    )
    .ok_or(IbError::OutOfDomain {
        point: point_index + 1,
        axis,
        coordinate: x,
    })
}

/// x and y windows for every point. Points are independent and mapped in parallel.
pub fn map_points(grid: &GridDescriptor, positions: &[V2]) -> IbResult<Vec<(IndexWindow, IndexWindow)>> {
    par_map_collect(positions.len(), |i| {
        let p = positions[i];
        Ok((
            index_window(grid, Axis::X, i, p.x)?,
            index_window(grid, Axis::Y, i, p.y)?,
        ))
    })
}

#[test]
fn window_is_centered_on_point() {
    let h = 0.1;
    let w = one_dimensional_window(0.53, 32, h, 4, BoundaryKind::Periodic).unwrap();
    assert_eq!(w.indices, vec![4, 5, 6, 7]);
    for (k, (_, r)) in w.iter().enumerate() {
        approx::assert_relative_eq!(r, (4 + k) as FT * h - 0.53, epsilon = 1e-14);
    }

    // point exactly on a node: the node itself is the second entry
    let w = one_dimensional_window(0.5, 10, 0.25, 4, BoundaryKind::Periodic).unwrap();
    assert_eq!(w.indices, vec![1, 2, 3, 4]);
    assert_eq!(w.offsets[1], 0.);
}

#[test]
fn window_wraps_at_periodic_seam() {
    let n = 16;
    let h = 1. / n as FT;

    let w = one_dimensional_window(0.01, n, h, 4, BoundaryKind::Periodic).unwrap();
    assert_eq!(w.indices, vec![15, 0, 1, 2]);
    approx::assert_relative_eq!(w.offsets[0], -h - 0.01, epsilon = 1e-14);

    let w = one_dimensional_window(1. - 0.01, n, h, 4, BoundaryKind::Periodic).unwrap();
    assert_eq!(w.indices, vec![14, 15, 0, 1]);

    // coordinates that already left the domain map like their periodic image
    let w_out = one_dimensional_window(1. + 0.3, n, h, 6, BoundaryKind::Periodic).unwrap();
    let w_in = one_dimensional_window(0.3, n, h, 6, BoundaryKind::Periodic).unwrap();
    assert_eq!(w_out.indices, w_in.indices);
    for (a, b) in w_out.offsets.iter().zip(w_in.offsets.iter()) {
        approx::assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }

    let w = one_dimensional_window(-0.02, n, h, 4, BoundaryKind::Periodic).unwrap();
    assert_eq!(w.indices, vec![14, 15, 0, 1]);
}

#[test]
fn window_of_far_away_coordinate() {
    let n = 16;
    let h = 1. / n as FT;

    for x in [1e300, -1e300, 1e18 + 0.3, FT::MAX] {
        let w = one_dimensional_window(x, n, h, 4, BoundaryKind::Periodic).unwrap();
        assert_eq!(w.len(), 4);
        assert!(w.indices.iter().all(|&i| i < n));
        assert!(w.offsets.iter().all(|r| r.abs() <= 2. * h));
    }

    // several periods away the window matches the one of the image inside the domain
    let w_far = one_dimensional_window(1000.3, n, h, 6, BoundaryKind::Periodic).unwrap();
    let w_in = one_dimensional_window(0.3, n, h, 6, BoundaryKind::Periodic).unwrap();
    assert_eq!(w_far.indices, w_in.indices);
    for (a, b) in w_far.offsets.iter().zip(w_in.offsets.iter()) {
        approx::assert_abs_diff_eq!(a, b, epsilon = 1e-10);
    }

    assert!(one_dimensional_window(1e300, n, h, 4, BoundaryKind::Wall).is_none());
    assert!(one_dimensional_window(-1e300, n, h, 4, BoundaryKind::Wall).is_none());
}

#[test]
fn window_rejected_near_wall() {
    let n = 16;
    let h = 1. / n as FT;
    assert!(one_dimensional_window(0.01, n, h, 4, BoundaryKind::Wall).is_none());
    assert!(one_dimensional_window(1. - 0.01, n, h, 4, BoundaryKind::Wall).is_none());
    assert!(one_dimensional_window(0.5, n, h, 4, BoundaryKind::Wall).is_some());
    assert!(one_dimensional_window(FT::NAN, n, h, 4, BoundaryKind::Periodic).is_none());

    let grid = GridDescriptor::with_boundaries(
        16,
        16,
        1.,
        1.,
        4,
        2,
        0.01,
        BoundaryKind::Periodic,
        BoundaryKind::Wall,
    )
    .unwrap();
    let positions = vec![crate::vec2f(0.5, 0.5), crate::vec2f(0.01, 0.99)];
    match map_points(&grid, &positions) {
        Err(IbError::OutOfDomain { point, axis, .. }) => {
            assert_eq!(point, 2);
            assert_eq!(axis, Axis::Y);
        }
        other => panic!("expected out of domain error, got {:?}", other.map(|w| w.len())),
    }
}
