//! Intersecting edges and simplices with the zero level set.
//!
//! The level set is treated as linear on each simplex,
//! so the interface crosses an edge at the root of the linear interpolant
//! of the values at its endpoints.

use itertools::Itertools;

use crate::{
    domain::CUT_TOLERANCE,
    polytope::{Polytope, VertexStore},
    CutError,
};

/// Find the point where the level set crosses a line segment.
///
/// The intersection is appended to `store` with a level-set value of zero,
/// and a 0-dimensional polytope containing only the new vertex is returned.
/// The caller is responsible for making sure the values at the endpoints
/// have opposite signs; if they're equal the result is not finite.
pub fn cut_edge(store: &mut VertexStore, segment: &Polytope) -> Result<Polytope, CutError> {
    if segment.dim() != 1 || segment.len() != 2 {
        return Err(CutError::InvalidArgument(format!(
            "tried to cut a {}-dimensional polytope with {} vertices as a line segment",
            segment.dim(),
            segment.len()
        )));
    }
    segment.check_indices(store)?;

    let view = segment.view(store);
    let (p0, p1) = (view.position(0), view.position(1));
    let (f0, f1) = (view.value(0), view.value(1));
    let t = f0 / (f0 - f1);
    let cut_point = p0 + t * (p1 - p0);
    log::trace!("cut edge {:?} at t = {t}", segment.indices());

    let new_idx = store.push(cut_point, 0.);
    Ok(Polytope::point(new_idx))
}

/// Intersect a triangle or tetrahedron with the level set.
///
/// Every edge whose endpoint values have a product below `-CUT_TOLERANCE`
/// is cut with [`cut_edge`], visiting edges `(i, j)`, `i < j`,
/// in lexicographic order of local vertex indices.
/// The returned polytope has dimension one less than the simplex
/// and contains the cut points in the order they were found.
/// For a triangle this is a line segment;
/// a tetrahedron gives either a triangle or a quadrilateral.
/// The decomposition tables in [`StraightCutGeometry`][crate::StraightCutGeometry]
/// depend on this ordering.
pub fn cut_simplex(store: &mut VertexStore, simplex: &Polytope) -> Result<Polytope, CutError> {
    let is_cuttable = matches!((simplex.dim(), simplex.len()), (2, 3) | (3, 4));
    if !is_cuttable {
        return Err(CutError::Unsupported(format!(
            "tried to cut a {}-dimensional polytope with {} vertices, \
            only triangles and tetrahedra can be cut",
            simplex.dim(),
            simplex.len()
        )));
    }
    simplex.check_indices(store)?;

    let mut cut_points = Vec::new();
    for (i, j) in simplex.indices().iter().copied().tuple_combinations() {
        let value = |idx: usize| store.samples()[idx].value;
        if value(i) * value(j) < -CUT_TOLERANCE {
            let edge = Polytope::new(vec![i, j], 1);
            let cut_point = cut_edge(store, &edge)?;
            cut_points.push(cut_point[0]);
        }
    }

    Ok(Polytope::new(cut_points, simplex.dim() - 1))
}
