//! Decomposition of a cut element into sub-simplices
//! and construction of quadrature rules on them.

use crate::{
    cut::cut_simplex,
    domain::{DomainType, CUT_TOLERANCE},
    element::ElementShape,
    polytope::{Polytope, PolytopeView, VertexStore},
    quadrature::{map_reference_rule, IntegrationRule, ReferenceQuadrature},
    CutError, UnitVec3, Vec3,
};

/// The stages a [`StraightCutGeometry`] goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryState {
    /// Nothing has been loaded yet.
    Empty,
    /// The base simplex has been loaded from the reference element.
    Loaded,
    /// The base simplex has been decomposed for a domain.
    Cut,
}

/// The geometry of a single element cut by a piecewise linear level set.
///
/// Holds the vertex store and the current decomposition of the element
/// into simplices for one evaluation.
/// The usual entry point is [`build_quadrature_rule`][Self::build_quadrature_rule],
/// which runs the whole pipeline of loading, cutting and mapping quadratures.
///
/// ```
/// # use straightcut::{DomainType, ElementShape, GaussRules, StraightCutGeometry};
/// let lset = [1., -1., -1.];
/// let mut geom = StraightCutGeometry::new(ElementShape::Triangle, &lset);
/// let rule = geom
///     .build_quadrature_rule(2, DomainType::Positive, &GaussRules)
///     .unwrap();
/// // the positive part is the triangle (0,0), (0.5,0), (0,0.5)
/// assert!((rule.total_weight() - 0.125).abs() < 1e-14);
/// assert_eq!(geom.simplices().count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct StraightCutGeometry<'a> {
    shape: ElementShape,
    lset: &'a [f64],
    store: VertexStore,
    simplices: Vec<Polytope>,
    normal: Option<UnitVec3>,
    state: GeometryState,
}

impl<'a> StraightCutGeometry<'a> {
    /// Create an empty geometry for an element of the given shape
    /// with the given level-set values at its vertices.
    pub fn new(shape: ElementShape, lset: &'a [f64]) -> Self {
        Self::with_store(VertexStore::with_capacity(2 * shape.vertex_count()), shape, lset)
    }

    /// Create an empty geometry reusing the allocation of an existing vertex store.
    ///
    /// The store is cleared first.
    /// Get it back with [`into_store`][Self::into_store]
    /// once the element has been processed.
    pub fn with_store(mut store: VertexStore, shape: ElementShape, lset: &'a [f64]) -> Self {
        store.clear();
        Self {
            shape,
            lset,
            store,
            simplices: Vec::new(),
            normal: None,
            state: GeometryState::Empty,
        }
    }

    /// Consume the geometry, returning its vertex store for reuse.
    #[inline]
    pub fn into_store(self) -> VertexStore {
        self.store
    }

    /// Get the shape of the element.
    #[inline]
    pub fn shape(&self) -> ElementShape {
        self.shape
    }

    /// Get the dimension of the element.
    #[inline]
    pub fn dim(&self) -> usize {
        self.shape.dim()
    }

    /// Get the current stage of the geometry.
    #[inline]
    pub fn state(&self) -> GeometryState {
        self.state
    }

    /// Get the vertex store, containing the element's vertices
    /// followed by the points created by cutting.
    #[inline]
    pub fn store(&self) -> &VertexStore {
        &self.store
    }

    /// Get the interface normal in reference coordinates.
    ///
    /// Only available after cutting for [`DomainType::Interface`].
    /// It points towards the positive side of the level set.
    #[inline]
    pub fn normal(&self) -> Option<UnitVec3> {
        self.normal
    }

    /// Iterate over the current simplices:
    /// the base simplex after [`load`][Self::load],
    /// or the decomposition of the requested domain after [`cut`][Self::cut].
    pub fn simplices(&self) -> impl '_ + Iterator<Item = PolytopeView<'_>> {
        self.simplices.iter().map(|s| s.view(&self.store))
    }

    /// Load the reference element's vertices with their level-set values
    /// and set up the base simplex.
    pub fn load(&mut self) -> Result<(), CutError> {
        if self.state != GeometryState::Empty {
            return Err(CutError::BadState(format!(
                "can't load a geometry in state {:?}",
                self.state
            )));
        }
        self.shape.require_cuttable()?;
        let ref_verts = self.shape.reference_vertices();
        if self.lset.len() != ref_verts.len() {
            return Err(CutError::InvalidArgument(format!(
                "a {:?} has {} vertices but {} level-set values were given",
                self.shape,
                ref_verts.len(),
                self.lset.len()
            )));
        }

        let base_indices: Vec<usize> = ref_verts
            .iter()
            .zip(self.lset)
            .map(|(v, &value)| self.store.push(Vec3::from(*v), value))
            .collect();
        self.simplices = vec![Polytope::new(base_indices, self.dim())];
        self.state = GeometryState::Loaded;
        Ok(())
    }

    /// Compute the unit gradient of the level set on the base simplex.
    ///
    /// Every edge from the first vertex to another one
    /// must be parallel to a coordinate axis,
    /// so that the gradient component along that axis
    /// is the difference quotient along the edge.
    /// This is the case for the reference simplices.
    fn compute_normal(&self, base: &Polytope) -> Result<UnitVec3, CutError> {
        let view = base.view(&self.store);
        let mut grad = Vec3::zeros();

        for i in 1..base.len() {
            let delta = view.position(i) - view.position(0);
            let delta_f = view.value(i) - view.value(0);
            let axis = aligned_axis(&delta).ok_or_else(|| {
                CutError::AssumptionViolated(format!(
                    "edge {delta:?} is not aligned with a coordinate axis, \
                    can't compute the gradient by difference quotients"
                ))
            })?;
            grad[axis] = delta_f / delta[axis];
        }

        UnitVec3::try_new(grad, CUT_TOLERANCE).ok_or_else(|| {
            CutError::AssumptionViolated(format!(
                "level-set gradient {grad:?} vanishes, there is no normal direction"
            ))
        })
    }

    /// Decompose the base simplex into simplices covering the given domain.
    ///
    /// For [`DomainType::Interface`] this also computes the
    /// [`normal`][Self::normal] of the interface.
    /// Requires the geometry to be [`load`][Self::load]ed
    /// and the element to actually be cut.
    pub fn cut(&mut self, domain: DomainType) -> Result<(), CutError> {
        if self.state != GeometryState::Loaded {
            return Err(CutError::BadState(format!(
                "can't cut a geometry in state {:?}",
                self.state
            )));
        }
        let dim = self.dim();
        let base = self.simplices[0].clone();
        let facet = cut_simplex(&mut self.store, &base)?;
        let f = facet.indices();

        let simplices = match domain {
            DomainType::Interface => {
                // the normal has to come from the un-cut base simplex
                self.normal = Some(self.compute_normal(&base)?);
                match f.len() {
                    n if n == dim => vec![facet.clone()],
                    4 if dim == 3 => vec![
                        Polytope::new(vec![f[0], f[1], f[3]], 2),
                        Polytope::new(vec![f[0], f[2], f[3]], 2),
                    ],
                    n => {
                        return Err(CutError::BadTopology(format!(
                            "cutting a {dim}-simplex produced an interface facet with {n} points"
                        )))
                    }
                }
            }
            DomainType::Positive | DomainType::Negative => {
                let relevant: Vec<usize> = base
                    .view(&self.store)
                    .values()
                    .zip(base.indices())
                    .filter(|(value, _)| domain.contains_value(*value))
                    .map(|(_, &idx)| idx)
                    .collect();
                decompose_volume(&facet, &relevant, dim)?
            }
        };

        log::debug!(
            "cut {:?} with values {:?} for {domain:?}: facet of {} points, {} sub-simplices",
            self.shape,
            self.lset,
            facet.len(),
            simplices.len()
        );
        self.simplices = simplices;
        self.state = GeometryState::Cut;
        Ok(())
    }

    /// Load and cut the element, then build a quadrature rule of the given order
    /// on the requested domain.
    ///
    /// The points are in reference coordinates of the element.
    /// Weights are scaled to the reference element,
    /// i.e. for volume domains they sum to the area or volume
    /// of the domain within the reference element
    /// and for the interface to the length or area of the interface in it.
    pub fn build_quadrature_rule(
        &mut self,
        order: usize,
        domain: DomainType,
        quadrature: &impl ReferenceQuadrature,
    ) -> Result<IntegrationRule, CutError> {
        self.load()?;
        self.cut(domain)?;

        let mut rule = IntegrationRule::default();
        let mut reference_size = None;
        for simplex in self.simplices() {
            let shape = simplex.shape().ok_or_else(|| {
                CutError::NotImplemented(format!(
                    "no reference quadrature for a simplex with {} vertices",
                    simplex.polytope().len()
                ))
            })?;
            let reference = quadrature.rule(shape, order);
            match reference_size {
                None => reference_size = Some(reference.len()),
                Some(size) if size != reference.len() => {
                    return Err(CutError::BadState(format!(
                        "sub-simplices got reference rules with {size} and {} points",
                        reference.len()
                    )))
                }
                Some(_) => {}
            }
            rule.extend(map_reference_rule(&reference, &simplex)?);
        }

        log::debug!(
            "built a rule of order {order} with {} points for {domain:?}",
            rule.len()
        );
        Ok(rule)
    }
}

/// Find the coordinate axis a vector is parallel to, if any.
fn aligned_axis(v: &Vec3) -> Option<usize> {
    let len = v.magnitude();
    (0..3).find(|&axis| {
        v[axis].abs() > CUT_TOLERANCE && (len - v[axis].abs()).abs() <= CUT_TOLERANCE
    })
}

/// Check that the interface facet has the number of points
/// a decomposition case expects.
fn expect_facet_len(facet: &Polytope, len: usize, relevant: usize) -> Result<(), CutError> {
    if facet.len() == len {
        Ok(())
    } else {
        Err(CutError::BadTopology(format!(
            "{relevant} vertices inside the domain need an interface facet of {len} points, \
            got {} (is a vertex exactly on the interface?)",
            facet.len()
        )))
    }
}

/// Split the part of a cut simplex on one side of the interface into simplices,
/// given the interface facet `f` and the simplex's vertices `r` on that side.
///
/// The index substitutions depend on the order in which
/// [`cut_simplex`] produces the facet's points.
fn decompose_volume(
    facet: &Polytope,
    r: &[usize],
    dim: usize,
) -> Result<Vec<Polytope>, CutError> {
    let f = facet.indices();
    let simplices = match (r.len(), dim) {
        // a corner cut off from the rest,
        // same shape as the element
        (1, _) => {
            expect_facet_len(facet, dim, 1)?;
            let mut corner = f.to_vec();
            corner.push(r[0]);
            vec![Polytope::new(corner, dim)]
        }
        // quadrilateral left over from a triangle
        (2, 2) => {
            expect_facet_len(facet, 2, 2)?;
            vec![
                Polytope::new(vec![r[0], r[1], f[1]], 2),
                Polytope::new(vec![f[0], f[1], r[0]], 2),
            ]
        }
        // prism between two opposite edges of a tetrahedron
        (2, 3) => {
            expect_facet_len(facet, 4, 2)?;
            vec![
                Polytope::new(vec![r[1], f[1], f[2], f[3]], 3),
                Polytope::new(vec![r[0], r[1], f[1], f[2]], 3),
                Polytope::new(vec![f[0], f[1], f[2], r[0]], 3),
            ]
        }
        // tetrahedron with one corner cut off
        (3, 3) => {
            expect_facet_len(facet, 3, 3)?;
            vec![
                Polytope::new(vec![f[0], f[1], f[2], r[2]], 3),
                Polytope::new(vec![r[0], r[1], r[2], f[1]], 3),
                Polytope::new(vec![f[0], f[1], r[0], r[2]], 3),
            ]
        }
        (n, _) => {
            return Err(CutError::NotImplemented(format!(
                "decomposing the part of a {dim}-simplex with {n} vertices inside the domain"
            )))
        }
    };
    Ok(simplices)
}
