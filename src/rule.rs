//! Per-element entry point producing quadrature rules for cut and uncut elements.

use crate::{
    domain::{classify, DomainType},
    element::ElementShape,
    geometry::StraightCutGeometry,
    polytope::VertexStore,
    quadrature::{GaussRules, IntegrationRule, ReferenceQuadrature},
    transform::{transform_interface_rule, ElementMapping},
    CutError,
};

/// The result of requesting a quadrature rule for a domain on an element.
#[derive(Clone, Debug, PartialEq)]
pub enum CutRule {
    /// The element doesn't intersect the requested domain at all.
    ///
    /// This is distinct from an empty rule:
    /// callers can skip the element entirely.
    Outside,
    /// A rule in the element's reference coordinates.
    Rule(IntegrationRule),
}

impl CutRule {
    /// Whether the element is outside the requested domain.
    #[inline]
    pub fn is_outside(&self) -> bool {
        matches!(self, CutRule::Outside)
    }

    /// Get the rule, if there is one.
    #[inline]
    pub fn rule(&self) -> Option<&IntegrationRule> {
        match self {
            CutRule::Outside => None,
            CutRule::Rule(rule) => Some(rule),
        }
    }

    /// Take the rule out, if there is one.
    #[inline]
    pub fn into_rule(self) -> Option<IntegrationRule> {
        match self {
            CutRule::Outside => None,
            CutRule::Rule(rule) => Some(rule),
        }
    }
}

/// Builds quadrature rules on elements cut by a level set
/// that is linear on each element,
/// using reference rules from a [`ReferenceQuadrature`] provider.
///
/// The integrator holds no per-element state,
/// so a single one can be shared across threads
/// if the quadrature provider allows it.
///
/// # Example
///
/// ```
/// # use straightcut::{
/// #     AffineMapping, CutRule, DomainType, ElementShape, GaussRules,
/// #     StraightCutIntegrator, Vec3, na,
/// # };
/// let integrator = StraightCutIntegrator::new(GaussRules);
/// let mapping = AffineMapping::from_simplex_vertices(&[
///     na::Vector2::new(0., 0.),
///     na::Vector2::new(2., 0.),
///     na::Vector2::new(0., 2.),
/// ])
/// .unwrap();
/// let circle = |p: &Vec3| p.magnitude() - 1.;
/// let lset = ElementShape::Triangle
///     .sample_level_set(&mapping, &circle)
///     .unwrap();
///
/// let inside = integrator
///     .rule(ElementShape::Triangle, &lset, &mapping, DomainType::Negative, 2)
///     .unwrap();
/// let CutRule::Rule(rule) = inside else {
///     panic!("the element is cut");
/// };
/// // in reference coordinates the negative part is the triangle
/// // (0,0), (1/2,0), (0,1/2); scaling by the Jacobian determinant
/// // gives the physical area
/// let area = rule.total_weight() * mapping.jacobian_determinant();
/// assert!((area - 0.5).abs() < 1e-14);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct StraightCutIntegrator<Q = GaussRules> {
    quadrature: Q,
}

impl<Q: ReferenceQuadrature> StraightCutIntegrator<Q> {
    /// Create an integrator using the given reference quadrature provider.
    pub fn new(quadrature: Q) -> Self {
        Self { quadrature }
    }

    /// Get the reference quadrature provider.
    #[inline]
    pub fn quadrature(&self) -> &Q {
        &self.quadrature
    }

    /// Build a quadrature rule of the given order
    /// for a domain on an element.
    ///
    /// `lset` holds the level-set values at the element's vertices,
    /// e.g. from [`ElementShape::sample_level_set`].
    /// Points of the returned rule are in reference coordinates.
    ///
    /// If the element isn't cut, the result is either [`CutRule::Outside`]
    /// or the provider's standard rule for the whole element.
    /// For a cut element and a volume domain the weights are in reference units,
    /// so integrating in physical space needs the usual scaling
    /// by the Jacobian determinant.
    /// For [`DomainType::Interface`] the weights are additionally transformed
    /// with [`transform_interface_rule`] using `mapping`,
    /// after which the same determinant scaling gives surface integrals.
    pub fn rule<const DIM: usize>(
        &self,
        shape: ElementShape,
        lset: &[f64],
        mapping: &impl ElementMapping<DIM>,
        domain: DomainType,
        order: usize,
    ) -> Result<CutRule, CutError> {
        let mut store = VertexStore::new();
        self.rule_with_store(&mut store, shape, lset, mapping, domain, order)
    }

    /// Like [`rule`][Self::rule], but using a caller-provided vertex store
    /// as scratch space so its allocation can be reused between elements.
    ///
    /// The store is cleared on entry and holds the vertices
    /// of the last processed element on return.
    pub fn rule_with_store<const DIM: usize>(
        &self,
        store: &mut VertexStore,
        shape: ElementShape,
        lset: &[f64],
        mapping: &impl ElementMapping<DIM>,
        domain: DomainType,
        order: usize,
    ) -> Result<CutRule, CutError> {
        store.clear();
        shape.require_cuttable()?;
        let simplex_shape = shape.simplex_shape().ok_or_else(|| {
            CutError::Unsupported(format!("{shape:?} is not a simplex"))
        })?;
        if shape.dim() != DIM {
            return Err(CutError::InvalidArgument(format!(
                "a {DIM}-dimensional mapping can't map a {}-dimensional {shape:?}",
                shape.dim()
            )));
        }
        if lset.len() != shape.vertex_count() {
            return Err(CutError::InvalidArgument(format!(
                "a {shape:?} has {} vertices but {} level-set values were given",
                shape.vertex_count(),
                lset.len()
            )));
        }

        let class = classify(lset);
        if class != DomainType::Interface {
            return Ok(if class == domain {
                CutRule::Rule(self.quadrature.rule(simplex_shape, order))
            } else {
                CutRule::Outside
            });
        }

        let mut geom = StraightCutGeometry::with_store(std::mem::take(store), shape, lset);
        let built = geom.build_quadrature_rule(order, domain, &self.quadrature);
        let normal = geom.normal();
        *store = geom.into_store();
        let rule = built?;

        if domain != DomainType::Interface {
            return Ok(CutRule::Rule(rule));
        }
        let normal = normal.ok_or_else(|| {
            CutError::BadState("interface rule was built without a normal".to_string())
        })?;
        let rule = transform_interface_rule(&rule, &normal, mapping)?;
        Ok(CutRule::Rule(rule))
    }
}

/// Build a quadrature rule for a domain on an element
/// using the default [`GaussRules`].
///
/// See [`StraightCutIntegrator::rule`] for details.
pub fn straight_cut_rule<const DIM: usize>(
    shape: ElementShape,
    lset: &[f64],
    mapping: &impl ElementMapping<DIM>,
    domain: DomainType,
    order: usize,
) -> Result<CutRule, CutError> {
    StraightCutIntegrator::new(GaussRules).rule(shape, lset, mapping, domain, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{na, polytope::SimplexShape, AffineMapping, IdentityMapping, Vec3};
    use approx::{abs_diff_eq, relative_eq};

    fn expect_rule(res: Result<CutRule, CutError>) -> IntegrationRule {
        match res {
            Ok(CutRule::Rule(rule)) => rule,
            other => panic!("expected a rule, got {other:?}"),
        }
    }

    #[test]
    fn cut_reference_triangle() {
        let lset = [1., -1., -1.];
        let id = IdentityMapping::<2>;
        let tri = ElementShape::Triangle;

        let pos = expect_rule(straight_cut_rule(tri, &lset, &id, DomainType::Positive, 2));
        assert!(relative_eq!(pos.total_weight(), 0.125));
        for qp in &pos {
            assert!(qp.point.x + qp.point.y < 0.5);
        }
        let neg = expect_rule(straight_cut_rule(tri, &lset, &id, DomainType::Negative, 2));
        assert!(relative_eq!(neg.total_weight(), 0.375));
        for qp in &neg {
            assert!(qp.point.x + qp.point.y > 0.5);
        }
        // identity mapping leaves the unit normal's weights alone
        let iface = expect_rule(straight_cut_rule(tri, &lset, &id, DomainType::Interface, 2));
        assert!(relative_eq!(iface.total_weight(), 0.5f64.sqrt()));
    }

    #[test]
    fn uncut_elements() {
        let id = IdentityMapping::<2>;
        let tri = ElementShape::Triangle;
        let integrator: StraightCutIntegrator = Default::default();

        let lset = [1., 2., 0.5];
        for domain in [DomainType::Interface, DomainType::Negative] {
            let res = integrator.rule(tri, &lset, &id, domain, 3).unwrap();
            assert!(res.is_outside(), "{domain:?} should be outside");
            assert!(res.rule().is_none());
        }
        let res = integrator
            .rule(tri, &lset, &id, DomainType::Positive, 3)
            .unwrap();
        assert_eq!(
            res.into_rule(),
            Some(GaussRules.rule(SimplexShape::Triangle, 3))
        );

        // zeros count as positive
        let zeros = [0., 0., 1e-12];
        let res = integrator
            .rule(tri, &zeros, &id, DomainType::Positive, 1)
            .unwrap();
        assert!(!res.is_outside());
        let res = integrator
            .rule(tri, &zeros, &id, DomainType::Interface, 1)
            .unwrap();
        assert!(res.is_outside());

        let lset = [-1., -2., -3., -4.];
        let res = integrator
            .rule(
                ElementShape::Tetrahedron,
                &lset,
                &IdentityMapping::<3>,
                DomainType::Negative,
                2,
            )
            .unwrap();
        let rule = res.into_rule().unwrap();
        assert!(relative_eq!(rule.total_weight(), 1. / 6.));
    }

    #[test]
    fn bad_elements() {
        let hex = straight_cut_rule(
            ElementShape::Hexahedron,
            &[1., -1., 1., -1., 1., -1., 1., -1.],
            &IdentityMapping::<3>,
            DomainType::Positive,
            1,
        );
        assert!(matches!(hex, Err(CutError::Unsupported(_))));

        let wrong_dim = straight_cut_rule(
            ElementShape::Triangle,
            &[1., -1., 1.],
            &IdentityMapping::<3>,
            DomainType::Positive,
            1,
        );
        assert!(matches!(wrong_dim, Err(CutError::InvalidArgument(_))));

        // too few values for a tetrahedron, even though their signs don't mix
        let too_few = straight_cut_rule(
            ElementShape::Tetrahedron,
            &[1., 1., 1.],
            &IdentityMapping::<3>,
            DomainType::Positive,
            1,
        );
        assert!(matches!(too_few, Err(CutError::InvalidArgument(_))));
    }

    /// A triangle stretched by 2 in the x direction,
    /// cut along the line from (1, 0) to (0, 1/2).
    #[test]
    fn interface_on_mapped_triangle() {
        let mapping = AffineMapping::from_simplex_vertices(&[
            na::Vector2::new(0., 0.),
            na::Vector2::new(2., 0.),
            na::Vector2::new(0., 1.),
        ])
        .unwrap();
        let line = |p: &Vec3| 1. - p.x - 2. * p.y;
        let lset = ElementShape::Triangle
            .sample_level_set(&mapping, &line)
            .unwrap();
        itertools::assert_equal(lset.iter().copied(), [1., -1., -1.]);

        let iface = expect_rule(straight_cut_rule(
            ElementShape::Triangle,
            &lset,
            &mapping,
            DomainType::Interface,
            3,
        ));
        let det = mapping.jacobian_determinant();
        assert!(relative_eq!(det, 2.));
        let physical_length = iface.total_weight() * det;
        assert!(relative_eq!(physical_length, 1.25f64.sqrt()));

        // integrating x over the physical interface:
        // x goes linearly from 1 to 0 along it, so the mean is 1/2
        let physical_x = |p: &Vec3| {
            let ref_point = na::Vector2::new(p.x, p.y);
            mapping.map_point(&ref_point).x
        };
        assert!(relative_eq!(
            iface.integrate(physical_x) * det,
            0.5 * 1.25f64.sqrt(),
            max_relative = 1e-12
        ));

        // volume parts scale by the determinant only
        let neg = expect_rule(straight_cut_rule(
            ElementShape::Triangle,
            &lset,
            &mapping,
            DomainType::Negative,
            1,
        ));
        assert!(relative_eq!(neg.total_weight() * det, 0.75));
    }

    #[test]
    fn tetrahedron_cut_by_plane() {
        let plane = |p: &Vec3| p.z - 0.5;
        let id = IdentityMapping::<3>;
        let tet = ElementShape::Tetrahedron;
        let lset = tet.sample_level_set(&id, &plane).unwrap();

        let pos = expect_rule(straight_cut_rule(tet, &lset, &id, DomainType::Positive, 2));
        assert!(relative_eq!(pos.total_weight(), 1. / 48.));
        // centroid of the corner tetrahedron at z = 1/2 + 1/8
        let mean_z = pos.integrate(|p| p.z) / pos.total_weight();
        assert!(relative_eq!(mean_z, 0.625, max_relative = 1e-12));

        let neg = expect_rule(straight_cut_rule(tet, &lset, &id, DomainType::Negative, 2));
        assert!(relative_eq!(
            pos.total_weight() + neg.total_weight(),
            1. / 6.
        ));

        let iface = expect_rule(straight_cut_rule(tet, &lset, &id, DomainType::Interface, 2));
        assert!(relative_eq!(iface.total_weight(), 0.125));
        for qp in &iface {
            assert!(abs_diff_eq!(qp.point.z, 0.5, epsilon = 1e-14));
        }
    }

    #[test]
    fn reused_store() {
        let integrator = StraightCutIntegrator::new(GaussRules);
        let mut store = VertexStore::with_capacity(16);
        let id = IdentityMapping::<3>;
        let tet = ElementShape::Tetrahedron;

        let mut total = 0.;
        for lset in [[1., 1., -1., -1.], [2., -1., 1., -3.]] {
            for domain in [DomainType::Positive, DomainType::Negative] {
                let rule = integrator
                    .rule_with_store(&mut store, tet, &lset, &id, domain, 1)
                    .unwrap()
                    .into_rule()
                    .unwrap();
                total += rule.total_weight();
                // four vertices and four cut points
                assert_eq!(store.len(), 8);
            }
        }
        assert!(relative_eq!(total, 2. / 6.));

        integrator
            .rule_with_store(&mut store, tet, &[1.; 4], &id, DomainType::Positive, 1)
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StraightCutIntegrator>();
        assert_send_sync::<CutRule>();
        assert_send_sync::<StraightCutGeometry<'static>>();
    }
}
