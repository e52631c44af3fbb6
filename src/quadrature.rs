//! Quadrature rules on reference simplices
//! and their mapping onto the sub-simplices of a cut element.
//!
//! Reference rules are supplied by a [`ReferenceQuadrature`] implementation.
//! Their points are given in free barycentric coordinates:
//! a point `(xi_1, .., xi_n)` on a simplex with vertices `P_0, .., P_n`
//! is `(1 - sum(xi)) * P_0 + sum(xi_m * P_m)`.
//! On the reference simplices of [`ElementShape`][crate::ElementShape]
//! these coincide with Cartesian coordinates.
//!
//! The default provider [`GaussRules`] builds rules of any order
//! from Gauss-Legendre quadratures,
//! collapsing the tensor product rule on a square or cube
//! onto the triangle or tetrahedron.
//!
//! ```
//! # use straightcut::{GaussRules, ReferenceQuadrature, SimplexShape};
//! let rule = GaussRules.rule(SimplexShape::Triangle, 2);
//! // weights sum to the area of the reference triangle
//! assert!((rule.total_weight() - 0.5).abs() < 1e-14);
//! // x * y integrated exactly
//! let integral = rule.integrate(|p| p.x * p.y);
//! assert!((integral - 1. / 24.).abs() < 1e-14);
//! ```

use crate::{polytope::PolytopeView, CutError, SimplexShape, Vec3};

/// A single quadrature point with its weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraturePoint {
    /// Coordinates of the point.
    /// Unused components are zero.
    pub point: Vec3,
    /// Integration weight.
    pub weight: f64,
}

impl QuadraturePoint {
    /// Create a quadrature point.
    #[inline]
    pub fn new(point: Vec3, weight: f64) -> Self {
        Self { point, weight }
    }

    /// Copy this point with a different weight.
    #[inline]
    pub fn with_weight(&self, weight: f64) -> Self {
        Self {
            point: self.point,
            weight,
        }
    }
}

/// An ordered sequence of quadrature points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntegrationRule {
    points: Vec<QuadraturePoint>,
}

impl IntegrationRule {
    /// Create an empty rule with room for `capacity` points.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Append a point to the rule.
    #[inline]
    pub fn push(&mut self, point: QuadraturePoint) {
        self.points.push(point);
    }

    /// Get the number of points in the rule.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the rule has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get a slice of the points in the rule.
    #[inline]
    pub fn points(&self) -> &[QuadraturePoint] {
        &self.points
    }

    /// Iterate over the points in the rule.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, QuadraturePoint> {
        self.points.iter()
    }

    /// Get the sum of the weights, i.e. the integral of the constant function 1.
    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.points.iter().map(|qp| qp.weight).sum()
    }

    /// Approximate the integral of a function with this rule.
    pub fn integrate(&self, f: impl Fn(&Vec3) -> f64) -> f64 {
        self.points.iter().map(|qp| qp.weight * f(&qp.point)).sum()
    }
}

impl From<Vec<QuadraturePoint>> for IntegrationRule {
    #[inline]
    fn from(points: Vec<QuadraturePoint>) -> Self {
        Self { points }
    }
}

impl FromIterator<QuadraturePoint> for IntegrationRule {
    fn from_iter<I: IntoIterator<Item = QuadraturePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Extend<QuadraturePoint> for IntegrationRule {
    fn extend<I: IntoIterator<Item = QuadraturePoint>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl IntoIterator for IntegrationRule {
    type Item = QuadraturePoint;
    type IntoIter = std::vec::IntoIter<QuadraturePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a IntegrationRule {
    type Item = &'a QuadraturePoint;
    type IntoIter = std::slice::Iter<'a, QuadraturePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// A source of quadrature rules on the reference simplices.
///
/// Weights must be normalized so that they sum to the measure
/// of the reference simplex: 1 for the unit segment,
/// 1/2 for the reference triangle and 1/6 for the reference tetrahedron.
/// [`measure`][crate::polytope::measure] is scaled to match this,
/// so a provider with a different normalization
/// silently produces wrong weights for cut elements.
///
/// Implementations should be deterministic,
/// and for a given shape and order always return the same number of points.
pub trait ReferenceQuadrature {
    /// Get a rule on the reference simplex of the given shape
    /// that integrates polynomials of total degree `order` or less exactly.
    fn rule(&self, shape: SimplexShape, order: usize) -> IntegrationRule;
}

/// Gauss-Legendre based quadratures of arbitrary order on reference simplices.
///
/// Segments use plain Gauss-Legendre rules on `[0, 1]`.
/// Triangles and tetrahedra use the collapsed (Duffy) coordinates
/// `x = u, y = v (1 - u)` and `x = u, y = v (1 - u), z = w (1 - u) (1 - v)`
/// with a Gauss-Legendre rule in each direction,
/// sized so that the polynomial including the Jacobian of the collapse
/// is integrated exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct GaussRules;

impl ReferenceQuadrature for GaussRules {
    fn rule(&self, shape: SimplexShape, order: usize) -> IntegrationRule {
        // a Gauss-Legendre rule with n points is exact up to degree 2n - 1,
        // so a polynomial of degree m needs (m + 2) / 2 points
        let points_for_degree = |degree: usize| (degree + 2) / 2;

        match shape {
            SimplexShape::Segment => unit_interval_rule(points_for_degree(order))
                .map(|(x, w)| QuadraturePoint::new(Vec3::new(x, 0., 0.), w))
                .collect(),
            SimplexShape::Triangle => {
                // the Jacobian (1 - u) adds one degree in u
                let u_rule: Vec<_> = unit_interval_rule(points_for_degree(order + 1)).collect();
                let v_rule: Vec<_> = unit_interval_rule(points_for_degree(order)).collect();

                let mut rule = IntegrationRule::with_capacity(u_rule.len() * v_rule.len());
                for &(u, wu) in &u_rule {
                    for &(v, wv) in &v_rule {
                        let point = Vec3::new(u, v * (1. - u), 0.);
                        rule.push(QuadraturePoint::new(point, wu * wv * (1. - u)));
                    }
                }
                rule
            }
            SimplexShape::Tetrahedron => {
                // Jacobian (1 - u)^2 (1 - v)
                let u_rule: Vec<_> = unit_interval_rule(points_for_degree(order + 2)).collect();
                let v_rule: Vec<_> = unit_interval_rule(points_for_degree(order + 1)).collect();
                let w_rule: Vec<_> = unit_interval_rule(points_for_degree(order)).collect();

                let mut rule =
                    IntegrationRule::with_capacity(u_rule.len() * v_rule.len() * w_rule.len());
                for &(u, wu) in &u_rule {
                    for &(v, wv) in &v_rule {
                        for &(w, ww) in &w_rule {
                            let point = Vec3::new(u, v * (1. - u), w * (1. - u) * (1. - v));
                            let weight = wu * wv * ww * (1. - u).powi(2) * (1. - v);
                            rule.push(QuadraturePoint::new(point, weight));
                        }
                    }
                }
                rule
            }
        }
    }
}

/// A point of a Gauss-Legendre rule on the interval `[-1, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GLPoint {
    /// Integration weight.
    pub weight: f64,
    /// Location of the point in `[-1, 1]`.
    pub abscissa: f64,
}

/// Compute the `n`-point Gauss-Legendre rule on `[-1, 1]`,
/// exact for polynomials of degree `2n - 1` or less.
///
/// The abscissae are the roots of the Legendre polynomial `P_n`,
/// found with Newton's method, and are returned in ascending order.
pub fn gauss_legendre(n: usize) -> Vec<GLPoint> {
    let mut points: Vec<GLPoint> = (0..n)
        .map(|i| {
            // initial guess close to the i-th root, counting down from 1
            let mut x =
                f64::cos(std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5));
            for _ in 0..100 {
                let (p, dp) = legendre_with_derivative(n, x);
                let dx = p / dp;
                x -= dx;
                if dx.abs() < 1e-15 {
                    break;
                }
            }
            let (_, dp) = legendre_with_derivative(n, x);
            GLPoint {
                weight: 2. / ((1. - x * x) * dp * dp),
                abscissa: x,
            }
        })
        .collect();
    points.reverse();
    points
}

/// Evaluate the Legendre polynomial `P_n` and its derivative at `x`
/// using the three-term recurrence.
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.;
    let mut p = x;
    for k in 2..=n {
        let k = k as f64;
        let p_next = ((2. * k - 1.) * x * p - (k - 1.) * p_prev) / k;
        p_prev = p;
        p = p_next;
    }
    let dp = n as f64 * (x * p - p_prev) / (x * x - 1.);
    (p, dp)
}

/// Gauss-Legendre rule with `n` points rescaled to the interval `[0, 1]`,
/// as (abscissa, weight) pairs.
fn unit_interval_rule(n: usize) -> impl Iterator<Item = (f64, f64)> {
    gauss_legendre(n)
        .into_iter()
        .map(|p| ((1. + p.abscissa) / 2., p.weight / 2.))
}

/// Map a reference rule onto a simplex.
///
/// Each point is placed by the affine combination of the simplex's vertices
/// given by its free barycentric coordinates,
/// and each weight is scaled by the [`measure`][crate::polytope::measure]
/// of the simplex.
pub fn map_reference_rule(
    reference: &IntegrationRule,
    simplex: &PolytopeView,
) -> Result<IntegrationRule, CutError> {
    let scale = simplex.measure()?;
    let vertex_count = simplex.polytope().len();
    let origin = simplex.position(0);

    let mapped = reference
        .iter()
        .map(|qp| {
            let origin_weight = 1. - qp.point.iter().take(vertex_count - 1).sum::<f64>();
            let mut point = origin_weight * origin;
            for m in 0..vertex_count - 1 {
                point += qp.point[m] * simplex.position(m + 1);
            }
            QuadraturePoint::new(point, qp.weight * scale)
        })
        .collect();
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polytope::{Polytope, VertexStore};
    use approx::relative_eq;

    fn factorial(n: u32) -> f64 {
        (1..=n).map(f64::from).product()
    }

    /// The abscissae and weights match tabulated values.
    #[test]
    fn gauss_legendre_tables() {
        // 3-point rule, ordered by abscissa
        let expected_3 = [
            (-0.7745966692414834, 0.5555555555555556),
            (0.0000000000000000, 0.8888888888888888),
            (0.7745966692414834, 0.5555555555555556),
        ];
        let computed_3 = gauss_legendre(3);
        assert_eq!(computed_3.len(), 3);
        for (p, (x, w)) in computed_3.iter().zip(expected_3) {
            assert!(relative_eq!(p.abscissa, x, epsilon = 1e-14));
            assert!(relative_eq!(p.weight, w, epsilon = 1e-14));
        }

        let computed_6 = gauss_legendre(6);
        assert!(relative_eq!(computed_6[5].abscissa, 0.932469514203152, epsilon = 1e-14));
        assert!(relative_eq!(computed_6[5].weight, 0.1713244923791704, epsilon = 1e-14));
        assert!(relative_eq!(computed_6[3].abscissa, 0.2386191860831969, epsilon = 1e-14));
        assert!(relative_eq!(computed_6[3].weight, 0.467913934572691, epsilon = 1e-14));

        // weights always sum to the length of the interval
        for n in 1..=20 {
            let sum: f64 = gauss_legendre(n).iter().map(|p| p.weight).sum();
            assert!(relative_eq!(sum, 2., epsilon = 1e-13), "n = {n}: sum {sum}");
        }
        assert!(gauss_legendre(0).is_empty());
    }

    /// Check that the reference rules
    /// integrate every monomial up to their order exactly.
    #[test]
    fn reference_rules_are_exact() {
        for order in 0..=8 {
            let seg = GaussRules.rule(SimplexShape::Segment, order);
            for a in 0..=order as i32 {
                let exact = 1. / (a + 1) as f64;
                let num = seg.integrate(|p| p.x.powi(a));
                assert!(
                    relative_eq!(num, exact, max_relative = 1e-12),
                    "segment, order {order}, x^{a}: expected {exact}, got {num}"
                );
            }

            // integral of x^a y^b over the reference triangle is a! b! / (a + b + 2)!
            let tri = GaussRules.rule(SimplexShape::Triangle, order);
            for a in 0..=order as u32 {
                for b in 0..=order as u32 - a {
                    let exact = factorial(a) * factorial(b) / factorial(a + b + 2);
                    let num = tri.integrate(|p| p.x.powi(a as i32) * p.y.powi(b as i32));
                    assert!(
                        relative_eq!(num, exact, max_relative = 1e-12),
                        "triangle, order {order}, x^{a} y^{b}: expected {exact}, got {num}"
                    );
                }
            }

            // and x^a y^b z^c over the tetrahedron a! b! c! / (a + b + c + 3)!
            let tet = GaussRules.rule(SimplexShape::Tetrahedron, order);
            for a in 0..=order as u32 {
                for b in 0..=order as u32 - a {
                    for c in 0..=order as u32 - a - b {
                        let exact = factorial(a) * factorial(b) * factorial(c)
                            / factorial(a + b + c + 3);
                        let num = tet.integrate(|p| {
                            p.x.powi(a as i32) * p.y.powi(b as i32) * p.z.powi(c as i32)
                        });
                        assert!(
                            relative_eq!(num, exact, max_relative = 1e-12),
                            "tetrahedron, order {order}, x^{a} y^{b} z^{c}: \
                            expected {exact}, got {num}"
                        );
                    }
                }
            }
        }
    }

    /// Rule sizes only depend on shape and order.
    #[test]
    fn rule_sizes() {
        assert_eq!(GaussRules.rule(SimplexShape::Segment, 0).len(), 1);
        assert_eq!(GaussRules.rule(SimplexShape::Segment, 5).len(), 3);
        assert_eq!(GaussRules.rule(SimplexShape::Triangle, 1).len(), 2);
        assert_eq!(GaussRules.rule(SimplexShape::Triangle, 2).len(), 4);
        assert_eq!(GaussRules.rule(SimplexShape::Tetrahedron, 2).len(), 12);
        assert_eq!(
            GaussRules.rule(SimplexShape::Tetrahedron, 4),
            GaussRules.rule(SimplexShape::Tetrahedron, 4)
        );
    }

    #[test]
    fn map_onto_triangle() {
        let mut store = VertexStore::new();
        store.push(Vec3::new(1., 1., 0.), 0.);
        store.push(Vec3::new(3., 1., 0.), 0.);
        store.push(Vec3::new(1., 2., 0.), 0.);
        let tri = Polytope::new(vec![0, 1, 2], 2);
        let view = tri.view(&store);

        let reference = GaussRules.rule(SimplexShape::Triangle, 3);
        let mapped = map_reference_rule(&reference, &view).unwrap();
        assert_eq!(mapped.len(), reference.len());
        // area of the triangle is 1
        assert!(relative_eq!(mapped.total_weight(), 1.));
        // centroid at (5/3, 4/3)
        assert!(relative_eq!(mapped.integrate(|p| p.x), 5. / 3.));
        assert!(relative_eq!(mapped.integrate(|p| p.y), 4. / 3.));
        // every point lies inside the triangle
        for qp in &mapped {
            let (x, y) = (qp.point.x - 1., qp.point.y - 1.);
            assert!(x > 0. && y > 0. && x / 2. + y < 1.);
            assert_eq!(qp.point.z, 0.);
        }
    }

    /// A point in free barycentric coordinates weights the first vertex implicitly.
    #[test]
    fn map_uses_first_vertex_as_origin() {
        let mut store = VertexStore::new();
        store.push(Vec3::new(0., 0., 2.), 0.);
        store.push(Vec3::new(4., 0., 2.), 0.);
        let seg = Polytope::new(vec![1, 0], 1);
        let reference = IntegrationRule::from(vec![QuadraturePoint::new(
            Vec3::new(0.25, 0., 0.),
            1.,
        )]);
        let mapped = map_reference_rule(&reference, &seg.view(&store)).unwrap();
        assert!(relative_eq!(mapped.points()[0].point, Vec3::new(3., 0., 2.)));
        assert!(relative_eq!(mapped.points()[0].weight, 4.));
    }
}
