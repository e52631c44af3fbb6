//! Mappings from reference to physical elements,
//! and the transformation of interface rules under them.

use nalgebra as na;

use crate::{quadrature::IntegrationRule, CutError, UnitVec3};

/// A mapping from a reference element to a physical element.
///
/// Implemented by the caller's geometry code;
/// [`AffineMapping`] covers straight-sided simplices.
pub trait ElementMapping<const DIM: usize> {
    /// Map a point in reference coordinates to physical coordinates.
    fn map_point(&self, ref_point: &na::SVector<f64, DIM>) -> na::SVector<f64, DIM>;
    /// Get the inverse of the mapping's Jacobian at a point in reference coordinates.
    fn jacobian_inverse(&self, ref_point: &na::SVector<f64, DIM>) -> na::SMatrix<f64, DIM, DIM>;
}

/// The mapping of the reference element onto itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityMapping<const DIM: usize>;

impl<const DIM: usize> ElementMapping<DIM> for IdentityMapping<DIM> {
    #[inline]
    fn map_point(&self, ref_point: &na::SVector<f64, DIM>) -> na::SVector<f64, DIM> {
        *ref_point
    }

    #[inline]
    fn jacobian_inverse(&self, _: &na::SVector<f64, DIM>) -> na::SMatrix<f64, DIM, DIM> {
        na::SMatrix::identity()
    }
}

/// An affine mapping `x = origin + J * xi`,
/// e.g. the mapping of the reference simplex onto a straight-sided simplex.
#[derive(Clone, Copy, Debug)]
pub struct AffineMapping<const DIM: usize> {
    origin: na::SVector<f64, DIM>,
    jacobian: na::SMatrix<f64, DIM, DIM>,
    jacobian_inv: na::SMatrix<f64, DIM, DIM>,
}

impl<const DIM: usize> AffineMapping<DIM> {
    /// Create a mapping from its constant Jacobian and the image of the origin.
    ///
    /// Fails if the Jacobian is not invertible.
    pub fn new(
        origin: na::SVector<f64, DIM>,
        jacobian: na::SMatrix<f64, DIM, DIM>,
    ) -> Result<Self, CutError> {
        let jacobian_inv = jacobian.try_inverse().ok_or_else(|| {
            CutError::InvalidArgument(format!("singular Jacobian {jacobian:?}"))
        })?;
        Ok(Self {
            origin,
            jacobian,
            jacobian_inv,
        })
    }

    /// Create the mapping of the reference simplex
    /// onto the simplex with the given vertices.
    ///
    /// Vertex 0 of the reference simplex maps to `vertices[0]`
    /// and vertex `i` (on the `i`th axis) maps to `vertices[i]`.
    /// There must be exactly `DIM + 1` vertices spanning a nondegenerate simplex.
    pub fn from_simplex_vertices(vertices: &[na::SVector<f64, DIM>]) -> Result<Self, CutError> {
        if vertices.len() != DIM + 1 {
            return Err(CutError::InvalidArgument(format!(
                "a {DIM}-simplex needs {} vertices, got {}",
                DIM + 1,
                vertices.len()
            )));
        }
        let origin = vertices[0];
        let jacobian = na::SMatrix::<f64, DIM, DIM>::from_fn(|row, col| {
            vertices[col + 1][row] - origin[row]
        });
        Self::new(origin, jacobian)
    }

    /// Get the (constant) Jacobian of the mapping.
    #[inline]
    pub fn jacobian(&self) -> &na::SMatrix<f64, DIM, DIM> {
        &self.jacobian
    }

    /// Get the determinant of the Jacobian.
    #[inline]
    pub fn jacobian_determinant(&self) -> f64 {
        // const-generic matrices only get `determinant` for concrete sizes,
        // so go through a dynamically sized copy
        na::DMatrix::from_column_slice(DIM, DIM, self.jacobian.as_slice()).determinant()
    }
}

impl<const DIM: usize> ElementMapping<DIM> for AffineMapping<DIM> {
    #[inline]
    fn map_point(&self, ref_point: &na::SVector<f64, DIM>) -> na::SVector<f64, DIM> {
        self.origin + self.jacobian * ref_point
    }

    #[inline]
    fn jacobian_inverse(&self, _: &na::SVector<f64, DIM>) -> na::SMatrix<f64, DIM, DIM> {
        self.jacobian_inv
    }
}

/// Rescale the weights of an interface rule given in reference coordinates
/// so that integrating over the mapped interface
/// only needs the usual volume scaling by the Jacobian determinant.
///
/// At each point, the reference normal is transformed
/// by the inverse transpose of the Jacobian
/// and the weight is multiplied by the length of the result.
/// Points stay in reference coordinates.
pub fn transform_interface_rule<const DIM: usize>(
    rule: &IntegrationRule,
    normal: &UnitVec3,
    mapping: &impl ElementMapping<DIM>,
) -> Result<IntegrationRule, CutError> {
    if !(1..=3).contains(&DIM) {
        return Err(CutError::InvalidArgument(format!(
            "interface rules exist only in 1 to 3 dimensions, not {DIM}"
        )));
    }
    let normal = na::SVector::<f64, DIM>::from_fn(|i, _| normal[i]);

    let transformed = rule
        .iter()
        .map(|qp| {
            let ref_point = na::SVector::<f64, DIM>::from_fn(|i, _| qp.point[i]);
            let jac_inv = mapping.jacobian_inverse(&ref_point);
            let mapped_normal = jac_inv.transpose() * normal;
            qp.with_weight(qp.weight * mapped_normal.magnitude())
        })
        .collect();
    Ok(transformed)
}
