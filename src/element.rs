//! Reference element shapes and sampling of level-set functions on them.

use nalgebra as na;

use crate::{polytope::SimplexShape, transform::ElementMapping, CutError, Vec3};

/// The shape of a reference element.
///
/// Only [`Triangle`][Self::Triangle] and [`Tetrahedron`][Self::Tetrahedron]
/// elements can be cut; the other shapes exist so that
/// callers iterating over mixed meshes get a proper error for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementShape {
    /// The unit interval.
    Segment,
    /// The triangle with vertices (0,0), (1,0), (0,1).
    Triangle,
    /// The unit square.
    Quadrilateral,
    /// The tetrahedron with vertices (0,0,0), (1,0,0), (0,1,0), (0,0,1).
    Tetrahedron,
    /// The unit cube.
    Hexahedron,
}

const SEGMENT_VERTICES: [[f64; 3]; 2] = [[0., 0., 0.], [1., 0., 0.]];
const TRIANGLE_VERTICES: [[f64; 3]; 3] = [[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]];
const QUADRILATERAL_VERTICES: [[f64; 3]; 4] =
    [[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]];
const TETRAHEDRON_VERTICES: [[f64; 3]; 4] =
    [[0., 0., 0.], [1., 0., 0.], [0., 1., 0.], [0., 0., 1.]];
#[rustfmt::skip]
const HEXAHEDRON_VERTICES: [[f64; 3]; 8] = [
    [0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.],
    [0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.],
];

impl ElementShape {
    /// Get the dimension of the element.
    #[inline]
    pub fn dim(self) -> usize {
        match self {
            ElementShape::Segment => 1,
            ElementShape::Triangle | ElementShape::Quadrilateral => 2,
            ElementShape::Tetrahedron | ElementShape::Hexahedron => 3,
        }
    }

    /// Get the vertices of the reference element
    /// as 3D coordinates, with unused components set to zero.
    ///
    /// For the simplices, vertex 0 is at the origin
    /// and vertex `i` lies on the `i`th coordinate axis.
    /// The interface normal computation relies on this.
    pub fn reference_vertices(self) -> &'static [[f64; 3]] {
        match self {
            ElementShape::Segment => &SEGMENT_VERTICES,
            ElementShape::Triangle => &TRIANGLE_VERTICES,
            ElementShape::Quadrilateral => &QUADRILATERAL_VERTICES,
            ElementShape::Tetrahedron => &TETRAHEDRON_VERTICES,
            ElementShape::Hexahedron => &HEXAHEDRON_VERTICES,
        }
    }

    /// Get the number of vertices of the element.
    #[inline]
    pub fn vertex_count(self) -> usize {
        self.reference_vertices().len()
    }

    /// Get the simplex shape of this element, if it is a simplex.
    #[inline]
    pub fn simplex_shape(self) -> Option<SimplexShape> {
        match self {
            ElementShape::Segment => Some(SimplexShape::Segment),
            ElementShape::Triangle => Some(SimplexShape::Triangle),
            ElementShape::Tetrahedron => Some(SimplexShape::Tetrahedron),
            ElementShape::Quadrilateral | ElementShape::Hexahedron => None,
        }
    }

    /// Whether elements of this shape can be cut by a level set.
    #[inline]
    pub fn is_cuttable(self) -> bool {
        matches!(self, ElementShape::Triangle | ElementShape::Tetrahedron)
    }

    /// Return an error unless elements of this shape can be cut.
    pub(crate) fn require_cuttable(self) -> Result<(), CutError> {
        if self.is_cuttable() {
            Ok(())
        } else {
            Err(CutError::Unsupported(format!(
                "{self:?} elements can't be cut, only triangles and tetrahedra"
            )))
        }
    }

    /// Evaluate a level-set function at the vertices of an element.
    ///
    /// The reference vertices are mapped to physical space with `mapping`
    /// before evaluating the level set there.
    /// The dimension of the mapping must match the dimension of the shape.
    ///
    /// ```
    /// # use straightcut::{ElementShape, IdentityMapping, Vec3};
    /// let circle = |p: &Vec3| p.magnitude() - 0.5;
    /// let values = ElementShape::Triangle
    ///     .sample_level_set(&IdentityMapping::<2>, &circle)
    ///     .unwrap();
    /// assert_eq!(values, vec![-0.5, 0.5, 0.5]);
    /// ```
    pub fn sample_level_set<const DIM: usize>(
        self,
        mapping: &impl ElementMapping<DIM>,
        level_set: &impl LevelSet,
    ) -> Result<Vec<f64>, CutError> {
        if DIM != self.dim() {
            return Err(CutError::InvalidArgument(format!(
                "a {DIM}-dimensional mapping can't map a {}-dimensional {self:?}",
                self.dim()
            )));
        }

        let values = self
            .reference_vertices()
            .iter()
            .map(|v| {
                let ref_point = na::SVector::<f64, DIM>::from_fn(|i, _| v[i]);
                let physical = embed(&mapping.map_point(&ref_point));
                level_set.value(&physical)
            })
            .collect();
        Ok(values)
    }
}

/// Embed a point of up to 3 dimensions into 3D space,
/// setting the missing components to zero.
pub(crate) fn embed<const DIM: usize>(p: &na::SVector<f64, DIM>) -> Vec3 {
    Vec3::from_fn(|i, _| if i < DIM { p[i] } else { 0. })
}

/// A scalar function whose zero level set defines the interface.
///
/// Only ever evaluated at element vertices;
/// between them the level set is treated as linear.
/// Implemented for all closures taking a 3D point,
/// where the unused coordinates of 2D points are zero.
pub trait LevelSet {
    /// Evaluate the level set at a point in physical space.
    fn value(&self, point: &Vec3) -> f64;
}

impl<F> LevelSet for F
where
    F: Fn(&Vec3) -> f64,
{
    #[inline]
    fn value(&self, point: &Vec3) -> f64 {
        self(point)
    }
}
