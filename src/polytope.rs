//! The geometric data model: a per-element vertex arena
//! and lightweight index-based simplices pointing into it.

use crate::{CutError, Vec3};

/// A point in the element together with the level-set value sampled there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexSample {
    /// Position in ambient 3D space.
    /// For 2D elements the z coordinate is zero.
    pub position: Vec3,
    /// Level-set value at this position.
    pub value: f64,
}

/// Append-only storage of the vertices used while cutting one element.
///
/// Vertices are referred to by their index in the store,
/// which stays valid for as long as the store is not [`clear`][Self::clear]ed.
/// The store can be reused for another element after clearing it,
/// which keeps the allocation around.
#[derive(Clone, Debug, Default)]
pub struct VertexStore {
    samples: Vec<VertexSample>,
}

impl VertexStore {
    /// Create an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` vertices.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append a vertex and return its index.
    #[inline]
    pub fn push(&mut self, position: Vec3, value: f64) -> usize {
        self.samples.push(VertexSample { position, value });
        self.samples.len() - 1
    }

    /// Get a vertex by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&VertexSample> {
        self.samples.get(index)
    }

    /// Get the number of vertices in the store.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the store contains no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get a slice of all vertices in the store.
    #[inline]
    pub fn samples(&self) -> &[VertexSample] {
        &self.samples
    }

    /// Remove all vertices, invalidating every index into the store.
    #[inline]
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// The shape of a simplex, determined by its number of vertices.
///
/// This selects both the reference quadrature rule
/// and the measure formula for a sub-simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimplexShape {
    /// A line segment (2 vertices).
    Segment,
    /// A triangle (3 vertices).
    Triangle,
    /// A tetrahedron (4 vertices).
    Tetrahedron,
}

impl SimplexShape {
    /// Get the shape of a simplex with the given number of vertices,
    /// or `None` if no shape has that many.
    pub fn from_vertex_count(count: usize) -> Option<Self> {
        match count {
            2 => Some(SimplexShape::Segment),
            3 => Some(SimplexShape::Triangle),
            4 => Some(SimplexShape::Tetrahedron),
            _ => None,
        }
    }

    /// Get the dimension of the shape.
    #[inline]
    pub fn dim(self) -> usize {
        match self {
            SimplexShape::Segment => 1,
            SimplexShape::Triangle => 2,
            SimplexShape::Tetrahedron => 3,
        }
    }

    /// Get the number of vertices of the shape.
    #[inline]
    pub fn vertex_count(self) -> usize {
        self.dim() + 1
    }
}

/// An ordered set of vertex indices into a [`VertexStore`],
/// tagged with a dimension.
///
/// For a simplex the number of indices is `dim + 1`,
/// but intermediate results such as the quadrilateral interface facet
/// of a tetrahedron have more.
/// The polytope doesn't borrow its store;
/// use [`view`][Self::view] to access vertex data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polytope {
    dim: usize,
    indices: Vec<usize>,
}

impl Polytope {
    /// Create a polytope from vertex indices and a dimension.
    #[inline]
    pub fn new(indices: Vec<usize>, dim: usize) -> Self {
        Self { dim, indices }
    }

    /// Create a 0-dimensional polytope consisting of a single vertex.
    #[inline]
    pub fn point(index: usize) -> Self {
        Self::new(vec![index], 0)
    }

    /// Get the dimension this polytope is tagged with.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the polytope has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Get the vertex indices in order.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Append a vertex index.
    #[inline]
    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    /// Whether this polytope is a simplex of its tagged dimension.
    #[inline]
    pub fn is_simplex(&self) -> bool {
        self.indices.len() == self.dim + 1
    }

    /// Check that every index refers to a vertex in the store.
    pub fn check_indices(&self, store: &VertexStore) -> Result<(), CutError> {
        match self.indices.iter().find(|&&i| i >= store.len()) {
            Some(i) => Err(CutError::InvalidArgument(format!(
                "vertex index {i} out of bounds for a store of {} vertices",
                store.len()
            ))),
            None => Ok(()),
        }
    }

    /// Access the vertex data of this polytope through its store.
    ///
    /// The indices must be valid in `store`
    /// (see [`check_indices`][Self::check_indices]),
    /// otherwise accessing vertices through the view panics.
    #[inline]
    pub fn view<'a>(&'a self, store: &'a VertexStore) -> PolytopeView<'a> {
        PolytopeView {
            polytope: self,
            store,
        }
    }
}

impl std::ops::Index<usize> for Polytope {
    type Output = usize;

    #[inline]
    fn index(&self, i: usize) -> &usize {
        &self.indices[i]
    }
}

/// A view into a polytope's vertex data.
#[derive(Clone, Copy, Debug)]
pub struct PolytopeView<'a> {
    polytope: &'a Polytope,
    store: &'a VertexStore,
}

impl<'a> PolytopeView<'a> {
    /// Get the polytope this view is looking at.
    #[inline]
    pub fn polytope(&self) -> &'a Polytope {
        self.polytope
    }

    /// Get the position of the `i`th vertex of the polytope.
    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        self.store.samples[self.polytope.indices[i]].position
    }

    /// Get the level-set value at the `i`th vertex of the polytope.
    #[inline]
    pub fn value(&self, i: usize) -> f64 {
        self.store.samples[self.polytope.indices[i]].value
    }

    /// Iterate over the vertex positions of the polytope.
    #[inline]
    pub fn positions(&self) -> impl 'a + Iterator<Item = Vec3> {
        let (polytope, store) = (self.polytope, self.store);
        let samples = &store.samples;
        polytope.indices.iter().map(move |&i| samples[i].position)
    }

    /// Iterate over the level-set values at the vertices of the polytope.
    #[inline]
    pub fn values(&self) -> impl 'a + Iterator<Item = f64> {
        let (polytope, store) = (self.polytope, self.store);
        let samples = &store.samples;
        polytope.indices.iter().map(move |&i| samples[i].value)
    }

    /// Get the simplex shape corresponding to the number of vertices,
    /// if there is one.
    #[inline]
    pub fn shape(&self) -> Option<SimplexShape> {
        SimplexShape::from_vertex_count(self.polytope.len())
    }

    /// Compute the measure of this simplex. See [`measure`].
    #[inline]
    pub fn measure(&self) -> Result<f64, CutError> {
        measure(self)
    }
}

/// Compute the unsigned measure of a simplex,
/// scaled to match the normalization of reference quadrature rules.
///
/// - 2 vertices: the length of the segment.
/// - 3 vertices: the norm of the cross product of two edges,
///   i.e. **twice** the area of the triangle.
/// - 4 vertices: the absolute value of the triple product of three edges,
///   i.e. **six times** the volume of the tetrahedron.
///
/// These are the ratios of the simplex's measure to that of the reference simplex
/// (whose area is 1/2 and volume 1/6),
/// so multiplying the weights of a reference rule by them
/// gives weights summing to the simplex's actual measure.
/// Any other number of vertices is an error.
pub fn measure(simplex: &PolytopeView) -> Result<f64, CutError> {
    let p = |i| simplex.position(i);
    match simplex.shape() {
        Some(SimplexShape::Segment) => Ok((p(1) - p(0)).magnitude()),
        Some(SimplexShape::Triangle) => Ok((p(2) - p(0)).cross(&(p(1) - p(0))).magnitude()),
        Some(SimplexShape::Tetrahedron) => {
            let edges = crate::na::Matrix3::from_columns(&[p(3) - p(0), p(2) - p(0), p(1) - p(0)]);
            Ok(edges.determinant().abs())
        }
        None => Err(CutError::NotImplemented(format!(
            "measure of a polytope with {} vertices",
            simplex.polytope().len()
        ))),
    }
}
