//! Quadrature rules on triangles and tetrahedra cut by a level set.
//!
//! The level set is sampled at the vertices of an element
//! and treated as linear on it, so the interface is a straight line
//! (or flat polygon in 3D) through the element.
//! The element is cut along it into simplices
//! covering either side of the interface or the interface itself,
//! and a reference quadrature is mapped onto each of them.
//!
//! The main entry point is [`StraightCutIntegrator`]
//! (or [`straight_cut_rule`] for the default Gauss rules),
//! which handles both cut and uncut elements.
//! [`StraightCutGeometry`] exposes the individual steps
//! of loading, cutting and building rules on a single element.
//!
//! ```
//! # use straightcut::{straight_cut_rule, DomainType, ElementShape, IdentityMapping};
//! let lset = [1., -1., -1.];
//! let rule = straight_cut_rule(
//!     ElementShape::Triangle,
//!     &lset,
//!     &IdentityMapping::<2>,
//!     DomainType::Negative,
//!     2,
//! )
//! .unwrap()
//! .into_rule()
//! .unwrap();
//! assert!((rule.total_weight() - 0.375).abs() < 1e-14);
//! ```

#![warn(missing_docs)]

mod error;
#[doc(inline)]
pub use error::CutError;

pub mod domain;
#[doc(inline)]
pub use domain::{classify, DomainType, CUT_TOLERANCE};

pub mod polytope;
#[doc(inline)]
pub use polytope::{measure, Polytope, PolytopeView, SimplexShape, VertexSample, VertexStore};

pub mod cut;

pub mod element;
#[doc(inline)]
pub use element::{ElementShape, LevelSet};

pub mod transform;
#[doc(inline)]
pub use transform::{transform_interface_rule, AffineMapping, ElementMapping, IdentityMapping};

pub mod quadrature;
#[doc(inline)]
pub use quadrature::{GaussRules, IntegrationRule, QuadraturePoint, ReferenceQuadrature};

pub mod geometry;
#[doc(inline)]
pub use geometry::{GeometryState, StraightCutGeometry};

mod rule;
#[doc(inline)]
pub use rule::{straight_cut_rule, CutRule, StraightCutIntegrator};

// nalgebra re-exports of common types for convenience

pub use nalgebra as na;
/// Type alias for a 3D `nalgebra` vector.
pub type Vec3 = na::Vector3<f64>;
/// Type alias for a 3D `nalgebra` unit vector.
pub type UnitVec3 = na::Unit<Vec3>;
