//! The error type shared by all fallible operations in the crate.

/// Error in constructing a quadrature rule for a cut element.
///
/// Every error is fatal to the current element's rule construction.
/// The computation is deterministic, so retrying with the same inputs
/// gives the same result; what to do with a failed element
/// (propagate, skip, log) is up to the caller's element loop.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CutError {
    /// A polytope or input slice did not have the size or dimension
    /// the operation requires.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The element or reference shape is not a triangle or tetrahedron.
    #[error("Unsupported shape: {0}")]
    Unsupported(String),
    /// A combinatorial case or measure computation that has no implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    /// Cutting produced an interface facet of unexpected size.
    #[error("Bad topology: {0}")]
    BadTopology(String),
    /// An operation was called in the wrong state,
    /// or sub-simplices produced reference rules of different sizes.
    #[error("Bad state: {0}")]
    BadState(String),
    /// The axis-alignment shortcut used to compute the interface normal
    /// does not hold for the given simplex.
    #[error("Assumption violated: {0}")]
    AssumptionViolated(String),
}
