//! Classification of elements relative to the zero level set.

/// Tolerance below which a level-set value counts as zero.
///
/// Used both for classifying elements and for deciding
/// which edges of a simplex change sign.
pub const CUT_TOLERANCE: f64 = 1e-10;

/// The part of an element a quadrature rule is requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DomainType {
    /// The region where the level set is strictly positive.
    Positive,
    /// The region where the level set is strictly negative.
    Negative,
    /// The zero level set itself, a manifold of codimension 1.
    Interface,
}

impl DomainType {
    /// Whether a vertex with the given level-set value
    /// lies strictly inside this domain.
    ///
    /// Always false for [`Interface`][Self::Interface],
    /// which has no volume for a vertex to lie in.
    #[inline]
    pub fn contains_value(self, value: f64) -> bool {
        match self {
            DomainType::Positive => value > CUT_TOLERANCE,
            DomainType::Negative => value < -CUT_TOLERANCE,
            DomainType::Interface => false,
        }
    }
}

/// Classify an element by the level-set values at its vertices.
///
/// Returns [`DomainType::Interface`] if the values have mixed signs,
/// i.e. the element is cut,
/// [`DomainType::Negative`] if they're all negative
/// and [`DomainType::Positive`] otherwise.
/// Values within [`CUT_TOLERANCE`] of zero count for neither side,
/// so an element whose values are all zero is considered positive.
///
/// ```
/// # use straightcut::{classify, DomainType};
/// assert_eq!(classify(&[1., -1., -1.]), DomainType::Interface);
/// assert_eq!(classify(&[-1., -0.5, 0.]), DomainType::Negative);
/// assert_eq!(classify(&[0., 0., 0.]), DomainType::Positive);
/// ```
pub fn classify(values: &[f64]) -> DomainType {
    let mut has_pos = false;
    let mut has_neg = false;

    for &v in values {
        has_pos |= v > CUT_TOLERANCE;
        has_neg |= v < -CUT_TOLERANCE;
        if has_pos && has_neg {
            break;
        }
    }

    let domain = match (has_pos, has_neg) {
        (true, true) => DomainType::Interface,
        (false, true) => DomainType::Negative,
        _ => DomainType::Positive,
    };
    log::trace!("classified element with values {values:?} as {domain:?}");
    domain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_signs() {
        assert_eq!(classify(&[1., 2., 0.5]), DomainType::Positive);
        assert_eq!(classify(&[-1., -2., -0.5, -3.]), DomainType::Negative);
        assert_eq!(classify(&[1., -2., 0.5]), DomainType::Interface);
        assert_eq!(classify(&[-1., -2., -0.5, 3.]), DomainType::Interface);
    }

    /// Values within the tolerance never trigger either side.
    #[test]
    fn zeros_are_neutral() {
        assert_eq!(classify(&[0., 0., 0.]), DomainType::Positive);
        assert_eq!(classify(&[1e-11, -1e-11, 0.]), DomainType::Positive);
        assert_eq!(classify(&[0., 0., -1.]), DomainType::Negative);
        assert_eq!(classify(&[0., 1., 0., 0.]), DomainType::Positive);
        assert_eq!(classify(&[]), DomainType::Positive);
    }

    #[test]
    fn domain_membership() {
        assert!(DomainType::Positive.contains_value(0.1));
        assert!(!DomainType::Positive.contains_value(1e-12));
        assert!(DomainType::Negative.contains_value(-0.1));
        assert!(!DomainType::Negative.contains_value(0.1));
        assert!(!DomainType::Interface.contains_value(0.));
    }
}
