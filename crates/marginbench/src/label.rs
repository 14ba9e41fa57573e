//! Two-class labels and the label-diversity check.

use serde::Serialize;
use std::fmt;

/// Class of a point relative to a decision boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    #[inline]
    pub fn from_sign(positive: bool) -> Self {
        if positive {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// `+1` or `-1`.
    #[inline]
    pub fn value(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }
}

impl From<Label> for bool {
    fn from(l: Label) -> bool {
        l.is_positive()
    }
}

impl From<bool> for Label {
    fn from(b: bool) -> Label {
        Label::from_sign(b)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// True when the labels carry no diversity: all equal, or none at all.
///
/// A single-class dataset cannot train a two-class classifier; callers regenerate.
pub fn is_degenerate(labels: &[Label]) -> bool {
    match labels.first() {
        Some(first) => labels.iter().all(|l| l == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_and_bool_round_trip() {
        assert_eq!(Label::Positive.value(), 1);
        assert_eq!(Label::Negative.as_f64(), -1.0);
        assert!(bool::from(Label::Positive));
        assert_eq!(Label::from(false), Label::Negative);
        assert_eq!(Label::Negative.to_string(), "-1");
    }

    #[test]
    fn degenerate_detection() {
        use Label::*;
        assert!(is_degenerate(&[]));
        assert!(is_degenerate(&[Positive]));
        assert!(is_degenerate(&[Negative, Negative, Negative]));
        assert!(!is_degenerate(&[Negative, Negative, Positive]));
    }
}
