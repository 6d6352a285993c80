//! Failure rate to presentation color and letter grade.
//!
//! Both classifiers work on `strength = 100 - failure_rate` and scan a fixed
//! ladder from the highest rung down, returning the first rung satisfied.
//! Inputs are never clamped; a NaN strength satisfies no rung and lands on
//! the ladder's default.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    Above(f64),
}

impl Bound {
    fn admits(self, strength: f64) -> bool {
        match self {
            Bound::AtLeast(min) => strength >= min,
            Bound::Above(min) => strength > min,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Green400,
    Green500,
    Yellow400,
    Yellow500,
    Orange400,
    Orange500,
    DarkAccentRed,
    Red400,
    Red500,
    Gray100,
}

impl ColorToken {
    /// Theme class name understood by the front end.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorToken::Green400 => "text-green-400",
            ColorToken::Green500 => "text-green-500",
            ColorToken::Yellow400 => "text-yellow-400",
            ColorToken::Yellow500 => "text-yellow-500",
            ColorToken::Orange400 => "text-orange-400",
            ColorToken::Orange500 => "text-orange-500",
            ColorToken::DarkAccentRed => "text-dark-accent-red",
            ColorToken::Red400 => "text-red-400",
            ColorToken::Red500 => "text-red-500",
            ColorToken::Gray100 => "text-gray-100",
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColorToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Rungs 95 and 85 intentionally share a token.
pub const COLOR_LADDER: &[(Bound, ColorToken)] = &[
    (Bound::AtLeast(95.0), ColorToken::Green400),
    (Bound::AtLeast(85.0), ColorToken::Green400),
    (Bound::AtLeast(75.0), ColorToken::Green500),
    (Bound::AtLeast(65.0), ColorToken::Yellow400),
    (Bound::AtLeast(55.0), ColorToken::Yellow500),
    (Bound::AtLeast(45.0), ColorToken::Orange400),
    (Bound::AtLeast(35.0), ColorToken::Orange500),
    (Bound::AtLeast(25.0), ColorToken::DarkAccentRed),
    (Bound::AtLeast(15.0), ColorToken::Red400),
    (Bound::Above(0.0), ColorToken::Red500),
];
pub const COLOR_DEFAULT: ColorToken = ColorToken::Gray100;

pub const GRADE_LADDER: &[(Bound, Grade)] = &[
    (Bound::AtLeast(90.0), Grade::A),
    (Bound::AtLeast(80.0), Grade::B),
    (Bound::AtLeast(70.0), Grade::C),
    (Bound::AtLeast(60.0), Grade::D),
];
pub const GRADE_DEFAULT: Grade = Grade::E;

pub fn strength(failure_rate: f64) -> f64 {
    100.0 - failure_rate
}

/// First rung of `ladder` admitting `strength`, or `default`.
pub fn classify<T: Copy>(ladder: &[(Bound, T)], default: T, strength: f64) -> T {
    ladder
        .iter()
        .find(|(bound, _)| bound.admits(strength))
        .map(|(_, value)| *value)
        .unwrap_or(default)
}

pub fn color_for_failure_rate(failure_rate: f64) -> ColorToken {
    classify(COLOR_LADDER, COLOR_DEFAULT, strength(failure_rate))
}

pub fn grade_for_failure_rate(failure_rate: f64) -> Grade {
    classify(GRADE_LADDER, GRADE_DEFAULT, strength(failure_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_bound_is_strict() {
        assert!(!Bound::Above(0.0).admits(0.0));
        assert!(Bound::Above(0.0).admits(0.001));
        assert!(Bound::AtLeast(15.0).admits(15.0));
    }

    #[test]
    fn empty_ladder_falls_back() {
        let ladder: &[(Bound, u8)] = &[];
        assert_eq!(classify(ladder, 7, 50.0), 7);
    }
}
