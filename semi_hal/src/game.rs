//! Field element assignment from the field management system.
//!
//! At the start of a match the FMS sends a three-letter message such as
//! `"LRL"`: the lit side of the near switch, the scale and the far switch,
//! seen from the alliance wall.

use std::fmt;
use tracing::warn;

/// Side of a plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateSide {
    /// Left
    Left,
    /// Right
    Right,
    /// Unknown or not yet sent
    Invalid,
}

impl PlateSide {
    /// Parse one letter of the game message.
    pub fn from_letter(letter: char) -> Self {
        match letter {
            'L' => Self::Left,
            'R' => Self::Right,
            _ => Self::Invalid,
        }
    }

    /// Letter used in the game message.
    pub const fn letter(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Right => 'R',
            Self::Invalid => '?',
        }
    }
}

/// Plate sides for the near switch, scale and far switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateAssignment {
    sides: [PlateSide; 3],
}

impl PlateAssignment {
    /// Message used when no FMS is attached (practice runs).
    pub const UNKNOWN_MESSAGE: &'static str = "???";

    /// Assignment with every side unknown.
    pub const ALL_INVALID: Self = Self {
        sides: [PlateSide::Invalid; 3],
    };

    /// Parse a game message. Missing or unexpected letters become
    /// [`PlateSide::Invalid`].
    pub fn parse(message: &str) -> Self {
        let mut letters = message.chars();
        let sides = [(); 3].map(|_| {
            letters
                .next()
                .map_or(PlateSide::Invalid, PlateSide::from_letter)
        });
        let assignment = Self { sides };

        if message != Self::UNKNOWN_MESSAGE && sides.contains(&PlateSide::Invalid) {
            warn!("Found unknown plate sides in '{}': {}", message, assignment);
        }
        assignment
    }

    /// Switch nearest to the alliance wall.
    pub fn nearest(&self) -> PlateSide {
        self.sides[0]
    }

    /// Centre scale.
    pub fn scale(&self) -> PlateSide {
        self.sides[1]
    }

    /// Switch farthest from the alliance wall.
    pub fn farthest(&self) -> PlateSide {
        self.sides[2]
    }

    /// True if every side is known.
    pub fn is_complete(&self) -> bool {
        !self.sides.contains(&PlateSide::Invalid)
    }
}

impl fmt::Display for PlateAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in self.sides {
            write!(f, "{}", side.letter())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_message() {
        let a = PlateAssignment::parse("LRL");
        assert_eq!(a.nearest(), PlateSide::Left);
        assert_eq!(a.scale(), PlateSide::Right);
        assert_eq!(a.farthest(), PlateSide::Left);
        assert!(a.is_complete());
        assert_eq!(a.to_string(), "LRL");
    }

    #[test]
    fn test_parse_unknown_letters() {
        let a = PlateAssignment::parse("LXR");
        assert_eq!(a.scale(), PlateSide::Invalid);
        assert_eq!(a.to_string(), "L?R");
        assert!(!a.is_complete());
    }

    #[test]
    fn test_parse_short_message() {
        let a = PlateAssignment::parse("R");
        assert_eq!(a.nearest(), PlateSide::Right);
        assert_eq!(a.scale(), PlateSide::Invalid);
        assert_eq!(a.farthest(), PlateSide::Invalid);
    }

    #[test]
    fn test_all_invalid() {
        assert_eq!(PlateAssignment::parse("???"), PlateAssignment::ALL_INVALID);
        assert_eq!(PlateAssignment::ALL_INVALID.to_string(), "???");
    }
}
