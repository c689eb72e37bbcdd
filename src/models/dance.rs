use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::pose_sequence::PoseSequence;

/// Star rating awarded at the end of a session (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const MAX: u8 = 3;

    /// Returns `None` for values above three
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
            .ok_or_else(|| format!("{} stars is above the maximum of {}", value, Self::MAX))
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = "★".repeat(self.0 as usize);
        let empty = "☆".repeat(Self::MAX.saturating_sub(self.0) as usize);
        write!(f, "{}{}", filled, empty)
    }
}

/// A playable dance: its name, reference recording and best rating so far
#[derive(Debug, Clone)]
pub struct Dance {
    pub name: String,
    pub pose_sequence: PoseSequence,
    stars: Stars,
}

impl Dance {
    pub fn new(name: String, pose_sequence: PoseSequence) -> Self {
        Self {
            name,
            pose_sequence,
            stars: Stars::zero(),
        }
    }

    pub fn stars(&self) -> Stars {
        self.stars
    }

    /// Set the rating. Values outside 0..=3 are ignored.
    pub fn set_stars(&mut self, value: u8) {
        if let Some(stars) = Stars::new(value) {
            self.stars = stars;
        }
    }
}
