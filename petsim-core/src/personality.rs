//! Personality policies: map current attributes to a preferred action.
//!
//! Each personality looks at exactly one attribute:
//!
//! | Personality | Rule                                  |
//! |-------------|---------------------------------------|
//! | Dog         | `health < 70` → FEED, else PLAY       |
//! | Cat         | `hunger > 50` → FEED, else SLEEP      |
//! | Bird        | `social < 40` → PLAY, else SLEEP      |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::attributes::Attributes;
use crate::types::Action;

/// The personality chosen for a pet. Selected once per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Food when poorly, otherwise play.
    Dog,
    /// Food when hungry, otherwise nap.
    Cat,
    /// Company when lonely, otherwise nap.
    Bird,
}

impl Personality {
    /// Every personality, in menu order.
    pub const ALL: [Self; 3] = [Self::Dog, Self::Cat, Self::Bird];

    /// Decide what the pet wants right now.
    #[must_use]
    pub fn decide(self, attrs: &Attributes) -> Action {
        match self {
            Self::Dog => {
                if attrs.health() < 70 {
                    Action::Feed
                } else {
                    Action::Play
                }
            }
            Self::Cat => {
                if attrs.hunger() > 50 {
                    Action::Feed
                } else {
                    Action::Sleep
                }
            }
            Self::Bird => {
                if attrs.social() < 40 {
                    Action::Play
                } else {
                    Action::Sleep
                }
            }
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
            Self::Bird => "Bird",
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" | "1" => Ok(Self::Dog),
            "cat" | "2" => Ok(Self::Cat),
            "bird" | "3" => Ok(Self::Bird),
            other => Err(format!("unknown personality: {other}")),
        }
    }
}
