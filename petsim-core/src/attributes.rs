//! Bounded pet attributes (the attribute store).
//!
//! Five integers with fixed ranges:
//!
//! | Attribute | Range        | High value means          |
//! |-----------|--------------|---------------------------|
//! | hunger    | 0..=100      | starving                  |
//! | social    | 0..=100      | well socialised           |
//! | sleep     | 0..=100      | exhausted                 |
//! | health    | 0..=100      | healthy                   |
//! | score     | 0..=100000   | long, well-kept life      |
//!
//! Out-of-range writes are clamped, never rejected. Reads clamp again, so a
//! value smuggled in through deserialisation can never escape its range.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::types::Mood;

/// Name of one bounded attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// 0 = full, 100 = starving.
    Hunger,
    /// 0 = lonely, 100 = content.
    Social,
    /// 0 = rested, 100 = exhausted.
    Sleep,
    /// 0 = dead, 100 = perfect health.
    Health,
    /// Accumulated score, 0..=100000.
    Score,
}

impl Attribute {
    /// All attributes, in display order.
    pub const ALL: [Self; 5] = [
        Self::Score,
        Self::Hunger,
        Self::Social,
        Self::Sleep,
        Self::Health,
    ];

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(self) -> i32 {
        0
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn max(self) -> i32 {
        match self {
            Self::Score => 100_000,
            _ => 100,
        }
    }

    /// Clamp `value` into this attribute's range.
    #[must_use]
    pub fn clamp(self, value: i32) -> i32 {
        value.clamp(self.min(), self.max())
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hunger => "hunger",
            Self::Social => "social",
            Self::Sleep => "sleep",
            Self::Health => "health",
            Self::Score => "score",
        };
        f.write_str(name)
    }
}

/// The five bounded attributes of one pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    hunger: i32,
    social: i32,
    sleep: i32,
    health: i32,
    score: i32,
}

impl Attributes {
    /// Attributes of a freshly adopted pet.
    #[must_use]
    pub const fn fresh() -> Self {
        Self {
            hunger: 20,
            social: 80,
            sleep: 20,
            health: 100,
            score: 0,
        }
    }

    /// Attributes right after a revive.
    #[must_use]
    pub const fn revived() -> Self {
        Self {
            hunger: 0,
            social: 100,
            sleep: 0,
            health: 100,
            score: 0,
        }
    }

    fn slot(&self, attr: Attribute) -> i32 {
        match attr {
            Attribute::Hunger => self.hunger,
            Attribute::Social => self.social,
            Attribute::Sleep => self.sleep,
            Attribute::Health => self.health,
            Attribute::Score => self.score,
        }
    }

    fn slot_mut(&mut self, attr: Attribute) -> &mut i32 {
        match attr {
            Attribute::Hunger => &mut self.hunger,
            Attribute::Social => &mut self.social,
            Attribute::Sleep => &mut self.sleep,
            Attribute::Health => &mut self.health,
            Attribute::Score => &mut self.score,
        }
    }

    /// Read an attribute, re-clamped to its range.
    #[must_use]
    pub fn get(&self, attr: Attribute) -> i32 {
        attr.clamp(self.slot(attr))
    }

    /// Write an attribute. Out-of-range values are clamped silently.
    pub fn set(&mut self, attr: Attribute, value: i32) {
        let clamped = attr.clamp(value);
        if clamped != value {
            debug!(attribute = %attr, requested = value, stored = clamped, "Attribute clamped");
        }
        *self.slot_mut(attr) = clamped;
    }

    /// Add `delta` to an attribute, clamping before and after the arithmetic.
    pub fn adjust(&mut self, attr: Attribute, delta: i32) {
        let current = self.get(attr);
        self.set(attr, current.saturating_add(delta));
    }

    /// Bring every attribute back into range.
    pub fn clamp_all(&mut self) {
        for attr in Attribute::ALL {
            let v = self.get(attr);
            *self.slot_mut(attr) = v;
        }
    }

    /// Current hunger.
    #[must_use]
    pub fn hunger(&self) -> i32 {
        self.get(Attribute::Hunger)
    }

    /// Current social.
    #[must_use]
    pub fn social(&self) -> i32 {
        self.get(Attribute::Social)
    }

    /// Current sleepiness.
    #[must_use]
    pub fn sleep(&self) -> i32 {
        self.get(Attribute::Sleep)
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> i32 {
        self.get(Attribute::Health)
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.get(Attribute::Score)
    }

    /// Derived mood: sad when hungry, lonely or tired.
    #[must_use]
    pub fn mood(&self) -> Mood {
        if self.hunger() > 60 || self.social() < 40 || self.sleep() > 60 {
            Mood::Sad
        } else {
            Mood::Happy
        }
    }

    /// Whether the needs are bad enough to cost health on a decay tick.
    #[must_use]
    pub fn needs_neglected(&self) -> bool {
        self.hunger() > 70 || self.social() < 30 || self.sleep() > 70
    }

    /// Whether health has run out.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.health() <= 0
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::fresh()
    }
}
