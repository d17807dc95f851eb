//! Items and the pet's inventory.
//!
//! Items are a closed set of kinds; each kind has one fixed effect applied
//! through [`apply_effect`]. The inventory is an ordered list with no
//! uniqueness constraint: two Meats are two entries.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attributes::{Attribute, Attributes};

/// Kind of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Filling food.
    Meat,
    /// Moderate food.
    Vegetables,
    /// Light refreshment.
    Juice,
    /// A present; cheers the pet up.
    Gift,
}

/// Fixed attribute deltas of one item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemEffect {
    /// Added to hunger (negative feeds).
    pub hunger: i32,
    /// Added to health.
    pub health: i32,
    /// Added to social.
    pub social: i32,
}

impl ItemKind {
    /// Kinds the background generator draws from, uniformly.
    pub const GENERATED: [Self; 4] = [Self::Meat, Self::Vegetables, Self::Juice, Self::Gift];

    /// The effect table.
    #[must_use]
    pub const fn effect(self) -> ItemEffect {
        match self {
            Self::Meat => ItemEffect {
                hunger: -20,
                health: 5,
                social: 0,
            },
            Self::Vegetables => ItemEffect {
                hunger: -15,
                health: 3,
                social: 0,
            },
            Self::Juice => ItemEffect {
                hunger: -5,
                health: 1,
                social: 0,
            },
            Self::Gift => ItemEffect {
                hunger: 0,
                health: 0,
                social: 21,
            },
        }
    }

    /// Whether this kind is food.
    #[must_use]
    pub fn is_food(self) -> bool {
        !matches!(self, Self::Gift)
    }

    /// Default display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Meat => "Meat",
            Self::Vegetables => "Vegetables",
            Self::Juice => "Juice",
            Self::Gift => "Gift",
        }
    }

    /// Pick a generated kind uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::GENERATED[rng.gen_range(0..Self::GENERATED.len())]
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One inventory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name.
    pub name: String,
    /// What the item does.
    pub kind: ItemKind,
}

impl Item {
    /// An item with its kind's default name.
    #[must_use]
    pub fn new(kind: ItemKind) -> Self {
        Self {
            name: kind.name().to_string(),
            kind,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Apply an item kind's fixed effect to a set of attributes.
pub fn apply_effect(attrs: &mut Attributes, kind: ItemKind) {
    let effect = kind.effect();
    attrs.adjust(Attribute::Hunger, effect.hunger);
    attrs.adjust(Attribute::Health, effect.health);
    attrs.adjust(Attribute::Social, effect.social);
}

/// Ordered collection of items owned by one pet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Borrow the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Remove and return the item at `index`.
    pub fn take(&mut self, index: usize) -> Option<Item> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// All items, oldest first.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the inventory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count items of one kind.
    #[must_use]
    pub fn count(&self, kind: ItemKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn take_removes_exactly_one() {
        let mut inv = Inventory::new();
        inv.push(Item::new(ItemKind::Meat));
        inv.push(Item::new(ItemKind::Meat));
        inv.push(Item::new(ItemKind::Juice));

        let taken = inv.take(0).expect("item");
        assert_eq!(taken.kind, ItemKind::Meat);
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.count(ItemKind::Meat), 1);
        assert!(inv.take(5).is_none());
        assert_eq!(inv.len(), 2);
    }

    #[test]
    fn meat_feeds_more_than_juice() {
        let mut a = Attributes::fresh();
        a.set(Attribute::Hunger, 50);
        a.set(Attribute::Health, 50);
        let mut b = a;

        apply_effect(&mut a, ItemKind::Meat);
        apply_effect(&mut b, ItemKind::Juice);

        assert_eq!(a.hunger(), 30);
        assert_eq!(a.health(), 55);
        assert_eq!(b.hunger(), 45);
        assert_eq!(b.health(), 51);
    }

    #[test]
    fn gift_raises_social_clamped() {
        let mut a = Attributes::fresh();
        apply_effect(&mut a, ItemKind::Gift);
        assert_eq!(a.social(), 100);
        assert_eq!(a.hunger(), 20);
    }

    #[test]
    fn random_covers_every_kind() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(ItemKind::random(&mut rng));
        }
        assert_eq!(seen.len(), ItemKind::GENERATED.len());
    }
}
