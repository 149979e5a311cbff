use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

/// One card, top-left anchored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonPosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PersonPosition {
    pub fn center(&self) -> LayoutPoint {
        LayoutPoint {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Strict intersection: cards that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &PersonPosition) -> bool {
        const EPS: f64 = 1e-9;
        self.x + EPS < other.x + other.width
            && other.x + EPS < self.x + self.width
            && self.y + EPS < other.y + other.height
            && other.y + EPS < self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// Content width padded by one column spacing.
    pub width: f64,
    /// Content height padded by one row spacing.
    pub height: f64,
}

impl Bounds {
    pub fn center(&self) -> LayoutPoint {
        LayoutPoint {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }
}

/// Which card of a person an edge endpoint refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardSlot {
    Primary,
    Spouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// Parent card to child card.
    Parent,
    /// Spouse-ancestor lineage: lineage root to the spouse card, then each lineage node to its
    /// own parents.
    Lineage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub from: String,
    pub from_slot: CardSlot,
    pub to: String,
    pub to_slot: CardSlot,
    pub kind: EdgeKind,
    /// Card centres; curve shaping is left to the renderer.
    pub points: Vec<LayoutPoint>,
}

/// Result of one layout pass. Immutable; recompute it when the tree changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyLayout {
    /// Node ids per drawn column, each ordered top to bottom.
    pub generations: Vec<Vec<String>>,
    pub positions: IndexMap<String, PersonPosition>,
    /// Spouse cards keyed by the spouse's id.
    pub spouse_positions: IndexMap<String, PersonPosition>,
    pub edges: Vec<LayoutEdge>,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("layout invariant violated: card {first} overlaps card {second}")]
pub struct LayoutInvariantViolation {
    pub first: String,
    pub second: String,
}

impl FamilyLayout {
    /// Every card, primary cards first.
    pub fn cards(&self) -> impl Iterator<Item = (CardSlot, &PersonPosition)> {
        self.positions
            .values()
            .map(|p| (CardSlot::Primary, p))
            .chain(self.spouse_positions.values().map(|p| (CardSlot::Spouse, p)))
    }

    pub fn card_count(&self) -> usize {
        self.positions.len() + self.spouse_positions.len()
    }

    pub fn position_of(&self, id: &str, slot: CardSlot) -> Option<&PersonPosition> {
        match slot {
            CardSlot::Primary => self.positions.get(id),
            CardSlot::Spouse => self.spouse_positions.get(id),
        }
    }

    /// Verifies that no two cards intersect.
    pub fn check_no_overlap(&self) -> Result<(), LayoutInvariantViolation> {
        let mut cards: Vec<(CardSlot, &PersonPosition)> = self.cards().collect();
        cards.sort_by(|a, b| a.1.y.total_cmp(&b.1.y));
        for (i, (slot_a, a)) in cards.iter().enumerate() {
            for (slot_b, b) in &cards[i + 1..] {
                if b.y >= a.y + a.height {
                    break;
                }
                if a.overlaps(b) {
                    return Err(LayoutInvariantViolation {
                        first: card_label(&a.id, *slot_a),
                        second: card_label(&b.id, *slot_b),
                    });
                }
            }
        }
        Ok(())
    }
}

fn card_label(id: &str, slot: CardSlot) -> String {
    match slot {
        CardSlot::Primary => id.to_string(),
        CardSlot::Spouse => format!("{id} (spouse)"),
    }
}
