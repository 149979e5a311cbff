use std::fmt;

use indexmap::IndexMap;
use kindred_core::FamilyNode;
use serde::{Serialize, Serializer};

/// An HSL color, rendered as `hsl(h, s%, l%)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl BranchColor {
    const fn pastel(hue: u16) -> Self {
        Self {
            hue,
            saturation: 45,
            lightness: BASE_LIGHTNESS,
        }
    }

    fn with_lightness(self, lightness: u8) -> Self {
        Self { lightness, ..self }
    }
}

impl fmt::Display for BranchColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl Serialize for BranchColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const BASE_LIGHTNESS: u8 = 75;
const MAX_LIGHTNESS: u8 = 95;
const MIN_LIGHTNESS: u8 = 50;

/// Branch bases, assigned to the root's children in order and cycled.
pub const PALETTE: [BranchColor; 9] = [
    BranchColor::pastel(0),
    BranchColor::pastel(30),
    BranchColor::pastel(60),
    BranchColor::pastel(120),
    BranchColor::pastel(180),
    BranchColor::pastel(210),
    BranchColor::pastel(270),
    BranchColor::pastel(300),
    BranchColor::pastel(330),
];

/// Lightness `depth` generations below the branch origin: lighter, capped.
pub fn descendant_lightness(depth: usize) -> u8 {
    let step = depth.min(2) as u8 * 5;
    (BASE_LIGHTNESS + step).min(MAX_LIGHTNESS)
}

/// Lightness `generations_up` generations above the spouse a lineage hangs from: darker,
/// floored.
pub fn lineage_lightness(generations_up: usize) -> u8 {
    let darker = usize::from(BASE_LIGHTNESS).saturating_sub(generations_up.saturating_mul(10));
    darker.max(usize::from(MIN_LIGHTNESS)) as u8
}

pub type ColorMap = IndexMap<String, Option<BranchColor>>;

/// Maps every person shown in the tree (primary, spouse and lineage cards) to its branch
/// color. The root, its spouse and the root's spouse lineage are uncolored.
pub fn branch_colors(root: &FamilyNode) -> ColorMap {
    let mut map = ColorMap::new();
    set(&mut map, root.id(), None, true);
    if let Some(spouse) = &root.spouse {
        set(&mut map, &spouse.id, None, false);
    }
    if let Some(lineage) = root.spouse_ancestors.as_deref() {
        paint_lineage(&mut map, lineage, None, 1);
    }

    let branches = root.children.iter().filter(|child| !child.truncated);
    for (index, branch) in branches.enumerate() {
        paint_branch(&mut map, branch, PALETTE[index % PALETTE.len()], 0);
    }
    map
}

fn set(map: &mut ColorMap, id: &str, color: Option<BranchColor>, primary: bool) {
    if primary {
        map.insert(id.to_string(), color);
    } else {
        map.entry(id.to_string()).or_insert(color);
    }
}

fn paint_branch(map: &mut ColorMap, node: &FamilyNode, base: BranchColor, depth: usize) {
    if node.truncated {
        return;
    }
    let color = base.with_lightness(descendant_lightness(depth));
    set(map, node.id(), Some(color), true);
    if let Some(spouse) = &node.spouse {
        set(map, &spouse.id, Some(color), false);
    }
    if let Some(lineage) = node.spouse_ancestors.as_deref() {
        paint_lineage(map, lineage, Some(base), 1);
    }
    for child in &node.children {
        paint_branch(map, child, base, depth + 1);
    }
}

fn paint_lineage(map: &mut ColorMap, node: &FamilyNode, base: Option<BranchColor>, up: usize) {
    let color = base.map(|b| b.with_lightness(lineage_lightness(up)));
    set(map, node.id(), color, true);
    if let Some(spouse) = &node.spouse {
        set(map, &spouse.id, color, false);
    }
    for older in &node.children {
        paint_lineage(map, older, base, up + 1);
    }
}
