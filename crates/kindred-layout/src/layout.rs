//! Generation-column tree layout.
//!
//! Columns are a pure function of depth (`x = depth * column_spacing`). Vertically, children
//! are stacked first and each parent is centred on the span of its children's subtrees. A
//! parent block taller than its children can poke out above the cursor it was given; the
//! caller then shifts that whole subtree down. Every subtree owns a contiguous range of the
//! card buffer, so the shift is a slice update.

use indexmap::IndexMap;
use kindred_core::FamilyNode;

use crate::config::LayoutConfig;
use crate::model::{
    Bounds, CardSlot, EdgeKind, FamilyLayout, LayoutEdge, LayoutPoint, PersonPosition,
};
use crate::Result;

#[derive(Debug, Clone, Copy)]
struct Card<'t> {
    id: &'t str,
    slot: CardSlot,
    column: usize,
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Copy)]
struct PendingEdge {
    from: usize,
    to: usize,
    kind: EdgeKind,
}

/// Vertical extent of a placed subtree.
#[derive(Debug, Clone, Copy)]
struct Span {
    min: f64,
    max: f64,
    /// Space the next sibling must leave below `max`.
    reserve: f64,
    /// Index of the subtree root's primary card.
    card: usize,
}

impl Span {
    fn shifted(self, dy: f64) -> Self {
        Self {
            min: self.min + dy,
            max: self.max + dy,
            ..self
        }
    }
}

struct Placer<'t, 'c> {
    config: &'c LayoutConfig,
    cards: Vec<Card<'t>>,
    edges: Vec<PendingEdge>,
}

/// Children that get their own cards; cycle-closing leaves point at a person placed
/// elsewhere and are skipped.
fn placed_children(node: &FamilyNode) -> impl Iterator<Item = &FamilyNode> {
    node.children.iter().filter(|child| !child.truncated)
}

impl<'t> Placer<'t, '_> {
    fn x_for(&self, column: usize) -> f64 {
        column as f64 * self.config.column_spacing
    }

    fn push(&mut self, id: &'t str, slot: CardSlot, column: usize, y: f64) -> usize {
        let x = self.x_for(column);
        self.cards.push(Card {
            id,
            slot,
            column,
            x,
            y,
        });
        self.cards.len() - 1
    }

    fn shift(&mut self, first: usize, dy: f64) {
        for card in &mut self.cards[first..] {
            card.y += dy;
        }
    }

    /// Height of a lineage stack: each lineage node (and its spouse) followed by its own
    /// parents, separated by the sibling gap.
    fn stack_height(&self, node: &FamilyNode) -> f64 {
        let h = self.config.card_height;
        let own = if node.spouse.is_some() { 2.0 * h } else { h };
        node.children
            .iter()
            .map(|older| self.config.sibling_gap + self.stack_height(older))
            .fold(own, |acc, extra| acc + extra)
    }

    /// Height of a node's own block: card, spouse card, and the spouse lineage.
    fn block_height(&self, node: &FamilyNode) -> f64 {
        let h = self.config.card_height;
        let mut height = h;
        if node.spouse.is_some() {
            height += h;
        }
        if let Some(lineage) = node.spouse_ancestors.as_deref() {
            height += self.config.row_spacing + self.stack_height(lineage);
        }
        height
    }

    /// Places the node card at `y`, its spouse directly beneath, then its lineage.
    fn place_block(&mut self, node: &'t FamilyNode, column: usize, y: f64) -> usize {
        let h = self.config.card_height;
        let card = self.push(node.id(), CardSlot::Primary, column, y);
        let Some(spouse) = node.spouse.as_ref() else {
            return card;
        };
        let spouse_card = self.push(&spouse.id, CardSlot::Spouse, column, y + h);
        if let Some(lineage) = node.spouse_ancestors.as_deref() {
            let top = y + 2.0 * h + self.config.row_spacing;
            let (lineage_card, _) = self.place_stack(lineage, column, top);
            self.edges.push(PendingEdge {
                from: lineage_card,
                to: spouse_card,
                kind: EdgeKind::Lineage,
            });
        }
        card
    }

    /// Stacked placement for lineage nodes: returns the node's card and the stack bottom.
    fn place_stack(&mut self, node: &'t FamilyNode, column: usize, y: f64) -> (usize, f64) {
        let h = self.config.card_height;
        let card = self.push(node.id(), CardSlot::Primary, column, y);
        let mut bottom = y + h;
        if let Some(spouse) = node.spouse.as_ref() {
            self.push(&spouse.id, CardSlot::Spouse, column, bottom);
            bottom += h;
        }
        for older in &node.children {
            let (older_card, older_bottom) =
                self.place_stack(older, column, bottom + self.config.sibling_gap);
            self.edges.push(PendingEdge {
                from: older_card,
                to: card,
                kind: EdgeKind::Lineage,
            });
            bottom = older_bottom;
        }
        (card, bottom)
    }

    fn place(&mut self, node: &'t FamilyNode, column: usize, start_y: f64) -> Span {
        let own_height = self.block_height(node);
        let child_count = placed_children(node).count();
        if child_count == 0 {
            let card = self.place_block(node, column, start_y);
            return Span {
                min: start_y,
                max: start_y + own_height,
                reserve: 0.0,
                card,
            };
        }

        let mut cursor = start_y;
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        let mut child_cards = Vec::with_capacity(child_count);
        for (idx, child) in placed_children(node).enumerate() {
            let first = self.cards.len();
            let mut span = self.place(child, column + 1, cursor);
            if span.min < cursor {
                let dy = cursor - span.min;
                self.shift(first, dy);
                span = span.shifted(dy);
            }
            lo = lo.min(span.min);
            hi = hi.max(span.max);
            child_cards.push(span.card);
            if idx + 1 < child_count {
                cursor = span.max + self.config.sibling_gap.max(span.reserve);
            }
        }

        let y = (lo + hi) / 2.0 - own_height / 2.0;
        let card = self.place_block(node, column, y);
        for child_card in child_cards {
            self.edges.push(PendingEdge {
                from: card,
                to: child_card,
                kind: EdgeKind::Parent,
            });
        }
        Span {
            min: lo.min(y),
            max: hi.max(y + own_height),
            reserve: self.config.group_gap(),
            card,
        }
    }
}

/// Groups primary nodes by drawn column in one top-down pass. Lineage nodes share the column
/// of the node whose spouse they belong to.
fn bucket_generations<'t>(root: &'t FamilyNode) -> Vec<Vec<&'t str>> {
    fn visit<'t>(node: &'t FamilyNode, depth: usize, out: &mut Vec<Vec<&'t str>>) {
        if out.len() <= depth {
            out.resize_with(depth + 1, Vec::new);
        }
        out[depth].push(node.id());
        let mut lineage = node.spouse_ancestors.as_deref().map(|l| vec![l]);
        while let Some(level) = lineage.take().filter(|l| !l.is_empty()) {
            out[depth].extend(level.iter().map(|&n| n.id()));
            lineage = Some(level.iter().flat_map(|&n| n.children.iter()).collect());
        }
        for child in placed_children(node) {
            visit(child, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    visit(root, 0, &mut out);
    out
}

fn extents<'a>(cards: impl Iterator<Item = &'a (f64, f64)>, w: f64, h: f64) -> [f64; 4] {
    let mut b = [
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    ];
    for &(x, y) in cards {
        b[0] = b[0].min(x);
        b[1] = b[1].min(y);
        b[2] = b[2].max(x + w);
        b[3] = b[3].max(y + h);
    }
    b
}

/// Lays out a family tree. Deterministic for a given tree and config.
pub fn layout_family(root: &FamilyNode, config: &LayoutConfig) -> Result<FamilyLayout> {
    config.validate()?;

    let mut placer = Placer {
        config,
        cards: Vec::new(),
        edges: Vec::new(),
    };
    placer.place(root, 0, 0.0);
    let Placer {
        mut cards, edges, ..
    } = placer;

    let (w, h) = (config.card_width, config.card_height);
    let coords: Vec<(f64, f64)> = cards.iter().map(|c| (c.x, c.y)).collect();
    let [min_x, min_y, max_x, max_y] = extents(coords.iter(), w, h);
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    for card in &mut cards {
        card.x -= cx;
        card.y -= cy;
    }
    let coords: Vec<(f64, f64)> = cards.iter().map(|c| (c.x, c.y)).collect();
    let [min_x, min_y, max_x, max_y] = extents(coords.iter(), w, h);
    let bounds = Bounds {
        min_x,
        min_y,
        max_x,
        max_y,
        width: max_x - min_x + config.column_spacing,
        height: max_y - min_y + config.row_spacing,
    };

    let mut positions = IndexMap::new();
    let mut spouse_positions = IndexMap::new();
    let mut column_of: IndexMap<&str, (usize, f64)> = IndexMap::new();
    for card in &cards {
        let pos = PersonPosition {
            id: card.id.to_string(),
            x: card.x,
            y: card.y,
            width: w,
            height: h,
        };
        match card.slot {
            CardSlot::Primary => {
                column_of.insert(card.id, (card.column, card.y));
                positions.insert(pos.id.clone(), pos);
            }
            CardSlot::Spouse => {
                spouse_positions.insert(pos.id.clone(), pos);
            }
        }
    }

    let center = |card: &Card<'_>| LayoutPoint {
        x: card.x + w / 2.0,
        y: card.y + h / 2.0,
    };
    let edges = edges
        .iter()
        .map(|e| {
            let (from, to) = (&cards[e.from], &cards[e.to]);
            LayoutEdge {
                from: from.id.to_string(),
                from_slot: from.slot,
                to: to.id.to_string(),
                to_slot: to.slot,
                kind: e.kind,
                points: vec![center(from), center(to)],
            }
        })
        .collect();

    let mut generations = bucket_generations(root);
    for bucket in &mut generations {
        bucket.sort_by(|a, b| {
            let ya = column_of.get(a).map_or(0.0, |&(_, y)| y);
            let yb = column_of.get(b).map_or(0.0, |&(_, y)| y);
            ya.total_cmp(&yb)
        });
    }
    debug_assert!(
        generations
            .iter()
            .enumerate()
            .all(|(depth, ids)| ids.iter().all(|id| column_of.get(id).map(|c| c.0) == Some(depth))),
        "generation buckets must match drawn columns"
    );
    let generations = generations
        .into_iter()
        .map(|bucket| bucket.into_iter().map(str::to_string).collect())
        .collect();

    let layout = FamilyLayout {
        generations,
        positions,
        spouse_positions,
        edges,
        bounds,
    };
    debug_assert_eq!(layout.check_no_overlap(), Ok(()));
    tracing::debug!(
        cards = layout.card_count(),
        columns = layout.generations.len(),
        width = layout.bounds.width,
        height = layout.bounds.height,
        "family layout computed"
    );
    Ok(layout)
}
