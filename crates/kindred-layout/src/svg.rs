//! Minimal standalone SVG preview of a laid-out family.

use std::fmt::Write as _;

use kindred_core::FamilyNode;
use rustc_hash::FxHashMap;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::colors::ColorMap;
use crate::model::{CardSlot, FamilyLayout, PersonPosition};

const FONT_SIZE: f64 = 13.0;
/// Rough advance of one display column at `FONT_SIZE`.
const COLUMN_ADVANCE: f64 = 7.5;
const TEXT_PADDING: f64 = 8.0;
const UNCOLORED_FILL: &str = "#f1f5f9";
const EDGE_STROKE: &str = "#94a3b8";

fn escape_xml_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

/// Number formatting for attributes: at most three decimals, trailing zeros trimmed.
fn fmt(v: f64) -> String {
    if !v.is_finite() || v.abs() < 1e-9 {
        return "0".to_string();
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Truncates `name` to `max_columns` display columns, ending in an ellipsis when shortened.
pub fn truncate_to_width(name: &str, max_columns: usize) -> String {
    if name.width() <= max_columns {
        return name.to_string();
    }
    let budget = max_columns.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in name.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

fn collect_names<'t>(node: &'t FamilyNode, names: &mut FxHashMap<&'t str, &'t str>) {
    names.insert(node.id(), node.person.name.as_str());
    if let Some(spouse) = &node.spouse {
        names.insert(spouse.id.as_str(), spouse.name.as_str());
    }
    if let Some(lineage) = node.spouse_ancestors.as_deref() {
        collect_names(lineage, names);
    }
    for child in &node.children {
        if !child.truncated {
            collect_names(child, names);
        }
    }
}

fn write_card(
    out: &mut String,
    pos: &PersonPosition,
    slot: CardSlot,
    name: &str,
    colors: &ColorMap,
) {
    let fill = colors
        .get(&pos.id)
        .copied()
        .flatten()
        .map(|c| c.to_string())
        .unwrap_or_else(|| UNCOLORED_FILL.to_string());
    let class = match slot {
        CardSlot::Primary => "person",
        CardSlot::Spouse => "person spouse",
    };
    let max_columns = ((pos.width - 2.0 * TEXT_PADDING) / COLUMN_ADVANCE).floor().max(1.0) as usize;
    let label = truncate_to_width(name, max_columns);
    let _ = write!(
        out,
        r##"<g class="{class}" data-id="{id}"><rect x="{x}" y="{y}" width="{w}" height="{h}" rx="8" ry="8" fill="{fill}" stroke="#475569"/><text x="{tx}" y="{ty}" text-anchor="middle" dominant-baseline="middle" font-size="{fs}">{label}</text></g>"##,
        id = escape_xml(&pos.id),
        x = fmt(pos.x),
        y = fmt(pos.y),
        w = fmt(pos.width),
        h = fmt(pos.height),
        tx = fmt(pos.x + pos.width / 2.0),
        ty = fmt(pos.y + pos.height / 2.0),
        fs = fmt(FONT_SIZE),
        label = escape_xml(&label),
    );
}

/// Renders the layout as an SVG document. Cards are filled with their branch color; edges
/// are cubic curves between card centres.
pub fn render_svg(root: &FamilyNode, layout: &FamilyLayout, colors: &ColorMap) -> String {
    let mut names = FxHashMap::default();
    collect_names(root, &mut names);

    let b = &layout.bounds;
    let (pad_x, pad_y) = (
        (b.width - (b.max_x - b.min_x)) / 2.0,
        (b.height - (b.max_y - b.min_y)) / 2.0,
    );
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
        fmt(b.min_x - pad_x),
        fmt(b.min_y - pad_y),
        fmt(b.width),
        fmt(b.height),
        fmt(b.width),
        fmt(b.height),
    );

    out.push_str(r#"<g class="edges">"#);
    for edge in &layout.edges {
        let [p, c] = match edge.points.as_slice() {
            [p, c] => [*p, *c],
            _ => continue,
        };
        let mid = (p.x + c.x) / 2.0;
        let _ = write!(
            out,
            r#"<path d="M {px} {py} C {mid} {py}, {mid} {cy}, {cx} {cy}" fill="none" stroke="{EDGE_STROKE}" stroke-width="2" opacity="0.6"/>"#,
            px = fmt(p.x),
            py = fmt(p.y),
            mid = fmt(mid),
            cx = fmt(c.x),
            cy = fmt(c.y),
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="cards">"#);
    for (slot, pos) in layout.cards() {
        let name = names.get(pos.id.as_str()).copied().unwrap_or(pos.id.as_str());
        write_card(&mut out, pos, slot, name, colors);
    }
    out.push_str("</g></svg>\n");
    out
}
