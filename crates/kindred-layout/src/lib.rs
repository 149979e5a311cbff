#![forbid(unsafe_code)]

//! Headless layout for family trees built by `kindred-core`.
//!
//! [`layout_family`] turns a [`FamilyNode`](kindred_core::FamilyNode) tree into card positions,
//! generation buckets and connection edges; [`branch_colors`] assigns presentation colors per
//! branch; [`render_svg`] draws a quick preview.

pub mod colors;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod svg;

pub use colors::{BranchColor, ColorMap, PALETTE, branch_colors};
pub use config::LayoutConfig;
pub use error::{Error, Result};
pub use layout::layout_family;
pub use model::{
    Bounds, CardSlot, EdgeKind, FamilyLayout, LayoutEdge, LayoutInvariantViolation, LayoutPoint,
    PersonPosition,
};
pub use svg::render_svg;
