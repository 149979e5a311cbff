#![forbid(unsafe_code)]

//! `kindred` builds a rooted family tree from flat person records and lays it out as
//! generation columns, headless.
//!
//! ```no_run
//! use kindred::Engine;
//!
//! let engine = Engine::new();
//! let store = engine.load_sheet("id,name,parent_id\n1,Ada,\n2,Byron,1\n")?;
//! if let Some(chart) = engine.chart(&store)? {
//!     println!("{}", chart.to_svg());
//! }
//! # Ok::<(), kindred::Error>(())
//! ```

pub use kindred_core::{
    BuildReport, DataError, FamilyNode, FamilyTree, LoadPolicy, Person, PersonStore, Relations,
    MAX_DEPTH, TreeOptions, build_tree, parse_people_json, parse_sheet,
};
pub use kindred_core::Error as CoreError;
pub use kindred_layout::Error as LayoutError;
pub use kindred_layout::{
    BranchColor, ColorMap, FamilyLayout, LayoutConfig, LayoutEdge, PersonPosition,
    branch_colors, layout_family, render_svg,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] CoreError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a viewer needs to draw one family.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FamilyChart {
    pub tree: FamilyNode,
    pub layout: FamilyLayout,
    pub colors: ColorMap,
    pub report: BuildReport,
}

impl FamilyChart {
    pub fn to_svg(&self) -> String {
        render_svg(&self.tree, &self.layout, &self.colors)
    }
}

/// Runs the whole pipeline: records → store → relations → tree → layout and colors.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: TreeOptions,
    layout: LayoutConfig,
    policy: LoadPolicy,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_layout_config(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn load_policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Parses sheet text (header row plus records) into a store under the engine's policy.
    pub fn load_sheet(&self, text: &str) -> Result<PersonStore> {
        let records = parse_sheet(text)?;
        Ok(PersonStore::load(records, self.policy)?)
    }

    /// Parses a JSON array of person records into a store under the engine's policy.
    pub fn load_json(&self, text: &str) -> Result<PersonStore> {
        let records = parse_people_json(text)?;
        Ok(PersonStore::load(records, self.policy)?)
    }

    /// Builds the tree only. `Ok(None)` means there is nobody to show.
    pub fn tree(&self, store: &PersonStore) -> Result<Option<FamilyTree>> {
        Ok(kindred_core::build_from_store(store, &self.options)?)
    }

    /// Builds, lays out and colors the family. `Ok(None)` means there is nobody to show.
    pub fn chart(&self, store: &PersonStore) -> Result<Option<FamilyChart>> {
        let Some(FamilyTree { root, report }) = self.tree(store)? else {
            return Ok(None);
        };
        let layout = layout_family(&root, &self.layout)?;
        let colors = branch_colors(&root);
        tracing::debug!(
            people = store.len(),
            reachable = report.reachable,
            excluded = report.excluded,
            truncated = report.truncated,
            "family chart built"
        );
        Ok(Some(FamilyChart {
            tree: root,
            layout,
            colors,
            report,
        }))
    }
}
