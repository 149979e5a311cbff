use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::Person;
use crate::resolve::Relations;

/// A person with resolved children, spouse and optional spouse lineage.
///
/// Spouses are plain records, never expanded. `spouse_ancestors` holds the spouse's upward
/// lineage: its root is the spouse's parent and every node's `children` are that person's own
/// parents, so walking it moves back in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyNode {
    #[serde(flatten)]
    pub person: Person,
    pub children: Vec<FamilyNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_ancestors: Option<Box<FamilyNode>>,
    /// Set on the leaf that closes a parent cycle; the person is expanded elsewhere.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// Deepest generation the builder expands, counted from the root (and, for spouse lineages,
/// upward from the spouse). Nodes at this depth keep their card but lose their children, so
/// every recursive pass over a built tree stays within a bounded stack.
pub const MAX_DEPTH: usize = 256;

impl FamilyNode {
    pub fn leaf(person: Person) -> Self {
        Self {
            person,
            children: Vec::new(),
            spouse: None,
            spouse_ancestors: None,
            truncated: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.person.id
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first pre-order walk over the primary nodes (lineages excluded).
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of primary nodes in this subtree.
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn find(&self, id: &str) -> Option<&FamilyNode> {
        self.walk().find(|node| node.id() == id)
    }
}

#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a FamilyNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a FamilyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Explicit root id; unknown ids fall back to automatic root selection.
    pub root: Option<String>,
    /// Attach each spouse's own parent lineage when it is not already part of the tree.
    pub spouse_ancestors: bool,
}

/// What the builder had to work around while building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub root_candidates: usize,
    pub reachable: usize,
    pub lineage_nodes: usize,
    pub truncated: usize,
    /// Nodes whose children (or older lineage) were cut at [`MAX_DEPTH`].
    pub depth_limited: usize,
    /// People that appear nowhere in the result (disconnected components).
    pub excluded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyTree {
    pub root: FamilyNode,
    pub report: BuildReport,
}

/// Picks the root: among people without a known parent, the lowest `generation`, first
/// encountered on ties. Without any such person (every parent link resolves, i.e. the parent
/// graph is cyclic) the lowest `generation` overall wins.
pub fn select_root<'a>(relations: &Relations<'a>) -> Option<&'a Person> {
    let candidates = relations.root_candidates();
    min_generation(candidates).or_else(|| min_generation(relations.people().iter()))
}

fn min_generation<'a>(people: impl Iterator<Item = &'a Person>) -> Option<&'a Person> {
    // `min_by_key` keeps the last of equal keys, so fold manually to keep the first.
    people.fold(None, |best: Option<&Person>, person| match best {
        Some(best) if best.generation <= person.generation => Some(best),
        _ => Some(person),
    })
}

/// Builds the tree rooted at the selected person. Returns `None` for empty input.
///
/// Malformed relationships never fail the build: cycles are cut with a truncated leaf,
/// orphaned spouse links were already dropped by the resolver, and people unreachable from
/// the root are left out.
pub fn build_tree(relations: &Relations<'_>, options: &TreeOptions) -> Option<FamilyTree> {
    let root_candidates = relations.root_candidates().count();
    let explicit = options.root.as_deref().and_then(|id| {
        let found = relations.person(id);
        if found.is_none() {
            tracing::warn!(root = %id, "requested root not found, selecting automatically");
        }
        found
    });
    let root_person = explicit.or_else(|| select_root(relations))?;
    if explicit.is_none() && root_candidates > 1 {
        tracing::debug!(
            candidates = root_candidates,
            root = %root_person.id,
            "multiple root candidates, picked lowest generation"
        );
    }

    let mut builder = Builder {
        relations,
        visited: FxHashSet::default(),
        truncated: 0,
        lineage_nodes: 0,
        depth_limited: 0,
    };
    let mut root = builder.build_node(root_person, 0);
    let reachable = builder.visited.len();
    if options.spouse_ancestors {
        // Spouse cards already drawn must not reappear as lineage nodes.
        let mut spouses = FxHashSet::default();
        collect_spouses(&root, &mut spouses);
        builder
            .visited
            .extend(spouses.iter().filter_map(|id| relations.person(id)).map(|p| p.id.as_str()));
        builder.attach_lineages(&mut root);
    }

    let mut shown: FxHashSet<&str> = builder.visited.clone();
    collect_spouses(&root, &mut shown);
    let excluded = relations
        .people()
        .iter()
        .filter(|p| !shown.contains(p.id.as_str()))
        .count();
    if excluded > 0 {
        tracing::debug!(excluded, "people unreachable from the root were left out");
    }

    let report = BuildReport {
        root_candidates,
        reachable,
        lineage_nodes: builder.lineage_nodes,
        truncated: builder.truncated,
        depth_limited: builder.depth_limited,
        excluded,
    };
    Some(FamilyTree { root, report })
}

struct Builder<'r, 'a> {
    relations: &'r Relations<'a>,
    visited: FxHashSet<&'a str>,
    truncated: usize,
    lineage_nodes: usize,
    depth_limited: usize,
}

impl<'a> Builder<'_, 'a> {
    fn build_node(&mut self, person: &'a Person, depth: usize) -> FamilyNode {
        if !self.visited.insert(person.id.as_str()) {
            tracing::debug!(person = %person.id, "parent cycle detected, truncating");
            self.truncated += 1;
            let mut leaf = FamilyNode::leaf(person.clone());
            leaf.truncated = true;
            return leaf;
        }

        let relations = self.relations;
        let below = relations.children_of(&person.id);
        if depth >= MAX_DEPTH && !below.is_empty() {
            tracing::warn!(person = %person.id, depth, "tree too deep, dropping descendants");
            self.depth_limited += 1;
        }
        let mut children: Vec<FamilyNode> = if depth < MAX_DEPTH {
            below.iter().map(|&child| self.build_node(child, depth + 1)).collect()
        } else {
            Vec::new()
        };
        sort_by_birth(&mut children);

        FamilyNode {
            person: person.clone(),
            children,
            spouse: relations.spouse_of(&person.id).cloned(),
            spouse_ancestors: None,
            truncated: false,
        }
    }

    fn attach_lineages(&mut self, node: &mut FamilyNode) {
        if !node.truncated {
            let parent = node
                .spouse
                .as_ref()
                .and_then(|spouse| self.relations.parent_of(spouse));
            if let Some(parent) = parent {
                node.spouse_ancestors = self.build_lineage(parent, 1).map(Box::new);
            }
        }
        for child in &mut node.children {
            self.attach_lineages(child);
        }
    }

    fn build_lineage(&mut self, person: &'a Person, up: usize) -> Option<FamilyNode> {
        if !self.visited.insert(person.id.as_str()) {
            return None;
        }
        self.lineage_nodes += 1;
        let parent = self.relations.parent_of(person);
        let older = match parent {
            Some(_) if up >= MAX_DEPTH => {
                tracing::warn!(person = %person.id, "spouse lineage too deep, cutting");
                self.depth_limited += 1;
                None
            }
            Some(parent) => self.build_lineage(parent, up + 1),
            None => None,
        };
        Some(FamilyNode {
            person: person.clone(),
            children: older.into_iter().collect(),
            spouse: self.relations.spouse_of(&person.id).cloned(),
            spouse_ancestors: None,
            truncated: false,
        })
    }
}

/// Birthdate ascending, undated (or unparseable) last; stable for ties.
pub fn sort_by_birth(children: &mut [FamilyNode]) {
    children.sort_by_key(|child| {
        let date = child.person.birth_date();
        (date.is_none(), date)
    });
}

fn collect_spouses<'t>(node: &'t FamilyNode, shown: &mut FxHashSet<&'t str>) {
    if let Some(spouse) = &node.spouse {
        shown.insert(spouse.id.as_str());
    }
    if let Some(lineage) = &node.spouse_ancestors {
        collect_spouses(lineage, shown);
    }
    for child in &node.children {
        collect_spouses(child, shown);
    }
}
