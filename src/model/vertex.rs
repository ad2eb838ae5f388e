//! Vertex module for phylogenetic tree representation.

use crate::model::support::Support;
use crate::model::tree::VertexIndex;
use std::ops::Deref;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a phylogenetic tree.
///
/// Trees produced by tree inference tools are frequently multifurcating
/// (e.g. an unrooted trifurcating root) and get rerooted on an outgroup, so a
/// vertex is a single record whose role follows from its links:
/// - **Root**: no parent
/// - **Leaf**: no children, carries the taxon identifier as `name`
/// - **Internal**: parent and at least one child
///
/// # Invariants
/// - `index` is the position of this vertex in the tree arena
/// - `branch_length` is non-negative if set
/// - `multi_support`, once set, has one entry per merged tree
#[derive(PartialEq, Debug, Clone)]
pub struct Vertex {
    /// Index of this vertex in the tree arena
    index: VertexIndex,
    /// Index of the parent vertex, `None` for the root
    parent: Option<VertexIndex>,
    /// Indices of the child vertices in their original order
    children: Vec<VertexIndex>,
    /// Leaf identifier, or name of an internal vertex
    name: Option<String>,
    /// Distance to parent (optional, non-negative if present)
    branch_length: Option<BranchLength>,
    /// Support of the clade below this vertex
    support: Option<f64>,
    /// Supports of this clade across merged trees, base tree first
    multi_support: Option<Vec<Support>>,
}

impl Vertex {
    /// Creates a new leaf vertex.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `name` - Identifier of the taxon
    /// * `branch_length` - Distance to parent node
    pub fn new_leaf(index: VertexIndex, name: String, branch_length: Option<BranchLength>) -> Self {
        Vertex {
            index,
            parent: None,
            children: Vec::new(),
            name: Some(name),
            branch_length,
            support: None,
            multi_support: None,
        }
    }

    /// Creates a new inner vertex with the given children.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `children` - Child indices in order
    /// * `branch_length` - Distance to parent node
    pub fn new_inner(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
    ) -> Self {
        Vertex {
            index,
            parent: None,
            children,
            name: None,
            branch_length,
            support: None,
            multi_support: None,
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: VertexIndex) {
        self.index = index;
    }

    /// Returns the index of the parent, `None` for the root.
    pub fn parent(&self) -> Option<VertexIndex> {
        self.parent
    }

    /// Returns `true` if this vertex has a parent set.
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<VertexIndex>) {
        self.parent = parent;
    }

    /// Returns the child indices in order.
    pub fn children(&self) -> &[VertexIndex] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<VertexIndex> {
        &mut self.children
    }

    /// Returns `true` if this vertex has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this vertex has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns `true` if this vertex is neither root nor leaf.
    pub fn is_internal(&self) -> bool {
        !self.is_root() && !self.is_leaf()
    }

    /// Returns the name, i.e. the taxon identifier for leaves.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Returns the branch length to the parent, if set.
    pub fn branch_length(&self) -> Option<BranchLength> {
        self.branch_length
    }

    /// Returns whether this vertex has a [BranchLength].
    pub fn has_branch_length(&self) -> bool {
        self.branch_length.is_some()
    }

    /// Sets the branch length to the parent.
    pub fn set_branch_length(&mut self, branch_length: Option<BranchLength>) {
        self.branch_length = branch_length;
    }

    /// Returns the support value of the clade below this vertex, if set.
    pub fn support(&self) -> Option<f64> {
        self.support
    }

    /// Sets the support value.
    pub fn set_support(&mut self, support: Option<f64>) {
        self.support = support;
    }

    /// Returns the merged supports, base tree first, if this vertex was merged.
    pub fn multi_support(&self) -> Option<&[Support]> {
        self.multi_support.as_deref()
    }

    /// Sets the merged supports.
    pub fn set_multi_support(&mut self, multi_support: Option<Vec<Support>>) {
        self.multi_support = multi_support;
    }

    /// Moves all edge attributes (length, supports) out of this vertex.
    pub(crate) fn take_edge(&mut self) -> EdgeData {
        EdgeData {
            branch_length: self.branch_length.take(),
            support: self.support.take(),
            multi_support: self.multi_support.take(),
        }
    }

    /// Places edge attributes onto this vertex.
    pub(crate) fn put_edge(&mut self, edge: EdgeData) {
        self.branch_length = edge.branch_length;
        self.support = edge.support;
        self.multi_support = edge.multi_support;
    }
}

/// Attributes of the edge from a vertex to its parent.
///
/// Support values belong to the edge, so they travel with it when a tree is
/// rerooted.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct EdgeData {
    pub(crate) branch_length: Option<BranchLength>,
    pub(crate) support: Option<f64>,
    pub(crate) multi_support: Option<Vec<Support>>,
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced non-negative.
///
/// Represents the evolutionary distance between a vertex and its parent.
/// The value is guaranteed to be non-negative and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Arguments
    /// * `length` - The branch length value (must be non-negative)
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn new(length: f64) -> Self {
        assert!(
            length >= 0.0,
            "Branch length must be non-negative, got {}",
            length
        );
        assert!(
            length.is_finite(),
            "Branch length must be finite, got {}",
            length
        );
        BranchLength(length)
    }

    /// Creates a new branch length, or `None` if `length` is negative or not finite.
    pub fn try_new(length: f64) -> Option<Self> {
        (length >= 0.0 && length.is_finite()).then_some(BranchLength(length))
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}
