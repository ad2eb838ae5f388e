//! Provides the phylogenetic tree representation.
//!
//! Provides core data structures for representing phylogenetic trees:
//! * [PhyloTree] - Main tree structure using the arena pattern,
//!   multifurcating, with rerooting for outgroup placement
//! * [VertexIndex] as type used to index vertices in tree
//! * [PreOrderIter] and [PostOrderIter] for stack-based traversal

use crate::model::vertex::{BranchLength, EdgeData, Vertex};
use crate::newick;
use crate::newick::NewickStyle;
use std::collections::HashSet;
use std::fmt::Write;

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A phylogenetic tree represented using the arena pattern on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by
/// [VertexIndex]. Aim is to avoid referencing troubles as well as to provide
/// efficient memory layout and cache locality for traversal operations.
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena.
/// - Index of root is maintained.
/// - Vertices may have any number of children; tree inference tools emit
///   an unrooted tree as a root with three children.
/// - Leaves carry the taxon identifier as name.
/// - Branch lengths are optional, but if provided must be non-negative.
///
/// # Construction
/// Add vertices bottom-up with [add_leaf](Self::add_leaf) and
/// [add_inner](Self::add_inner), then declare the root with
/// [set_root](Self::set_root). Test validity with [`PhyloTree::is_valid()`].
#[derive(Debug, Clone)]
pub struct PhyloTree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,

    /// Name of tree, e.g. the file it was read from
    name: Option<String>,
}

impl Default for PhyloTree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl PhyloTree {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty tree with room for `num_vertices` vertices.
    pub fn with_capacity(num_vertices: usize) -> Self {
        PhyloTree {
            vertices: Vec::with_capacity(num_vertices),
            root_index: NO_ROOT_SET_INDEX,
            name: None,
        }
    }

    /// Attaches a name to this tree.
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Adds a leaf to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `name` - Identifier of the taxon at this leaf
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent
    ///
    /// # Returns
    /// The index of the newly created leaf vertex.
    pub fn add_leaf(&mut self, name: String, branch_length: Option<BranchLength>) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices
            .push(Vertex::new_leaf(index, name, branch_length));
        index
    }

    /// Adds an inner vertex above `children`, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `children` - Child indices, in order
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent
    ///
    /// # Returns
    /// The index of the newly created vertex.
    pub fn add_inner(
        &mut self,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self.vertices[child].set_parent(Some(index));
        }
        self.vertices
            .push(Vertex::new_inner(index, children, branch_length));
        index
    }

    /// Declares the vertex at `index` as root.
    pub fn set_root(&mut self, index: VertexIndex) {
        self.vertices[index].set_parent(None);
        self.root_index = index;
    }

    /// Returns reference to name of this tree, or `None` if not set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set a name for this tree.
    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus tree hasn't been fully constructed yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns whether this tree is rooted, i.e. the root has exactly two children.
    pub fn is_rooted(&self) -> bool {
        self.is_root_set() && self.root().children().len() == 2
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns a mutable reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex_mut(&mut self, index: VertexIndex) -> &mut Vertex {
        &mut self.vertices[index]
    }

    /// Returns all vertices in arena order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_leaf()).count()
    }

    /// Returns the number of internal vertices in this tree.
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_internal()).count()
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the sum of all branch lengths in the tree.
    pub fn total_branch_length(&self) -> f64 {
        self.vertices
            .iter()
            .filter_map(|v| v.branch_length())
            .map(|bl| *bl)
            .sum::<f64>()
    }

    /// Checks if all non-root vertices have branch lengths set.
    pub fn vertices_have_branch_lengths(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.is_root() || v.has_branch_length())
    }

    /// Convenience method to convert this tree to a Newick string
    pub fn to_newick(&self, style: NewickStyle) -> String {
        newick::to_newick(self, style)
    }
}

impl std::ops::Index<VertexIndex> for PhyloTree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

impl std::ops::IndexMut<VertexIndex> for PhyloTree {
    fn index_mut(&mut self, index: VertexIndex) -> &mut Self::Output {
        &mut self.vertices[index]
    }
}

// ============================================================================
// Leaves, Clades, Ancestry (pub)
// ============================================================================
impl PhyloTree {
    /// Returns the indices of all leaves in pre-order.
    pub fn leaf_indices(&self) -> Vec<VertexIndex> {
        self.pre_order_iter()
            .filter(|v| v.is_leaf())
            .map(|v| v.index())
            .collect()
    }

    /// Returns the names of all leaves in pre-order.
    pub fn leaf_names(&self) -> Vec<&str> {
        self.pre_order_iter()
            .filter(|v| v.is_leaf())
            .filter_map(|v| v.name())
            .collect()
    }

    /// Returns the index of the leaf named `name`.
    pub fn find_leaf(&self, name: &str) -> Option<VertexIndex> {
        self.vertices
            .iter()
            .find(|v| v.is_leaf() && v.name() == Some(name))
            .map(|v| v.index())
    }

    /// Returns the names of the leaves below `index` (inclusive) in pre-order.
    pub fn leaf_names_below(&self, index: VertexIndex) -> Vec<&str> {
        self.subtree_iter(index)
            .filter(|v| v.is_leaf())
            .filter_map(|v| v.name())
            .collect()
    }

    /// Computes for every vertex the sorted names of the leaves below it.
    ///
    /// # Returns
    /// Vector indexed by [VertexIndex]; sets are compared by equality, so the
    /// sorted representation makes the order of children irrelevant.
    pub fn clades(&self) -> Vec<Vec<&str>> {
        let mut clades: Vec<Vec<&str>> = vec![Vec::new(); self.num_vertices()];
        for vertex in self.post_order_iter() {
            let index = vertex.index();
            if vertex.is_leaf() {
                if let Some(name) = vertex.name() {
                    clades[index].push(name);
                }
            } else {
                let mut clade: Vec<&str> = vertex
                    .children()
                    .iter()
                    .flat_map(|&c| clades[c].iter().copied())
                    .collect();
                clade.sort_unstable();
                clades[index] = clade;
            }
        }
        clades
    }

    /// Returns the path from `index` up to the root, both inclusive.
    pub fn path_to_root(&self, index: VertexIndex) -> Vec<VertexIndex> {
        let mut path = vec![index];
        let mut current = index;
        while let Some(parent) = self[current].parent() {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Returns the most recent common ancestor of the given vertices.
    ///
    /// # Returns
    /// The vertex itself for a single index, `None` for an empty slice.
    pub fn mrca(&self, indices: &[VertexIndex]) -> Option<VertexIndex> {
        let (&first, rest) = indices.split_first()?;
        let mut candidates = self.path_to_root(first);

        for &index in rest {
            let ancestors: HashSet<VertexIndex> = self.path_to_root(index).into_iter().collect();
            candidates.retain(|c| ancestors.contains(c));
        }

        // Paths run bottom-up, so the first shared vertex is the deepest
        candidates.first().copied()
    }

    /// Reverses the order of children at every vertex.
    pub fn flip(&mut self) {
        for vertex in &mut self.vertices {
            vertex.children_mut().reverse();
        }
    }
}

// ============================================================================
// Rerooting (pub)
// ============================================================================
impl PhyloTree {
    /// Places the root on the branch above `outgroup`.
    ///
    /// A new root gets inserted halfway along the incoming branch of
    /// `outgroup`; edges on the path to the old root get reversed, carrying
    /// their lengths and supports along. An old root left with a single child
    /// gets spliced out. Afterwards the arena is compacted and re-indexed in
    /// pre-order, so previously held indices are invalidated.
    ///
    /// Nothing changes if `outgroup` is the root or already a child of a
    /// bifurcating root.
    pub fn set_outgroup(&mut self, outgroup: VertexIndex) {
        let Some(parent) = self[outgroup].parent() else {
            return;
        };
        if parent == self.root_index && self.is_rooted() {
            return;
        }

        // Path from parent of outgroup up to old root
        let path = self.path_to_root(parent);
        let old_root = self.root_index;

        let outgroup_edge = self.vertices[outgroup].take_edge();
        let half = outgroup_edge
            .branch_length
            .map(|bl| BranchLength::new(*bl / 2.0));

        let new_root = self.add_inner(vec![outgroup], None);
        self.vertices[outgroup].put_edge(EdgeData {
            branch_length: half,
            ..outgroup_edge.clone()
        });

        // Reverse edges along the path; edge of v_i moves onto v_{i+1}
        let mut carried = EdgeData {
            branch_length: half,
            ..outgroup_edge
        };
        let mut previous_child = outgroup;
        let mut new_parent = new_root;
        for &current in &path {
            let own_edge = self.vertices[current].take_edge();
            self.vertices[current].put_edge(carried);
            carried = own_edge;

            self.vertices[current]
                .children_mut()
                .retain(|&c| c != previous_child);
            self.vertices[current].set_parent(Some(new_parent));
            self.vertices[new_parent].children_mut().push(current);

            previous_child = current;
            new_parent = current;
        }

        self.set_root(new_root);
        self.splice_out_if_unary(old_root);
        self.compact();
    }

    /// Removes vertex `index` if it has exactly one child, connecting that
    /// child to the parent of `index` with the summed branch length.
    fn splice_out_if_unary(&mut self, index: VertexIndex) {
        let (child, parent) = match (self[index].children(), self[index].parent()) {
            ([child], Some(parent)) => (*child, parent),
            _ => return,
        };

        let removed = self.vertices[index].take_edge();
        let child_vertex = &mut self.vertices[child];
        let merged_length = match (child_vertex.branch_length(), removed.branch_length) {
            (Some(a), Some(b)) => Some(BranchLength::new(*a + *b)),
            (a, b) => a.or(b),
        };
        child_vertex.set_branch_length(merged_length);
        if child_vertex.support().is_none() {
            child_vertex.set_support(removed.support);
        }
        if child_vertex.multi_support().is_none() {
            child_vertex.set_multi_support(removed.multi_support);
        }
        child_vertex.set_parent(Some(parent));

        for c in self.vertices[parent].children_mut().iter_mut() {
            if *c == index {
                *c = child;
            }
        }
        self.vertices[index].children_mut().clear();
        self.vertices[index].set_parent(None);
    }

    /// Rebuilds the arena with only the vertices reachable from the root,
    /// indexed in pre-order.
    fn compact(&mut self) {
        let order: Vec<VertexIndex> = self.pre_order_iter().map(|v| v.index()).collect();
        let mut new_index = vec![NO_ROOT_SET_INDEX; self.vertices.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }

        let mut old_vertices: Vec<Option<Vertex>> =
            std::mem::take(&mut self.vertices).into_iter().map(Some).collect();
        let mut vertices = Vec::with_capacity(order.len());
        for &old in &order {
            if let Some(mut vertex) = old_vertices[old].take() {
                vertex.set_index(new_index[old]);
                vertex.set_parent(vertex.parent().map(|p| new_index[p]));
                for c in vertex.children_mut().iter_mut() {
                    *c = new_index[*c];
                }
                vertices.push(vertex);
            }
        }

        self.vertices = vertices;
        self.root_index = 0;
    }
}

// ============================================================================
// Validation (pub)
// ============================================================================
impl PhyloTree {
    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is valid and root has no parent
    /// - All vertex indices match their position in the arena
    /// - All child indices are valid and point back to correct parent
    /// - Every non-root vertex is reachable from the root
    /// - Leaves carry a non-empty name
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        if !self.is_root_set() || self.root_index >= self.vertices.len() {
            return false;
        }
        if self.root().has_parent() {
            return false;
        }

        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return false;
            }

            for &child in vertex.children() {
                if child >= self.vertices.len() || self.vertices[child].parent() != Some(index) {
                    return false;
                }
            }

            if let Some(parent) = vertex.parent() {
                if parent >= self.vertices.len()
                    || !self.vertices[parent].children().contains(&index)
                {
                    return false;
                }
            }

            if vertex.is_leaf() && vertex.name().is_none_or(str::is_empty) {
                return false;
            }
        }

        self.pre_order_iter().count() == self.vertices.len()
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
impl PhyloTree {
    /// Draws the tree as indented text, labelling each vertex with `label`.
    ///
    /// # Example Output
    /// ```text
    /// [0]
    ///   ├─ [1] A (0.1)
    ///   └─ [2] 95 (0.3)
    ///       ├─ [3] B (0.2)
    ///       └─ [4] C (0.4)
    /// ```
    pub fn draw<F>(&self, label: F) -> String
    where
        F: Fn(&Vertex) -> String,
    {
        let mut out = String::new();
        if self.is_root_set() {
            self.draw_vertex(&mut out, self.root_index, "", true, &label);
        }
        out
    }

    /// Helper function to recursively draw a vertex and its children.
    fn draw_vertex<F>(&self, out: &mut String, idx: VertexIndex, prefix: &str, is_last: bool, label: &F)
    where
        F: Fn(&Vertex) -> String,
    {
        let vertex = &self.vertices[idx];
        let connector = if prefix.is_empty() {
            ""
        } else if is_last {
            "└─ "
        } else {
            "├─ "
        };

        let branch_str = vertex
            .branch_length()
            .map(|bl| format!(" ({:.3})", *bl))
            .unwrap_or_default();
        let _ = writeln!(out, "{prefix}{connector}[{idx}] {}{branch_str}", label(vertex));

        let new_prefix = if prefix.is_empty() {
            "  ".to_string()
        } else {
            format!("{}{}  ", prefix, if is_last { " " } else { "│" })
        };
        let children = vertex.children();
        for (i, &child) in children.iter().enumerate() {
            self.draw_vertex(out, child, &new_prefix, i + 1 == children.len(), label);
        }
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
impl PhyloTree {
    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// Post-order traversal visits each vertex's children before visiting the vertex itself.
    /// This is useful for aggregating data from leaves upward, e.g. clades.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self, self.root_index)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    ///
    /// Pre-order traversal visits each vertex before visiting its children.
    /// This is useful for propagating data from root to leaves.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, self.root_index)
    }

    /// Returns a pre-order iterator over the subtree rooted at `index`.
    pub fn subtree_iter(&self, index: VertexIndex) -> PreOrderIter<'_> {
        PreOrderIter::new(self, index)
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a PhyloTree, start: VertexIndex) -> Self {
        let mut stack = Vec::new();
        if start < tree.vertices.len() {
            stack.push((start, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            if children_visited || vertex.is_leaf() {
                return Some(vertex);
            }

            self.stack.push((index, true));
            // Push children in reverse, so the first child is processed first
            for &child in vertex.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a PhyloTree, start: VertexIndex) -> Self {
        let mut stack = Vec::new();
        if start < tree.vertices.len() {
            stack.push(start);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        for &child in vertex.children().iter().rev() {
            self.stack.push(child);
        }

        Some(vertex)
    }
}
