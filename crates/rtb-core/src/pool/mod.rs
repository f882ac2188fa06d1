//! The dice pool expression tree.
//!
//! A [`PoolTree`] owns its nodes in an arena. Lists hold their children as
//! [`NodeId`]s and every node records the id of the list that contains it,
//! so parent lookups go through the arena rather than through pointers.
//! A detached value (a new die group, a removed child, a duplicate) is
//! itself a `PoolTree` and is grafted into another tree on insertion.

mod edit;
mod eval;
mod record;

use std::fmt;
use std::sync::Arc;

pub use edit::DropSide;
pub use eval::ResultSink;
pub use record::PoolRecord;

use crate::die::DieType;
use crate::error::{PoolError, PoolResult};
use crate::operation::Operation;
use crate::resolve::DieTypeResolver;

/// Index of a node inside one [`PoolTree`]. Ids are not valid across trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The arena slot this id refers to.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque handle to whatever presentation object currently renders a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayId(pub u64);

/// A group of identical dice.
#[derive(Debug, Clone)]
pub struct DicePool {
    /// The type of every die in the group.
    pub die_type: Arc<DieType>,
    /// How many dice are rolled.
    pub quantity: u32,
}

impl DicePool {
    /// Create a group of `quantity` dice.
    pub fn new(die_type: Arc<DieType>, quantity: u32) -> Self {
        Self {
            die_type,
            quantity,
        }
    }

    /// Add dice to the group. Returns the new quantity.
    pub fn inc_dice(&mut self, additional: u32) -> u32 {
        self.quantity = self.quantity.saturating_add(additional);
        self.quantity
    }

    /// Remove dice from the group, stopping at zero. Returns the new quantity.
    pub fn dec_dice(&mut self, removed: u32) -> u32 {
        self.quantity = self.quantity.saturating_sub(removed);
        self.quantity
    }
}

/// A constant contribution to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedNumber {
    /// The constant.
    pub value: i32,
}

/// An ordered list of children combined by one operation.
#[derive(Debug, Clone)]
pub struct PoolList {
    operation: Operation,
    children: Vec<NodeId>,
}

impl PoolList {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            children: Vec::new(),
        }
    }

    /// The operation folding the children.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Child ids in order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if the list has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// The three kinds of value a pool node can hold.
#[derive(Debug, Clone)]
pub enum PoolValue {
    /// A group of dice.
    Dice(DicePool),
    /// A constant.
    Fixed(FixedNumber),
    /// An operator list.
    List(PoolList),
}

impl PoolValue {
    /// The list, if this value is one.
    pub fn as_list(&self) -> Option<&PoolList> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dice(_) => "dice",
            Self::Fixed(_) => "number",
            Self::List(_) => "list",
        }
    }

    // Copy of the value without list children; used when rebuilding subtrees.
    fn shallow_copy(&self) -> Self {
        match self {
            Self::Dice(pool) => Self::Dice(pool.clone()),
            Self::Fixed(number) => Self::Fixed(*number),
            Self::List(list) => Self::List(PoolList::new(list.operation)),
        }
    }
}

/// A node in the arena.
#[derive(Debug)]
pub struct PoolNode {
    value: PoolValue,
    parent: Option<NodeId>,
    display: Option<DisplayId>,
}

impl PoolNode {
    /// The value stored at this node.
    pub fn value(&self) -> &PoolValue {
        &self.value
    }

    /// The list containing this node, or `None` for a root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The presentation handle, if one is attached.
    pub fn display(&self) -> Option<DisplayId> {
        self.display
    }
}

/// A dice pool expression tree.
///
/// Not `Clone`: copies go through [`PoolTree::duplicate`],
/// which never carries presentation handles along.
#[derive(Debug)]
pub struct PoolTree {
    nodes: Vec<Option<PoolNode>>,
    free: Vec<usize>,
    root: NodeId,
}

impl PoolTree {
    fn with_root(value: PoolValue) -> Self {
        Self {
            nodes: vec![Some(PoolNode {
                value,
                parent: None,
                display: None,
            })],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// An empty list using `operation`.
    pub fn list(operation: Operation) -> Self {
        Self::with_root(PoolValue::List(PoolList::new(operation)))
    }

    /// A single group of dice.
    pub fn dice(die_type: Arc<DieType>, quantity: u32) -> Self {
        Self::with_root(PoolValue::Dice(DicePool::new(die_type, quantity)))
    }

    /// A single constant.
    pub fn fixed(value: i32) -> Self {
        Self::with_root(PoolValue::Fixed(FixedNumber { value }))
    }

    /// The pool shown when nothing else is available: one die in a `+` list.
    pub fn default_pool(die_type: Arc<DieType>) -> Self {
        let mut tree = Self::list(Operation::Add);
        let root = tree.root;
        tree.attach(root, 0, PoolValue::Dice(DicePool::new(die_type, 1)));
        tree
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root value, if it is a list.
    pub fn root_list(&self) -> Option<&PoolList> {
        self.list_at(self.root)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&PoolNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Look up a node's value.
    pub fn value(&self, id: NodeId) -> Option<&PoolValue> {
        self.node(id).map(PoolNode::value)
    }

    /// The list containing `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(PoolNode::parent)
    }

    /// The list stored at `id`, if that node is a list.
    pub fn list_at(&self, id: NodeId) -> Option<&PoolList> {
        self.value(id).and_then(PoolValue::as_list)
    }

    /// Children of `id`. Empty for anything that is not a list.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.list_at(id).map(PoolList::children).unwrap_or(&[])
    }

    /// The child of `list` at `index`.
    pub fn child(&self, list: NodeId, index: usize) -> Option<NodeId> {
        self.children(list).get(index).copied()
    }

    /// Number of live nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Node ids in depth-first, left-to-right order starting at the root.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Mutable access to a dice group.
    pub fn dice_mut(&mut self, id: NodeId) -> Option<&mut DicePool> {
        match self.node_mut(id).map(|n| &mut n.value) {
            Some(PoolValue::Dice(pool)) => Some(pool),
            _ => None,
        }
    }

    /// Mutable access to a constant.
    pub fn fixed_mut(&mut self, id: NodeId) -> Option<&mut FixedNumber> {
        match self.node_mut(id).map(|n| &mut n.value) {
            Some(PoolValue::Fixed(number)) => Some(number),
            _ => None,
        }
    }

    /// Attach or clear the presentation handle of a node.
    pub fn set_display(&mut self, id: NodeId, display: Option<DisplayId>) -> PoolResult<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| PoolError::NotFound(format!("node {id}")))?;
        node.display = display;
        Ok(())
    }

    /// Deep copy of the whole tree. Die types and operations are shared;
    /// presentation handles are not copied.
    pub fn duplicate(&self) -> PoolTree {
        self.copy_subtree(self.root, false)
    }

    /// Deep copy of the subtree rooted at `id`, detached from any parent.
    pub fn duplicate_subtree(&self, id: NodeId) -> PoolResult<PoolTree> {
        self.require(id)?;
        Ok(self.copy_subtree(id, false))
    }

    /// Re-resolve every die named `old_name` as `new_name`.
    ///
    /// Returns true if any dice group was changed. Passing the same name twice
    /// refreshes that type from the resolver.
    pub fn replace_die_type<R>(&mut self, old_name: &str, new_name: &str, resolver: &mut R) -> bool
    where
        R: DieTypeResolver + ?Sized,
    {
        let mut replacement: Option<Arc<DieType>> = None;
        let mut replaced = false;
        for slot in self.nodes.iter_mut().flatten() {
            if let PoolValue::Dice(pool) = &mut slot.value {
                if pool.die_type.name() != old_name {
                    continue;
                }
                let new_type = replacement
                    .get_or_insert_with(|| resolver.resolve(new_name))
                    .clone();
                pool.die_type = new_type;
                replaced = true;
            }
        }
        replaced
    }

    /// The first placeholder die type in depth-first, left-to-right order.
    pub fn find_first_placeholder(&self) -> Option<Arc<DieType>> {
        self.walk().into_iter().find_map(|id| match self.value(id) {
            Some(PoolValue::Dice(pool)) if pool.die_type.is_placeholder() => {
                Some(pool.die_type.clone())
            }
            _ => None,
        })
    }

    /// Verify that every child's parent link matches its container and that
    /// every live node is reachable exactly once from the root.
    pub fn check_links(&self) -> PoolResult<()> {
        let root = self.require(self.root)?;
        if root.parent.is_some() {
            return Err(PoolError::InvariantViolation("root has a parent".into()));
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.0], true) {
                return Err(PoolError::InvariantViolation(format!(
                    "node {id} appears more than once"
                )));
            }
            for &child in self.children(id) {
                let node = self.require(child)?;
                if node.parent != Some(id) {
                    return Err(PoolError::InvariantViolation(format!(
                        "node {child} is in {id} but points at {:?}",
                        node.parent
                    )));
                }
                stack.push(child);
            }
        }
        if seen.iter().filter(|s| **s).count() != self.node_count() {
            return Err(PoolError::InvariantViolation(
                "tree has unreachable nodes".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Arena plumbing
    // -----------------------------------------------------------------------

    fn require(&self, id: NodeId) -> PoolResult<&PoolNode> {
        self.node(id)
            .ok_or_else(|| PoolError::NotFound(format!("node {id}")))
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut PoolNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn list_mut(&mut self, id: NodeId) -> PoolResult<&mut PoolList> {
        match self.node_mut(id).map(|n| &mut n.value) {
            Some(PoolValue::List(list)) => Ok(list),
            Some(_) => Err(PoolError::InvalidOperation(format!(
                "node {id} is not a list"
            ))),
            None => Err(PoolError::NotFound(format!("node {id}"))),
        }
    }

    fn alloc(&mut self, node: PoolNode) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    // Store `value` as a new child of `list` at `index`. Callers check bounds.
    fn attach(&mut self, list: NodeId, index: usize, value: PoolValue) -> NodeId {
        let id = self.alloc(PoolNode {
            value,
            parent: Some(list),
            display: None,
        });
        if let Some(PoolValue::List(parent)) = self.node_mut(list).map(|n| &mut n.value) {
            parent.children.insert(index, id);
        }
        id
    }

    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                if let PoolValue::List(list) = node.value {
                    stack.extend(list.children);
                }
                self.free.push(current.0);
            }
        }
    }

    fn copy_subtree(&self, id: NodeId, keep_display: bool) -> PoolTree {
        let mut copy = PoolTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
        };
        copy.root = self.copy_into(id, &mut copy, None, keep_display);
        copy
    }

    // Copy the subtree at `src` into `dest`. The new node is appended to
    // `dest_parent`'s children when a parent is given.
    fn copy_into(
        &self,
        src: NodeId,
        dest: &mut PoolTree,
        dest_parent: Option<NodeId>,
        keep_display: bool,
    ) -> NodeId {
        let Some(node) = self.node(src) else {
            return dest.root;
        };
        let new_id = dest.alloc(PoolNode {
            value: node.value.shallow_copy(),
            parent: dest_parent,
            display: if keep_display { node.display } else { None },
        });
        if let Some(parent) = dest_parent {
            if let Ok(list) = dest.list_mut(parent) {
                list.children.push(new_id);
            }
        }
        for &child in self.children(src) {
            self.copy_into(child, dest, Some(new_id), keep_display);
        }
        new_id
    }
}
