//! Structural edits: insertion, removal, moves, and operator promotion.

use super::{NodeId, PoolTree, PoolValue};
use crate::error::{PoolError, PoolResult};
use crate::operation::Operation;

/// Which side of an existing child a value is dropped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSide {
    /// In front of the child.
    Before,
    /// Behind the child.
    After,
}

impl PoolTree {
    /// Graft `value` into `list` at `index` (`0..=len`). Returns the id of
    /// the grafted root inside this tree.
    pub fn insert(&mut self, list: NodeId, index: usize, value: PoolTree) -> PoolResult<NodeId> {
        let len = self.list_mut(list)?.len();
        if index > len {
            return Err(PoolError::InvariantViolation(format!(
                "insert index {index} is past the end of list {list} (len {len})"
            )));
        }
        let id = value.copy_into(value.root, self, Some(list), true);
        // copy_into appends; move the new child to its slot.
        let children = &mut self.list_mut(list)?.children;
        children.pop();
        children.insert(index, id);
        Ok(id)
    }

    /// Graft `value` at the end of `list`.
    pub fn push(&mut self, list: NodeId, value: PoolTree) -> PoolResult<NodeId> {
        let len = self.list_mut(list)?.len();
        self.insert(list, len, value)
    }

    /// Remove the child of `list` at `index` and return it as a detached tree.
    pub fn remove_at(&mut self, list: NodeId, index: usize) -> PoolResult<PoolTree> {
        let children = &mut self.list_mut(list)?.children;
        if index >= children.len() {
            return Err(PoolError::InvariantViolation(format!(
                "remove index {index} is past the end of list {list} (len {})",
                children.len()
            )));
        }
        let child = children.remove(index);
        let detached = self.copy_subtree(child, true);
        self.release(child);
        Ok(detached)
    }

    /// Remove `node` from whichever list contains it.
    pub fn remove_node(&mut self, node: NodeId) -> PoolResult<PoolTree> {
        let parent = self
            .require(node)?
            .parent
            .ok_or_else(|| PoolError::InvalidOperation("the root cannot be removed".into()))?;
        let index = self.index_of(parent, node).ok_or_else(|| {
            PoolError::InvariantViolation(format!("node {node} is missing from its parent"))
        })?;
        self.remove_at(parent, index)
    }

    /// Remove every child of `list`.
    pub fn clear(&mut self, list: NodeId) -> PoolResult<()> {
        let children = std::mem::take(&mut self.list_mut(list)?.children);
        for child in children {
            self.release(child);
        }
        Ok(())
    }

    /// Position of `node` among the children of `list`.
    pub fn index_of(&self, list: NodeId, node: NodeId) -> Option<usize> {
        self.children(list).iter().position(|&c| c == node)
    }

    /// True if `candidate` is `node` itself or any list above it.
    ///
    /// Dropping `candidate` into `node` is only allowed when this is false.
    pub fn is_ancestor_of(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Move `node` into `target` at the drop slot `index`.
    ///
    /// `index` refers to the target's children as they are before the move,
    /// so dropping a child just after itself leaves the order unchanged.
    pub fn move_node(&mut self, node: NodeId, target: NodeId, index: usize) -> PoolResult<NodeId> {
        let source = self
            .require(node)?
            .parent
            .ok_or_else(|| PoolError::InvalidOperation("the root list cannot be moved".into()))?;
        if self.is_ancestor_of(node, target) {
            return Err(PoolError::InvariantViolation(format!(
                "cannot move {node} into itself or one of its descendants"
            )));
        }
        let len = self.list_mut(target)?.len();
        if index > len {
            return Err(PoolError::InvariantViolation(format!(
                "move index {index} is past the end of list {target} (len {len})"
            )));
        }

        let mut slot = index;
        if source == target && self.index_of(source, node).is_some_and(|old| old < index) {
            slot -= 1;
        }
        let detached = self.remove_node(node)?;
        self.insert(target, slot, detached)
    }

    /// Drop `value` next to the child of `list` at `neighbor`.
    ///
    /// When `operator` is `None` (an existing node being moved) or matches the
    /// list's operation, the value is simply inserted beside the neighbor.
    /// Otherwise the neighbor is replaced by a new sub-list using `operator`
    /// that holds the neighbor and the value, ordered by `side`. Returns the
    /// id of the inserted value.
    pub fn insert_adjacent(
        &mut self,
        list: NodeId,
        neighbor: usize,
        side: DropSide,
        value: PoolTree,
        operator: Option<Operation>,
    ) -> PoolResult<NodeId> {
        let list_op = self.list_mut(list)?.operation;
        let len = self.children(list).len();
        if neighbor >= len {
            return Err(PoolError::InvariantViolation(format!(
                "neighbor index {neighbor} is past the end of list {list} (len {len})"
            )));
        }

        let op = match operator {
            Some(op) if op != list_op => op,
            _ => {
                let slot = match side {
                    DropSide::Before => neighbor,
                    DropSide::After => neighbor + 1,
                };
                return self.insert(list, slot, value);
            }
        };

        let existing = self.remove_at(list, neighbor)?;
        let mut sub = PoolTree::list(op);
        let sub_root = sub.root;
        let value_position = match side {
            DropSide::Before => {
                sub.push(sub_root, value)?;
                sub.push(sub_root, existing.duplicate())?;
                0
            }
            DropSide::After => {
                sub.push(sub_root, existing.duplicate())?;
                sub.push(sub_root, value)?;
                1
            }
        };
        let sub_id = self.insert(list, neighbor, sub)?;
        self.child(sub_id, value_position)
            .ok_or_else(|| PoolError::InvariantViolation("sub-list lost its value".into()))
    }

    /// Drop `value` directly onto `list`, appending it. Used for empty lists,
    /// where no sub-list is created regardless of the chosen operator.
    pub fn drop_onto(&mut self, list: NodeId, value: PoolTree) -> PoolResult<NodeId> {
        if matches!(self.value(list), Some(PoolValue::List(l)) if !l.is_empty()) {
            return Err(PoolError::InvalidOperation(format!(
                "list {list} is not empty; drop beside one of its children instead"
            )));
        }
        self.push(list, value)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::die;
    use super::*;
    use crate::pool::DisplayId;

    fn numbers(values: &[i32], op: Operation) -> PoolTree {
        let mut tree = PoolTree::list(op);
        let root = tree.root();
        for v in values {
            tree.push(root, PoolTree::fixed(*v)).unwrap();
        }
        tree
    }

    fn fixed_values(tree: &PoolTree, list: NodeId) -> Vec<i32> {
        tree.children(list)
            .iter()
            .filter_map(|&id| match tree.value(id) {
                Some(PoolValue::Fixed(n)) => Some(n.value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn insert_sets_parent_and_position() {
        let mut tree = numbers(&[1, 3], Operation::Add);
        let root = tree.root();
        let id = tree.insert(root, 1, PoolTree::fixed(2)).unwrap();
        assert_eq!(tree.parent(id), Some(root));
        assert_eq!(fixed_values(&tree, root), vec![1, 2, 3]);
        tree.check_links().unwrap();
    }

    #[test]
    fn insert_rejects_out_of_range() {
        let mut tree = numbers(&[1], Operation::Add);
        let root = tree.root();
        assert!(matches!(
            tree.insert(root, 5, PoolTree::fixed(2)),
            Err(PoolError::InvariantViolation(_))
        ));
        let leaf = tree.child(root, 0).unwrap();
        assert!(matches!(
            tree.insert(leaf, 0, PoolTree::fixed(2)),
            Err(PoolError::InvalidOperation(_))
        ));
    }

    #[test]
    fn remove_detaches_subtree() {
        let mut tree = numbers(&[1], Operation::Add);
        let root = tree.root();
        let inner = tree.push(root, numbers(&[5, 6], Operation::Multiply)).unwrap();
        tree.set_display(inner, Some(DisplayId(3))).unwrap();
        let before = tree.node_count();

        let removed = tree.remove_at(root, 1).unwrap();
        assert_eq!(removed.parent(removed.root()), None);
        assert_eq!(fixed_values(&removed, removed.root()), vec![5, 6]);
        assert_eq!(removed.node(removed.root()).unwrap().display(), Some(DisplayId(3)));
        assert_eq!(tree.node_count(), before - 3);
        assert!(tree.node(inner).is_none());
        tree.check_links().unwrap();
        removed.check_links().unwrap();
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut tree = numbers(&[1, 2], Operation::Add);
        let root = tree.root();
        let slots = tree.nodes.len();
        tree.remove_at(root, 0).unwrap();
        tree.push(root, PoolTree::fixed(3)).unwrap();
        assert_eq!(tree.nodes.len(), slots);
        assert_eq!(fixed_values(&tree, root), vec![2, 3]);
    }

    #[test]
    fn root_cannot_be_removed_or_moved() {
        let mut tree = numbers(&[1], Operation::Add);
        let root = tree.root();
        assert!(tree.remove_node(root).is_err());
        assert!(tree.move_node(root, root, 0).is_err());
    }

    #[test]
    fn clear_empties_list() {
        let mut tree = numbers(&[1, 2, 3], Operation::Add);
        let root = tree.root();
        tree.clear(root).unwrap();
        assert!(tree.root_list().unwrap().is_empty());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn ancestry_is_inclusive() {
        let mut tree = PoolTree::list(Operation::Add);
        let root = tree.root();
        let inner = tree.push(root, PoolTree::list(Operation::Add)).unwrap();
        let leaf = tree.push(inner, PoolTree::fixed(1)).unwrap();
        assert!(tree.is_ancestor_of(root, leaf));
        assert!(tree.is_ancestor_of(inner, leaf));
        assert!(tree.is_ancestor_of(inner, inner));
        assert!(!tree.is_ancestor_of(leaf, inner));
    }

    #[test]
    fn list_cannot_move_into_itself() {
        let mut tree = PoolTree::list(Operation::Add);
        let root = tree.root();
        let outer = tree.push(root, PoolTree::list(Operation::Add)).unwrap();
        let inner = tree.push(outer, PoolTree::list(Operation::Add)).unwrap();
        assert!(matches!(
            tree.move_node(outer, inner, 0),
            Err(PoolError::InvariantViolation(_))
        ));
        assert!(matches!(
            tree.move_node(outer, outer, 0),
            Err(PoolError::InvariantViolation(_))
        ));
        tree.check_links().unwrap();
    }

    #[test]
    fn move_within_same_list_uses_drop_slots() {
        let mut tree = numbers(&[1, 2, 3], Operation::Add);
        let root = tree.root();
        let first = tree.child(root, 0).unwrap();
        tree.move_node(first, root, 3).unwrap();
        assert_eq!(fixed_values(&tree, root), vec![2, 3, 1]);

        let last = tree.child(root, 2).unwrap();
        tree.move_node(last, root, 0).unwrap();
        assert_eq!(fixed_values(&tree, root), vec![1, 2, 3]);

        let middle = tree.child(root, 1).unwrap();
        tree.move_node(middle, root, 2).unwrap();
        assert_eq!(fixed_values(&tree, root), vec![1, 2, 3]);
        tree.check_links().unwrap();
    }

    #[test]
    fn move_between_lists_keeps_display() {
        let mut tree = numbers(&[1], Operation::Add);
        let root = tree.root();
        let inner = tree.push(root, PoolTree::list(Operation::Multiply)).unwrap();
        let one = tree.child(root, 0).unwrap();
        tree.set_display(one, Some(DisplayId(11))).unwrap();

        let moved = tree.move_node(one, inner, 0).unwrap();
        assert_eq!(tree.parent(moved), Some(inner));
        assert_eq!(tree.node(moved).unwrap().display(), Some(DisplayId(11)));
        assert_eq!(tree.children(root).len(), 1);
        tree.check_links().unwrap();
    }

    #[test]
    fn same_operator_drop_is_plain_insert() {
        let mut tree = numbers(&[1, 3], Operation::Add);
        let root = tree.root();
        tree.insert_adjacent(root, 0, DropSide::After, PoolTree::fixed(2), Some(Operation::Add))
            .unwrap();
        tree.insert_adjacent(root, 0, DropSide::Before, PoolTree::fixed(0), None)
            .unwrap();
        assert_eq!(fixed_values(&tree, root), vec![0, 1, 2, 3]);
    }

    #[test]
    fn different_operator_after_builds_sub_list() {
        let mut tree = numbers(&[2, 3], Operation::Add);
        let root = tree.root();
        let id = tree
            .insert_adjacent(root, 1, DropSide::After, PoolTree::fixed(4), Some(Operation::Multiply))
            .unwrap();

        let sub = tree.child(root, 1).unwrap();
        assert_eq!(tree.list_at(sub).unwrap().operation(), Operation::Multiply);
        assert_eq!(fixed_values(&tree, sub), vec![3, 4]);
        assert_eq!(tree.parent(id), Some(sub));
        assert_eq!(tree.index_of(sub, id), Some(1));
        assert_eq!(fixed_values(&tree, root), vec![2]);
        tree.check_links().unwrap();
    }

    #[test]
    fn different_operator_before_puts_value_first() {
        let mut tree = numbers(&[7], Operation::Add);
        let root = tree.root();
        let id = tree
            .insert_adjacent(
                root,
                0,
                DropSide::Before,
                PoolTree::dice(die("D6", 6), 2),
                Some(Operation::Subtract),
            )
            .unwrap();
        let sub = tree.child(root, 0).unwrap();
        assert_eq!(tree.index_of(sub, id), Some(0));
        assert!(matches!(tree.value(id), Some(PoolValue::Dice(_))));
        assert_eq!(fixed_values(&tree, sub), vec![7]);
        tree.check_links().unwrap();
    }

    #[test]
    fn promoted_neighbor_is_a_fresh_copy() {
        let mut tree = numbers(&[5], Operation::Add);
        let root = tree.root();
        let old = tree.child(root, 0).unwrap();
        tree.set_display(old, Some(DisplayId(1))).unwrap();

        let mut dragged = PoolTree::fixed(6);
        let dragged_root = dragged.root();
        dragged.set_display(dragged_root, Some(DisplayId(2))).unwrap();

        let id = tree
            .insert_adjacent(root, 0, DropSide::After, dragged, Some(Operation::Multiply))
            .unwrap();
        let sub = tree.child(root, 0).unwrap();
        let neighbor = tree.child(sub, 0).unwrap();
        // The neighbor is rebuilt without its old presentation; the dragged
        // value arrives as handed in.
        assert_eq!(tree.node(neighbor).unwrap().display(), None);
        assert_eq!(tree.node(id).unwrap().display(), Some(DisplayId(2)));
        tree.check_links().unwrap();
    }

    #[test]
    fn drop_onto_empty_ignores_operator() {
        let mut tree = PoolTree::list(Operation::Add);
        let root = tree.root();
        tree.drop_onto(root, PoolTree::fixed(1)).unwrap();
        assert_eq!(fixed_values(&tree, root), vec![1]);
        assert!(tree.drop_onto(root, PoolTree::fixed(2)).is_err());
    }
}
