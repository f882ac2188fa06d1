//! Rolling, previewing, and printing pool trees.

use rand::rngs::StdRng;

use super::{DicePool, DisplayId, NodeId, PoolTree, PoolValue};
use crate::error::{PoolError, PoolResult};
use crate::operation::Operation;
use crate::result::DicePoolResult;

/// Receives per-node results during evaluation.
///
/// Only nodes that carry a [`DisplayId`] are reported. Purely observational:
/// a sink cannot change any result.
pub trait ResultSink {
    /// A node's result was computed.
    fn on_result_computed(&mut self, display: DisplayId, result: &DicePoolResult);

    /// A dice node is shown unrolled with its config result.
    fn on_ghosted_config(&mut self, display: DisplayId, result: &DicePoolResult) {
        let _ = (display, result);
    }
}

struct Quiet;

impl ResultSink for Quiet {
    fn on_result_computed(&mut self, _: DisplayId, _: &DicePoolResult) {}
}

impl PoolTree {
    /// Roll every die in the tree and fold the results.
    pub fn evaluate(&self, rng: &mut StdRng) -> PoolResult<DicePoolResult> {
        self.evaluate_with(rng, &mut Quiet)
    }

    /// Like [`evaluate`](Self::evaluate), reporting each displayed node to `sink`.
    pub fn evaluate_with(
        &self,
        rng: &mut StdRng,
        sink: &mut dyn ResultSink,
    ) -> PoolResult<DicePoolResult> {
        self.evaluate_node(self.root, rng, sink)
    }

    /// Evaluate the subtree rooted at `id`.
    pub fn evaluate_node(
        &self,
        id: NodeId,
        rng: &mut StdRng,
        sink: &mut dyn ResultSink,
    ) -> PoolResult<DicePoolResult> {
        self.fold(id, &mut |pool: &DicePool| roll_group(pool, rng), sink)
    }

    /// The deterministic preview: every die shows its maximum result.
    pub fn config_result(&self) -> PoolResult<DicePoolResult> {
        self.fold(self.root, &mut config_group, &mut Quiet)
    }

    /// Report the config result of every displayed dice node to `sink`, so a
    /// presentation can show dice that have not been rolled yet.
    pub fn ghost_config_dice(&self, sink: &mut dyn ResultSink) -> PoolResult<()> {
        for id in self.walk() {
            let Some(node) = self.node(id) else { continue };
            if let (PoolValue::Dice(pool), Some(display)) = (&node.value, node.display) {
                sink.on_ghosted_config(display, &config_group(pool)?);
            }
        }
        Ok(())
    }

    /// The configuration as text, e.g. `3xD6+(1xD4-2)`. Empty lists print nothing.
    pub fn notation(&self) -> String {
        self.notate(self.root).0
    }

    fn fold<F>(
        &self,
        id: NodeId,
        leaf: &mut F,
        sink: &mut dyn ResultSink,
    ) -> PoolResult<DicePoolResult>
    where
        F: FnMut(&DicePool) -> PoolResult<DicePoolResult>,
    {
        let node = self.require(id)?;
        let result = match &node.value {
            PoolValue::Dice(pool) => leaf(pool)?,
            PoolValue::Fixed(number) => DicePoolResult::fixed(number.value),
            PoolValue::List(list) => {
                let mut acc = DicePoolResult::new();
                for &child in list.children() {
                    let next = self.fold(child, leaf, sink)?;
                    acc = acc.concatenate(next, list.operation());
                }
                acc
            }
        };
        if let Some(display) = node.display {
            sink.on_result_computed(display, &result);
        }
        Ok(result)
    }

    fn notate(&self, id: NodeId) -> (String, bool) {
        match self.value(id) {
            Some(PoolValue::Dice(pool)) => {
                (format!("{}x{}", pool.quantity, pool.die_type.name()), false)
            }
            Some(PoolValue::Fixed(number)) => (number.value.to_string(), false),
            Some(PoolValue::List(list)) => {
                let terms: Vec<(String, bool)> = list
                    .children()
                    .iter()
                    .map(|&child| self.notate(child))
                    .filter(|(text, _)| !text.is_empty())
                    .collect();
                join_terms(terms, list.operation())
            }
            None => (String::new(), false),
        }
    }
}

fn join_terms(terms: Vec<(String, bool)>, operation: Operation) -> (String, bool) {
    if terms.len() == 1 {
        return terms.into_iter().next().unwrap_or_default();
    }
    let compound = !terms.is_empty();
    let text = terms
        .into_iter()
        .map(|(text, nested)| if nested { format!("({text})") } else { text })
        .collect::<Vec<_>>()
        .join(operation.symbol());
    (text, compound)
}

fn roll_group(pool: &DicePool, rng: &mut StdRng) -> PoolResult<DicePoolResult> {
    reject_placeholder(pool)?;
    let mut result = DicePoolResult::new();
    for _ in 0..pool.quantity {
        result.add_roll(pool.die_type.roll(rng)?);
    }
    Ok(result)
}

fn config_group(pool: &DicePool) -> PoolResult<DicePoolResult> {
    reject_placeholder(pool)?;
    let mut result = DicePoolResult::new();
    for _ in 0..pool.quantity {
        result.add_roll(pool.die_type.config_result()?);
    }
    Ok(result)
}

// A placeholder group fails even with no dice in it.
fn reject_placeholder(pool: &DicePool) -> PoolResult<()> {
    if pool.die_type.is_placeholder() {
        return Err(PoolError::InvalidOperation(format!(
            "die type \"{}\" is missing and must be replaced before rolling",
            pool.die_type.name()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::super::tests::{Dice, build, die, shape};
    use super::*;
    use crate::die::DieType;
    use crate::resolve::DieTypeResolver;

    #[derive(Default)]
    struct Recorder {
        computed: Vec<(DisplayId, String)>,
        ghosted: Vec<(DisplayId, i32)>,
    }

    impl ResultSink for Recorder {
        fn on_result_computed(&mut self, display: DisplayId, result: &DicePoolResult) {
            self.computed.push((display, result.description().to_string()));
        }

        fn on_ghosted_config(&mut self, display: DisplayId, result: &DicePoolResult) {
            self.ghosted.push((display, result.total()));
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn three_d6_in_range() {
        let tree = PoolTree::dice(die("D6", 6), 3);
        let result = tree.evaluate(&mut rng()).unwrap();
        assert!((3..=18).contains(&result.total()));
        assert_eq!(result.faces().len(), 3);
    }

    #[test]
    fn fixed_number_evaluates_to_itself() {
        let result = PoolTree::fixed(5).evaluate(&mut rng()).unwrap();
        assert_eq!(result.total(), 5);
        assert_eq!(result.description(), "5");
        assert!(result.faces().is_empty());
    }

    #[test]
    fn config_result_of_die_plus_two() {
        let mut tree = PoolTree::list(Operation::Add);
        let root = tree.root();
        tree.push(root, PoolTree::dice(die("D6", 6), 1)).unwrap();
        tree.push(root, PoolTree::fixed(2)).unwrap();
        let result = tree.config_result().unwrap();
        assert_eq!(result.total(), 8);
        assert_eq!(result.description(), "6+2");
    }

    #[test]
    fn empty_list_is_absorbed() {
        let mut tree = PoolTree::list(Operation::Subtract);
        let root = tree.root();
        tree.push(root, PoolTree::fixed(9)).unwrap();
        tree.push(root, PoolTree::list(Operation::Add)).unwrap();
        let result = tree.evaluate(&mut rng()).unwrap();
        assert_eq!(result, DicePoolResult::fixed(9));
    }

    #[test]
    fn empty_tree_is_zero() {
        let result = PoolTree::list(Operation::Multiply).evaluate(&mut rng()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn nesting_is_parenthesized() {
        let mut tree = PoolTree::list(Operation::Multiply);
        let root = tree.root();
        let sum = tree.push(root, PoolTree::list(Operation::Add)).unwrap();
        tree.push(sum, PoolTree::fixed(2)).unwrap();
        tree.push(sum, PoolTree::fixed(3)).unwrap();
        tree.push(root, PoolTree::fixed(4)).unwrap();
        let result = tree.evaluate(&mut rng()).unwrap();
        assert_eq!(result.description(), "(2+3)*4");
        assert_eq!(result.total(), 20);
    }

    #[test]
    fn placeholder_fails_to_roll_even_when_empty() {
        let tree = PoolTree::dice(Arc::new(DieType::placeholder("Lost")), 0);
        assert!(matches!(
            tree.evaluate(&mut rng()),
            Err(PoolError::InvalidOperation(_))
        ));
        assert!(matches!(
            tree.config_result(),
            Err(PoolError::InvalidOperation(_))
        ));
    }

    #[test]
    fn replacing_placeholder_makes_tree_rollable() {
        let mut resolver = Dice::default();
        let mut tree = PoolTree::list(Operation::Add);
        let root = tree.root();
        tree.push(root, PoolTree::dice(resolver.resolve("Bone"), 2))
            .unwrap();
        assert!(tree.evaluate(&mut rng()).is_err());

        resolver.known.insert("Bone".into(), die("Bone", 4));
        assert!(tree.replace_die_type("Bone", "Bone", &mut resolver));
        let result = tree.evaluate(&mut rng()).unwrap();
        assert!((2..=8).contains(&result.total()));
    }

    #[test]
    fn sink_sees_displayed_nodes_only() {
        let mut tree = PoolTree::list(Operation::Add);
        let root = tree.root();
        let dice = tree.push(root, PoolTree::dice(die("D4", 4), 2)).unwrap();
        tree.push(root, PoolTree::fixed(1)).unwrap();
        tree.set_display(dice, Some(DisplayId(1))).unwrap();
        tree.set_display(root, Some(DisplayId(2))).unwrap();

        let mut sink = Recorder::default();
        let result = tree.evaluate_with(&mut rng(), &mut sink).unwrap();
        assert_eq!(sink.computed.len(), 2);
        assert_eq!(sink.computed[0].0, DisplayId(1));
        assert_eq!(sink.computed[1], (DisplayId(2), result.description().to_string()));
    }

    #[test]
    fn ghosting_reports_config_of_dice() {
        let mut tree = PoolTree::list(Operation::Add);
        let root = tree.root();
        let d8 = tree.push(root, PoolTree::dice(die("D8", 8), 2)).unwrap();
        let five = tree.push(root, PoolTree::fixed(5)).unwrap();
        tree.set_display(d8, Some(DisplayId(7))).unwrap();
        tree.set_display(five, Some(DisplayId(8))).unwrap();

        let mut sink = Recorder::default();
        tree.ghost_config_dice(&mut sink).unwrap();
        assert_eq!(sink.ghosted, vec![(DisplayId(7), 16)]);
        assert!(sink.computed.is_empty());
    }

    #[test]
    fn notation_mirrors_structure() {
        let mut tree = PoolTree::list(Operation::Add);
        let root = tree.root();
        tree.push(root, PoolTree::dice(die("D6", 6), 3)).unwrap();
        let inner = tree.push(root, PoolTree::list(Operation::Subtract)).unwrap();
        tree.push(inner, PoolTree::dice(die("D4", 4), 1)).unwrap();
        tree.push(inner, PoolTree::fixed(2)).unwrap();
        tree.push(root, PoolTree::list(Operation::Multiply)).unwrap();
        assert_eq!(tree.notation(), "3xD6+(1xD4-2)");
        assert_eq!(PoolTree::list(Operation::Add).notation(), "");
    }

    proptest! {
        #[test]
        fn dice_stay_within_bounds(min in -5i32..5, span in 0i32..10, quantity in 0u32..8, seed: u64) {
            let max = min + span;
            let faces = crate::die::build_faces(min, max, None);
            let d = Arc::new(DieType::new("Any", min, max, faces).unwrap());
            let tree = PoolTree::dice(d, quantity);
            let result = tree.evaluate(&mut StdRng::seed_from_u64(seed)).unwrap();
            let n = quantity as i32;
            prop_assert!(result.total() >= n * min && result.total() <= n * max);
            prop_assert_eq!(result.faces().len(), quantity as usize);
        }

        #[test]
        fn config_result_is_repeatable(s in shape()) {
            let tree = build(&s);
            let first = tree.config_result().unwrap();
            let second = tree.config_result().unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn same_seed_same_roll(s in shape(), seed: u64) {
            let tree = build(&s);
            let a = tree.evaluate(&mut StdRng::seed_from_u64(seed)).unwrap();
            let b = tree.evaluate(&mut StdRng::seed_from_u64(seed)).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn single_child_prints_like_itself(s in shape(), seed: u64) {
            let alone = build(&s);
            let mut wrapped = PoolTree::list(Operation::Multiply);
            let root = wrapped.root();
            wrapped.push(root, alone.duplicate()).unwrap();
            let a = alone.evaluate(&mut StdRng::seed_from_u64(seed)).unwrap();
            let b = wrapped.evaluate(&mut StdRng::seed_from_u64(seed)).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn subtraction_folds_left(values in proptest::collection::vec(-100i32..100, 1..6)) {
            let mut tree = PoolTree::list(Operation::Subtract);
            let root = tree.root();
            for v in &values {
                tree.push(root, PoolTree::fixed(*v)).unwrap();
            }
            let expected = values[1..].iter().fold(values[0], |acc, v| acc - v);
            prop_assert_eq!(tree.evaluate(&mut rng()).unwrap().total(), expected);
        }

        #[test]
        fn duplicates_evaluate_alike(s in shape()) {
            let tree = build(&s);
            let copy = tree.duplicate();
            copy.check_links().unwrap();
            prop_assert_eq!(tree.notation(), copy.notation());
            prop_assert_eq!(tree.config_result().unwrap(), copy.config_result().unwrap());
        }
    }
}
