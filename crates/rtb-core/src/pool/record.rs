//! The persisted form of a pool tree.
//!
//! Dice are stored by die type name only and are resolved again on load,
//! so edits to a custom die reach every pool that uses it.

use serde::{Deserialize, Serialize};

use super::{NodeId, PoolTree, PoolValue};
use crate::error::{PoolError, PoolResult};
use crate::operation::Operation;
use crate::resolve::DieTypeResolver;

/// Serializable mirror of a pool value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolRecord {
    /// A group of dice, by die type name.
    DicePool {
        /// Die type name.
        die: String,
        /// Number of dice.
        quantity: u32,
    },
    /// A constant.
    FixedNumber {
        /// The constant.
        number: i32,
    },
    /// An operator list.
    PoolList {
        /// Operation symbol.
        operation: Operation,
        /// Children in order.
        children: Vec<PoolRecord>,
    },
}

impl PoolTree {
    /// The record form of this tree.
    ///
    /// Fails with `InvalidOperation` if the tree still refers to a placeholder.
    pub fn to_record(&self) -> PoolResult<PoolRecord> {
        self.record_of(self.root)
    }

    /// Rebuild a tree, resolving every die type name through `resolver`.
    pub fn from_record<R>(record: &PoolRecord, resolver: &mut R) -> PoolTree
    where
        R: DieTypeResolver + ?Sized,
    {
        match record {
            PoolRecord::DicePool { die, quantity } => {
                PoolTree::dice(resolver.resolve(die), *quantity)
            }
            PoolRecord::FixedNumber { number } => PoolTree::fixed(*number),
            PoolRecord::PoolList {
                operation,
                children,
            } => {
                let mut tree = PoolTree::list(*operation);
                let root = tree.root;
                for child in children {
                    tree.graft_record(root, child, resolver);
                }
                tree
            }
        }
    }

    /// Serialize to JSON text.
    pub fn to_json(&self) -> PoolResult<String> {
        let record = self.to_record()?;
        serde_json::to_string_pretty(&record)
            .map_err(|e| PoolError::CorruptData(format!("cannot encode pool: {e}")))
    }

    /// Parse JSON text produced by [`to_json`](Self::to_json).
    ///
    /// Saved pools always have a list at the root; anything else is corrupt.
    pub fn from_json<R>(text: &str, resolver: &mut R) -> PoolResult<PoolTree>
    where
        R: DieTypeResolver + ?Sized,
    {
        let record: PoolRecord = serde_json::from_str(text)
            .map_err(|e| PoolError::CorruptData(format!("cannot decode pool: {e}")))?;
        if !matches!(record, PoolRecord::PoolList { .. }) {
            return Err(PoolError::CorruptData(
                "a saved pool must start with a list".into(),
            ));
        }
        Ok(Self::from_record(&record, resolver))
    }

    fn record_of(&self, id: NodeId) -> PoolResult<PoolRecord> {
        let record = match &self.require(id)?.value {
            PoolValue::Dice(pool) => {
                if pool.die_type.is_placeholder() {
                    return Err(PoolError::InvalidOperation(format!(
                        "die type \"{}\" is missing; replace it before saving",
                        pool.die_type.name()
                    )));
                }
                PoolRecord::DicePool {
                    die: pool.die_type.name().to_string(),
                    quantity: pool.quantity,
                }
            }
            PoolValue::Fixed(number) => PoolRecord::FixedNumber {
                number: number.value,
            },
            PoolValue::List(list) => PoolRecord::PoolList {
                operation: list.operation(),
                children: list
                    .children()
                    .iter()
                    .map(|&child| self.record_of(child))
                    .collect::<PoolResult<_>>()?,
            },
        };
        Ok(record)
    }

    fn graft_record<R>(&mut self, list: NodeId, record: &PoolRecord, resolver: &mut R)
    where
        R: DieTypeResolver + ?Sized,
    {
        let index = self.children(list).len();
        let value = match record {
            PoolRecord::DicePool { die, quantity } => {
                PoolValue::Dice(super::DicePool::new(resolver.resolve(die), *quantity))
            }
            PoolRecord::FixedNumber { number } => {
                PoolValue::Fixed(super::FixedNumber { value: *number })
            }
            PoolRecord::PoolList { operation, .. } => {
                PoolValue::List(super::PoolList::new(*operation))
            }
        };
        let id = self.attach(list, index, value);
        if let PoolRecord::PoolList { children, .. } = record {
            for child in children {
                self.graft_record(id, child, resolver);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::super::tests::{Dice, build, die, shape};
    use super::*;
    use crate::die::DieType;

    fn resolver_for(names: &[(&str, i32)]) -> Dice {
        let mut dice = Dice::default();
        for (name, max) in names {
            dice.known.insert((*name).to_string(), die(name, *max));
        }
        dice
    }

    #[test]
    fn json_layout() {
        let mut tree = PoolTree::list(Operation::Subtract);
        let root = tree.root();
        tree.push(root, PoolTree::dice(die("D8", 8), 2)).unwrap();
        tree.push(root, PoolTree::fixed(3)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "pool_list");
        assert_eq!(value["operation"], "-");
        assert_eq!(value["children"][0]["type"], "dice_pool");
        assert_eq!(value["children"][0]["die"], "D8");
        assert_eq!(value["children"][0]["quantity"], 2);
        assert_eq!(value["children"][1]["number"], 3);
    }

    #[test]
    fn load_resolves_names() {
        let text = r#"{"type":"pool_list","operation":"*","children":[
            {"type":"dice_pool","die":"D12","quantity":1},
            {"type":"pool_list","operation":"+","children":[{"type":"fixed_number","number":4}]}
        ]}"#;
        let mut dice = resolver_for(&[("D12", 12)]);
        let tree = PoolTree::from_json(text, &mut dice).unwrap();
        tree.check_links().unwrap();
        assert_eq!(tree.notation(), "1xD12*4");
        assert_eq!(dice.lookups, 1);
    }

    #[test]
    fn unknown_names_become_placeholders() {
        let text = r#"{"type":"pool_list","operation":"+","children":[
            {"type":"dice_pool","die":"Gone","quantity":2}]}"#;
        let tree = PoolTree::from_json(text, &mut Dice::default()).unwrap();
        assert_eq!(tree.find_first_placeholder().unwrap().name(), "Gone");
    }

    #[test]
    fn rejects_bad_input() {
        let mut dice = Dice::default();
        for text in [
            "not json",
            r#"{"type":"fixed_number","number":1}"#,
            r#"{"type":"pool_list","operation":"/","children":[]}"#,
            r#"{"type":"dice_pool","die":"D6"}"#,
        ] {
            assert!(
                matches!(PoolTree::from_json(text, &mut dice), Err(PoolError::CorruptData(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn placeholders_cannot_be_saved() {
        let tree = PoolTree::default_pool(Arc::new(DieType::placeholder("Lost")));
        assert!(matches!(tree.to_json(), Err(PoolError::InvalidOperation(_))));
    }

    proptest! {
        #[test]
        fn round_trip_keeps_structure(s in shape()) {
            let tree = build(&s);
            let record = tree.to_record().unwrap();
            let names: Vec<(String, i32)> = tree
                .walk()
                .into_iter()
                .filter_map(|id| match tree.value(id) {
                    Some(PoolValue::Dice(p)) => Some((p.die_type.name().to_string(), p.die_type.max_result())),
                    _ => None,
                })
                .collect();
            let mut dice = Dice::default();
            for (name, max) in &names {
                dice.known.insert(name.clone(), die(name, *max));
            }
            let loaded = PoolTree::from_json(&tree.to_json().unwrap(), &mut dice).unwrap();
            loaded.check_links().unwrap();
            prop_assert_eq!(loaded.to_record().unwrap(), record);
            prop_assert_eq!(loaded.config_result().unwrap(), tree.config_result().unwrap());
        }
    }
}
