//! Results of evaluating pool values and how they fold together.

use std::fmt;

use crate::die::{DieRollResult, Face};
use crate::operation::Operation;

/// The result of evaluating a pool value: a total, a printable expression,
/// and the faces of any dice rolled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DicePoolResult {
    total: i32,
    description: String,
    faces: Vec<Face>,
    // More than one term, so the description needs parentheses when nested.
    compound: bool,
}

impl DicePoolResult {
    /// An empty result. Concatenating anything onto it yields that thing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The result of a constant.
    pub fn fixed(value: i32) -> Self {
        Self {
            total: value,
            description: value.to_string(),
            faces: Vec::new(),
            compound: false,
        }
    }

    /// Numeric total.
    pub fn total(&self) -> i32 {
        self.total
    }

    /// The expression that produced the total, e.g. `(3+5)*2`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Faces of every die rolled, in roll order.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// True if this result has more than one term.
    pub fn is_compound(&self) -> bool {
        self.compound
    }

    /// True if nothing has contributed to this result.
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
    }

    /// Add one die to a dice-group result. Dice within a group always sum.
    pub fn add_roll(&mut self, roll: DieRollResult) {
        self.total = self.total.wrapping_add(roll.number);
        if self.description.is_empty() {
            self.description = roll.number.to_string();
        } else {
            self.description.push('+');
            self.description.push_str(&roll.number.to_string());
            self.compound = true;
        }
        self.faces.push(roll.face);
    }

    /// Append `other` after this result using `operation`.
    ///
    /// An empty side is absorbed, so a list with one child prints exactly
    /// like the child. Otherwise the totals combine as
    /// `operation(self, other)` and each compound side is parenthesized.
    pub fn concatenate(self, other: Self, operation: Operation) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }

        let mut faces = self.faces;
        faces.extend(other.faces);
        let description = format!(
            "{}{}{}",
            wrap(&self.description, self.compound),
            operation.symbol(),
            wrap(&other.description, other.compound)
        );
        Self {
            total: operation.apply(self.total, other.total),
            description,
            faces,
            compound: true,
        }
    }
}

fn wrap(description: &str, compound: bool) -> String {
    if compound {
        format!("({description})")
    } else {
        description.to_string()
    }
}

impl fmt::Display for DicePoolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "{}", self.total)
        } else {
            write!(f, "{} = {}", self.description, self.total)
        }
    }
}
