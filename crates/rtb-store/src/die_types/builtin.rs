//! The die types every installation ships with.

use std::sync::Arc;

use rtb_core::{DieType, Face};

/// Sides of each built-in die, in menu order.
pub const BUILTIN_SIDES: [i32; 6] = [4, 6, 8, 10, 12, 20];

/// Position of the default die (`D6`) in [`builtin_types`].
pub const DEFAULT_TYPE_INDEX: usize = 1;

/// Built-in die types with their artwork faces (`d6_1` .. `d6_6`).
pub fn builtin_types() -> Vec<Arc<DieType>> {
    BUILTIN_SIDES
        .iter()
        .filter_map(|&sides| {
            let faces = (1..=sides)
                .map(|value| Face::Asset(format!("d{sides}_{value}")))
                .collect();
            DieType::new(format!("D{sides}"), 1, sides, faces).ok()
        })
        .map(Arc::new)
        .collect()
}
