pub mod budget;

pub use budget::{compute_budget, translation_max_length, LengthBudget};
