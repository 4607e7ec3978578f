pub mod invariants;
pub mod validation;

pub use invariants::check_parent_slot;
pub use validation::validate_graph;
