mod assignment;
mod combinations;
mod error;
mod generator;
mod matrix;
mod rules;
mod validation;
mod variants;

pub use assignment::{build_assignment, overflow};
pub use combinations::{
    combination_count, combinations, permutation_count, result_count, ChildOrdering,
};
pub use error::EngineError;
pub use generator::{generate_rules, regenerate, GeneratedRules, GenerationWarning};
pub use matrix::{apply_matrix, apply_to_price_list, context_matches, matrix_price};
pub use rules::{
    calculate_final_price, create_rule, recompute_all, reprice, rule_id, set_base_price,
    update_rule, RuleUpdate,
};
pub use validation::validate_price_list;
pub use variants::{
    bed_plan, derive_variants, occupancy_table, resolve_allowed, set_child_sharing,
    toggle_allowed, OccupancyRow, OccupancyVariant, PlanMark, PlannedBed, Resolution,
    ResolvedVariant,
};
