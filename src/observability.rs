//! Metric names. The library only records; embedding applications install
//! the recorder (any `metrics` exporter).

/// Counter: pricing rules produced by regeneration.
pub const RULES_GENERATED_TOTAL: &str = "bedrate_rules_generated_total";

/// Counter: generation warnings. Labels: kind.
pub const GENERATION_WARNINGS_TOTAL: &str = "bedrate_generation_warnings_total";

/// Counter: rules whose base price was set from a pricing matrix.
pub const RULES_REPRICED_TOTAL: &str = "bedrate_rules_repriced_total";
