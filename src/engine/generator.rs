use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::assignment::{build_assignment, overflow};
use super::combinations::{combinations, result_count, ChildOrdering};
use super::rules::create_rule;
use super::variants::resolve_allowed;
use super::EngineError;

/// Something the operator should see after a regeneration. None of these stop it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// An allowed key that no longer parses or matches the bed layout.
    OrphanedKey { key: String },
    /// Children were requested but the catalog has no child categories.
    Infeasible { key: String, children: u32 },
}

impl GenerationWarning {
    pub fn label(&self) -> &'static str {
        match self {
            GenerationWarning::OrphanedKey { .. } => "orphaned_key",
            GenerationWarning::Infeasible { .. } => "infeasible",
        }
    }
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::OrphanedKey { key } => {
                write!(f, "variant {key} does not match the current bed layout")
            }
            GenerationWarning::Infeasible { key, children } => write!(
                f,
                "variant {key} needs {children} children but the catalog has no child categories"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedRules {
    pub rules: Vec<PricingRule>,
    pub warnings: Vec<GenerationWarning>,
}

/// Build the rule set for a room type from its allowed variants.
///
/// Variants are processed in toggle order and child sequences in generator
/// order, so an unchanged room and catalog always yield the same ids in the
/// same order. Rules repeating an earlier id are dropped.
pub fn generate_rules(
    room: &RoomType,
    catalog: &Catalog,
    ordering: ChildOrdering,
) -> Result<GeneratedRules, EngineError> {
    room.validate()?;
    let children = catalog.child_codes();
    let resolution = resolve_allowed(room);

    let projected: u64 = resolution
        .resolved
        .iter()
        .map(|v| result_count(children.len(), v.key.children as usize, ordering))
        .fold(0, u64::saturating_add);
    if projected > MAX_RULES_PER_ROOM_TYPE {
        return Err(EngineError::LimitExceeded("too many pricing rules for room type"));
    }

    let mut out = GeneratedRules::default();
    for key in resolution.orphaned {
        out.warnings.push(GenerationWarning::OrphanedKey { key: key.to_string() });
    }

    let mut seen = HashSet::new();
    for variant in &resolution.resolved {
        let setup = variant.setup;
        let sequences = combinations(&children, variant.key.children as usize, ordering);
        if sequences.is_empty() {
            out.warnings.push(GenerationWarning::Infeasible {
                key: variant.raw.to_string(),
                children: variant.key.children,
            });
            continue;
        }

        // Resolution matched the key's total to the setup's, so nobody is truncated.
        debug_assert_eq!(
            overflow(setup.basic, setup.extra, variant.key.adults, variant.key.children as usize),
            0
        );

        let before = out.rules.len();
        for sequence in &sequences {
            let assignment =
                build_assignment(setup.basic, setup.extra, variant.key.adults, sequence);
            let rule = create_rule(assignment);
            if seen.insert(rule.id.clone()) {
                out.rules.push(rule);
            }
        }
        debug!(
            "variant {} on setup {}: {} sequences, {} new rules",
            variant.raw,
            setup.id,
            sequences.len(),
            out.rules.len() - before
        );
    }

    for warning in &out.warnings {
        warn!("room {}: {warning}", room.room_type_id);
        metrics::counter!(observability::GENERATION_WARNINGS_TOTAL, "kind" => warning.label())
            .increment(1);
    }
    metrics::counter!(observability::RULES_GENERATED_TOTAL).increment(out.rules.len() as u64);
    Ok(out)
}

/// Regenerate the room type's rules and replace its entry in the price list.
///
/// Destructive: prices edited on the previous rule set are discarded. Other
/// room types are untouched and the entry keeps its position when it exists.
pub fn regenerate(
    price_list: &mut PriceList,
    room: &RoomType,
    catalog: &Catalog,
    ordering: ChildOrdering,
) -> Result<Vec<GenerationWarning>, EngineError> {
    let generated = generate_rules(room, catalog, ordering)?;
    let pricing = RoomTypePricing {
        room_type_id: room.room_type_id.clone(),
        room_type_name: room.name.clone(),
        base_occupancy_variants: room.allowed_occupancy_variants.clone(),
        pricing_rules: generated.rules,
        base_room_price: room.base_room_price,
    };

    info!(
        "regenerated {} rules for room {} ({:?})",
        pricing.pricing_rules.len(),
        room.room_type_id,
        ordering
    );
    match price_list.room_type_pricing_mut(&room.room_type_id) {
        Some(existing) => *existing = pricing,
        None => price_list.room_type_pricing.push(pricing),
    }
    Ok(generated.warnings)
}
