use serde::{Deserialize, Serialize};

use crate::limits::*;
use crate::model::*;

use super::EngineError;

// ── Rule factory ─────────────────────────────────────────────────

/// Content address of an assignment: `"{b|e}{index}_{CODE}"` per occupant, joined by `_`.
/// Occupant order matters.
pub fn rule_id(assignment: &[BedOccupant]) -> String {
    assignment
        .iter()
        .map(|o| format!("{}{}_{}", o.bed_type.initial(), o.bed_index, o.person_category))
        .collect::<Vec<_>>()
        .join("_")
}

/// A fresh, active, unpriced rule for the assignment.
pub fn create_rule(assignment: BedAssignment) -> PricingRule {
    PricingRule {
        id: rule_id(&assignment),
        is_active: true,
        bed_assignment: assignment,
        base_price: 0.0,
        discounts: Vec::new(),
        surcharges: Vec::new(),
        final_price: 0.0,
        notes: None,
    }
}

// ── Price calculation ────────────────────────────────────────────

/// Discounts then surcharges, in list order, each against the running price.
/// The result never goes below zero. Pure; callers store it in `final_price`.
pub fn calculate_final_price(rule: &PricingRule) -> f64 {
    let mut price = rule.base_price;
    for discount in &rule.discounts {
        price -= discount.magnitude(price);
    }
    for surcharge in &rule.surcharges {
        price += surcharge.magnitude(price);
    }
    price.max(0.0)
}

/// Recompute `final_price` on one rule.
pub fn reprice(rule: &mut PricingRule) {
    rule.final_price = calculate_final_price(rule);
}

// ── Rule edits ───────────────────────────────────────────────────

/// Partial edit of a rule. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Vec<Discount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharges: Option<Vec<Surcharge>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Merge `update` into the rule with `rule_id` and recompute its final price.
pub fn update_rule(
    pricing: &mut RoomTypePricing,
    rule_id: &str,
    update: RuleUpdate,
) -> Result<(), EngineError> {
    if let Some(base) = update.base_price
        && !(base.is_finite() && base >= 0.0)
    {
        return Err(EngineError::InvalidPrice(base));
    }
    if let Some(ref notes) = update.notes
        && notes.len() > MAX_LABEL_LEN
    {
        return Err(EngineError::LimitExceeded("notes too long"));
    }

    let rule = pricing
        .pricing_rules
        .iter_mut()
        .find(|r| r.id == rule_id)
        .ok_or_else(|| EngineError::RuleNotFound(rule_id.to_string()))?;

    if let Some(active) = update.is_active {
        rule.is_active = active;
    }
    if let Some(base) = update.base_price {
        rule.base_price = base;
    }
    if let Some(discounts) = update.discounts {
        rule.discounts = discounts;
    }
    if let Some(surcharges) = update.surcharges {
        rule.surcharges = surcharges;
    }
    if let Some(notes) = update.notes {
        rule.notes = if notes.is_empty() { None } else { Some(notes) };
    }
    reprice(rule);
    Ok(())
}

/// Recompute every rule's final price.
pub fn recompute_all(pricing: &mut RoomTypePricing) {
    pricing.pricing_rules.iter_mut().for_each(reprice);
}

/// Set one base price on every rule of the room type and reprice them.
pub fn set_base_price(pricing: &mut RoomTypePricing, price: f64) -> Result<(), EngineError> {
    if !(price.is_finite() && price >= 0.0) {
        return Err(EngineError::InvalidPrice(price));
    }
    for rule in &mut pricing.pricing_rules {
        rule.base_price = price;
        reprice(rule);
    }
    Ok(())
}
