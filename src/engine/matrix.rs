use std::collections::BTreeMap;

use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::rules::reprice;
use super::EngineError;

// ── Copy-on-write editing ────────────────────────────────────────

impl PricingMatrixContext {
    pub fn new(base_adults: u32, label: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            base_adults,
            label: label.into(),
            grid: BTreeMap::new(),
        }
    }

    pub fn cell(&self, slot: SlotKey, code: CategoryCode) -> Option<&MatrixCell> {
        self.grid.get(&slot).and_then(|cells| cells.get(&code))
    }
}

impl PricingMatrix {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            contexts: Vec::new(),
            room_type_ids: Vec::new(),
        }
    }

    pub fn context(&self, id: &str) -> Option<&PricingMatrixContext> {
        self.contexts.iter().find(|c| c.id == id)
    }

    /// Copy with `context` added, or replacing the context with the same id.
    pub fn with_context(&self, context: PricingMatrixContext) -> Result<Self, EngineError> {
        if context.id.len() > MAX_ID_LEN {
            return Err(EngineError::LimitExceeded("context id too long"));
        }
        if context.label.len() > MAX_LABEL_LEN {
            return Err(EngineError::LimitExceeded("context label too long"));
        }
        let mut next = self.clone();
        match next.contexts.iter_mut().find(|c| c.id == context.id) {
            Some(existing) => *existing = context,
            None => next.contexts.push(context),
        }
        Ok(next)
    }

    /// Copy with one grid cell set.
    pub fn with_cell(
        &self,
        context_id: &str,
        slot: SlotKey,
        code: CategoryCode,
        cell: MatrixCell,
    ) -> Result<Self, EngineError> {
        let mut next = self.clone();
        let context = next.context_mut(context_id)?;
        context.grid.entry(slot).or_default().insert(code, cell);
        Ok(next)
    }

    /// Copy with one grid cell removed. A slot left without cells is removed too,
    /// so it no longer counts towards the context's slot count.
    pub fn without_cell(
        &self,
        context_id: &str,
        slot: SlotKey,
        code: CategoryCode,
    ) -> Result<Self, EngineError> {
        let mut next = self.clone();
        let context = next.context_mut(context_id)?;
        if let Some(cells) = context.grid.get_mut(&slot) {
            cells.remove(&code);
            if cells.is_empty() {
                context.grid.remove(&slot);
            }
        }
        Ok(next)
    }

    /// Copy that also targets `room_type_id`.
    pub fn with_target(&self, room_type_id: impl Into<String>) -> Self {
        let room_type_id = room_type_id.into();
        let mut next = self.clone();
        if !next.room_type_ids.contains(&room_type_id) {
            next.room_type_ids.push(room_type_id);
        }
        next
    }

    fn context_mut(&mut self, id: &str) -> Result<&mut PricingMatrixContext, EngineError> {
        self.contexts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::ContextNotFound(id.to_string()))
    }
}

// ── Matching and pricing ─────────────────────────────────────────

/// True when the context's grid has one slot per occupant and a cell for each
/// occupant's slot and category.
pub fn context_matches(context: &PricingMatrixContext, assignment: &[BedOccupant]) -> bool {
    context.grid.len() == assignment.len()
        && assignment
            .iter()
            .all(|o| context.cell(SlotKey::for_occupant(o), o.person_category).is_some())
}

/// `base_room_price * Σpercent / 100 + Σfixed` over the assignment's cells.
/// Free and unrecognised cells add nothing.
pub fn matrix_price(
    context: &PricingMatrixContext,
    assignment: &[BedOccupant],
    base_room_price: f64,
) -> f64 {
    let mut total_percent = 0.0;
    let mut total_fixed = 0.0;
    for occupant in assignment {
        let slot = SlotKey::for_occupant(occupant);
        let Some(cell) = context.cell(slot, occupant.person_category) else {
            continue;
        };
        match cell.kind {
            CellKind::Percent => total_percent += cell.value,
            CellKind::Fixed => total_fixed += cell.value,
            CellKind::Free | CellKind::Unknown => {}
        }
    }
    base_room_price * total_percent / 100.0 + total_fixed
}

/// Reprice the room type's rules from the matrix, returning an updated copy.
///
/// With `context_id` only that context is tried; otherwise contexts are tried in
/// order and the first match wins. Rules no context matches are left unchanged.
pub fn apply_matrix(
    matrix: &PricingMatrix,
    context_id: Option<&str>,
    pricing: &RoomTypePricing,
) -> Result<RoomTypePricing, EngineError> {
    let candidates: Vec<&PricingMatrixContext> = match context_id {
        Some(id) => vec![
            matrix
                .context(id)
                .ok_or_else(|| EngineError::ContextNotFound(id.to_string()))?,
        ],
        None => matrix.contexts.iter().collect(),
    };
    let (updated, repriced) = reprice_from(&candidates, pricing);
    debug!(
        "matrix {} repriced {repriced}/{} rules of {}",
        matrix.id,
        updated.pricing_rules.len(),
        updated.room_type_id
    );
    Ok(updated)
}

/// Apply a stored matrix to every room type it targets. Returns how many rules
/// a context matched.
pub fn apply_to_price_list(
    price_list: &mut PriceList,
    matrix_id: &str,
) -> Result<usize, EngineError> {
    let matrix = price_list
        .matrix(matrix_id)
        .cloned()
        .ok_or_else(|| EngineError::MatrixNotFound(matrix_id.to_string()))?;
    let candidates: Vec<&PricingMatrixContext> = matrix.contexts.iter().collect();

    let mut total = 0;
    for pricing in &mut price_list.room_type_pricing {
        if !matrix.room_type_ids.contains(&pricing.room_type_id) {
            continue;
        }
        let (updated, repriced) = reprice_from(&candidates, pricing);
        *pricing = updated;
        total += repriced;
    }
    info!(
        "matrix {} applied to {} room types, {total} rules repriced",
        matrix.id,
        matrix.room_type_ids.len()
    );
    Ok(total)
}

fn reprice_from(
    candidates: &[&PricingMatrixContext],
    pricing: &RoomTypePricing,
) -> (RoomTypePricing, usize) {
    let mut updated = pricing.clone();
    let mut repriced = 0;
    for rule in &mut updated.pricing_rules {
        let Some(context) = candidates
            .iter()
            .find(|c| context_matches(c, &rule.bed_assignment))
        else {
            continue;
        };
        rule.base_price = matrix_price(context, &rule.bed_assignment, pricing.base_room_price);
        reprice(rule);
        repriced += 1;
    }
    metrics::counter!(observability::RULES_REPRICED_TOTAL).increment(repriced as u64);
    (updated, repriced)
}
