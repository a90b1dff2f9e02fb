use std::fmt;

use serde::Serialize;

use crate::limits::MAX_BEDS_PER_SETUP;
use crate::model::*;

use super::EngineError;

// ── Occupancy variants ───────────────────────────────────────────

/// What the occupancy table shows in one bed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanMark {
    #[serde(rename = "ADL")]
    Adult,
    #[serde(rename = "CHD")]
    Child,
    #[serde(rename = "-")]
    Empty,
}

impl fmt::Display for PlanMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlanMark::Adult => "ADL",
            PlanMark::Child => "CHD",
            PlanMark::Empty => "-",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedBed {
    pub bed_type: BedType,
    pub bed_index: u32,
    pub mark: PlanMark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyVariant {
    pub key: VariantKey,
    pub plan: Vec<PlannedBed>,
}

impl OccupancyVariant {
    pub fn adults(&self) -> u32 {
        self.key.adults
    }

    pub fn children(&self) -> u32 {
        self.key.children
    }
}

/// Every (adults, children) split that fills the setup exactly, adults ascending.
/// A setup with no beds, or more beds than a setup may have, yields nothing.
pub fn derive_variants(setup: &BedSetup) -> Vec<OccupancyVariant> {
    let total = setup.total();
    if total > MAX_BEDS_PER_SETUP {
        return Vec::new();
    }
    (1..=total)
        .map(|adults| {
            let children = total - adults;
            OccupancyVariant {
                key: VariantKey::new(setup.id.clone(), adults, children),
                plan: bed_plan(setup, adults, children),
            }
        })
        .collect()
}

/// Generic ADL/CHD layout for display: basic slots first, adults before children.
/// Empty for setups over the bed limit.
pub fn bed_plan(setup: &BedSetup, adults: u32, children: u32) -> Vec<PlannedBed> {
    if setup.total() > MAX_BEDS_PER_SETUP {
        return Vec::new();
    }
    let mut adults_left = adults;
    let mut children_left = children;
    let slots = (0..setup.basic)
        .map(|i| (BedType::Basic, i))
        .chain((0..setup.extra).map(|i| (BedType::Extra, i)));

    slots
        .map(|(bed_type, bed_index)| {
            let mark = if adults_left > 0 {
                adults_left -= 1;
                PlanMark::Adult
            } else if children_left > 0 {
                children_left -= 1;
                PlanMark::Child
            } else {
                PlanMark::Empty
            };
            PlannedBed {
                bed_type,
                bed_index,
                mark,
            }
        })
        .collect()
}

// ── Occupancy table ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyRow {
    pub setup_id: String,
    pub key: String,
    pub adults: u32,
    pub children: u32,
    pub plan: Vec<PlannedBed>,
    pub allowed: bool,
    pub child_sharing: bool,
    /// Headcount shown to the operator; a sharing child adds one without a bed.
    pub display_headcount: u32,
}

/// Rows for every setup of the room, recomputed from the bed layout on each call.
pub fn occupancy_table(room: &RoomType) -> Vec<OccupancyRow> {
    let mut rows = Vec::new();
    for setup in &room.bed_setups {
        for variant in derive_variants(setup) {
            let allowed = is_toggled(room, &room.allowed_occupancy_variants, setup, &variant.key);
            let child_sharing =
                allowed && is_toggled(room, &room.child_sharing_variants, setup, &variant.key);
            let total = setup.total();
            rows.push(OccupancyRow {
                setup_id: setup.id.clone(),
                key: variant.key.to_string(),
                adults: variant.adults(),
                children: variant.children(),
                plan: variant.plan,
                allowed,
                child_sharing,
                display_headcount: if child_sharing { total + 1 } else { total },
            });
        }
    }
    rows
}

fn is_toggled(room: &RoomType, keys: &[String], setup: &BedSetup, variant: &VariantKey) -> bool {
    let target = Some((setup.id.clone(), variant.adults, variant.children));
    keys.iter().any(|raw| variant_identity(room, raw) == target)
}

// ── Resolving operator toggles ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant<'a> {
    /// The key exactly as the operator stored it.
    pub raw: &'a str,
    pub setup: &'a BedSetup,
    pub key: VariantKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub resolved: Vec<ResolvedVariant<'a>>,
    /// Keys that no longer parse or no longer match a derivable variant.
    pub orphaned: Vec<&'a str>,
}

/// Resolve the room's allowed keys against its current bed layout, in toggle order.
///
/// Prefixed keys must name an existing setup whose total matches. Legacy keys
/// without a setup id resolve to the first setup with a matching total.
pub fn resolve_allowed(room: &RoomType) -> Resolution<'_> {
    let mut resolution = Resolution::default();
    for raw in &room.allowed_occupancy_variants {
        match resolve_key(room, raw) {
            Some((setup, key)) => resolution.resolved.push(ResolvedVariant { raw, setup, key }),
            None => resolution.orphaned.push(raw),
        }
    }
    resolution
}

fn resolve_key<'a>(room: &'a RoomType, raw: &str) -> Option<(&'a BedSetup, VariantKey)> {
    let key: VariantKey = raw.parse().ok()?;
    let setup = match &key.setup_id {
        Some(id) => room.setup(id).filter(|s| s.total() == key.total())?,
        None => room.bed_setups.iter().find(|s| s.total() == key.total())?,
    };
    Some((setup, key))
}

/// Setup id and head counts a stored key stands for, if it still resolves.
fn variant_identity(room: &RoomType, raw: &str) -> Option<(String, u32, u32)> {
    resolve_key(room, raw).map(|(setup, key)| (setup.id.clone(), key.adults, key.children))
}

/// Entries of `keys` naming the same variant as `key`: the key itself, or any
/// stored key that resolves to the same setup and head counts.
fn matching_keys(room: &RoomType, keys: &[String], key: &str) -> Vec<String> {
    let target = variant_identity(room, key);
    keys.iter()
        .filter(|stored| {
            stored.as_str() == key || (target.is_some() && variant_identity(room, stored) == target)
        })
        .cloned()
        .collect()
}

/// Flip a variant's allowed flag. Returns the new state.
///
/// Stored keys are matched by the variant they resolve to, so a legacy key is
/// disallowed through the prefixed key the occupancy table shows for it.
/// Disallowing also clears the variant's child-sharing flag.
pub fn toggle_allowed(room: &mut RoomType, key: &str) -> Result<bool, EngineError> {
    key.parse::<VariantKey>()?;
    let allowed = matching_keys(room, &room.allowed_occupancy_variants, key);
    if allowed.is_empty() {
        room.allowed_occupancy_variants.push(key.to_string());
        return Ok(true);
    }
    let sharing = matching_keys(room, &room.child_sharing_variants, key);
    room.allowed_occupancy_variants.retain(|k| !allowed.contains(k));
    room.child_sharing_variants.retain(|k| !sharing.contains(k));
    Ok(false)
}

/// Set the child-sharing flag of an allowed variant.
pub fn set_child_sharing(
    room: &mut RoomType,
    key: &str,
    sharing: bool,
) -> Result<(), EngineError> {
    key.parse::<VariantKey>()?;
    let existing = matching_keys(room, &room.child_sharing_variants, key);
    if !sharing {
        room.child_sharing_variants.retain(|k| !existing.contains(k));
        return Ok(());
    }
    if matching_keys(room, &room.allowed_occupancy_variants, key).is_empty() {
        return Err(EngineError::VariantNotAllowed(key.to_string()));
    }
    if existing.is_empty() {
        room.child_sharing_variants.push(key.to_string());
    }
    Ok(())
}
