use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::limits::*;

/// Unix milliseconds. The only time type.
pub type Ms = i64;

// ── Person categories ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryCode {
    #[serde(rename = "ADL")]
    Adl,
    #[serde(rename = "CHD1")]
    Chd1,
    #[serde(rename = "CHD2")]
    Chd2,
    #[serde(rename = "CHD3")]
    Chd3,
    #[serde(rename = "INF")]
    Inf,
}

impl CategoryCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryCode::Adl => "ADL",
            CategoryCode::Chd1 => "CHD1",
            CategoryCode::Chd2 => "CHD2",
            CategoryCode::Chd3 => "CHD3",
            CategoryCode::Inf => "INF",
        }
    }

    /// Only CHD-coded categories fill child slots; infants never do.
    pub fn is_child(&self) -> bool {
        matches!(self, CategoryCode::Chd1 | CategoryCode::Chd2 | CategoryCode::Chd3)
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADL" => Ok(CategoryCode::Adl),
            "CHD1" => Ok(CategoryCode::Chd1),
            "CHD2" => Ok(CategoryCode::Chd2),
            "CHD3" => Ok(CategoryCode::Chd3),
            "INF" => Ok(CategoryCode::Inf),
            other => Err(EngineError::InvalidKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeCategory {
    pub code: CategoryCode,
    pub label: String,
    pub age_from: u32,
    pub age_to: u32,
}

impl AgeCategory {
    pub fn new(code: CategoryCode, label: impl Into<String>, age_from: u32, age_to: u32) -> Self {
        Self {
            code,
            label: label.into(),
            age_from,
            age_to,
        }
    }
}

// ── Bed layout ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedType {
    Basic,
    Extra,
}

impl BedType {
    /// First letter of the type name, used in rule ids.
    pub fn initial(&self) -> char {
        match self {
            BedType::Basic => 'b',
            BedType::Extra => 'e',
        }
    }

    /// Prefix used by matrix slot keys.
    pub fn slot_prefix(&self) -> &'static str {
        match self {
            BedType::Basic => "BASIC",
            BedType::Extra => "EXTRA",
        }
    }
}

/// One bed configuration of a room: `basic` primary beds plus `extra` beds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedSetup {
    pub id: String,
    pub basic: u32,
    pub extra: u32,
}

impl BedSetup {
    pub fn new(id: impl Into<String>, basic: u32, extra: u32) -> Result<Self, EngineError> {
        let setup = Self {
            id: id.into(),
            basic,
            extra,
        };
        setup.validate()?;
        Ok(setup)
    }

    /// Beds in the setup, saturating for setups that never went through `validate`.
    pub fn total(&self) -> u32 {
        self.basic.saturating_add(self.extra)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id.is_empty() {
            return Err(EngineError::InvalidBedSetup("setup id must not be empty".into()));
        }
        if self.id.len() > MAX_ID_LEN {
            return Err(EngineError::LimitExceeded("setup id too long"));
        }
        if self.total() > MAX_BEDS_PER_SETUP {
            return Err(EngineError::LimitExceeded("too many beds in setup"));
        }
        Ok(())
    }
}

/// A room type as the operator edits it: bed setups plus occupancy toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub room_type_id: String,
    pub name: String,
    #[serde(default)]
    pub bed_setups: Vec<BedSetup>,
    #[serde(default)]
    pub allowed_occupancy_variants: Vec<String>,
    #[serde(default)]
    pub child_sharing_variants: Vec<String>,
    #[serde(default)]
    pub base_room_price: f64,
}

impl RoomType {
    pub fn new(room_type_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            room_type_id: room_type_id.into(),
            name: name.into(),
            bed_setups: Vec::new(),
            allowed_occupancy_variants: Vec::new(),
            child_sharing_variants: Vec::new(),
            base_room_price: 0.0,
        }
    }

    /// Validate every setup. Called when a room is ingested, before any derivation.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.bed_setups.len() > MAX_SETUPS_PER_ROOM {
            return Err(EngineError::LimitExceeded("too many bed setups"));
        }
        for setup in &self.bed_setups {
            setup.validate()?;
        }
        Ok(())
    }

    pub fn setup(&self, id: &str) -> Option<&BedSetup> {
        self.bed_setups.iter().find(|s| s.id == id)
    }
}

// ── Keys ─────────────────────────────────────────────────────────

/// Parsed form of `"{setupId}_{a}ADL_{c}CHD"`. Legacy keys have no setup id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub setup_id: Option<String>,
    pub adults: u32,
    pub children: u32,
}

impl VariantKey {
    pub fn new(setup_id: impl Into<String>, adults: u32, children: u32) -> Self {
        Self {
            setup_id: Some(setup_id.into()),
            adults,
            children,
        }
    }

    pub fn total(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(setup_id) = &self.setup_id {
            write!(f, "{setup_id}_")?;
        }
        write!(f, "{}ADL_{}CHD", self.adults, self.children)
    }
}

impl FromStr for VariantKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidKey(s.to_string());

        // Setup ids may contain underscores, so peel the two counts off the right.
        let (rest, children) = s.rsplit_once('_').ok_or_else(invalid)?;
        let children = children
            .strip_suffix("CHD")
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let (setup_id, adults) = match rest.rsplit_once('_') {
            Some((setup_id, adults)) => (Some(setup_id), adults),
            None => (None, rest),
        };
        let adults = adults
            .strip_suffix("ADL")
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        if adults == 0 {
            return Err(invalid());
        }
        if setup_id.is_some_and(str::is_empty) {
            return Err(invalid());
        }

        Ok(Self {
            setup_id: setup_id.map(str::to_string),
            adults,
            children,
        })
    }
}

/// Parsed form of a matrix slot key, `"BASIC_1"` / `"EXTRA_2"`. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotKey {
    pub bed_type: BedType,
    pub index: u32,
}

impl SlotKey {
    pub fn new(bed_type: BedType, index: u32) -> Self {
        Self { bed_type, index }
    }

    pub fn for_occupant(occupant: &BedOccupant) -> Self {
        Self {
            bed_type: occupant.bed_type,
            index: occupant.bed_index.saturating_add(1),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.bed_type.slot_prefix(), self.index)
    }
}

impl FromStr for SlotKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidKey(s.to_string());
        let (prefix, index) = s.split_once('_').ok_or_else(invalid)?;
        let bed_type = match prefix {
            "BASIC" => BedType::Basic,
            "EXTRA" => BedType::Extra,
            _ => return Err(invalid()),
        };
        let index = index.parse::<u32>().map_err(|_| invalid())?;
        if index == 0 {
            return Err(invalid());
        }
        Ok(Self { bed_type, index })
    }
}

impl TryFrom<String> for SlotKey {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.to_string()
    }
}

// ── Assignments and rules ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedOccupant {
    pub bed_type: BedType,
    pub bed_index: u32,
    pub person_category: CategoryCode,
}

impl BedOccupant {
    pub fn new(bed_type: BedType, bed_index: u32, person_category: CategoryCode) -> Self {
        Self {
            bed_type,
            bed_index,
            person_category,
        }
    }
}

pub type BedAssignment = Vec<BedOccupant>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    EarlyBooking,
    ChildDiscount,
    LastMinute,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeKind {
    SingleUse,
    ExtraBed,
    SeaView,
    Custom,
}

/// Shared shape of discounts and surcharges: a fixed amount or a percentage of the running price.
pub trait Adjustment {
    fn amount(&self) -> Option<f64>;
    fn percentage(&self) -> Option<f64>;

    /// Magnitude of the adjustment against `running`. A zero amount counts as unset.
    fn magnitude(&self, running: f64) -> f64 {
        match (self.amount(), self.percentage()) {
            (Some(amount), _) if amount != 0.0 => amount,
            (_, Some(pct)) if pct != 0.0 => running * pct / 100.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl Discount {
    pub fn fixed(kind: DiscountKind, label: impl Into<String>, amount: f64) -> Self {
        Self {
            kind,
            label: label.into(),
            amount: Some(amount),
            percentage: None,
        }
    }

    pub fn percent(kind: DiscountKind, label: impl Into<String>, percentage: f64) -> Self {
        Self {
            kind,
            label: label.into(),
            amount: None,
            percentage: Some(percentage),
        }
    }
}

impl Adjustment for Discount {
    fn amount(&self) -> Option<f64> {
        self.amount
    }

    fn percentage(&self) -> Option<f64> {
        self.percentage
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surcharge {
    #[serde(rename = "type")]
    pub kind: SurchargeKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl Surcharge {
    pub fn fixed(kind: SurchargeKind, label: impl Into<String>, amount: f64) -> Self {
        Self {
            kind,
            label: label.into(),
            amount: Some(amount),
            percentage: None,
        }
    }

    pub fn percent(kind: SurchargeKind, label: impl Into<String>, percentage: f64) -> Self {
        Self {
            kind,
            label: label.into(),
            amount: None,
            percentage: Some(percentage),
        }
    }
}

impl Adjustment for Surcharge {
    fn amount(&self) -> Option<f64> {
        self.amount
    }

    fn percentage(&self) -> Option<f64> {
        self.percentage
    }
}

/// A bed assignment with its price. `final_price` is only correct after
/// `engine::calculate_final_price` has been re-run by whoever mutated the rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    pub id: String,
    pub is_active: bool,
    pub bed_assignment: BedAssignment,
    pub base_price: f64,
    #[serde(default)]
    pub discounts: Vec<Discount>,
    #[serde(default)]
    pub surcharges: Vec<Surcharge>,
    pub final_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypePricing {
    pub room_type_id: String,
    pub room_type_name: String,
    #[serde(default)]
    pub base_occupancy_variants: Vec<String>,
    #[serde(default)]
    pub pricing_rules: Vec<PricingRule>,
    /// Scalar base price the matrix applier scales percent cells against.
    #[serde(default)]
    pub base_room_price: f64,
}

impl RoomTypePricing {
    pub fn rule(&self, id: &str) -> Option<&PricingRule> {
        self.pricing_rules.iter().find(|r| r.id == id)
    }
}

// ── Pricing matrix ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Percent,
    Fixed,
    Free,
    /// Any unrecognised type. Contributes nothing.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    #[serde(rename = "type")]
    pub kind: CellKind,
    #[serde(default)]
    pub value: f64,
}

impl MatrixCell {
    pub fn percent(value: f64) -> Self {
        Self { kind: CellKind::Percent, value }
    }

    pub fn fixed(value: f64) -> Self {
        Self { kind: CellKind::Fixed, value }
    }

    pub fn free() -> Self {
        Self { kind: CellKind::Free, value: 0.0 }
    }
}

pub type MatrixGrid = BTreeMap<SlotKey, BTreeMap<CategoryCode, MatrixCell>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingMatrixContext {
    pub id: String,
    pub base_adults: u32,
    pub label: String,
    #[serde(default)]
    pub grid: MatrixGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingMatrix {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contexts: Vec<PricingMatrixContext>,
    #[serde(default)]
    pub room_type_ids: Vec<String>,
}

// ── Price list ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceList {
    pub id: String,
    pub name: String,
    pub property_id: String,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<Ms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<Ms>,
    #[serde(default)]
    pub person_categories: Vec<AgeCategory>,
    #[serde(default)]
    pub room_type_pricing: Vec<RoomTypePricing>,
    #[serde(default)]
    pub pricing_matrices: Vec<PricingMatrix>,
}

impl PriceList {
    pub fn room_type_pricing(&self, room_type_id: &str) -> Option<&RoomTypePricing> {
        self.room_type_pricing.iter().find(|p| p.room_type_id == room_type_id)
    }

    pub fn room_type_pricing_mut(&mut self, room_type_id: &str) -> Option<&mut RoomTypePricing> {
        self.room_type_pricing.iter_mut().find(|p| p.room_type_id == room_type_id)
    }

    pub fn matrix(&self, id: &str) -> Option<&PricingMatrix> {
        self.pricing_matrices.iter().find(|m| m.id == id)
    }
}

/// File shape used by the operator tool: the rooms plus the price list they feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceListDocument {
    #[serde(default)]
    pub rooms: Vec<RoomType>,
    pub price_list: PriceList,
}

impl PriceListDocument {
    pub fn room(&self, room_type_id: &str) -> Option<&RoomType> {
        self.rooms.iter().find(|r| r.room_type_id == room_type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_key_with_setup_round_trips() {
        let key: VariantKey = "twin_extra_2ADL_1CHD".parse().unwrap();
        assert_eq!(key.setup_id.as_deref(), Some("twin_extra"));
        assert_eq!(key.adults, 2);
        assert_eq!(key.children, 1);
        assert_eq!(key.to_string(), "twin_extra_2ADL_1CHD");
    }

    #[test]
    fn variant_key_legacy_form_has_no_setup() {
        let key: VariantKey = "2ADL_0CHD".parse().unwrap();
        assert_eq!(key.setup_id, None);
        assert_eq!(key.total(), 2);
        assert_eq!(key.to_string(), "2ADL_0CHD");
    }

    #[test]
    fn variant_key_rejects_garbage() {
        for bad in ["", "2+1", "s1_0ADL_2CHD", "s1_xADL_1CHD", "s1_2ADL_1", "_2ADL_1CHD"] {
            assert!(
                matches!(bad.parse::<VariantKey>(), Err(EngineError::InvalidKey(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn slot_key_parse_and_display() {
        let key: SlotKey = "EXTRA_2".parse().unwrap();
        assert_eq!(key, SlotKey::new(BedType::Extra, 2));
        assert_eq!(key.to_string(), "EXTRA_2");
        assert!("EXTRA_0".parse::<SlotKey>().is_err());
        assert!("SOFA_1".parse::<SlotKey>().is_err());
    }

    #[test]
    fn slot_key_for_occupant_is_one_based() {
        let occ = BedOccupant::new(BedType::Basic, 0, CategoryCode::Adl);
        assert_eq!(SlotKey::for_occupant(&occ).to_string(), "BASIC_1");
    }

    #[test]
    fn negative_bed_counts_fail_at_the_boundary() {
        let result: Result<BedSetup, _> = serde_json::from_str(r#"{"id":"s1","basic":-1,"extra":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn bed_setup_limits() {
        assert!(BedSetup::new("s1", 2, 1).is_ok());
        assert!(matches!(BedSetup::new("", 2, 1), Err(EngineError::InvalidBedSetup(_))));
        assert!(matches!(
            BedSetup::new("s1", MAX_BEDS_PER_SETUP, 1),
            Err(EngineError::LimitExceeded(_))
        ));
    }

    #[test]
    fn matrix_grid_uses_string_keys_on_the_wire() {
        let json = r#"{
            "id": "ctx1", "baseAdults": 2, "label": "2+1",
            "grid": {
                "BASIC_1": {"ADL": {"type": "percent", "value": 50}},
                "EXTRA_1": {"CHD1": {"type": "bogus", "value": 10}}
            }
        }"#;
        let ctx: PricingMatrixContext = serde_json::from_str(json).unwrap();
        let basic = &ctx.grid[&SlotKey::new(BedType::Basic, 1)];
        assert_eq!(basic[&CategoryCode::Adl], MatrixCell::percent(50.0));
        let extra = &ctx.grid[&SlotKey::new(BedType::Extra, 1)];
        assert_eq!(extra[&CategoryCode::Chd1].kind, CellKind::Unknown);

        let out = serde_json::to_value(&ctx).unwrap();
        assert!(out["grid"]["BASIC_1"]["ADL"].is_object());
    }

    #[test]
    fn pricing_rule_reads_editor_documents() {
        let json = r#"{
            "id": "b0_ADL", "isActive": true,
            "bedAssignment": [{"bedType": "basic", "bedIndex": 0, "personCategory": "ADL"}],
            "basePrice": 40, "finalPrice": 40
        }"#;
        let rule: PricingRule = serde_json::from_str(json).unwrap();
        assert!(rule.discounts.is_empty());
        assert_eq!(rule.bed_assignment[0].person_category, CategoryCode::Adl);
    }
}
