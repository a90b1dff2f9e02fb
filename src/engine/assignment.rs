use crate::limits::MAX_BEDS_PER_SETUP;
use crate::model::*;

/// Place guests on concrete bed slots.
///
/// Basic beds fill before extra beds and adults before children, each in slot
/// order. Slots nobody takes are left out. Guests beyond the setup's capacity
/// are dropped; see [`overflow`].
pub fn build_assignment(
    basic: u32,
    extra: u32,
    adults: u32,
    children: &[CategoryCode],
) -> BedAssignment {
    let beds = basic.saturating_add(extra).min(MAX_BEDS_PER_SETUP);
    let mut assignment = Vec::with_capacity(beds as usize);
    let mut adults_placed = 0;
    let mut children_placed = 0;

    for (bed_type, slots) in [(BedType::Basic, basic), (BedType::Extra, extra)] {
        for bed_index in 0..slots {
            if adults_placed == adults && children_placed == children.len() {
                return assignment;
            }
            if adults_placed < adults {
                assignment.push(BedOccupant::new(bed_type, bed_index, CategoryCode::Adl));
                adults_placed += 1;
            } else if let Some(&child) = children.get(children_placed) {
                assignment.push(BedOccupant::new(bed_type, bed_index, child));
                children_placed += 1;
            }
        }
    }

    assignment
}

/// How many guests `build_assignment` would drop for lack of beds.
pub fn overflow(basic: u32, extra: u32, adults: u32, children: usize) -> u32 {
    let guests = adults as u64 + children as u64;
    guests.saturating_sub(basic as u64 + extra as u64) as u32
}
