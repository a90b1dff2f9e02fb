use crate::model::*;

/// Human-readable problems with a price list, typically one fresh from an import.
/// An empty result means the list can be used for rule generation.
pub fn validate_price_list(price_list: &PriceList) -> Vec<String> {
    let mut errors = Vec::new();
    let categories = &price_list.person_categories;

    if categories.is_empty() {
        errors.push("No person categories found".to_string());
    }
    match categories.iter().filter(|c| c.code == CategoryCode::Adl).count() {
        0 => errors.push("Missing ADL (Adult) category".to_string()),
        1 => {}
        n => errors.push(format!("Expected one ADL (Adult) category, found {n}")),
    }
    for category in categories {
        if category.age_from >= category.age_to {
            errors.push(format!(
                "Invalid age range for {}: {}-{}",
                category.label, category.age_from, category.age_to
            ));
        }
    }
    if price_list.room_type_pricing.is_empty() {
        errors.push("No room type pricing found".to_string());
    }
    for matrix in &price_list.pricing_matrices {
        for room_type_id in &matrix.room_type_ids {
            if price_list.room_type_pricing(room_type_id).is_none() {
                errors.push(format!(
                    "Matrix {} targets unknown room type {room_type_id}",
                    matrix.name
                ));
            }
        }
    }

    errors
}
