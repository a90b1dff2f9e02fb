use serde::Serialize;

use crate::engine::EngineError;
use crate::limits::*;
use crate::model::{AgeCategory, CategoryCode};

/// Validated, immutable list of person categories.
///
/// Passed explicitly into every generator call; there is no global catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: Vec<AgeCategory>,
}

impl Catalog {
    /// Build a catalog, rejecting shapes that would corrupt rule generation:
    /// a missing or repeated ADL, duplicate codes, empty age ranges.
    pub fn new(categories: Vec<AgeCategory>) -> Result<Self, EngineError> {
        if categories.len() > MAX_CATEGORIES {
            return Err(EngineError::LimitExceeded("too many categories"));
        }
        for (i, category) in categories.iter().enumerate() {
            if category.age_from >= category.age_to {
                return Err(EngineError::InvalidCatalog(format!(
                    "{} has empty age range {}-{}",
                    category.code, category.age_from, category.age_to
                )));
            }
            if category.label.len() > MAX_LABEL_LEN {
                return Err(EngineError::LimitExceeded("category label too long"));
            }
            if categories[..i].iter().any(|c| c.code == category.code) {
                return Err(EngineError::InvalidCatalog(format!(
                    "duplicate category {}",
                    category.code
                )));
            }
        }
        if !categories.iter().any(|c| c.code == CategoryCode::Adl) {
            return Err(EngineError::InvalidCatalog("missing ADL category".into()));
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[AgeCategory] {
        &self.categories
    }

    pub fn get(&self, code: CategoryCode) -> Option<&AgeCategory> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Child categories in catalog order. This order drives combination order.
    pub fn children(&self) -> Vec<&AgeCategory> {
        self.categories.iter().filter(|c| c.code.is_child()).collect()
    }

    pub fn child_codes(&self) -> Vec<CategoryCode> {
        self.children().into_iter().map(|c| c.code).collect()
    }

    /// Copy with every label replaced by its auto label.
    pub fn relabeled(&self) -> Self {
        let categories = self
            .categories
            .iter()
            .map(|c| AgeCategory {
                label: auto_label(c),
                ..c.clone()
            })
            .collect();
        Self { categories }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            categories: vec![
                AgeCategory::new(CategoryCode::Adl, "Odrasli", 18, 99),
                AgeCategory::new(CategoryCode::Chd1, "Deca 2-7", 2, 7),
                AgeCategory::new(CategoryCode::Chd2, "Deca 7-12", 7, 12),
                AgeCategory::new(CategoryCode::Chd3, "Deca 12-18", 12, 18),
                AgeCategory::new(CategoryCode::Inf, "Beba 0-2", 0, 2),
            ],
        }
    }
}

impl TryFrom<Vec<AgeCategory>> for Catalog {
    type Error = EngineError;

    fn try_from(categories: Vec<AgeCategory>) -> Result<Self, Self::Error> {
        Self::new(categories)
    }
}

/// Label derived from code and age range, as shown on the category editor.
pub fn auto_label(category: &AgeCategory) -> String {
    let (from, to) = (category.age_from, category.age_to);
    match category.code {
        CategoryCode::Adl => format!("Odrasli ({from}-{to})"),
        CategoryCode::Inf => format!("Beba ({from}-{to})"),
        code => format!("{code} ({from}-{to})"),
    }
}
