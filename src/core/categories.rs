use serde::{Deserialize, Serialize};

/// Stable identifier for a discretionary spending category. Declaration
/// order is allocation order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryId {
    Groceries,
    Transportation,
    Dining,
    Entertainment,
    Shopping,
    Health,
    PersonalCare,
    Savings,
    DebtRepayment,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub label: &'static str,
    pub glyph: &'static str,
}

pub const CATEGORY_COUNT: usize = 9;

pub const CATEGORIES: [Category; CATEGORY_COUNT] = [
    Category {
        id: CategoryId::Groceries,
        label: "Groceries",
        glyph: "🛒",
    },
    Category {
        id: CategoryId::Transportation,
        label: "Transportation",
        glyph: "🚗",
    },
    Category {
        id: CategoryId::Dining,
        label: "Dining Out",
        glyph: "🍽️",
    },
    Category {
        id: CategoryId::Entertainment,
        label: "Entertainment",
        glyph: "🎬",
    },
    Category {
        id: CategoryId::Shopping,
        label: "Shopping",
        glyph: "🛍️",
    },
    Category {
        id: CategoryId::Health,
        label: "Health",
        glyph: "💊",
    },
    Category {
        id: CategoryId::PersonalCare,
        label: "Personal Care",
        glyph: "💇",
    },
    Category {
        id: CategoryId::Savings,
        label: "Savings",
        glyph: "💰",
    },
    Category {
        id: CategoryId::DebtRepayment,
        label: "Debt Repayment",
        glyph: "💳",
    },
];

pub fn category_at(index: usize) -> Option<&'static Category> {
    CATEGORIES.get(index)
}

impl CategoryId {
    pub fn category(self) -> &'static Category {
        &CATEGORIES[self as usize]
    }

    pub fn glyph(self) -> &'static str {
        self.category().glyph
    }

    pub fn label(self) -> &'static str {
        self.category().label
    }

    /// Savings and debt repayment move money into a balance instead of
    /// spending it, so only income may fund them.
    pub fn is_transfer(self) -> bool {
        matches!(self, Self::Savings | Self::DebtRepayment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_index_matches_declaration_order() {
        for (index, category) in CATEGORIES.iter().enumerate() {
            assert_eq!(category.id as usize, index);
            assert_eq!(category_at(index), Some(category));
        }
        assert_eq!(category_at(CATEGORY_COUNT), None);
    }

    #[test]
    fn special_categories_close_the_round() {
        assert_eq!(CATEGORIES[7].id, CategoryId::Savings);
        assert_eq!(CATEGORIES[8].id, CategoryId::DebtRepayment);
        let transfers: Vec<_> = CATEGORIES
            .iter()
            .filter(|category| category.id.is_transfer())
            .map(|category| category.id)
            .collect();
        assert_eq!(transfers, [CategoryId::Savings, CategoryId::DebtRepayment]);
    }

    #[test]
    fn identifiers_serialize_as_stable_keys() {
        let json = serde_json::to_string(&CategoryId::DebtRepayment).expect("serialize");
        assert_eq!(json, "\"debtRepayment\"");
        assert_eq!(CategoryId::DebtRepayment.label(), "Debt Repayment");
        assert_eq!(CategoryId::Savings.glyph(), "💰");
    }
}
