use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::BudgetError;

/// Cost categories reported in a [`CostBreakdown`], in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostCategory {
    Flight,
    Accommodation,
    LiftTickets,
    Food,
    Lessons,
}

impl CostCategory {
    pub const ALL: [CostCategory; 5] = [
        Self::Flight,
        Self::Accommodation,
        Self::LiftTickets,
        Self::Food,
        Self::Lessons,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Flight => "Flight",
            Self::Accommodation => "Accommodation",
            Self::LiftTickets => "Lift tickets",
            Self::Food => "Food",
            Self::Lessons => "Lessons",
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-person cost of each category, in origin currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub flight: Decimal,
    pub accommodation: Decimal,
    pub lift_tickets: Decimal,
    pub food: Decimal,
    pub lessons: Decimal,
}

impl CostBreakdown {
    pub fn get(
        &self,
        category: CostCategory,
    ) -> Decimal {
        match category {
            CostCategory::Flight => self.flight,
            CostCategory::Accommodation => self.accommodation,
            CostCategory::LiftTickets => self.lift_tickets,
            CostCategory::Food => self.food,
            CostCategory::Lessons => self.lessons,
        }
    }

    /// Every category paired with its amount, in [`CostCategory::ALL`] order.
    pub fn items(&self) -> [(CostCategory, Decimal); 5] {
        CostCategory::ALL.map(|category| (category, self.get(category)))
    }

    /// Sum of all categories.
    ///
    /// # Errors
    ///
    /// [`BudgetError::Overflow`] if the sum does not fit in a [`Decimal`].
    pub fn total(&self) -> Result<Decimal, BudgetError> {
        self.items()
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or(BudgetError::Overflow("per-person total"))
    }
}

/// Outcome of one estimate. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetResult {
    /// Nights of accommodation charged.
    pub nights: u32,

    /// Days of lift tickets charged.
    pub ski_days: u32,

    /// Per-person lesson cost, destination currency.
    pub lesson_cost: Decimal,

    /// Per-person spend at the destination before conversion.
    pub destination_subtotal: Decimal,

    /// Per-person cost by category, origin currency.
    pub breakdown: CostBreakdown,

    /// Per-person total, origin currency. Equal to `breakdown.total()`.
    pub per_person_total: Decimal,

    /// Whole party, origin currency. Equal to `per_person_total * people`.
    pub group_total: Decimal,

    /// Share of the per-person total spent on lessons, in `[0, 1]`.
    pub lesson_ratio: Decimal,
}
