mod budget_result;
mod day_count;
mod lesson_plan;
mod trip_input;

pub use budget_result::{BudgetResult, CostBreakdown, CostCategory};
pub use day_count::{DayCountPolicy, NightsPolicy, SkiDaysPolicy};
pub use lesson_plan::LessonPlan;
pub use trip_input::TripBudgetInput;
