//! End-of-day reflection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scale::five_point_scale;

five_point_scale!(
    /// How the day went, 1 (terrible) to 5 (excellent).
    Rating,
    "rating"
);

impl Rating {
    pub fn label(self) -> &'static str {
        match self.value() {
            1 => "Terrible",
            2 => "Not great",
            3 => "Okay",
            4 => "Good",
            _ => "Excellent",
        }
    }
}

/// One reflection per user per date, optionally tied to that day's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub day_plan_id: Option<String>,
    pub rating: Option<Rating>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Reflection {
    pub fn new(
        user_id: impl Into<String>,
        date: NaiveDate,
        day_plan_id: Option<String>,
        rating: Option<Rating>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            date,
            day_plan_id,
            rating,
            notes: notes.filter(|n| !n.trim().is_empty()),
            created_at: Utc::now(),
        }
    }
}
