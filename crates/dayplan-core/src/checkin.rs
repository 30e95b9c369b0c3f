//! Morning check-in: how the user feels before the day is planned.
//!
//! Only the energy score shapes the plan. Mood and the note are stored
//! alongside it for the end-of-day reflection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scale::five_point_scale;

five_point_scale!(
    /// Self-reported mood, 1 (awful) to 5 (great).
    Mood,
    "mood"
);

five_point_scale!(
    /// Self-reported energy, 1 (drained) to 5 (energized).
    EnergyLevel,
    "energy_level"
);

/// Coarse energy bucket that decides how long focus blocks are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyBand {
    /// Energy 1-2
    Low,
    /// Energy 3
    Medium,
    /// Energy 4-5
    High,
}

impl EnergyLevel {
    pub fn band(self) -> EnergyBand {
        match self.value() {
            4..=5 => EnergyBand::High,
            3 => EnergyBand::Medium,
            _ => EnergyBand::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self.value() {
            1 => "Drained",
            2 => "Low",
            3 => "Medium",
            4 => "High",
            _ => "Energized",
        }
    }
}

impl Mood {
    pub fn label(self) -> &'static str {
        match self.value() {
            1 => "Awful",
            2 => "Meh",
            3 => "Okay",
            4 => "Good",
            _ => "Great",
        }
    }
}

/// One check-in per user per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub mood: Mood,
    pub energy_level: EnergyLevel,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CheckIn {
    pub fn new(
        user_id: impl Into<String>,
        date: NaiveDate,
        mood: Mood,
        energy_level: EnergyLevel,
        note: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            date,
            mood,
            energy_level,
            // Blank notes are treated as absent.
            note: note.filter(|n| !n.trim().is_empty()),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn energy_bands() {
        let band = |v| EnergyLevel::new(v).unwrap().band();
        assert_eq!(band(1), EnergyBand::Low);
        assert_eq!(band(2), EnergyBand::Low);
        assert_eq!(band(3), EnergyBand::Medium);
        assert_eq!(band(4), EnergyBand::High);
        assert_eq!(band(5), EnergyBand::High);
    }

    #[test]
    fn rejects_scores_outside_one_to_five() {
        assert!(matches!(
            EnergyLevel::new(0),
            Err(ValidationError::OutOfRange { field: "energy_level", value: 0, .. })
        ));
        assert!(Mood::new(6).is_err());
        assert!(serde_json::from_str::<EnergyLevel>("9").is_err());
        assert_eq!(serde_json::from_str::<Mood>("4").unwrap().value(), 4);
    }

    #[test]
    fn blank_note_is_dropped() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let checkin = CheckIn::new(
            "u1",
            date,
            Mood::new(3).unwrap(),
            EnergyLevel::new(3).unwrap(),
            Some("   ".into()),
        );
        assert!(checkin.note.is_none());
    }

    #[test]
    fn serializes_scores_as_plain_integers() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let checkin = CheckIn::new("u1", date, Mood::new(4).unwrap(), EnergyLevel::new(2).unwrap(), None);
        let json = serde_json::to_value(&checkin).unwrap();
        assert_eq!(json["mood"], 4);
        assert_eq!(json["energy_level"], 2);
        assert_eq!(json["date"], "2026-03-02");
    }
}
