//! SQLite-backed [`PlanStore`].
//!
//! Blocks are stored as a JSON array in `day_plans.plan`; dates as
//! `YYYY-MM-DD`; timestamps as RFC 3339.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{info, warn};

use super::{data_dir, migrations, PlanStore};
use crate::checkin::{CheckIn, EnergyLevel, Mood};
use crate::error::{DatabaseError, Result};
use crate::plan::{DayPlan, PlanBlock};
use crate::time_of_day::TimeOfDay;
use crate::reflection::{Rating, Reflection};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_date(row: &Row, idx: usize) -> Result<NaiveDate, rusqlite::Error> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn get_timestamp(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn get_time(row: &Row, idx: usize) -> Result<TimeOfDay, rusqlite::Error> {
    let s: String = row.get(idx)?;
    s.parse::<TimeOfDay>().map_err(|e| conversion_error(idx, e))
}

fn get_score<T>(row: &Row, idx: usize) -> Result<T, rusqlite::Error>
where
    T: TryFrom<u8, Error = crate::error::ValidationError>,
{
    let raw: u8 = row.get(idx)?;
    T::try_from(raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn row_to_check_in(row: &Row) -> Result<CheckIn, rusqlite::Error> {
    Ok(CheckIn {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: get_date(row, 2)?,
        mood: get_score::<Mood>(row, 3)?,
        energy_level: get_score::<EnergyLevel>(row, 4)?,
        note: row.get(5)?,
        created_at: get_timestamp(row, 6)?,
    })
}

fn row_to_day_plan(row: &Row) -> Result<DayPlan, rusqlite::Error> {
    let plan_json: String = row.get(4)?;
    let plan: Vec<PlanBlock> = serde_json::from_str(&plan_json).map_err(|e| conversion_error(4, e))?;
    let current_step: i64 = row.get(5)?;
    Ok(DayPlan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        check_in_id: row.get(2)?,
        date: get_date(row, 3)?,
        plan,
        current_step: usize::try_from(current_step).unwrap_or(0),
        work_start: get_time(row, 6)?,
        work_end: get_time(row, 7)?,
        created_at: get_timestamp(row, 8)?,
        updated_at: get_timestamp(row, 9)?,
    })
}

fn row_to_reflection(row: &Row) -> Result<Reflection, rusqlite::Error> {
    let rating = match row.get::<_, Option<u8>>(4)? {
        Some(raw) => Some(
            Rating::try_from(raw)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(e)))?,
        ),
        None => None,
    };
    Ok(Reflection {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: get_date(row, 2)?,
        day_plan_id: row.get(3)?,
        rating,
        notes: row.get(5)?,
        created_at: get_timestamp(row, 6)?,
    })
}

const CHECK_IN_COLUMNS: &str = "id, user_id, date, mood, energy_level, note, created_at";
const DAY_PLAN_COLUMNS: &str =
    "id, user_id, check_in_id, date, plan, current_step, work_start, work_end, created_at, updated_at";
const REFLECTION_COLUMNS: &str = "id, user_id, date, day_plan_id, rating, notes, created_at";

/// SQLite database for check-ins, plans and reflections.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `<data dir>/dayplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("dayplan.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests and previews).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    fn fetch_plan_by_id(&self, plan_id: &str) -> Result<Option<DayPlan>> {
        let sql = format!("SELECT {DAY_PLAN_COLUMNS} FROM day_plans WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![plan_id], row_to_day_plan)
            .optional()?)
    }
}

impl PlanStore for SqliteStore {
    fn fetch_check_in(&self, user_id: &str, date: NaiveDate) -> Result<Option<CheckIn>> {
        let sql = format!("SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE user_id = ?1 AND date = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![user_id, format_date(date)], row_to_check_in)
            .optional()?)
    }

    fn upsert_check_in(&self, check_in: &CheckIn) -> Result<CheckIn> {
        self.conn.execute(
            "INSERT INTO check_ins (id, user_id, date, mood, energy_level, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id, date) DO UPDATE SET
                mood = excluded.mood,
                energy_level = excluded.energy_level,
                note = excluded.note",
            params![
                check_in.id,
                check_in.user_id,
                format_date(check_in.date),
                check_in.mood.value(),
                check_in.energy_level.value(),
                check_in.note,
                check_in.created_at.to_rfc3339(),
            ],
        )?;
        info!(user = %check_in.user_id, date = %check_in.date, energy = check_in.energy_level.value(), "check-in saved");

        self.fetch_check_in(&check_in.user_id, check_in.date)?
            .ok_or_else(|| {
                DatabaseError::NotFound {
                    table: "check_ins",
                    id: check_in.id.clone(),
                }
                .into()
            })
    }

    fn fetch_plan(&self, user_id: &str, date: NaiveDate) -> Result<Option<DayPlan>> {
        let sql = format!("SELECT {DAY_PLAN_COLUMNS} FROM day_plans WHERE user_id = ?1 AND date = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![user_id, format_date(date)], row_to_day_plan)
            .optional()?)
    }

    fn upsert_plan(&self, plan: &DayPlan) -> Result<DayPlan> {
        let plan_json = serde_json::to_string(&plan.plan)?;
        self.conn.execute(
            "INSERT INTO day_plans (id, user_id, check_in_id, date, plan, current_step,
                                    work_start, work_end, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8, ?8)
             ON CONFLICT(user_id, date) DO UPDATE SET
                check_in_id = excluded.check_in_id,
                plan = excluded.plan,
                current_step = 0,
                work_start = excluded.work_start,
                work_end = excluded.work_end,
                updated_at = excluded.updated_at",
            params![
                plan.id,
                plan.user_id,
                plan.check_in_id,
                format_date(plan.date),
                plan_json,
                plan.work_start.to_string(),
                plan.work_end.to_string(),
                plan.updated_at.to_rfc3339(),
            ],
        )?;
        info!(user = %plan.user_id, date = %plan.date, blocks = plan.plan.len(), "day plan saved");

        self.fetch_plan(&plan.user_id, plan.date)?.ok_or_else(|| {
            DatabaseError::NotFound {
                table: "day_plans",
                id: plan.id.clone(),
            }
            .into()
        })
    }

    fn list_plans(&self, user_id: &str, limit: usize) -> Result<Vec<DayPlan>> {
        let sql = format!(
            "SELECT {DAY_PLAN_COLUMNS} FROM day_plans WHERE user_id = ?1 ORDER BY date DESC LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, limit as i64], row_to_day_plan)?;
        let plans = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(plans)
    }

    fn update_current_step(&self, plan_id: &str, expected: usize, new_step: usize) -> Result<DayPlan> {
        let changed = self.conn.execute(
            "UPDATE day_plans SET current_step = ?1, updated_at = ?2
             WHERE id = ?3 AND current_step = ?4",
            params![new_step as i64, Utc::now().to_rfc3339(), plan_id, expected as i64],
        )?;

        if changed == 0 {
            return match self.fetch_plan_by_id(plan_id)? {
                Some(_) => {
                    warn!(plan = %plan_id, expected, "stale step update rejected");
                    Err(DatabaseError::StaleStep {
                        plan_id: plan_id.to_string(),
                        expected,
                    }
                    .into())
                }
                None => Err(DatabaseError::NotFound {
                    table: "day_plans",
                    id: plan_id.to_string(),
                }
                .into()),
            };
        }

        info!(plan = %plan_id, from = expected, to = new_step, "plan step updated");
        self.fetch_plan_by_id(plan_id)?.ok_or_else(|| {
            DatabaseError::NotFound {
                table: "day_plans",
                id: plan_id.to_string(),
            }
            .into()
        })
    }

    fn fetch_reflection(&self, user_id: &str, date: NaiveDate) -> Result<Option<Reflection>> {
        let sql = format!("SELECT {REFLECTION_COLUMNS} FROM reflections WHERE user_id = ?1 AND date = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![user_id, format_date(date)], row_to_reflection)
            .optional()?)
    }

    fn upsert_reflection(&self, reflection: &Reflection) -> Result<Reflection> {
        self.conn.execute(
            "INSERT INTO reflections (id, user_id, date, day_plan_id, rating, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id, date) DO UPDATE SET
                day_plan_id = excluded.day_plan_id,
                rating = excluded.rating,
                notes = excluded.notes",
            params![
                reflection.id,
                reflection.user_id,
                format_date(reflection.date),
                reflection.day_plan_id,
                reflection.rating.map(Rating::value),
                reflection.notes,
                reflection.created_at.to_rfc3339(),
            ],
        )?;
        info!(user = %reflection.user_id, date = %reflection.date, "reflection saved");

        self.fetch_reflection(&reflection.user_id, reflection.date)?
            .ok_or_else(|| {
                DatabaseError::NotFound {
                    table: "reflections",
                    id: reflection.id.clone(),
                }
                .into()
            })
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        // Dropping the transaction without commit rolls it back.
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::plan::generate;
    use chrono::Datelike;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn check_in(energy: u8) -> CheckIn {
        CheckIn::new("u1", date(), Mood::new(3).unwrap(), EnergyLevel::new(energy).unwrap(), None)
    }

    fn blocks(energy: u8) -> Vec<PlanBlock> {
        generate(EnergyLevel::new(energy).unwrap(), &[], t("09:00"), t("17:00")).unwrap()
    }

    fn day_plan(check_in_id: &str, d: NaiveDate, energy: u8) -> DayPlan {
        DayPlan::new("u1", check_in_id, d, blocks(energy), t("09:00"), t("17:00"))
    }

    #[test]
    fn check_in_round_trip() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.fetch_check_in("u1", date()).unwrap().is_none());

        let saved = store.upsert_check_in(&check_in(4)).unwrap();
        let fetched = store.fetch_check_in("u1", date()).unwrap().unwrap();
        assert_eq!(saved, fetched);
        assert_eq!(fetched.energy_level.value(), 4);
    }

    #[test]
    fn check_in_upsert_keeps_original_id() {
        let store = SqliteStore::open_memory().unwrap();
        let first = store.upsert_check_in(&check_in(2)).unwrap();
        let second = store.upsert_check_in(&check_in(5)).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.energy_level.value(), 5);
    }

    #[test]
    fn plan_upsert_resets_cursor() {
        let store = SqliteStore::open_memory().unwrap();
        let ci = store.upsert_check_in(&check_in(3)).unwrap();
        let plan = store.upsert_plan(&day_plan(&ci.id, date(), 3)).unwrap();
        let plan = store.update_current_step(&plan.id, 0, 1).unwrap();
        assert_eq!(plan.current_step, 1);

        let replanned = store.upsert_plan(&day_plan(&ci.id, date(), 5)).unwrap();
        assert_eq!(replanned.id, plan.id);
        assert_eq!(replanned.current_step, 0);
        assert_eq!(replanned.plan, blocks(5));
    }

    #[test]
    fn stale_step_update_is_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        let ci = store.upsert_check_in(&check_in(3)).unwrap();
        let plan = store.upsert_plan(&day_plan(&ci.id, date(), 3)).unwrap();

        store.update_current_step(&plan.id, 0, 1).unwrap();
        let err = store.update_current_step(&plan.id, 0, 1).unwrap_err();
        assert!(matches!(err, CoreError::Database(DatabaseError::StaleStep { expected: 0, .. })));
        assert_eq!(store.fetch_plan("u1", date()).unwrap().unwrap().current_step, 1);
    }

    #[test]
    fn update_unknown_plan_is_not_found() {
        let store = SqliteStore::open_memory().unwrap();
        let err = store.update_current_step("missing", 0, 1).unwrap_err();
        assert!(matches!(err, CoreError::Database(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn reflection_round_trip() {
        let store = SqliteStore::open_memory().unwrap();
        let r = Reflection::new("u1", date(), None, Some(Rating::new(4).unwrap()), Some("good".into()));
        let saved = store.upsert_reflection(&r).unwrap();
        assert_eq!(saved.rating.map(Rating::value), Some(4));

        let updated = Reflection::new("u1", date(), None, None, None);
        let saved = store.upsert_reflection(&updated).unwrap();
        assert_eq!(saved.id, r.id);
        assert!(saved.rating.is_none());
    }

    #[test]
    fn list_plans_newest_first() {
        let store = SqliteStore::open_memory().unwrap();
        for day in [1, 3, 2] {
            let d = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
            let ci = CheckIn::new("u1", d, Mood::new(3).unwrap(), EnergyLevel::new(3).unwrap(), None);
            let ci = store.upsert_check_in(&ci).unwrap();
            store.upsert_plan(&day_plan(&ci.id, d, 3)).unwrap();
        }
        let dates: Vec<_> = store.list_plans("u1", 10).unwrap().iter().map(|p| p.date.day()).collect();
        assert_eq!(dates, vec![3, 2, 1]);
    }

    #[test]
    fn plan_keeps_its_work_window() {
        let store = SqliteStore::open_memory().unwrap();
        let ci = store.upsert_check_in(&check_in(3)).unwrap();
        let fresh = DayPlan::new("u1", &ci.id, date(), Vec::new(), t("13:00"), t("15:30"));
        let saved = store.upsert_plan(&fresh).unwrap();
        assert_eq!((saved.work_start, saved.work_end), (t("13:00"), t("15:30")));
        assert_eq!(saved.summary().trailing_slack_minutes, 150);
    }

    #[test]
    fn failed_atomic_block_rolls_back() {
        let store = SqliteStore::open_memory().unwrap();
        store.upsert_check_in(&check_in(2)).unwrap();

        let result: Result<()> = store.atomically(|s| {
            s.upsert_check_in(&check_in(5))?;
            Err(DatabaseError::QueryFailed("disk full".into()).into())
        });
        assert!(result.is_err());
        assert_eq!(store.fetch_check_in("u1", date()).unwrap().unwrap().energy_level.value(), 2);

        store.atomically(|s| s.upsert_check_in(&check_in(4))).unwrap();
        assert_eq!(store.fetch_check_in("u1", date()).unwrap().unwrap().energy_level.value(), 4);
    }
}
