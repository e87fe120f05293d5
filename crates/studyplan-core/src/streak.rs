use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Singleton streak record stored under the `streak` key. An empty
/// `last_study_date` string on disk means no session has ever been logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current_streak: u32,

    #[serde(with = "date_or_empty")]
    pub last_study_date: Option<NaiveDate>,

    pub total_days: u32,
}

impl Default for Streak {
    fn default() -> Self {
        Self {
            current_streak: 0,
            last_study_date: None,
            total_days: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// Already logged today; nothing changed.
    AlreadyLogged,
    /// Yesterday was logged too, the streak grew.
    Extended(u32),
    /// Gap of two or more days (or first ever log), streak restarted at 1.
    Restarted,
}

impl Streak {
    /// One explicit log attempt for `today`. A silently skipped day does
    /// not reset anything by itself; the reset happens lazily here on the
    /// next attempt.
    pub fn log(&mut self, today: NaiveDate) -> LogOutcome {
        if self.last_study_date == Some(today) {
            return LogOutcome::AlreadyLogged;
        }

        let yesterday = today.pred_opt();
        let outcome = if self.last_study_date.is_some() && self.last_study_date == yesterday {
            self.current_streak += 1;
            LogOutcome::Extended(self.current_streak)
        } else {
            self.current_streak = 1;
            LogOutcome::Restarted
        };

        self.total_days += 1;
        self.last_study_date = Some(today);
        outcome
    }

    pub fn logged_on(&self, today: NaiveDate) -> bool {
        self.last_study_date == Some(today)
    }
}

/// `NaiveDate` as `YYYY-MM-DD`, with the empty string standing in for
/// "never logged". Unparseable stored strings read back as never-logged.
mod date_or_empty {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("ymd")
    }

    #[test]
    fn first_log_starts_streak() {
        let mut streak = Streak::default();
        assert_eq!(streak.log(date(2025, 5, 1)), LogOutcome::Restarted);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.total_days, 1);
        assert!(streak.logged_on(date(2025, 5, 1)));
    }

    #[test]
    fn same_day_log_is_noop() {
        let mut streak = Streak::default();
        streak.log(date(2025, 5, 1));
        assert_eq!(streak.log(date(2025, 5, 1)), LogOutcome::AlreadyLogged);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.total_days, 1);
    }

    #[test]
    fn consecutive_days_extend() {
        let mut streak = Streak::default();
        streak.log(date(2025, 5, 1));
        assert_eq!(streak.log(date(2025, 5, 2)), LogOutcome::Extended(2));
        assert_eq!(streak.current_streak, 2);
        assert_eq!(streak.total_days, 2);
    }

    #[test]
    fn gap_restarts_but_total_accumulates() {
        let mut streak = Streak::default();
        streak.log(date(2025, 5, 1));
        streak.log(date(2025, 5, 2));
        // Day 3 skipped.
        assert_eq!(streak.log(date(2025, 5, 4)), LogOutcome::Restarted);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.total_days, 3);
    }

    #[test]
    fn year_rollover_counts_as_consecutive() {
        let mut streak = Streak::default();
        streak.log(date(2024, 12, 31));
        assert_eq!(streak.log(date(2025, 1, 1)), LogOutcome::Extended(2));
    }

    #[test]
    fn empty_string_reads_as_never_logged() {
        let parsed: Streak =
            serde_json::from_str(r#"{"current_streak":0,"last_study_date":"","total_days":0}"#)
                .expect("parse");
        assert_eq!(parsed, Streak::default());
    }

    #[test]
    fn roundtrips_through_json() {
        let mut streak = Streak::default();
        streak.log(date(2025, 5, 1));
        let raw = serde_json::to_string(&streak).expect("serialize");
        let parsed: Streak = serde_json::from_str(&raw).expect("parse");
        assert_eq!(parsed, streak);
    }
}
