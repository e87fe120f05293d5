use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// School days covered by the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

pub const DAYS: [Day; 5] = [
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
];

impl std::str::FromStr for Day {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Self::Monday),
            "tuesday" | "tue" => Ok(Self::Tuesday),
            "wednesday" | "wed" => Ok(Self::Wednesday),
            "thursday" | "thu" => Ok(Self::Thursday),
            "friday" | "fri" => Ok(Self::Friday),
            other => Err(anyhow!("expected a weekday Monday-Friday, got: {other}")),
        }
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        };
        write!(f, "{text}")
    }
}

/// The fixed lesson slots; there is no 13:00 (lunch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotTime {
    #[serde(rename = "9:00")]
    Nine,
    #[serde(rename = "10:00")]
    Ten,
    #[serde(rename = "11:00")]
    Eleven,
    #[serde(rename = "12:00")]
    Twelve,
    #[serde(rename = "14:00")]
    Fourteen,
    #[serde(rename = "15:00")]
    Fifteen,
    #[serde(rename = "16:00")]
    Sixteen,
}

pub const SLOT_TIMES: [SlotTime; 7] = [
    SlotTime::Nine,
    SlotTime::Ten,
    SlotTime::Eleven,
    SlotTime::Twelve,
    SlotTime::Fourteen,
    SlotTime::Fifteen,
    SlotTime::Sixteen,
];

impl std::str::FromStr for SlotTime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "9:00" | "09:00" | "9" => Ok(Self::Nine),
            "10:00" | "10" => Ok(Self::Ten),
            "11:00" | "11" => Ok(Self::Eleven),
            "12:00" | "12" => Ok(Self::Twelve),
            "14:00" | "14" => Ok(Self::Fourteen),
            "15:00" | "15" => Ok(Self::Fifteen),
            "16:00" | "16" => Ok(Self::Sixteen),
            other => Err(anyhow!(
                "expected one of 9:00, 10:00, 11:00, 12:00, 14:00, 15:00, 16:00, got: {other}"
            )),
        }
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Nine => "9:00",
            Self::Ten => "10:00",
            Self::Eleven => "11:00",
            Self::Twelve => "12:00",
            Self::Fourteen => "14:00",
            Self::Fifteen => "15:00",
            Self::Sixteen => "16:00",
        };
        write!(f, "{text}")
    }
}

/// One filled cell of the weekly grid, keyed by `(day, time)` rather than
/// by id. Absence of a record means the slot is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: Day,
    pub time: SlotTime,
    pub subject: String,
}

/// First-run contents of the `timetable` collection.
pub fn seed() -> Vec<TimeSlot> {
    [
        (Day::Monday, SlotTime::Nine, "Mathematics"),
        (Day::Monday, SlotTime::Ten, "Science"),
        (Day::Tuesday, SlotTime::Nine, "English"),
        (Day::Wednesday, SlotTime::Eleven, "History"),
    ]
    .into_iter()
    .map(|(day, time, subject)| TimeSlot {
        day,
        time,
        subject: subject.to_string(),
    })
    .collect()
}

/// Overwrites the slot for `(day, time)`. An empty trimmed subject clears
/// the slot. Returns the subject now occupying the slot, if any.
pub fn set(
    schedule: &mut Vec<TimeSlot>,
    day: Day,
    time: SlotTime,
    subject: &str,
) -> Option<String> {
    schedule.retain(|slot| !(slot.day == day && slot.time == time));

    let subject = subject.trim();
    if subject.is_empty() {
        return None;
    }

    schedule.push(TimeSlot {
        day,
        time,
        subject: subject.to_string(),
    });
    Some(subject.to_string())
}

pub fn subject_at(schedule: &[TimeSlot], day: Day, time: SlotTime) -> Option<&str> {
    schedule
        .iter()
        .find(|slot| slot.day == day && slot.time == time)
        .map(|slot| slot.subject.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_fills_four_slots() {
        let schedule = seed();
        assert_eq!(schedule.len(), 4);
        assert_eq!(
            subject_at(&schedule, Day::Monday, SlotTime::Nine),
            Some("Mathematics")
        );
        assert_eq!(subject_at(&schedule, Day::Friday, SlotTime::Nine), None);
    }

    #[test]
    fn set_overwrites_existing_slot() {
        let mut schedule = seed();
        set(&mut schedule, Day::Monday, SlotTime::Nine, "Physics");
        assert_eq!(
            subject_at(&schedule, Day::Monday, SlotTime::Nine),
            Some("Physics")
        );
        assert_eq!(schedule.len(), 4);
    }

    #[test]
    fn empty_subject_clears_slot() {
        let mut schedule = seed();
        assert_eq!(set(&mut schedule, Day::Monday, SlotTime::Nine, "  "), None);
        assert_eq!(subject_at(&schedule, Day::Monday, SlotTime::Nine), None);
        assert_eq!(schedule.len(), 3);
    }

    #[test]
    fn clearing_a_free_slot_is_a_noop() {
        let mut schedule = seed();
        assert_eq!(set(&mut schedule, Day::Friday, SlotTime::Sixteen, ""), None);
        assert_eq!(schedule.len(), 4);
    }

    #[test]
    fn parses_day_and_time_spellings() {
        assert_eq!("wed".parse::<Day>().expect("day"), Day::Wednesday);
        assert_eq!("Monday".parse::<Day>().expect("day"), Day::Monday);
        assert!("saturday".parse::<Day>().is_err());

        assert_eq!("09:00".parse::<SlotTime>().expect("time"), SlotTime::Nine);
        assert_eq!("14".parse::<SlotTime>().expect("time"), SlotTime::Fourteen);
        assert!("13:00".parse::<SlotTime>().is_err());
    }

    #[test]
    fn slot_times_serialize_as_clock_strings() {
        let raw = serde_json::to_string(&seed()).expect("serialize");
        assert!(raw.contains("\"9:00\""));
        let parsed: Vec<TimeSlot> = serde_json::from_str(&raw).expect("parse");
        assert_eq!(parsed, seed());
    }
}
