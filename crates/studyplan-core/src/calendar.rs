use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::Keyed;
use crate::tasks::{Priority, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Event,
    Deadline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub priority: Priority,
    pub date: NaiveDate,

    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl Keyed for CalendarEvent {
    fn key(&self) -> Uuid {
        self.id
    }
}

pub fn seed() -> Vec<CalendarEvent> {
    Vec::new()
}

/// Appends a stored event. `kind` is always `Event` here; deadline entries
/// are synthesized from tasks at query time and never written back.
pub fn add(
    events: &mut Vec<CalendarEvent>,
    name: &str,
    subject: Option<String>,
    priority: Option<Priority>,
    date: NaiveDate,
) -> anyhow::Result<Uuid> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("event name cannot be empty"));
    }

    let event = CalendarEvent {
        id: Uuid::new_v4(),
        name: name.to_string(),
        subject: subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "General".to_string()),
        priority: priority.unwrap_or(Priority::Medium),
        date,
        kind: EventKind::Event,
    };
    let id = event.id;
    events.push(event);
    Ok(id)
}

pub fn delete(events: &mut Vec<CalendarEvent>, id: Uuid) -> anyhow::Result<CalendarEvent> {
    let index = events
        .iter()
        .position(|event| event.id == id)
        .ok_or_else(|| anyhow!("no event with id: {id}"))?;
    Ok(events.remove(index))
}

/// The agenda for one day: stored events with that date, in stored order,
/// followed by task deadlines falling on it. The deadline entries are
/// display-only records; the dependency runs strictly one way (the
/// calendar reads task data, never the reverse).
pub fn agenda_for(events: &[CalendarEvent], tasks: &[Task], date: NaiveDate) -> Vec<CalendarEvent> {
    let mut agenda: Vec<CalendarEvent> = events
        .iter()
        .filter(|event| event.date == date)
        .cloned()
        .collect();

    agenda.extend(tasks.iter().filter(|task| task.deadline == date).map(|task| {
        CalendarEvent {
            id: task.id,
            name: task.title.clone(),
            subject: task.subject.clone(),
            priority: task.priority.unwrap_or(Priority::Medium),
            date: task.deadline,
            kind: EventKind::Deadline,
        }
    }));

    agenda
}

/// Whether the month view should mark this day.
pub fn has_entries_on(events: &[CalendarEvent], tasks: &[Task], date: NaiveDate) -> bool {
    events.iter().any(|event| event.date == date) || tasks.iter().any(|task| task.deadline == date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("ymd")
    }

    #[test]
    fn agenda_lists_events_before_deadlines() {
        let day = date(2025, 3, 10);
        let mut events = Vec::new();
        add(&mut events, "Mock exam", None, Some(Priority::High), day).expect("add event");

        let mut task_list = Vec::new();
        tasks::add(
            &mut task_list,
            "Hand in essay",
            Some(day),
            Some("English".to_string()),
            None,
            day,
        )
        .expect("add task");

        let agenda = agenda_for(&events, &task_list, day);
        assert_eq!(agenda.len(), 2);
        assert_eq!(agenda[0].kind, EventKind::Event);
        assert_eq!(agenda[0].name, "Mock exam");
        assert_eq!(agenda[1].kind, EventKind::Deadline);
        assert_eq!(agenda[1].name, "Hand in essay");
        assert_eq!(agenda[1].priority, Priority::Medium);
    }

    #[test]
    fn agenda_ignores_other_dates() {
        let mut events = Vec::new();
        add(&mut events, "Mock exam", None, None, date(2025, 3, 10)).expect("add");

        let agenda = agenda_for(&events, &[], date(2025, 3, 11));
        assert!(agenda.is_empty());
    }

    #[test]
    fn agenda_keeps_stored_event_order() {
        let day = date(2025, 3, 10);
        let mut events = Vec::new();
        add(&mut events, "First", None, None, day).expect("add");
        add(&mut events, "Second", None, None, day).expect("add");

        let agenda = agenda_for(&events, &[], day);
        assert_eq!(agenda[0].name, "First");
        assert_eq!(agenda[1].name, "Second");
    }

    #[test]
    fn marks_days_from_either_collection() {
        let day = date(2025, 3, 10);
        let mut events = Vec::new();
        add(&mut events, "Mock exam", None, None, day).expect("add");

        let mut task_list = Vec::new();
        tasks::add(&mut task_list, "Essay", Some(date(2025, 3, 12)), None, None, day)
            .expect("add task");

        assert!(has_entries_on(&events, &task_list, day));
        assert!(has_entries_on(&events, &task_list, date(2025, 3, 12)));
        assert!(!has_entries_on(&events, &task_list, date(2025, 3, 11)));
    }

    #[test]
    fn defaults_subject_and_priority() {
        let mut events = Vec::new();
        add(&mut events, "Revision", Some("  ".to_string()), None, date(2025, 1, 1))
            .expect("add");
        assert_eq!(events[0].subject, "General");
        assert_eq!(events[0].priority, Priority::Medium);
        assert_eq!(events[0].kind, EventKind::Event);
    }
}
