use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(anyhow!("expected low, medium or high, got: {other}")),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub deadline: NaiveDate,
    pub completed: bool,
    pub subject: String,

    #[serde(default)]
    pub priority: Option<Priority>,
}

impl Keyed for Task {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Task {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.deadline < today
    }
}

/// First-run contents of the `tasks` collection.
pub fn seed() -> Vec<Task> {
    [
        ("Complete Math Assignment", (2024, 12, 1), "Mathematics"),
        ("Study for Science Quiz", (2024, 11, 28), "Science"),
    ]
    .into_iter()
    .filter_map(|(title, (y, m, d), subject)| {
        let deadline = NaiveDate::from_ymd_opt(y, m, d)?;
        Some(Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            deadline,
            completed: false,
            subject: subject.to_string(),
            priority: None,
        })
    })
    .collect()
}

/// Appends a new pending task. The title must be non-empty after trimming;
/// a missing deadline defaults to today and a missing subject to "General".
pub fn add(
    tasks: &mut Vec<Task>,
    title: &str,
    deadline: Option<NaiveDate>,
    subject: Option<String>,
    priority: Option<Priority>,
    today: NaiveDate,
) -> anyhow::Result<Uuid> {
    let title = title.trim();
    if title.is_empty() {
        return Err(anyhow!("task title cannot be empty"));
    }

    let task = Task {
        id: Uuid::new_v4(),
        title: title.to_string(),
        deadline: deadline.unwrap_or(today),
        completed: false,
        subject: subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "General".to_string()),
        priority,
    };
    let id = task.id;
    tasks.push(task);
    Ok(id)
}

/// Flips the completed flag; returns the new state.
pub fn toggle(tasks: &mut [Task], id: Uuid) -> anyhow::Result<bool> {
    let task = tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or_else(|| anyhow!("no task with id: {id}"))?;
    task.completed = !task.completed;
    Ok(task.completed)
}

pub fn delete(tasks: &mut Vec<Task>, id: Uuid) -> anyhow::Result<Task> {
    let index = tasks
        .iter()
        .position(|task| task.id == id)
        .ok_or_else(|| anyhow!("no task with id: {id}"))?;
    Ok(tasks.remove(index))
}

/// Display order: pending before completed, ties broken by ascending
/// deadline. Stored order is left untouched; this only shapes output.
pub fn display_order(tasks: &[Task]) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| a.deadline.cmp(&b.deadline))
    });
    ordered
}
