use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Math,
    Science,
    English,
    History,
    Other,
}

/// New subjects cycle through the palette by insertion index.
const COLOR_CYCLE: [Color; 5] = [
    Color::Math,
    Color::Science,
    Color::English,
    Color::History,
    Color::Other,
];

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Math => "math",
            Self::Science => "science",
            Self::English => "english",
            Self::History => "history",
            Self::Other => "other",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,

    /// Derived percentage. Recomputed on every progress or target edit;
    /// kept stored for parity with the persisted shape. A direct target
    /// edit can leave `completed > target`, which pushes this above 100
    /// until the next progress update (see DESIGN.md).
    pub progress: u32,
    pub color: Color,
    pub target: u32,
    pub completed: u32,
}

impl Keyed for Subject {
    fn key(&self) -> Uuid {
        self.id
    }
}

fn derive_progress(completed: u32, target: u32) -> u32 {
    let target = target.max(1);
    ((f64::from(completed) / f64::from(target)) * 100.0).round() as u32
}

fn make(name: &str, completed: u32, target: u32, color: Color) -> Subject {
    Subject {
        id: Uuid::new_v4(),
        name: name.to_string(),
        progress: derive_progress(completed, target),
        color,
        target,
        completed,
    }
}

/// First-run contents of the `subjects` collection.
pub fn seed() -> Vec<Subject> {
    vec![
        make("Mathematics", 65, 100, Color::Math),
        make("Science", 40, 100, Color::Science),
        make("English", 80, 100, Color::English),
    ]
}

pub fn add(subjects: &mut Vec<Subject>, name: &str) -> anyhow::Result<Uuid> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("subject name cannot be empty"));
    }

    let color = COLOR_CYCLE[subjects.len() % COLOR_CYCLE.len()];
    let subject = make(name, 0, 100, color);
    let id = subject.id;
    subjects.push(subject);
    Ok(id)
}

/// Applies a signed hours delta. `completed` is clamped to `[0, target]`
/// and `progress` re-derived from the clamped value.
pub fn update_progress(subjects: &mut [Subject], id: Uuid, delta: i64) -> anyhow::Result<u32> {
    let subject = find_mut(subjects, id)?;
    let updated = i64::from(subject.completed)
        .saturating_add(delta)
        .clamp(0, i64::from(subject.target));
    subject.completed = updated as u32;
    subject.progress = derive_progress(subject.completed, subject.target);
    Ok(subject.progress)
}

/// Sets a new target (floored at 1) and re-derives `progress` from the
/// existing `completed`. `completed` itself is deliberately not reclamped
/// against a lowered target; the stored hours survive the edit.
pub fn set_target(subjects: &mut [Subject], id: Uuid, target: u32) -> anyhow::Result<u32> {
    let subject = find_mut(subjects, id)?;
    subject.target = target.max(1);
    subject.progress = derive_progress(subject.completed, subject.target);
    Ok(subject.progress)
}

pub fn delete(subjects: &mut Vec<Subject>, id: Uuid) -> anyhow::Result<Subject> {
    let index = subjects
        .iter()
        .position(|subject| subject.id == id)
        .ok_or_else(|| anyhow!("no subject with id: {id}"))?;
    Ok(subjects.remove(index))
}

fn find_mut(subjects: &mut [Subject], id: Uuid) -> anyhow::Result<&mut Subject> {
    subjects
        .iter_mut()
        .find(|subject| subject.id == id)
        .ok_or_else(|| anyhow!("no subject with id: {id}"))
}
