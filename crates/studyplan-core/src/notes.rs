use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::Keyed;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

impl Keyed for Note {
    fn key(&self) -> Uuid {
        self.id
    }
}

pub fn seed() -> Vec<Note> {
    Vec::new()
}

/// Creates a note at the front of the list; newest first is the default
/// order, and the user can reorder afterwards. Title and content must both
/// be non-empty after trimming.
pub fn create(
    notes: &mut Vec<Note>,
    title: &str,
    content: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<Uuid> {
    let title = title.trim();
    let content = content.trim();
    if title.is_empty() {
        return Err(anyhow!("note title cannot be empty"));
    }
    if content.is_empty() {
        return Err(anyhow!("note content cannot be empty"));
    }

    let note = Note {
        id: Uuid::new_v4(),
        title: title.to_string(),
        content: content.to_string(),
        subject: "General".to_string(),
        created_at: now,
    };
    let id = note.id;
    notes.insert(0, note);
    Ok(id)
}

pub fn delete(notes: &mut Vec<Note>, id: Uuid) -> anyhow::Result<Note> {
    let index = notes
        .iter()
        .position(|note| note.id == id)
        .ok_or_else(|| anyhow!("no note with id: {id}"))?;
    Ok(notes.remove(index))
}

pub fn find(notes: &[Note], id: Uuid) -> anyhow::Result<&Note> {
    notes
        .iter()
        .find(|note| note.id == id)
        .ok_or_else(|| anyhow!("no note with id: {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_prepends() {
        let mut notes = Vec::new();
        let now = Utc::now();
        create(&mut notes, "First", "body", now).expect("create");
        create(&mut notes, "Second", "body", now).expect("create");

        assert_eq!(notes[0].title, "Second");
        assert_eq!(notes[1].title, "First");
    }

    #[test]
    fn create_requires_title_and_content() {
        let mut notes = Vec::new();
        let now = Utc::now();
        assert!(create(&mut notes, " ", "body", now).is_err());
        assert!(create(&mut notes, "Title", "  ", now).is_err());
        assert!(notes.is_empty());
    }

    #[test]
    fn delete_then_find_fails() {
        let mut notes = Vec::new();
        let now = Utc::now();
        let id = create(&mut notes, "Title", "body", now).expect("create");

        delete(&mut notes, id).expect("delete");
        assert!(find(&notes, id).is_err());
        assert!(delete(&mut notes, id).is_err());
    }
}
