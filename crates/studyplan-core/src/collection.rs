use anyhow::anyhow;
use uuid::Uuid;

/// Records that live in a uuid-keyed, insertion-ordered collection.
pub trait Keyed {
    fn key(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl std::str::FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(anyhow!("expected 'up' or 'down', got: {other}")),
        }
    }
}

/// Adjacent swap toward the front (`Up`) or back (`Down`) of the list.
/// A move at either boundary is a no-op, as is an unknown id. Returns
/// whether the collection changed.
pub fn move_item<T: Keyed>(items: &mut [T], id: Uuid, direction: Direction) -> bool {
    let Some(index) = items.iter().position(|item| item.key() == id) else {
        return false;
    };

    match direction {
        Direction::Up if index > 0 => {
            items.swap(index, index - 1);
            true
        }
        Direction::Down if index + 1 < items.len() => {
            items.swap(index, index + 1);
            true
        }
        _ => false,
    }
}

/// Resolves a uuid or unambiguous uuid prefix to the full key.
pub fn resolve_id<T: Keyed>(items: &[T], prefix: &str) -> anyhow::Result<Uuid> {
    let needle = prefix.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(anyhow!("empty id"));
    }

    let mut matches = items
        .iter()
        .map(Keyed::key)
        .filter(|key| key.to_string().starts_with(&needle));

    let Some(first) = matches.next() else {
        return Err(anyhow!("no record matching id: {prefix}"));
    };
    if matches.next().is_some() {
        return Err(anyhow!("ambiguous id prefix: {prefix}"));
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rec {
        id: Uuid,
        label: &'static str,
    }

    impl Keyed for Rec {
        fn key(&self) -> Uuid {
            self.id
        }
    }

    fn three() -> Vec<Rec> {
        vec![
            Rec {
                id: Uuid::new_v4(),
                label: "a",
            },
            Rec {
                id: Uuid::new_v4(),
                label: "b",
            },
            Rec {
                id: Uuid::new_v4(),
                label: "c",
            },
        ]
    }

    fn labels(items: &[Rec]) -> Vec<&'static str> {
        items.iter().map(|r| r.label).collect()
    }

    #[test]
    fn swaps_with_neighbor() {
        let mut items = three();
        let mid = items[1].id;
        assert!(move_item(&mut items, mid, Direction::Up));
        assert_eq!(labels(&items), vec!["b", "a", "c"]);

        assert!(move_item(&mut items, mid, Direction::Down));
        assert_eq!(labels(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn boundary_moves_are_noops() {
        let mut items = three();
        let first = items[0].id;
        let last = items[2].id;

        assert!(!move_item(&mut items, first, Direction::Up));
        assert_eq!(labels(&items), vec!["a", "b", "c"]);

        assert!(!move_item(&mut items, last, Direction::Down));
        assert_eq!(labels(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_id_is_noop() {
        let mut items = three();
        assert!(!move_item(&mut items, Uuid::new_v4(), Direction::Up));
        assert_eq!(labels(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn resolves_unique_prefix() {
        let items = three();
        let full = items[1].id;
        let text = full.to_string();
        let resolved = resolve_id(&items, &text[..8]).expect("resolve prefix");
        assert_eq!(resolved, full);
    }

    #[test]
    fn rejects_unknown_and_ambiguous() {
        let items = three();
        assert!(resolve_id(&items, "zzzzzzzz").is_err());

        // Duplicate keys force an ambiguous prefix.
        let mut pair = three();
        pair[1].id = pair[0].id;
        let text = pair[0].id.to_string();
        assert!(resolve_id(&pair, &text[..4]).is_err());
    }
}
