use uuid::Uuid;

use crate::models::{Community, KnownUser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub is_owner: bool,
}

/// Members of one community, resolved against the users this client knows.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn for_community(community: &Community, known: &[KnownUser]) -> Roster {
        let entries = community
            .members
            .iter()
            .map(|id| {
                let user = known.iter().find(|u| u.id == *id);
                RosterEntry {
                    id: *id,
                    name: user.map_or_else(|| id.to_string(), |u| u.username.clone()),
                    avatar: user.map(|u| u.avatar.clone()),
                    is_owner: *id == community.owner,
                }
            })
            .collect();
        Roster { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
