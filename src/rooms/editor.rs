use uuid::Uuid;

use crate::{
    models::{Community, KnownUser},
    require, FormError,
};

/// What the create and edit forms collect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityForm {
    pub name: String,
    pub description: String,
    pub members: Vec<Uuid>,
}

impl CommunityForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            members: Vec::new(),
        }
    }

    /// Seeds the edit form from a cached record.
    pub fn edit(community: &Community) -> Self {
        Self {
            name: community.name.clone(),
            description: community.description.clone().unwrap_or_default(),
            members: community.members.clone(),
        }
    }

    /// A new community needs both a name and a description.
    pub fn validate_create(&self) -> Result<(), FormError> {
        require("name", &self.name)?;
        require("description", &self.description)
    }

    pub fn validate_edit(&self) -> Result<(), FormError> {
        require("name", &self.name)
    }

    /// The full record an update submits: `original` with the edited fields
    /// laid over it.
    pub fn into_record(self, original: &Community) -> Community {
        let description = self.description.trim();
        Community {
            id: original.id,
            name: self.name.trim().to_owned(),
            description: (!description.is_empty()).then(|| description.to_owned()),
            owner: original.owner,
            members: self.members,
        }
    }
}

/// Member selection for the edit form.
#[derive(Debug, Clone)]
pub struct MemberPicker {
    candidates: Vec<KnownUser>,
    selected: Vec<Uuid>,
}

impl MemberPicker {
    pub fn new(candidates: Vec<KnownUser>, selected: Vec<Uuid>) -> Self {
        Self { candidates, selected }
    }

    pub fn selected(&self) -> &[Uuid] {
        &self.selected
    }

    /// Unselected users whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&KnownUser> {
        let query = query.to_lowercase();
        self.candidates
            .iter()
            .filter(|user| user.username.to_lowercase().contains(&query))
            .filter(|user| !self.selected.contains(&user.id))
            .collect()
    }

    /// Adds `id` if absent, removes it if present. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if let Some(pos) = self.selected.iter().position(|m| *m == id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(id);
            true
        }
    }

    pub fn into_selected(self) -> Vec<Uuid> {
        self.selected
    }
}
