use uuid::Uuid;

use crate::{
    api::{ApiClient, CreateGroupRequest},
    models::Community,
    AppResult,
};

use super::CommunityForm;

/// Cached copy of the communities the server knows about, plus which one is
/// open. The cache follows successful calls and is never reconciled.
#[derive(Debug, Default)]
pub struct Directory {
    communities: Vec<Community>,
    selected: Option<Uuid>,
}

impl Directory {
    pub fn communities(&self) -> &[Community] {
        &self.communities
    }

    pub fn get(&self, id: Uuid) -> Option<&Community> {
        self.communities.iter().find(|c| c.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Community> {
        self.communities.iter().find(|c| c.name == name)
    }

    pub fn selected(&self) -> Option<&Community> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Selects a cached community. Unknown ids leave the selection alone.
    pub fn select(&mut self, id: Uuid) -> Option<&Community> {
        if self.get(id).is_none() {
            tracing::warn!(%id, "cannot select unknown community");
            return None;
        }
        self.selected = Some(id);
        self.get(id)
    }

    pub fn clear(&mut self) {
        self.communities.clear();
        self.selected = None;
    }

    pub async fn refresh(&mut self, api: &ApiClient) -> AppResult<()> {
        let communities = api.groups().await?;
        self.replace_all(communities);
        Ok(())
    }

    /// Validates before anything is sent; an invalid form never reaches
    /// the server.
    pub async fn create(&mut self, api: &ApiClient, form: &CommunityForm, owner: Uuid) -> AppResult<&Community> {
        form.validate_create()?;

        let created = api.create_group(&CreateGroupRequest {
            name: form.name.trim(),
            description: form.description.trim(),
            owner,
            members: &form.members,
        }).await?;

        Ok(self.insert_created(created))
    }

    pub async fn update(&mut self, api: &ApiClient, record: Community) -> AppResult<&Community> {
        crate::require("name", &record.name)?;
        api.update_group(&record).await?;
        self.apply_update(record)
            .ok_or("updated community is no longer cached".into())
    }

    /// Returns true when the removed community was the open one.
    pub async fn delete(&mut self, api: &ApiClient, id: Uuid) -> AppResult<bool> {
        api.delete_group(id).await?;
        Ok(self.remove(id))
    }

    pub(crate) fn replace_all(&mut self, communities: Vec<Community>) {
        self.communities = communities;
        if self.selected().is_none() {
            self.selected = self.communities.first().map(|c| c.id);
        }
        tracing::debug!(count = self.communities.len(), "directory refreshed");
    }

    pub(crate) fn insert_created(&mut self, created: Community) -> &Community {
        tracing::info!(id = %created.id, name = %created.name, "community created");
        self.selected = Some(created.id);
        self.communities.push(created);
        &self.communities[self.communities.len() - 1]
    }

    pub(crate) fn apply_update(&mut self, record: Community) -> Option<&Community> {
        let slot = self.communities.iter_mut().find(|c| c.id == record.id)?;
        *slot = record;
        Some(&*slot)
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> bool {
        self.communities.retain(|c| c.id != id);
        if self.selected == Some(id) {
            self.selected = None;
            return true;
        }
        false
    }
}
