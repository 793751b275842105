use uuid::Uuid;

use crate::{
    api::ApiClient,
    auth::{self, LoginForm, SignupForm},
    config::Config,
    models::{known_users, ChatMessage, Community, KnownUser, User},
    rooms::{ChatPane, CommunityForm, Directory, Roster},
    session::{SessionStore, Storage},
    AppResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Chat,
    Profile,
}

/// Everything one running client holds: who is logged in, which view is up,
/// the community cache and the open chat pane.
pub struct App {
    api: ApiClient,
    session: SessionStore,
    directory: Directory,
    pane: ChatPane,
    known: Vec<KnownUser>,
    route: Route,
}

impl App {
    pub fn new(config: &Config, storage: Box<dyn Storage>) -> AppResult<App> {
        let api = ApiClient::new(config.api_url.clone())?;
        let session = SessionStore::load(storage);
        let mut pane = ChatPane::new(config.ws_url.clone());
        pane.set_sender(session.user().map(|u| u.username.clone()));

        Ok(App {
            api,
            session,
            directory: Directory::default(),
            pane,
            known: known_users(),
            route: Route::Landing,
        })
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn known_users(&self) -> &[KnownUser] {
        &self.known
    }

    pub fn pane(&self) -> &ChatPane {
        &self.pane
    }

    pub async fn login(&mut self, form: &LoginForm) -> AppResult<&User> {
        let user = auth::login(&self.api, &mut self.session, form).await?;
        self.pane.set_sender(Some(user.username.clone()));
        Ok(user)
    }

    pub async fn signup(&mut self, form: &SignupForm) -> AppResult<&User> {
        let user = auth::signup(&self.api, &mut self.session, form).await?;
        self.pane.set_sender(Some(user.username.clone()));
        Ok(user)
    }

    pub async fn logout(&mut self) -> Route {
        self.pane.close().await;
        self.pane.set_sender(None);
        self.directory.clear();
        self.route = auth::logout(&mut self.session);
        self.route
    }

    pub fn open_profile(&mut self) -> Route {
        self.route = Route::Profile;
        self.route
    }

    /// Enters the chat view. Without a session the client stays on the
    /// landing view and nothing is fetched.
    pub async fn open_chat(&mut self) -> Route {
        if !self.session.is_authenticated() {
            tracing::warn!("chat needs a logged in user");
            self.route = Route::Landing;
            return self.route;
        }
        self.route = Route::Chat;

        if let Err(e) = self.directory.refresh(&self.api).await {
            tracing::error!("failed to fetch communities: {e}");
        }
        self.connect_selected().await;
        self.route
    }

    /// Unmounts the chat view; the live connection goes with it.
    pub async fn leave_chat(&mut self) -> Route {
        self.pane.close().await;
        self.route = Route::Landing;
        self.route
    }

    /// Refetches the directory. In the chat view the pane follows the
    /// selection, which a refresh may move or drop.
    pub async fn refresh(&mut self) {
        if !self.has_session("refresh communities") {
            return;
        }
        if let Err(e) = self.directory.refresh(&self.api).await {
            tracing::error!("failed to fetch communities: {e}");
            return;
        }
        self.connect_selected().await;
    }

    /// Selects `id`. In the chat view the pane reopens on it, closing
    /// whatever was open first.
    pub async fn select_room(&mut self, id: Uuid) -> bool {
        if !self.has_session("select a community") {
            return false;
        }
        if self.directory.select(id).is_none() {
            return false;
        }
        self.connect_selected().await;
        true
    }

    pub async fn select_room_by_name(&mut self, name: &str) -> bool {
        if !self.has_session("select a community") {
            return false;
        }
        let Some(id) = self.directory.find_by_name(name).map(|c| c.id) else {
            tracing::warn!(name, "no community with that name");
            return false;
        };
        self.select_room(id).await
    }

    pub async fn create_community(&mut self, form: &CommunityForm) -> Option<Community> {
        let Some(owner) = self.session.user().map(|u| u.id) else {
            tracing::warn!("creating a community needs a logged in user");
            return None;
        };
        let created = match self.directory.create(&self.api, form, owner).await {
            Ok(created) => created.clone(),
            Err(e) => {
                tracing::error!("failed to create community: {e}");
                return None;
            }
        };
        self.connect_selected().await;
        Some(created)
    }

    pub async fn update_community(&mut self, record: Community) -> Option<Community> {
        if !self.has_session("update a community") {
            return None;
        }
        match self.directory.update(&self.api, record).await {
            Ok(updated) => Some(updated.clone()),
            Err(e) => {
                tracing::error!("failed to update community: {e}");
                None
            }
        }
    }

    pub async fn delete_community(&mut self, id: Uuid) -> bool {
        if !self.has_session("delete a community") {
            return false;
        }
        let was_open = match self.directory.delete(&self.api, id).await {
            Ok(was_open) => was_open,
            Err(e) => {
                tracing::error!(%id, "failed to delete community: {e}");
                return false;
            }
        };
        if was_open {
            self.pane.close().await;
        }
        true
    }

    pub async fn send(&mut self, text: &str) -> AppResult<()> {
        self.pane.send(text).await
    }

    pub async fn next_message(&mut self) -> Option<ChatMessage> {
        self.pane.next_message().await
    }

    pub fn roster(&self) -> Roster {
        self.directory
            .selected()
            .map(|c| Roster::for_community(c, &self.known))
            .unwrap_or_default()
    }

    fn has_session(&self, action: &str) -> bool {
        if self.session.is_authenticated() {
            return true;
        }
        tracing::warn!(action, "needs a logged in user");
        false
    }

    /// Keeps the pane on the selected community while the chat view is up.
    /// Outside it nothing is opened.
    async fn connect_selected(&mut self) {
        if self.route != Route::Chat || !self.session.is_authenticated() {
            return;
        }
        let Some(room) = self.directory.selected().map(Community::room_tag) else {
            self.pane.close().await;
            return;
        };
        if self.pane.room() == Some(room.as_str()) && self.pane.is_connected() {
            return;
        }
        if let Err(e) = self.pane.switch(&room).await {
            tracing::error!(room = %room, "failed to open live connection: {e}");
        }
    }
}
