//! Client-side session: the one user this client is logged in as, cached
//! across restarts under a fixed key.

use std::{collections::HashMap, fs, io, path::PathBuf};

use crate::{app::Route, models::User, AppResult};

pub const USER_KEY: &str = "user";

/// Small string key/value store the session is persisted in.
pub trait Storage: Send {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&mut self, key: &str) -> AppResult<()>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

pub struct SessionStore {
    user: Option<User>,
    storage: Box<dyn Storage>,
}

impl SessionStore {
    /// Restores whatever user was cached by a previous run. A cached record
    /// counts as proof of authentication; nothing is checked with the server.
    pub fn load(storage: Box<dyn Storage>) -> SessionStore {
        let user = match storage.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("ignoring unreadable cached user: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::error!("failed to read cached user: {e}");
                None
            }
        };

        if let Some(user) = &user {
            tracing::debug!(user = %user.username, "restored session");
        }

        SessionStore { user, storage }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn login(&mut self, user: User) -> &User {
        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(USER_KEY, &raw) {
                    tracing::error!("failed to cache user: {e}");
                }
            }
            Err(e) => tracing::error!("failed to encode user: {e}"),
        }

        tracing::info!(user = %user.username, "logged in");
        self.user.insert(user)
    }

    pub fn logout(&mut self) -> Route {
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.username, "logged out");
        }
        if let Err(e) = self.storage.remove(USER_KEY) {
            tracing::error!("failed to clear cached user: {e}");
        }
        Route::Landing
    }

    pub fn into_storage(self) -> Box<dyn Storage> {
        self.storage
    }
}
