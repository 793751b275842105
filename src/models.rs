use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: Uuid,
    #[serde(default)]
    pub members: Vec<Uuid>,
}

impl Community {
    /// Tag carried by every chat payload that belongs to this community.
    pub fn room_tag(&self) -> String {
        self.id.to_string()
    }
}

/// One line of chat. `timestamp` is milliseconds since the Unix epoch,
/// stamped by the sending client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub room: String,
    pub content: String,
    pub sender: String,
    pub timestamp: i64,
}

/// Someone the member picker and the roster can resolve an id against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownUser {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
}

impl KnownUser {
    fn seed(id: u128, username: &str, avatar: &str) -> Self {
        Self {
            id: Uuid::from_u128(id),
            username: username.to_owned(),
            avatar: avatar.to_owned(),
        }
    }
}

/// The people every client knows about before the server tells it anything.
pub fn known_users() -> Vec<KnownUser> {
    vec![
        KnownUser::seed(1, "Neo", "👨‍💻"),
        KnownUser::seed(2, "Trinity", "🕶️"),
        KnownUser::seed(3, "Morpheus", "🧔"),
        KnownUser::seed(4, "Oracle", "🔮"),
        KnownUser::seed(5, "Cypher", "🕵️"),
    ]
}

pub fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
