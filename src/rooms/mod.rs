pub mod directory;
pub mod editor;
pub mod msg;
pub mod pane;
pub mod roster;
pub mod ws;

pub use directory::Directory;
pub use editor::{CommunityForm, MemberPicker};
pub use pane::ChatPane;
pub use roster::Roster;
pub use ws::LiveConnection;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("no sender: log in first")]
    NoSender,
    #[error("not connected to a room")]
    NotConnected,
}
