use crate::{app::Route, session::SessionStore};

/// Forgets the current user and sends the client back to the landing view.
pub fn logout(session: &mut SessionStore) -> Route {
    session.logout()
}
