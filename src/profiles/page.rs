use crate::{include_res, models::User};

/// The profile card for the logged-in user, or the access-denied notice.
pub fn profile(user: Option<&User>) -> String {
    let Some(user) = user else {
        return include_res!(str, "/pages/denied.txt").to_owned();
    };

    let initial = user
        .username
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_owned());

    include_res!(str, "/pages/profile.txt")
        .replace("{initial}", &initial)
        .replace("{username}", &user.username)
        .replace("{email}", &user.email)
        .replace("{id}", &user.id.to_string())
}
