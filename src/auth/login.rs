use crate::{
    api::{ApiClient, LoginRequest, SignupRequest},
    models::User,
    require,
    session::SessionStore,
    AppResult, FormError,
};

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormError> {
        require("username", &self.username)?;
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

pub async fn login<'s>(
    api: &ApiClient,
    session: &'s mut SessionStore,
    form: &LoginForm,
) -> AppResult<&'s User> {
    form.validate()?;

    let user = api.login(&LoginRequest {
        email: form.email.trim(),
        password: &form.password,
    }).await?;

    Ok(session.login(user))
}

/// Creates the account and logs straight into it.
pub async fn signup<'s>(
    api: &ApiClient,
    session: &'s mut SessionStore,
    form: &SignupForm,
) -> AppResult<&'s User> {
    form.validate()?;

    let user = api.signup(&SignupRequest {
        username: form.username.trim(),
        email: form.email.trim(),
        password: &form.password,
    }).await?;

    Ok(session.login(user))
}
