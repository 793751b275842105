use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;
use uuid::Uuid;

use crate::{
    models::{Community, User},
    AppResult,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{method} {path} answered {status}: {body}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        body: String,
    },
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateGroupRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub owner: Uuid,
    pub members: &'a [Uuid],
}

/// Thin JSON client for the chat service's HTTP routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> AppResult<ApiClient> {
        let http = reqwest::ClientBuilder::new()
            .user_agent(concat!("neurochat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient { http, base })
    }

    pub async fn login(&self, request: &LoginRequest<'_>) -> AppResult<User> {
        self.send_json(Method::POST, "/login", Some(request)).await
    }

    pub async fn signup(&self, request: &SignupRequest<'_>) -> AppResult<User> {
        self.send_json(Method::POST, "/signup", Some(request)).await
    }

    pub async fn groups(&self) -> AppResult<Vec<Community>> {
        self.send_json::<(), _>(Method::GET, "/groups", None).await
    }

    pub async fn create_group(&self, request: &CreateGroupRequest<'_>) -> AppResult<Community> {
        self.send_json(Method::POST, "/create-group", Some(request)).await
    }

    /// The service only acknowledges updates; callers keep the record they sent.
    pub async fn update_group(&self, community: &Community) -> AppResult<()> {
        let builder = self.request(Method::PUT, "/update-group")?.json(community);
        self.execute(Method::PUT, "/update-group", builder).await?;
        Ok(())
    }

    pub async fn delete_group(&self, id: Uuid) -> AppResult<()> {
        let path = format!("/groups/{id}");
        let builder = self.request(Method::DELETE, &path)?;
        self.execute(Method::DELETE, &path, builder).await?;
        Ok(())
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method.clone(), path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.execute(method, path, builder).await?;
        Ok(response.json().await?)
    }

    fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let url = self.base.join(path)?;
        Ok(self.http.request(method, url))
    }

    async fn execute(&self, method: Method, path: &str, builder: RequestBuilder) -> AppResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(%method, path, %status, "api response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                method,
                path: path.to_owned(),
                status,
                body,
            })?;
        }
        Ok(response)
    }
}
