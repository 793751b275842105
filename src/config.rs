use std::path::PathBuf;

use url::Url;

use crate::AppResult;

pub const API_URL_VAR: &str = "NEUROCHAT_API_URL";
pub const WS_URL_VAR: &str = "NEUROCHAT_WS_URL";
pub const HOME_VAR: &str = "NEUROCHAT_HOME";

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub ws_url: Url,
    /// Where the cached session lives.
    pub data_dir: PathBuf,
}

impl Config {
    /// Reads `.env` and the process environment, falling back to the local
    /// development server.
    pub fn from_env() -> AppResult<Config> {
        dotenv::dotenv().ok();

        let api_url = dotenv::var(API_URL_VAR).unwrap_or(DEFAULT_API_URL.to_owned());
        let ws_url = dotenv::var(WS_URL_VAR).unwrap_or(DEFAULT_WS_URL.to_owned());
        let data_dir = match dotenv::var(HOME_VAR) {
            Ok(home) => PathBuf::from(home),
            Err(_) => default_data_dir(),
        };

        Config::new(&api_url, &ws_url, data_dir)
    }

    pub fn new(api_url: &str, ws_url: &str, data_dir: PathBuf) -> AppResult<Config> {
        Ok(Config {
            api_url: Url::parse(api_url)?,
            ws_url: parse_ws_url(ws_url)?,
            data_dir,
        })
    }

    /// Applies whatever the command line supplied on top of this config.
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        ws_url: Option<&str>,
        data_dir: Option<PathBuf>,
    ) -> AppResult<Config> {
        if let Some(api_url) = api_url {
            self.api_url = Url::parse(api_url)?;
        }
        if let Some(ws_url) = ws_url {
            self.ws_url = parse_ws_url(ws_url)?;
        }
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        Ok(self)
    }
}

fn parse_ws_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw)?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(format!("{url} is not a ws:// or wss:// address"))?;
    }
    Ok(url)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("neurochat")
}
