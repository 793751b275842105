//! In-process stand-in for the chat service: the HTTP routes the client
//! calls and a `/ws` endpoint that rebroadcasts every frame to every socket,
//! whatever room it was opened for.

use std::{
    net::SocketAddr,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path as UrlPath, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use neurochat::{
    config::Config,
    models::{Community, User},
};
use serde::Deserialize;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Clone)]
pub struct Backend {
    pub groups: Arc<Mutex<Vec<Community>>>,
    users: Arc<Mutex<Vec<(String, User)>>>,
    pub hits: Arc<AtomicUsize>,
    pub live: Arc<AtomicUsize>,
    pub opened: Arc<Mutex<Vec<String>>>,
    pub tx: broadcast::Sender<String>,
}

impl Backend {
    pub fn new() -> Self {
        Self {
            groups: Arc::default(),
            users: Arc::default(),
            hits: Arc::default(),
            live: Arc::default(),
            opened: Arc::default(),
            tx: broadcast::channel(64).0,
        }
    }

    pub fn with_groups(self, groups: Vec<Community>) -> Self {
        *self.groups.lock().unwrap() = groups;
        self
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// Pushes a raw frame to every open socket.
    pub fn broadcast(&self, frame: impl Into<String>) {
        let _ = self.tx.send(frame.into());
    }

    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Running {
    pub backend: Backend,
    pub addr: SocketAddr,
}

impl Running {
    pub fn config(&self, home: &Path) -> Config {
        Config::new(
            &format!("http://{}", self.addr),
            &format!("ws://{}/ws", self.addr),
            home.to_path_buf(),
        )
        .unwrap()
    }
}

pub async fn serve(backend: Backend) -> Running {
    let app = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/groups", get(groups))
        .route("/create-group", post(create_group))
        .route("/update-group", put(update_group))
        .route("/groups/{id}", delete(delete_group))
        .route("/ws", get(room_ws))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Running { backend, addr }
}

pub fn community(name: &str, owner: Uuid, members: Vec<Uuid>) -> Community {
    Community {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        description: Some(format!("all about {name}")),
        owner,
        members,
    }
}

/// Polls `check` until it holds or a couple of seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[derive(Deserialize)]
struct SignupBody {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct CreateGroupBody {
    name: String,
    description: Option<String>,
    owner: Uuid,
    members: Vec<Uuid>,
}

#[derive(Deserialize)]
struct RoomQuery {
    room: Option<String>,
}

async fn signup(State(backend): State<Backend>, Json(body): Json<SignupBody>) -> impl IntoResponse {
    backend.hit();
    let user = User {
        id: Uuid::now_v7(),
        username: body.username,
        email: body.email,
    };
    backend.users.lock().unwrap().push((body.password, user.clone()));
    Json(user)
}

async fn login(State(backend): State<Backend>, Json(body): Json<LoginBody>) -> Result<Json<User>, StatusCode> {
    backend.hit();
    backend
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|(password, user)| user.email == body.email && *password == body.password)
        .map(|(_, user)| Json(user.clone()))
        .ok_or(StatusCode::UNAUTHORIZED)
}

async fn groups(State(backend): State<Backend>) -> Json<Vec<Community>> {
    backend.hit();
    Json(backend.groups.lock().unwrap().clone())
}

async fn create_group(State(backend): State<Backend>, Json(body): Json<CreateGroupBody>) -> Json<Community> {
    backend.hit();
    let created = Community {
        id: Uuid::now_v7(),
        name: body.name,
        description: body.description,
        owner: body.owner,
        members: body.members,
    };
    backend.groups.lock().unwrap().push(created.clone());
    Json(created)
}

async fn update_group(State(backend): State<Backend>, Json(body): Json<Community>) -> StatusCode {
    backend.hit();
    let mut groups = backend.groups.lock().unwrap();
    match groups.iter_mut().find(|g| g.id == body.id) {
        Some(slot) => {
            *slot = body;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn delete_group(State(backend): State<Backend>, UrlPath(id): UrlPath<Uuid>) -> StatusCode {
    backend.hit();
    let mut groups = backend.groups.lock().unwrap();
    let before = groups.len();
    groups.retain(|g| g.id != id);
    if groups.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn room_ws(
    Query(RoomQuery { room }): Query<RoomQuery>,
    State(backend): State<Backend>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let room = room.unwrap_or_else(|| "general".to_owned());
    ws.on_upgrade(move |socket| relay(socket, room, backend))
}

async fn relay(socket: WebSocket, room: String, backend: Backend) {
    let mut rx = backend.tx.subscribe();
    backend.opened.lock().unwrap().push(room);
    backend.live.fetch_add(1, Ordering::SeqCst);

    let (mut sender, mut receiver) = socket.split();
    let broadcast_task = tokio::spawn(async move {
        while let Ok(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                let _ = backend.tx.send(text.as_str().to_owned());
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    broadcast_task.abort();
    backend.live.fetch_sub(1, Ordering::SeqCst);
}
