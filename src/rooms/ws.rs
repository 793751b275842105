use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use url::Url;

use crate::{models::ChatMessage, AppResult};

use super::msg;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const INBOUND_BUFFER: usize = 64;

/// One open socket scoped to a single room. The read half lives in a
/// spawned task that decodes frames and hands them over a channel.
pub struct LiveConnection {
    room: String,
    sink: SplitSink<Socket, Message>,
    inbound: mpsc::Receiver<ChatMessage>,
    reader: JoinHandle<()>,
}

pub fn room_url(ws_url: &Url, room: &str) -> Url {
    let mut url = ws_url.clone();
    url.query_pairs_mut().append_pair("room", room);
    url
}

impl LiveConnection {
    pub async fn open(ws_url: &Url, room: &str) -> AppResult<LiveConnection> {
        let url = room_url(ws_url, room);
        let (stream, _) = connect_async(url.as_str()).await?;
        tracing::info!(room, "connected to {url}");

        let (sink, mut receiver) = stream.split();
        let (tx, inbound) = mpsc::channel(INBOUND_BUFFER);

        let reader_room = room.to_owned();
        let reader = tokio::spawn(async move {
            while let Some(frame) = receiver.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!(room = %reader_room, "socket error: {e}");
                        break;
                    }
                };

                let msg = match msg::decode(text.as_str()) {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::warn!(room = %reader_room, "dropping malformed frame: {e}");
                        continue;
                    }
                };

                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            tracing::debug!(room = %reader_room, "reader finished");
        });

        Ok(LiveConnection {
            room: room.to_owned(),
            sink,
            inbound,
            reader,
        })
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub async fn send(&mut self, msg: &ChatMessage) -> AppResult<()> {
        let frame = msg::to_frame(msg)?;
        self.sink.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    /// Next decoded payload, or `None` once the socket is gone.
    pub async fn recv(&mut self) -> Option<ChatMessage> {
        self.inbound.recv().await
    }

    pub async fn close(mut self) {
        if let Err(e) = self.sink.send(Message::Close(None)).await {
            tracing::debug!(room = %self.room, "close frame not sent: {e}");
        }
        let _ = self.sink.close().await;
        self.reader.abort();
        tracing::info!(room = %self.room, "disconnected");
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
