//! Client session façade.
//!
//! `GameClient` owns one WebSocket connection. Outbound calls are
//! fire-and-forget frames tagged with the client's game type; inbound events
//! are decoded and handed to the handler registered for their kind. The
//! façade holds no game logic: every decision comes from the server.

use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use goishi_shared::protocol::{
    ClientEvent, ClientFrame, Color, CreateRoomPayload, GameOverPayload, GameType, JoinRoomPayload,
    MovePayload, QuickMatchPayload, RoomRef, ServerEvent, ServerEventKind,
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    error::ClientError,
    handlers::{Handler, HandlerTable},
};

pub struct GameClient {
    game: GameType,
    outbound: mpsc::UnboundedSender<String>,
    handlers: Arc<RwLock<HandlerTable>>,
    connected: watch::Receiver<bool>,
    socket_id: Arc<RwLock<Option<String>>>,
    read_task: JoinHandle<()>,
    write_task: JoinHandle<()>,
}

impl GameClient {
    /// Opens the WebSocket. The client counts as connected once the server's
    /// `connected` greeting arrives; see [`GameClient::wait_for_connection`].
    pub async fn connect(url: &str, game: GameType) -> Result<Self, ClientError> {
        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let handlers = Arc::new(RwLock::new(HandlerTable::new()));
        let socket_id = Arc::new(RwLock::new(None));
        let (connected_tx, connected) = watch::channel(false);
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();

        let read_handlers = handlers.clone();
        let read_socket_id = socket_id.clone();
        let read_task = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        let event = match serde_json::from_str::<ServerEvent>(text.as_str()) {
                            Ok(event) => event,
                            Err(e) => {
                                tracing::warn!("Unrecognized event: {} ({})", text.as_str(), e);
                                continue;
                            }
                        };
                        if let ServerEvent::Connected { socket_id } = &event {
                            if let Ok(mut slot) = read_socket_id.write() {
                                *slot = Some(socket_id.clone());
                            }
                            connected_tx.send_replace(true);
                        }
                        dispatch(&read_handlers, &event);
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            connected_tx.send_replace(false);
        });

        let write_task = tokio::spawn(async move {
            while let Some(json) = outbound_rx.recv().await {
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send frame: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
        });

        Ok(Self {
            game,
            outbound,
            handlers,
            connected,
            socket_id,
            read_task,
            write_task,
        })
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Socket id assigned by the server, once greeted
    pub fn socket_id(&self) -> Option<String> {
        self.socket_id.read().ok().and_then(|slot| slot.clone())
    }

    /// Resolves once the server greeting has arrived
    ///
    /// # Errors
    ///
    /// * `ClientError::Timeout` - no greeting within `timeout`
    /// * `ClientError::NotConnected` - the connection closed first
    pub async fn wait_for_connection(&self, timeout: Duration) -> Result<(), ClientError> {
        let mut connected = self.connected.clone();
        match tokio::time::timeout(timeout, connected.wait_for(|up| *up)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(ClientError::NotConnected),
            Err(_) => Err(ClientError::Timeout),
        }
    }

    /// Registers the handler for `kind`, replacing any previous one
    pub fn on<F>(&self, kind: ServerEventKind, handler: F)
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        if let Ok(mut table) = self.handlers.write() {
            table.register(kind, handler);
        }
    }

    pub fn off(&self, kind: ServerEventKind) {
        if let Ok(mut table) = self.handlers.write() {
            table.unregister(kind);
        }
    }

    pub fn send(&self, event: ClientEvent) -> Result<(), ClientError> {
        let json = serde_json::to_string(&ClientFrame::new(self.game, event))?;
        self.outbound
            .send(json)
            .map_err(|_| ClientError::NotConnected)
    }

    pub fn join_match(&self, username: Option<String>, user_id: Option<String>) -> Result<(), ClientError> {
        self.send(ClientEvent::QuickMatch(QuickMatchPayload { username, user_id }))
    }

    pub fn create_room(&self, payload: CreateRoomPayload) -> Result<(), ClientError> {
        self.send(ClientEvent::CreateRoom(payload))
    }

    pub fn join_room(
        &self,
        room_id: &str,
        username: &str,
        user_id: Option<String>,
        password: Option<String>,
    ) -> Result<(), ClientError> {
        self.send(ClientEvent::JoinRoom(JoinRoomPayload {
            room_id: room_id.to_string(),
            user_id,
            username: username.to_string(),
            password,
        }))
    }

    pub fn toggle_ready(&self, room_id: &str) -> Result<(), ClientError> {
        self.send(ClientEvent::ToggleReady(RoomRef::new(room_id)))
    }

    pub fn start_game(&self, room_id: &str) -> Result<(), ClientError> {
        self.send(ClientEvent::StartGame(RoomRef::new(room_id)))
    }

    pub fn send_move(&self, room_id: &str, row: i32, col: i32, side: Option<Color>) -> Result<(), ClientError> {
        self.send(ClientEvent::Move(MovePayload {
            room_id: room_id.to_string(),
            row,
            col,
            side,
        }))
    }

    pub fn report_game_over(&self, room_id: &str, winner: Option<Color>) -> Result<(), ClientError> {
        self.send(ClientEvent::GameOver(GameOverPayload {
            room_id: room_id.to_string(),
            winner,
        }))
    }

    pub fn get_room_list(&self) -> Result<(), ClientError> {
        self.send(ClientEvent::GetRoomList)
    }

    pub fn leave_room(&self, room_id: &str) -> Result<(), ClientError> {
        self.send(ClientEvent::LeaveRoom(RoomRef::new(room_id)))
    }

    pub fn request_rematch(&self, room_id: &str) -> Result<(), ClientError> {
        self.send(ClientEvent::RequestRematch(RoomRef::new(room_id)))
    }

    pub fn accept_rematch(&self, room_id: &str) -> Result<(), ClientError> {
        self.send(ClientEvent::AcceptRematch(RoomRef::new(room_id)))
    }

    pub fn decline_rematch(&self, room_id: &str) -> Result<(), ClientError> {
        self.send(ClientEvent::DeclineRematch(RoomRef::new(room_id)))
    }

    /// Resolves when the connection is gone
    pub async fn closed(&self) {
        let mut connected = self.connected.clone();
        // A greeting may not have arrived yet; wait for it first
        let _ = connected.wait_for(|up| *up).await;
        let _ = connected.wait_for(|up| !*up).await;
    }

    /// Closes the connection and stops the background tasks
    pub fn close(&self) {
        self.read_task.abort();
        self.write_task.abort();
    }
}

impl Drop for GameClient {
    fn drop(&mut self) {
        self.read_task.abort();
        self.write_task.abort();
    }
}

fn dispatch(handlers: &RwLock<HandlerTable>, event: &ServerEvent) {
    let handler = match handlers.read() {
        Ok(table) => table.get(event.kind()),
        Err(_) => None,
    };
    match handler {
        Some(handler) => handler(event),
        None => tracing::debug!("No handler for {:?}", event.kind()),
    }
}
