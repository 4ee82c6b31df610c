//! WebSocket connection handlers.

use std::{future::Future, sync::Arc};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use tokio::sync::{mpsc, oneshot};

use crate::{domain::ConnectionId, ui::state::AppState};

use super::event::handle_frame;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards queued events from `rx` to the WebSocket.
///
/// # Arguments
///
/// * `rx` - Channel receiver fed by the MessagePusher
/// * `sender` - WebSocket sink of this connection
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Reads text frames until the peer closes or `stop` fires.
///
/// `stop` is only observed between frames, so a frame already handed to
/// `on_text` always runs to completion.
async fn recv_loop<S, F, Fut>(mut receiver: S, mut stop: oneshot::Receiver<()>, on_text: F)
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
    F: Fn(String) -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let msg = tokio::select! {
            biased;
            _ = &mut stop => break,
            msg = receiver.next() => msg,
        };
        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => on_text(text.as_str().to_string()).await,
            Message::Ping(_) => {
                tracing::debug!("Received ping");
            }
            Message::Close(_) => {
                tracing::info!("Peer requested close");
                break;
            }
            _ => {}
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (tx, rx) = mpsc::unbounded_channel();

    // 登録と connected の送信（送信はチャネルに積まれ、pusher_loop が流す）
    if let Err(e) = state
        .connect_player_usecase
        .execute(connection_id.clone(), tx)
        .await
    {
        tracing::warn!("Rejecting connection: {}", e);
        return;
    }
    tracing::info!("Client '{}' connected", connection_id);

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    // 受信側はフレームの処理中には止めない。処理の途中で打ち切ると
    // Room と Repository の状態が食い違ったまま残る
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        recv_loop(receiver, stop_rx, |text| {
            let state = state_clone.clone();
            let connection_id = connection_id_clone.clone();
            async move { handle_frame(&state, &connection_id, &text).await }
        })
        .await;
    });

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            let _ = stop_tx.send(());
            let _ = (&mut recv_task).await;
        }
    };

    // 切断は leaveRoom と同じ経路で処理する
    let left = state
        .disconnect_player_usecase
        .execute(&connection_id)
        .await;
    if left.is_some() {
        state.room_list_usecase.publish_to_lobby().await;
    }
    tracing::info!("Client '{}' disconnected", connection_id);
}
