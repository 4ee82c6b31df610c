//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ送信を抽象化します。
//! UseCase 層はこの trait を通じて送信し、WebSocket の詳細には依存しません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::ConnectionId;

/// 接続ごとの送信チャネル（UI 層が生成し、MessagePusher に登録する）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録する
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の登録を解除する
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続に送信する
    async fn push_to(&self, connection_id: &ConnectionId, content: &str) -> Result<(), MessagePushError>;

    /// 複数の接続に送信する（一部の失敗は許容する）
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> Result<(), MessagePushError>;

    /// 登録済みの接続
    async fn connected_clients(&self) -> Vec<ConnectionId>;
}
