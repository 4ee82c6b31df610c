//! UseCase: 接続受付処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectPlayerUseCase::execute() メソッド
//! - 接続の登録と `connected` の通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - 異常系：同じ接続 ID での二重登録

use std::sync::Arc;

use goishi_shared::protocol::ServerEvent;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel};

use super::{error::ConnectError, notifier::Notifier};

/// 接続受付のユースケース
pub struct ConnectPlayerUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Notifier,
}

impl ConnectPlayerUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            notifier: Notifier::new(message_pusher.clone()),
            message_pusher,
        }
    }

    /// 接続を登録し、接続 ID を `connected` で本人に知らせる
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 新しい接続の ID
    /// * `sender` - この接続への送信チャネル
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 登録成功
    /// * `Err(ConnectError)` - 同じ ID がすでに登録済み
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<(), ConnectError> {
        // 1. 重複チェック
        let connected = self.message_pusher.connected_clients().await;
        if connected.contains(&connection_id) {
            return Err(ConnectError::DuplicateConnection(connection_id.to_string()));
        }

        // 2. MessagePusher に登録
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        // 3. 接続 ID を本人に通知
        let greeting = ServerEvent::Connected {
            socket_id: connection_id.to_string(),
        };
        self.notifier.send(&connection_id, &greeting).await;

        Ok(())
    }
}
