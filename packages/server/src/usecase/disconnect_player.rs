//! UseCase: 切断処理
//!
//! 参加中の Room があれば退室扱いにしてから、MessagePusher の登録を解除する。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher};

use super::leave_room::{LeaveOutcome, LeaveRoomUseCase};

pub struct DisconnectPlayerUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    leave_room: Arc<LeaveRoomUseCase>,
}

impl DisconnectPlayerUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, leave_room: Arc<LeaveRoomUseCase>) -> Self {
        Self {
            message_pusher,
            leave_room,
        }
    }

    /// # Returns
    ///
    /// 退室が発生した場合はその結果（ロビーへの通知が必要かの判断に使う）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<LeaveOutcome> {
        let outcome = self.leave_room.leave_current(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;
        outcome
    }
}
