//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use goishi_shared::protocol::GameType;
use tokio::sync::Mutex;

use super::entity::Room;
use super::error::RepositoryError;
use super::value_object::{ConnectionId, RoomId};

/// 共有される Room の参照
///
/// Room ごとに排他制御されるため、別々の Room への操作は並行して進む。
pub type RoomHandle = Arc<Mutex<Room>>;

/// Room Registry
///
/// Room の保管に加えて、次の二つの索引を管理する。
///
/// - 接続 ID → 参加中の Room（1 接続につき最大 1 Room）
/// - ゲーム種別 → 対戦相手を待っているクイックマッチ Room（種別ごとに最大 1 つ）
///
/// ## ロック順序
///
/// 実装は Room のロックを取得してはならない。UseCase は Room のロックを保持したまま
/// Repository を呼び出してよい。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を登録する。同じ ID の Room があればエラー
    async fn insert_room(&self, room: Room) -> Result<RoomHandle, RepositoryError>;

    async fn find_room(&self, room_id: &RoomId) -> Option<RoomHandle>;

    /// Room を削除し、その Room を指す索引もすべて消す
    async fn remove_room(&self, room_id: &RoomId) -> Option<RoomHandle>;

    async fn list_rooms(&self) -> Vec<RoomHandle>;

    async fn count_rooms(&self) -> usize;

    /// 待機中のクイックマッチ Room を取得する。なければ `candidate` を登録して待機枠に置く
    ///
    /// 戻り値の `bool` は `candidate` が登録された（新規作成された）かどうか。
    /// 判定と登録は一つの排他区間で行われるため、同時に到着した二人が
    /// 別々の Room を作ることはない。
    async fn claim_matchmaking_room(&self, candidate: Room) -> (RoomHandle, bool);

    /// 待機枠が `room_id` を指している場合に限り空ける
    async fn release_matchmaking_room(&self, game_type: GameType, room_id: &RoomId);

    /// 接続を Room に紐付ける。別の Room に紐付いていればエラー
    async fn bind_member(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RepositoryError>;

    async fn unbind_member(&self, connection_id: &ConnectionId);

    /// 接続が参加中の Room
    async fn room_of(&self, connection_id: &ConnectionId) -> Option<RoomId>;
}
