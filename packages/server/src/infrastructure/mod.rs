//! Infrastructure 層
//!
//! ドメイン層が定義するポートの具体的な実装と、ドメインモデル ⇔ DTO の変換を提供します。

pub mod dto;
pub mod message_pusher;
pub mod reasoning;
pub mod repository;
pub mod stats;
