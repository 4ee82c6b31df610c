//! StatsProvider 実装
//!
//! - `http`: 外部の統計サービスに HTTP で問い合わせる
//! - `disabled`: 統計サービスを使わない

pub mod disabled;
pub mod http;

pub use disabled::DisabledStatsProvider;
pub use http::HttpStatsProvider;
