//! ReasoningBackend 実装
//!
//! - `anthropic`: Anthropic Messages API に着手を問い合わせる
//! - `disabled`: API キーがないときに使う。常に `ReasoningError::Disabled` を返す

pub mod anthropic;
pub mod disabled;

pub use anthropic::{AnthropicConfig, AnthropicReasoningBackend};
pub use disabled::DisabledReasoningBackend;
