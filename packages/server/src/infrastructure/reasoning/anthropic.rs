//! Anthropic Messages API を使った ReasoningBackend 実装
//!
//! 盤面をテキストで渡し、`{"row": r, "col": c}` 形式の JSON で着手を返してもらう。
//! 応答の妥当性（盤内か、空きマスか、禁手でないか）はここでは検証せず、
//! 呼び出し側（DecideMoveUseCase）が判断する。

use std::fmt::Write as _;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{
    BOARD_SIZE, Board, Coord, ReasoningBackend, ReasoningError, ReasoningQuery, Side, Suggestion,
};

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 64;

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl AnthropicConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

pub struct AnthropicReasoningBackend {
    client: reqwest::Client,
    config: AnthropicConfig,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct MoveReply {
    row: i32,
    col: i32,
}

impl AnthropicReasoningBackend {
    pub fn new(config: AnthropicConfig) -> Result<Self, ReasoningError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ReasoningError::Request(e.to_string()))?;
        tracing::info!("Reasoning backend: Anthropic ({})", config.model);
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ReasoningBackend for AnthropicReasoningBackend {
    async fn suggest_move(&self, query: &ReasoningQuery) -> Result<Suggestion, ReasoningError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt(query),
            "messages": [{"role": "user", "content": user_prompt(query)}],
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReasoningError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReasoningError::Status(status.as_u16()));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ReasoningError::InvalidResponse(e.to_string()))?;
        let text = reply
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| ReasoningError::InvalidResponse("no text block".to_string()))?;
        tracing::debug!("Reasoning reply: {}", text);

        parse_suggestion(&text)
    }
}

fn system_prompt(query: &ReasoningQuery) -> String {
    let mut prompt = format!(
        "You are playing {} (five in a row) on a {}x{} board. \
         Answer with a single JSON object {{\"row\": <0-{}>, \"col\": <0-{}>}} and nothing else.",
        query.game_type,
        BOARD_SIZE,
        BOARD_SIZE,
        BOARD_SIZE - 1,
        BOARD_SIZE - 1
    );
    if let Some(restricted) = query.rules.restricted_side() {
        let _ = write!(
            prompt,
            " {} may not make a double-three, a double-four or an overline.",
            restricted
        );
    }
    prompt
}

fn user_prompt(query: &ReasoningQuery) -> String {
    let mut prompt = format!(
        "You play {} ({}).\n\n{}",
        query.side,
        stone_char(query.side),
        render_board(&query.board)
    );
    if let Some(last) = query.last_move {
        let _ = write!(
            prompt,
            "\nLast move: {} at row {}, col {}.",
            last.side, last.coord.row, last.coord.col
        );
    }
    if !query.threats.is_empty() {
        prompt.push_str("\nOpponent threats (most urgent first):");
        for threat in query.threats.iter().take(5) {
            let _ = write!(
                prompt,
                "\n- {} at row {}, col {}",
                threat.kind.as_str(),
                threat.coord.row,
                threat.coord.col
            );
        }
    }
    prompt
}

fn stone_char(side: Side) -> char {
    match side {
        Side::Black => 'X',
        Side::White => 'O',
    }
}

/// Text board with column and row indices
fn render_board(board: &Board) -> String {
    let mut text = String::from("   ");
    for col in 0..BOARD_SIZE {
        let _ = write!(text, "{:>3}", col);
    }
    text.push('\n');
    for row in 0..BOARD_SIZE {
        let _ = write!(text, "{:>3}", row);
        for col in 0..BOARD_SIZE {
            let cell = Coord { row, col };
            let ch = board.get(cell).map_or('.', stone_char);
            let _ = write!(text, "{:>3}", ch);
        }
        text.push('\n');
    }
    text
}

/// Pulls the first `{...}` object out of a free-text reply
pub fn parse_suggestion(text: &str) -> Result<Suggestion, ReasoningError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => return Err(ReasoningError::InvalidResponse(format!("no JSON object in '{}'", text))),
    };
    let reply: MoveReply =
        serde_json::from_str(json).map_err(|e| ReasoningError::InvalidResponse(e.to_string()))?;
    Ok(Suggestion {
        row: reply.row,
        col: reply.col,
    })
}
