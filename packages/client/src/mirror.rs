//! Read-only copy of the board, rebuilt from server events.
//!
//! The mirror never decides anything: it only replays what the server
//! announced, so a renderer can draw the position without game logic.

use goishi_shared::protocol::{BOARD_SIZE, Color, EMPTY_CELL, MoveData, RoomData, ServerEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct BoardMirror {
    cells: Vec<Vec<u8>>,
    room_id: Option<String>,
    my_color: Option<Color>,
    current_turn: Option<Color>,
    move_count: usize,
    last_move: Option<MoveData>,
    winner: Option<Color>,
    over: bool,
}

impl Default for BoardMirror {
    fn default() -> Self {
        Self {
            cells: vec![vec![EMPTY_CELL; BOARD_SIZE]; BOARD_SIZE],
            room_id: None,
            my_color: None,
            current_turn: None,
            move_count: 0,
            last_move: None,
            winner: None,
            over: false,
        }
    }
}

impl BoardMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn my_color(&self) -> Option<Color> {
        self.my_color
    }

    pub fn current_turn(&self) -> Option<Color> {
        self.current_turn
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn last_move(&self) -> Option<MoveData> {
        self.last_move
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn is_my_turn(&self) -> bool {
        !self.over && self.my_color.is_some() && self.my_color == self.current_turn
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Color> {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|v| Color::from_cell_value(*v))
    }

    /// Updates the mirror from one server event; other events are ignored
    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::Assigned { color, room_id } => {
                self.my_color = Some(*color);
                self.room_id = Some(room_id.clone());
            }
            ServerEvent::GameStart { room_data, .. } | ServerEvent::RematchStart { room_data } => {
                self.reset_from(room_data);
            }
            ServerEvent::RoomCreated { room_data, .. }
            | ServerEvent::JoinSuccess { room_data } => {
                self.room_id = Some(room_data.room_id.clone());
            }
            ServerEvent::Moved {
                row,
                col,
                side,
                move_number,
                ..
            } => {
                if let Some(cell) = self.cells.get_mut(*row).and_then(|r| r.get_mut(*col)) {
                    *cell = side.cell_value();
                }
                self.move_count = *move_number;
                self.last_move = Some(MoveData {
                    row: *row,
                    col: *col,
                    side: *side,
                });
                self.current_turn = Some(side.opponent());
            }
            ServerEvent::GameOver { winner, .. } => {
                self.winner = *winner;
                self.over = true;
            }
            ServerEvent::GameAborted { .. } => {
                self.over = true;
            }
            _ => {}
        }
    }

    fn reset_from(&mut self, room_data: &RoomData) {
        *self = Self {
            cells: room_data
                .board
                .clone()
                .unwrap_or_else(|| vec![vec![EMPTY_CELL; BOARD_SIZE]; BOARD_SIZE]),
            room_id: Some(room_data.room_id.clone()),
            my_color: self.my_color,
            current_turn: room_data.current_turn.or(Some(Color::Black)),
            move_count: room_data.move_count,
            last_move: room_data.last_move,
            winner: None,
            over: false,
        };
    }

    /// Takes this client's color from the seat it holds in `room_data`.
    /// Custom rooms announce colors only through room snapshots.
    pub fn adopt_seat(&mut self, room_data: &RoomData, socket_id: &str) {
        if let Some(color) = room_data
            .players
            .iter()
            .find(|p| p.socket_id == socket_id)
            .and_then(|p| p.color)
        {
            self.my_color = Some(color);
        }
    }

    /// Forgets the room, e.g. after leaving it
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Text rendering: `X` black, `O` white, `.` empty; the last move in brackets
    pub fn render(&self) -> String {
        let mut out = String::from("    ");
        for col in 0..BOARD_SIZE {
            out.push_str(&format!("{:>2} ", col));
        }
        out.push('\n');
        for (row, cells) in self.cells.iter().enumerate() {
            out.push_str(&format!("{:>2}  ", row));
            for (col, value) in cells.iter().enumerate() {
                let stone = match Color::from_cell_value(*value) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                let is_last = self.last_move.is_some_and(|m| m.row == row && m.col == col);
                if is_last {
                    out.push_str(&format!("[{}]", stone));
                } else {
                    out.push_str(&format!(" {} ", stone));
                }
            }
            out.push('\n');
        }
        out
    }
}
