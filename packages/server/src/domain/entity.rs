//! Room and Player entities.
//!
//! `Room` owns its lifecycle (`waiting → playing → finished`) and the game
//! being played in it. Every mutation goes through a method that checks the
//! preconditions first and leaves the room untouched when it refuses.

use goishi_shared::protocol::GameType;

use super::board::Side;
use super::error::{MoveRejection, RoomError};
use super::game::{GameState, MoveOutcome};
use super::role::RoleAssigner;
use super::rule::RuleSet;
use super::value_object::{ConnectionId, Password, RoomId, RoomName, Timestamp, UserId, Username};

/// Seats per room for every game type
pub const MAX_PLAYERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    Ai,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub connection_id: ConnectionId,
    pub user_id: Option<UserId>,
    pub username: Username,
    pub is_ready: bool,
    pub joined_at: Timestamp,
    /// Assigned when a game begins
    pub side: Option<Side>,
    pub kind: PlayerKind,
}

impl Player {
    pub fn human(
        connection_id: ConnectionId,
        user_id: Option<UserId>,
        username: Username,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            user_id,
            username,
            is_ready: false,
            joined_at,
            side: None,
            kind: PlayerKind::Human,
        }
    }

    /// AI seats are always ready
    pub fn ai(joined_at: Timestamp) -> Self {
        Self {
            connection_id: ConnectionId::generate_ai(),
            user_id: None,
            username: Username::ai(),
            is_ready: true,
            joined_at,
            side: None,
            kind: PlayerKind::Ai,
        }
    }

    pub fn ready(mut self) -> Self {
        self.is_ready = true;
        self
    }

    pub fn is_ai(&self) -> bool {
        self.kind == PlayerKind::Ai
    }
}

/// Result of `Room::remove_player`
#[derive(Debug, Clone)]
pub struct Departure {
    pub player: Player,
    /// The leaver walked out of a game in progress
    pub aborted: bool,
    pub new_host: Option<ConnectionId>,
    /// No human is left; the room should be destroyed
    pub is_empty: bool,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub game_type: GameType,
    pub created_at: Timestamp,
    pub is_private: bool,
    pub quick_match: bool,
    pub max_players: usize,
    host: ConnectionId,
    players: Vec<Player>,
    password: Option<Password>,
    status: RoomStatus,
    game: Option<GameState>,
    rematch_requested_by: Option<ConnectionId>,
}

impl Room {
    pub fn new(
        id: RoomId,
        name: RoomName,
        game_type: GameType,
        host: Player,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            game_type,
            created_at,
            is_private: false,
            quick_match: false,
            max_players: MAX_PLAYERS,
            host: host.connection_id.clone(),
            players: vec![host],
            password: None,
            status: RoomStatus::Waiting,
            game: None,
            rematch_requested_by: None,
        }
    }

    pub fn new_quick_match(
        id: RoomId,
        game_type: GameType,
        first: Player,
        created_at: Timestamp,
    ) -> Self {
        let mut room = Self::new(id, RoomName::quick_match(), game_type, first, created_at);
        room.quick_match = true;
        room
    }

    pub fn with_password(mut self, is_private: bool, password: Option<Password>) -> Self {
        self.is_private = is_private;
        self.password = password;
        self
    }

    pub fn host(&self) -> &ConnectionId {
        &self.host
    }

    pub fn host_player(&self) -> Option<&Player> {
        self.player(&self.host)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| &p.connection_id == id)
    }

    pub fn is_member(&self, id: &ConnectionId) -> bool {
        self.player(id).is_some()
    }

    pub fn humans(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_ai())
    }

    /// Broadcast targets: every human member
    pub fn human_ids(&self) -> Vec<ConnectionId> {
        self.humans().map(|p| p.connection_id.clone()).collect()
    }

    /// The member who is not `id`
    pub fn counterpart(&self, id: &ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| &p.connection_id != id)
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    /// Swaps in a prepared position for a game already in progress
    #[cfg(test)]
    pub fn replace_game(&mut self, game: GameState) {
        self.game = Some(game);
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn rematch_requested_by(&self) -> Option<&ConnectionId> {
        self.rematch_requested_by.as_ref()
    }

    /// The AI seat whose turn it is, if any
    pub fn ai_to_move(&self) -> Option<&Player> {
        if self.status != RoomStatus::Playing {
            return None;
        }
        let game = self.game.as_ref()?;
        if game.result().is_over() {
            return None;
        }
        self.players
            .iter()
            .find(|p| p.is_ai() && p.side == Some(game.current_turn()))
    }

    pub fn add_player(&mut self, player: Player, password: Option<&str>) -> Result<(), RoomError> {
        if self.is_member(&player.connection_id) {
            return Err(RoomError::AlreadyMember);
        }
        if self.status == RoomStatus::Playing {
            return Err(RoomError::AlreadyPlaying);
        }
        if self.is_full() {
            return Err(RoomError::Full);
        }
        if let Some(expected) = &self.password
            && !password.is_some_and(|candidate| expected.matches(candidate))
        {
            return Err(RoomError::WrongPassword);
        }
        if self.status == RoomStatus::Finished {
            self.reopen();
        }
        self.players.push(player);
        Ok(())
    }

    /// Fills the free seat with an AI opponent; no password applies
    pub fn seat_ai(&mut self, joined_at: Timestamp) -> Result<ConnectionId, RoomError> {
        if self.status == RoomStatus::Playing {
            return Err(RoomError::AlreadyPlaying);
        }
        if self.is_full() {
            return Err(RoomError::Full);
        }
        if self.status == RoomStatus::Finished {
            self.reopen();
        }
        let ai = Player::ai(joined_at);
        let id = ai.connection_id.clone();
        self.players.push(ai);
        Ok(id)
    }

    /// Returns the new readiness
    pub fn toggle_ready(&mut self, id: &ConnectionId) -> Result<bool, RoomError> {
        let status = self.status;
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.connection_id == id)
            .ok_or(RoomError::NotMember)?;
        if status != RoomStatus::Waiting {
            return Err(RoomError::NotWaiting);
        }
        player.is_ready = !player.is_ready;
        Ok(player.is_ready)
    }

    /// Host-initiated start of a named room
    pub fn start(&mut self, id: &ConnectionId, assigner: &dyn RoleAssigner) -> Result<(), RoomError> {
        if !self.is_member(id) {
            return Err(RoomError::NotMember);
        }
        if &self.host != id {
            return Err(RoomError::NotHost);
        }
        match self.status {
            RoomStatus::Waiting => {}
            RoomStatus::Playing => return Err(RoomError::AlreadyPlaying),
            RoomStatus::Finished => return Err(RoomError::NotWaiting),
        }
        if self.players.len() < self.max_players {
            return Err(RoomError::NotEnoughPlayers {
                have: self.players.len(),
                need: self.max_players,
            });
        }
        if !self.players.iter().all(|p| p.is_ready) {
            return Err(RoomError::NotAllReady);
        }
        self.begin(assigner);
        Ok(())
    }

    /// Matchmaking start: no host or readiness involved
    pub fn start_matched(&mut self, assigner: &dyn RoleAssigner) -> Result<(), RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::AlreadyPlaying);
        }
        if !self.is_full() {
            return Err(RoomError::NotEnoughPlayers {
                have: self.players.len(),
                need: self.max_players,
            });
        }
        self.begin(assigner);
        Ok(())
    }

    fn begin(&mut self, assigner: &dyn RoleAssigner) {
        assigner.assign(&mut self.players);
        self.game = Some(GameState::new(RuleSet::for_game(self.game_type)));
        self.status = RoomStatus::Playing;
        self.rematch_requested_by = None;
    }

    /// Back to `waiting`: board dropped, sides cleared, humans unready
    fn reopen(&mut self) {
        self.status = RoomStatus::Waiting;
        self.game = None;
        self.rematch_requested_by = None;
        for player in &mut self.players {
            player.is_ready = player.is_ai();
            player.side = None;
        }
    }

    pub fn submit_move(
        &mut self,
        id: &ConnectionId,
        row: i32,
        col: i32,
        claimed: Option<Side>,
    ) -> Result<MoveOutcome, MoveRejection> {
        if self.status != RoomStatus::Playing {
            return Err(MoveRejection::NotPlaying);
        }
        let player = self.player(id).ok_or(MoveRejection::NotMember)?;
        let side = player.side.ok_or(MoveRejection::NotPlaying)?;
        let game = self.game.as_mut().ok_or(MoveRejection::NotPlaying)?;
        if game.current_turn() != side {
            return Err(MoveRejection::NotYourTurn);
        }
        if let Some(claimed) = claimed
            && claimed != side
        {
            return Err(MoveRejection::SideMismatch {
                claimed,
                actual: side,
            });
        }

        let outcome = game.play(side, row, col)?;
        if outcome.result.is_over() {
            self.status = RoomStatus::Finished;
        }
        Ok(outcome)
    }

    /// `id` concedes; returns the winning side
    pub fn resign(&mut self, id: &ConnectionId) -> Result<Side, MoveRejection> {
        if self.status != RoomStatus::Playing {
            return Err(MoveRejection::NotPlaying);
        }
        let side = self
            .player(id)
            .ok_or(MoveRejection::NotMember)?
            .side
            .ok_or(MoveRejection::NotPlaying)?;
        let game = self.game.as_mut().ok_or(MoveRejection::NotPlaying)?;
        let winner = game.resign(side)?;
        self.status = RoomStatus::Finished;
        Ok(winner)
    }

    pub fn remove_player(&mut self, id: &ConnectionId) -> Result<Departure, RoomError> {
        let index = self
            .players
            .iter()
            .position(|p| &p.connection_id == id)
            .ok_or(RoomError::NotMember)?;
        let player = self.players.remove(index);

        let aborted = self.status == RoomStatus::Playing;
        if aborted {
            if let Some(game) = self.game.as_mut() {
                game.abort();
            }
            self.status = RoomStatus::Finished;
        } else if self.status == RoomStatus::Finished {
            self.reopen();
        }
        self.rematch_requested_by = None;

        let mut new_host = None;
        if self.host == player.connection_id
            && let Some(next) = self.players.iter().find(|p| !p.is_ai())
        {
            self.host = next.connection_id.clone();
            new_host = Some(self.host.clone());
        }

        let is_empty = self.humans().next().is_none();
        Ok(Departure {
            player,
            aborted,
            new_host,
            is_empty,
        })
    }

    fn check_rematch_possible(&self, id: &ConnectionId) -> Result<(), RoomError> {
        if !self.is_member(id) {
            return Err(RoomError::NotMember);
        }
        if self.status != RoomStatus::Finished || !self.is_full() {
            return Err(RoomError::RematchUnavailable);
        }
        Ok(())
    }

    fn check_pending_rematch(&self, id: &ConnectionId) -> Result<(), RoomError> {
        match &self.rematch_requested_by {
            Some(requester) if requester != id => Ok(()),
            _ => Err(RoomError::NoPendingRematch),
        }
    }

    pub fn request_rematch(&mut self, id: &ConnectionId) -> Result<(), RoomError> {
        self.check_rematch_possible(id)?;
        if self.rematch_requested_by.is_some() {
            return Err(RoomError::RematchAlreadyRequested);
        }
        self.rematch_requested_by = Some(id.clone());
        Ok(())
    }

    /// Fresh board, same sides
    pub fn accept_rematch(&mut self, id: &ConnectionId) -> Result<(), RoomError> {
        self.check_rematch_possible(id)?;
        self.check_pending_rematch(id)?;
        self.game = Some(GameState::new(RuleSet::for_game(self.game_type)));
        self.status = RoomStatus::Playing;
        self.rematch_requested_by = None;
        Ok(())
    }

    pub fn decline_rematch(&mut self, id: &ConnectionId) -> Result<(), RoomError> {
        self.check_rematch_possible(id)?;
        self.check_pending_rematch(id)?;
        self.reopen();
        Ok(())
    }
}
