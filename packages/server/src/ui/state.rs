//! Shared application state: every use case, wired once at startup.

use std::sync::Arc;

use goishi_shared::time::Clock;

use crate::{
    config::ServerSettings,
    domain::{MessagePusher, ReasoningBackend, RoleAssigners, RoomRepository, StatsProvider},
    usecase::{
        AiTurnUseCase, ConnectPlayerUseCase, CreateRoomUseCase, DecideMoveUseCase,
        DisconnectPlayerUseCase, GetRoomListUseCase, JoinRoomUseCase, LeaveRoomUseCase, Notifier,
        QuickMatchUseCase, RematchUseCase, ReportGameOverUseCase, StartGameUseCase,
        SubmitMoveUseCase, ToggleReadyUseCase,
    },
};

pub struct AppState {
    pub settings: ServerSettings,
    /// Notifier（イベント送信）
    pub notifier: Notifier,
    pub connect_player_usecase: Arc<ConnectPlayerUseCase>,
    pub disconnect_player_usecase: Arc<DisconnectPlayerUseCase>,
    pub quick_match_usecase: Arc<QuickMatchUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub toggle_ready_usecase: Arc<ToggleReadyUseCase>,
    pub start_game_usecase: Arc<StartGameUseCase>,
    pub submit_move_usecase: Arc<SubmitMoveUseCase>,
    pub report_game_over_usecase: Arc<ReportGameOverUseCase>,
    pub rematch_usecase: Arc<RematchUseCase>,
    pub room_list_usecase: Arc<GetRoomListUseCase>,
    pub ai_turn_usecase: Arc<AiTurnUseCase>,
}

impl AppState {
    /// Wires the use cases on top of the given port implementations
    ///
    /// # Arguments
    ///
    /// * `repository` - Room registry
    /// * `message_pusher` - Outbound channel per connection
    /// * `reasoning` - External move reasoning for AI seats
    /// * `stats` - Player statistics for the room list
    /// * `clock` - Source of timestamps
    /// * `settings` - AI timings and fallbacks
    pub fn build(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        reasoning: Arc<dyn ReasoningBackend>,
        stats: Arc<dyn StatsProvider>,
        clock: Arc<dyn Clock>,
        settings: ServerSettings,
    ) -> Self {
        let notifier = Notifier::new(message_pusher.clone());
        let roles = Arc::new(RoleAssigners::default());

        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(repository.clone(), notifier.clone()));
        let submit_move_usecase = Arc::new(SubmitMoveUseCase::new(repository.clone(), notifier.clone()));
        let decide_move_usecase = Arc::new(DecideMoveUseCase::new(
            reasoning,
            settings.ai.decision_budget,
            settings.ai.urgency_threshold,
        ));
        let report_game_over_usecase = Arc::new(ReportGameOverUseCase::new(repository.clone(), notifier.clone()));
        let room_list_usecase = Arc::new(GetRoomListUseCase::new(repository.clone(), notifier.clone(), stats));

        Self {
            connect_player_usecase: Arc::new(ConnectPlayerUseCase::new(message_pusher.clone())),
            disconnect_player_usecase: Arc::new(DisconnectPlayerUseCase::new(
                message_pusher,
                leave_room_usecase.clone(),
            )),
            quick_match_usecase: Arc::new(QuickMatchUseCase::new(
                repository.clone(),
                notifier.clone(),
                roles.clone(),
                clock.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                notifier.clone(),
                clock.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(repository.clone(), notifier.clone(), clock)),
            leave_room_usecase,
            toggle_ready_usecase: Arc::new(ToggleReadyUseCase::new(repository.clone(), notifier.clone())),
            start_game_usecase: Arc::new(StartGameUseCase::new(repository.clone(), notifier.clone(), roles)),
            rematch_usecase: Arc::new(RematchUseCase::new(repository.clone(), notifier.clone())),
            ai_turn_usecase: Arc::new(AiTurnUseCase::new(
                repository,
                submit_move_usecase.clone(),
                decide_move_usecase,
                report_game_over_usecase.clone(),
                room_list_usecase.clone(),
                settings.ai.think_delay,
            )),
            report_game_over_usecase,
            room_list_usecase,
            submit_move_usecase,
            notifier,
            settings,
        }
    }
}
