//! Client execution logic with reconnection support.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use goishi_shared::protocol::{CreateRoomPayload, GameType, ServerEvent, ServerEventKind};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    domain::{Command, HELP, parse_command, should_attempt_reconnect},
    error::ClientError,
    facade::GameClient,
    formatter::MessageFormatter,
    mirror::BoardMirror,
    ui::redisplay_prompt,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;
const GREETING_TIMEOUT: Duration = Duration::from_secs(5);

/// Every event kind the console prints
const DISPLAYED_KINDS: [ServerEventKind; 20] = [
    ServerEventKind::Connected,
    ServerEventKind::Waiting,
    ServerEventKind::Assigned,
    ServerEventKind::RoomCreated,
    ServerEventKind::JoinSuccess,
    ServerEventKind::JoinError,
    ServerEventKind::PlayerJoined,
    ServerEventKind::PlayerLeft,
    ServerEventKind::PlayerReady,
    ServerEventKind::HostChanged,
    ServerEventKind::GameStart,
    ServerEventKind::Moved,
    ServerEventKind::GameOver,
    ServerEventKind::GameAborted,
    ServerEventKind::RoomListUpdate,
    ServerEventKind::RematchRequested,
    ServerEventKind::RematchAccepted,
    ServerEventKind::RematchDeclined,
    ServerEventKind::RematchStart,
    ServerEventKind::Error,
];

/// Run the console client with reconnection logic
pub async fn run_client(url: String, game: GameType, username: String) -> Result<(), ClientError> {
    let mut input_rx = spawn_readline(format!("{}> ", username));
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            username,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, game, &username, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!("Giving up after {} attempts", reconnect_count);
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}

/// Reads prompt lines on a blocking thread; the channel closes on Ctrl+C or Ctrl+D
fn spawn_readline(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// One connected session. `Ok` means the user quit.
async fn run_client_session(
    url: &str,
    game: GameType,
    username: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let client = GameClient::connect(url, game).await?;
    client.wait_for_connection(GREETING_TIMEOUT).await?;
    let me = client.socket_id().unwrap_or_default();
    let prompt = format!("{}> ", username);

    let mirror = Arc::new(Mutex::new(BoardMirror::new()));
    for kind in DISPLAYED_KINDS {
        let mirror = mirror.clone();
        let me = me.clone();
        let prompt = prompt.clone();
        client.on(kind, move |event| {
            let board = match mirror.lock() {
                Ok(mut mirror) => {
                    mirror.apply(event);
                    match event {
                        ServerEvent::GameStart { room_data, .. }
                        | ServerEvent::RematchStart { room_data } => {
                            mirror.adopt_seat(room_data, &me);
                            Some(mirror.render())
                        }
                        ServerEvent::Moved { .. } => Some(mirror.render()),
                        _ => None,
                    }
                }
                Err(_) => None,
            };
            if let Some(text) = MessageFormatter::format_event(event, Some(&me)) {
                print!("{}", text);
            }
            if let Some(board) = board {
                print!("{}", board);
            }
            redisplay_prompt(&prompt);
        });
    }

    println!(
        "\nConnected to {} as '{}' playing {}. Type 'help' for commands.\n",
        url, username, game
    );
    redisplay_prompt(&prompt);

    loop {
        tokio::select! {
            _ = client.closed() => {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    client.close();
                    return Ok(());
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => {
                        client.close();
                        return Ok(());
                    }
                    Ok(command) => execute(&client, &mirror, username, command)?,
                    Err(message) => println!("{}", message),
                }
            }
        }
    }
}

/// Maps a prompt command onto a façade call
fn execute(
    client: &GameClient,
    mirror: &Mutex<BoardMirror>,
    username: &str,
    command: Command,
) -> Result<(), ClientError> {
    let (room_id, my_color) = match mirror.lock() {
        Ok(mirror) => (mirror.room_id().map(str::to_string), mirror.my_color()),
        Err(_) => (None, None),
    };
    let room_id = room_id.as_deref();

    match command {
        Command::QuickMatch => client.join_match(Some(username.to_string()), None),
        Command::Create {
            name,
            vs_ai,
            password,
        } => client.create_room(CreateRoomPayload {
            room_name: name,
            user_id: None,
            username: username.to_string(),
            is_private: password.is_some(),
            password,
            room_id: None,
            vs_ai,
        }),
        Command::Join { room_id, password } => client.join_room(&room_id, username, None, password),
        Command::Ready => with_room(room_id, |id| client.toggle_ready(id)),
        Command::Start => with_room(room_id, |id| client.start_game(id)),
        Command::Move { row, col } => with_room(room_id, |id| client.send_move(id, row, col, my_color)),
        Command::Resign => match my_color {
            Some(color) => with_room(room_id, |id| client.report_game_over(id, Some(color.opponent()))),
            None => {
                println!("no game to resign");
                Ok(())
            }
        },
        Command::List => client.get_room_list(),
        Command::Leave => {
            with_room(room_id, |id| client.leave_room(id))?;
            if let Ok(mut mirror) = mirror.lock() {
                mirror.clear();
            }
            Ok(())
        }
        Command::Rematch => with_room(room_id, |id| client.request_rematch(id)),
        Command::Accept => with_room(room_id, |id| client.accept_rematch(id)),
        Command::Decline => with_room(room_id, |id| client.decline_rematch(id)),
        Command::Board => {
            if let Ok(mirror) = mirror.lock() {
                print!("{}", mirror.render());
            }
            Ok(())
        }
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    }
}

fn with_room(
    room_id: Option<&str>,
    send: impl FnOnce(&str) -> Result<(), ClientError>,
) -> Result<(), ClientError> {
    match room_id {
        Some(id) => send(id),
        None => {
            println!("not in a room");
            Ok(())
        }
    }
}
