use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    dto::{
        game::GameSummary,
        ws::{ClientInboundMessage, ServerOutboundMessage},
    },
    error::{GameError, ProtocolError},
    services::websocket_service::send_message_to_websocket,
    state::{GameSession, PlayerConnection, SharedState, board::Mark},
};

/// Game a connection is currently playing in.
struct JoinedGame {
    id: String,
    session: Arc<GameSession>,
    mark: Mark,
}

/// Dispatch state owned by a single connection handler.
///
/// A connection plays in at most one game at a time; creating or joining
/// another game first leaves the current one.
pub struct ConnectionContext {
    connection: PlayerConnection,
    joined: Option<JoinedGame>,
}

impl ConnectionContext {
    /// Context for a connection not yet in any game.
    pub fn new(connection: PlayerConnection) -> Self {
        Self {
            connection,
            joined: None,
        }
    }

    /// Handle of the connection this context belongs to.
    pub fn connection(&self) -> &PlayerConnection {
        &self.connection
    }

    /// Identifier of the game this connection is attached to, if any.
    pub fn game_id(&self) -> Option<&str> {
        self.joined.as_ref().map(|joined| joined.id.as_str())
    }

    /// Mark this connection plays in its current game.
    pub fn mark(&self) -> Option<Mark> {
        self.joined.as_ref().map(|joined| joined.mark)
    }
}

/// Parse one client text frame and run the requested action.
///
/// Errors are meant for the requesting connection only; nothing shared has
/// been modified when one is returned.
pub async fn handle_text(
    state: &SharedState,
    ctx: &mut ConnectionContext,
    text: &str,
) -> Result<(), ProtocolError> {
    let message = ClientInboundMessage::from_json_str(text, state.config().max_game_id_len())?;
    match message {
        ClientInboundMessage::Create { game_id } => create_game(state, ctx, game_id).await,
        ClientInboundMessage::Join { game_id } => join_game(state, ctx, game_id).await,
        ClientInboundMessage::Move { row, col } => play_move(state, ctx, row, col).await,
        ClientInboundMessage::Unknown => Err(ProtocolError::UnknownType),
    }
}

/// Register `game_id` and seat the connection in it.
async fn create_game(
    state: &SharedState,
    ctx: &mut ConnectionContext,
    game_id: String,
) -> Result<(), ProtocolError> {
    let session = state.registry().create(&game_id)?;
    let mark = seat_creator(state, ctx, &game_id, session.clone()).await?;
    reply(ctx, &ServerOutboundMessage::game_created(&game_id));
    reply(ctx, &ServerOutboundMessage::assigned(&game_id, mark));
    announce_arrival(ctx, &game_id, &session, mark).await;
    Ok(())
}

/// Seat the creator in its fresh session; the game only counts once that succeeds.
///
/// A joiner can grab the session and leave before the creator is seated,
/// retiring it, in which case the creator gets [`GameError::SessionNotFound`].
async fn seat_creator(
    state: &SharedState,
    ctx: &mut ConnectionContext,
    game_id: &str,
    session: Arc<GameSession>,
) -> Result<Mark, GameError> {
    let mark = attach(state, ctx, game_id, session).await?;
    state.stats().record_game_created();
    info!(game_id = %game_id, conn = %ctx.connection.id, "game created");
    Ok(mark)
}

/// Seat the connection in an existing game and send it the current board.
async fn join_game(
    state: &SharedState,
    ctx: &mut ConnectionContext,
    game_id: String,
) -> Result<(), ProtocolError> {
    let session = state.registry().get(&game_id)?;
    let already_seated = ctx
        .joined
        .as_ref()
        .is_some_and(|joined| Arc::ptr_eq(&joined.session, &session));

    let mark = attach(state, ctx, &game_id, session.clone()).await?;
    reply(ctx, &ServerOutboundMessage::game_joined(&game_id));
    reply(ctx, &ServerOutboundMessage::assigned(&game_id, mark));
    let snapshot = session.snapshot().await;
    reply(
        ctx,
        &ServerOutboundMessage::board_updated(&game_id, snapshot.board),
    );
    if !already_seated {
        announce_arrival(ctx, &game_id, &session, mark).await;
    }
    Ok(())
}

/// Play a move in the connection's current game and broadcast the result.
async fn play_move(
    state: &SharedState,
    ctx: &ConnectionContext,
    row: i64,
    col: i64,
) -> Result<(), ProtocolError> {
    let joined = ctx.joined.as_ref().ok_or(ProtocolError::NoGameJoined)?;
    let report = joined
        .session
        .make_move(&ctx.connection, row, col)
        .await?;
    state.stats().record_move(report.outcome);
    info!(
        game_id = %joined.id,
        mark = %report.mark,
        row,
        col,
        "move applied"
    );

    broadcast(
        &report.participants,
        &ServerOutboundMessage::board_updated(&joined.id, report.board),
    );
    if let Some(label) = report.outcome.winner_label() {
        info!(game_id = %joined.id, result = %label, "game over");
        broadcast(
            &report.participants,
            &ServerOutboundMessage::winner(&joined.id, label),
        );
    }
    Ok(())
}

/// Detach the connection from its current game, if any.
///
/// Called when the connection goes away; removes the game from the registry
/// once its last participant is gone.
pub async fn leave_game(state: &SharedState, ctx: &mut ConnectionContext) {
    if let Some(joined) = ctx.joined.take() {
        depart(state, &ctx.connection, joined).await;
    }
}

/// Bind the connection to a side in `session`, leaving any other game on success.
async fn attach(
    state: &SharedState,
    ctx: &mut ConnectionContext,
    game_id: &str,
    session: Arc<GameSession>,
) -> Result<Mark, GameError> {
    let mark = session.assign_side(ctx.connection.clone()).await?;
    debug!(game_id = %game_id, conn = %ctx.connection.id, mark = %mark, "side assigned");

    let previous = ctx.joined.replace(JoinedGame {
        id: game_id.to_owned(),
        session: session.clone(),
        mark,
    });
    if let Some(previous) = previous
        && !Arc::ptr_eq(&previous.session, &session)
    {
        depart(state, &ctx.connection, previous).await;
    }
    Ok(mark)
}

async fn depart(state: &SharedState, connection: &PlayerConnection, joined: JoinedGame) {
    if joined.session.remove_participant(connection).await {
        // The session lock is released before touching the registry.
        state.registry().delete(&joined.id);
        info!(game_id = %joined.id, "last player left; game removed");
        return;
    }

    info!(game_id = %joined.id, conn = %connection.id, mark = %joined.mark, "player left game");
    let remaining = joined.session.participants().await;
    broadcast(
        &remaining,
        &ServerOutboundMessage::player_left(&joined.id, joined.mark),
    );
}

/// Tell the other participants that the connection took `mark`.
async fn announce_arrival(
    ctx: &ConnectionContext,
    game_id: &str,
    session: &GameSession,
    mark: Mark,
) {
    let others: Vec<_> = session
        .participants()
        .await
        .into_iter()
        .filter(|participant| participant != &ctx.connection)
        .collect();
    broadcast(&others, &ServerOutboundMessage::player_joined(game_id, mark));
}

/// Current state of a game for the HTTP API.
pub async fn game_summary(state: &SharedState, game_id: &str) -> Result<GameSummary, GameError> {
    let session = state.registry().get(game_id)?;
    let snapshot = session.snapshot().await;
    Ok(GameSummary::new(game_id.to_owned(), snapshot))
}

fn reply(ctx: &ConnectionContext, message: &ServerOutboundMessage) {
    if send_message_to_websocket(&ctx.connection.tx, message).is_err() {
        debug!(conn = %ctx.connection.id, "reply dropped; connection closing");
    }
}

/// Push `message` to every recipient. A closed recipient is skipped; its own
/// handler cleans it up.
fn broadcast(recipients: &[PlayerConnection], message: &ServerOutboundMessage) {
    for recipient in recipients {
        if send_message_to_websocket(&recipient.tx, message).is_err() {
            debug!(conn = %recipient.id, "broadcast skipped closed connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::ws::Message;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::AppConfig,
        dto::{game::GameStatus, ws::ServerOutboundMessage as Out},
        state::AppState,
    };

    struct TestClient {
        ctx: ConnectionContext,
        rx: mpsc::UnboundedReceiver<Message>,
    }

    impl TestClient {
        fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                ctx: ConnectionContext::new(PlayerConnection::new(tx)),
                rx,
            }
        }

        async fn send(&mut self, state: &SharedState, text: &str) -> Result<(), ProtocolError> {
            handle_text(state, &mut self.ctx, text).await
        }

        fn drain(&mut self) -> Vec<Out> {
            let mut received = Vec::new();
            while let Ok(message) = self.rx.try_recv() {
                match message {
                    Message::Text(text) => received.push(serde_json::from_str(text.as_str()).unwrap()),
                    other => panic!("unexpected frame: {other:?}"),
                }
            }
            received
        }
    }

    fn kinds(messages: &[Out]) -> Vec<&str> {
        messages.iter().map(|message| message.kind.as_str()).collect()
    }

    async fn seated_pair(state: &SharedState, game_id: &str) -> (TestClient, TestClient) {
        let mut x = TestClient::new();
        let mut o = TestClient::new();
        x.send(state, &format!(r#"{{"type":"create","gameID":"{game_id}"}}"#))
            .await
            .unwrap();
        o.send(state, &format!(r#"{{"type":"join","gameID":"{game_id}"}}"#))
            .await
            .unwrap();
        x.drain();
        o.drain();
        (x, o)
    }

    fn move_text(row: i64, col: i64) -> String {
        format!(r#"{{"type":"move","row":{row},"col":{col}}}"#)
    }

    #[tokio::test]
    async fn create_and_join_assign_both_sides() {
        let state = AppState::new(AppConfig::default());
        let mut x = TestClient::new();
        let mut o = TestClient::new();

        x.send(&state, r#"{"type":"create","gameID":"g1"}"#).await.unwrap();
        let created = x.drain();
        assert_eq!(kinds(&created), vec![Out::GAME_CREATED, Out::ASSIGNED]);
        assert_eq!(created[0].payload, "g1");
        assert_eq!(created[1].payload, "X");

        o.send(&state, r#"{"type":"join","gameID":"g1"}"#).await.unwrap();
        let joined = o.drain();
        assert_eq!(
            kinds(&joined),
            vec![Out::GAME_JOINED, Out::ASSIGNED, Out::BOARD_UPDATED]
        );
        assert_eq!(joined[1].payload, "O");
        assert_eq!(joined[2].payload, "---\n---\n---\n");

        assert_eq!(x.drain(), vec![Out::player_joined("g1", Mark::O)]);
        assert_eq!(x.ctx.mark(), Some(Mark::X));
        assert_eq!(o.ctx.game_id(), Some("g1"));
    }

    #[tokio::test]
    async fn moves_are_broadcast_until_a_win() {
        let state = AppState::new(AppConfig::default());
        let (mut x, mut o) = seated_pair(&state, "g1").await;

        x.send(&state, &move_text(0, 0)).await.unwrap();
        let expected = Out::board_updated("g1", "X--\n---\n---\n");
        assert_eq!(x.drain(), vec![expected.clone()]);
        assert_eq!(o.drain(), vec![expected]);

        assert!(matches!(
            x.send(&state, &move_text(1, 1)).await,
            Err(ProtocolError::Game(GameError::NotYourTurn))
        ));
        assert!(matches!(
            o.send(&state, &move_text(0, 0)).await,
            Err(ProtocolError::Game(GameError::CellOccupied))
        ));

        o.send(&state, &move_text(1, 0)).await.unwrap();
        x.send(&state, &move_text(0, 1)).await.unwrap();
        o.send(&state, &move_text(1, 1)).await.unwrap();
        x.drain();
        o.drain();

        x.send(&state, &move_text(0, 2)).await.unwrap();
        let final_messages = vec![
            Out::board_updated("g1", "XXX\nOO-\n---\n"),
            Out::winner("g1", "X"),
        ];
        assert_eq!(x.drain(), final_messages);
        assert_eq!(o.drain(), final_messages);

        assert!(matches!(
            o.send(&state, &move_text(2, 2)).await,
            Err(ProtocolError::Game(GameError::GameAlreadyOver))
        ));

        let stats = state.stats().snapshot();
        assert_eq!(stats.games_created, 1);
        assert_eq!(stats.moves_played, 5);
        assert_eq!(stats.x_wins, 1);

        let summary = game_summary(&state, "g1").await.unwrap();
        assert_eq!(summary.status, GameStatus::Won);
        assert_eq!(summary.winner, Some(Mark::X));
    }

    #[tokio::test]
    async fn third_player_is_turned_away() {
        let state = AppState::new(AppConfig::default());
        let (_x, _o) = seated_pair(&state, "full").await;
        let mut late = TestClient::new();

        assert!(matches!(
            late.send(&state, r#"{"type":"join","gameID":"full"}"#).await,
            Err(ProtocolError::Game(GameError::SessionFull))
        ));
        assert!(late.drain().is_empty());
        assert_eq!(late.ctx.game_id(), None);
    }

    #[tokio::test]
    async fn protocol_errors_are_reported() {
        let state = AppState::new(AppConfig::default());
        let mut client = TestClient::new();

        assert!(matches!(
            client.send(&state, &move_text(0, 0)).await,
            Err(ProtocolError::NoGameJoined)
        ));
        assert!(matches!(
            client.send(&state, r#"{"type":"shout"}"#).await,
            Err(ProtocolError::UnknownType)
        ));
        assert!(matches!(
            client.send(&state, "{").await,
            Err(ProtocolError::InvalidJson(_))
        ));
        assert!(matches!(
            client.send(&state, r#"{"type":"join","gameID":"missing"}"#).await,
            Err(ProtocolError::Game(GameError::SessionNotFound))
        ));
        assert!(state.registry().is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_keeps_current_game() {
        let state = AppState::new(AppConfig::default());
        let (mut x, _o) = seated_pair(&state, "taken").await;
        let mut other = TestClient::new();
        other
            .send(&state, r#"{"type":"create","gameID":"mine"}"#)
            .await
            .unwrap();

        assert!(matches!(
            other.send(&state, r#"{"type":"create","gameID":"taken"}"#).await,
            Err(ProtocolError::Game(GameError::SessionAlreadyExists))
        ));
        assert_eq!(other.ctx.game_id(), Some("mine"));
        assert_eq!(state.registry().len(), 2);
        assert!(x.drain().is_empty());
    }

    #[tokio::test]
    async fn leaving_notifies_partner_and_last_one_out_removes_game() {
        let state = AppState::new(AppConfig::default());
        let (mut x, mut o) = seated_pair(&state, "bye").await;

        leave_game(&state, &mut o.ctx).await;
        assert_eq!(x.drain(), vec![Out::player_left("bye", Mark::O)]);
        assert!(state.registry().get("bye").is_ok());

        leave_game(&state, &mut x.ctx).await;
        assert!(matches!(
            state.registry().get("bye"),
            Err(GameError::SessionNotFound)
        ));
        assert!(matches!(
            game_summary(&state, "bye").await,
            Err(GameError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn switching_games_leaves_the_previous_one() {
        let state = AppState::new(AppConfig::default());
        let mut client = TestClient::new();
        client
            .send(&state, r#"{"type":"create","gameID":"first"}"#)
            .await
            .unwrap();
        client
            .send(&state, r#"{"type":"create","gameID":"second"}"#)
            .await
            .unwrap();

        assert!(state.registry().get("first").is_err());
        assert_eq!(client.ctx.game_id(), Some("second"));
        assert_eq!(state.stats().snapshot().games_created, 2);
    }

    #[tokio::test]
    async fn rejoining_the_same_game_keeps_the_side() {
        let state = AppState::new(AppConfig::default());
        let (mut x, mut o) = seated_pair(&state, "again").await;

        x.send(&state, r#"{"type":"join","gameID":"again"}"#).await.unwrap();
        let replies = x.drain();
        assert_eq!(replies[1], Out::assigned("again", Mark::X));
        assert!(o.drain().is_empty());
    }

    #[tokio::test]
    async fn creator_losing_its_fresh_game_is_not_counted() {
        let state = AppState::new(AppConfig::default());
        let session = state.registry().create("gone").unwrap();

        let intruder = TestClient::new();
        session
            .assign_side(intruder.ctx.connection().clone())
            .await
            .unwrap();
        assert!(session.remove_participant(intruder.ctx.connection()).await);
        state.registry().delete("gone");

        let mut creator = TestClient::new();
        let err = seat_creator(&state, &mut creator.ctx, "gone", session)
            .await
            .unwrap_err();
        assert_eq!(err, GameError::SessionNotFound);
        assert_eq!(state.stats().snapshot().games_created, 0);
        assert_eq!(creator.ctx.game_id(), None);
        assert!(creator.drain().is_empty());
    }
}
