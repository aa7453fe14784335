//! Line-delimited JSON over TCP: one request per line, one response per line.
//!
//! Sessions are keyed by `game_id`. Each lives behind its own mutex so that
//! actions for one game run one at a time while other games proceed freely.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_stream::wrappers::{LinesStream, TcpListenerStream};
use tokio_stream::StreamExt;

use crate::engine::config::EngineConfig;
use crate::engine::models::{Action, Reply, Request, Response, SESSION_LIMIT_CODE};
use crate::engine::session::TurnController;

type Session = Arc<Mutex<TurnController>>;

/// All live games hosted by one server.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
    max_sessions: usize,
    seed: Option<u64>,
    started: AtomicU64,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, seed: Option<u64>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions,
            seed,
            started: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_sessions, config.random_seed)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Route one request to its session. A successful `init` opens a session; `exit` closes it.
    pub async fn dispatch(&self, request: Request) -> Response {
        let Request { game_id, action } = request;
        let reply = match self.route(&game_id, &action).await {
            Route::Live(session) => session.lock().await.handle(action),
            Route::Settled(reply) => reply,
            // Unknown game: a fresh controller gives the usual not-started answer.
            Route::Unknown => TurnController::new().handle(action),
        };

        if reply == Reply::Bye && self.sessions.lock().await.remove(&game_id).is_some() {
            tracing::info!(%game_id, "session closed");
        }
        Response { game_id, reply }
    }

    /// Find the session for `game_id`, or run `init` against a new one.
    /// The new session is registered only if its `init` is accepted.
    async fn route(&self, game_id: &str, action: &Action) -> Route {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(game_id) {
            return Route::Live(Arc::clone(session));
        }
        if !matches!(action, Action::Init { .. }) {
            return Route::Unknown;
        }
        if sessions.len() >= self.max_sessions {
            evict_finished(&mut sessions);
        }
        if sessions.len() >= self.max_sessions {
            tracing::warn!(%game_id, limit = self.max_sessions, "session limit reached");
            return Route::Settled(Reply::Rejected {
                code: SESSION_LIMIT_CODE,
                reason: format!("server is hosting its limit of {} games", self.max_sessions),
            });
        }

        let ordinal = self.started.load(Ordering::Relaxed);
        let mut controller = match self.seed {
            // Offset per session so seeded games still differ from each other.
            Some(seed) => TurnController::with_seed(seed.wrapping_add(ordinal)),
            None => TurnController::new(),
        };
        let reply = controller.handle(action.clone());
        if reply.is_rejected() {
            return Route::Settled(reply);
        }

        self.started.fetch_add(1, Ordering::Relaxed);
        sessions.insert(game_id.to_string(), Arc::new(Mutex::new(controller)));
        tracing::info!(%game_id, live = sessions.len(), "session opened");
        Route::Settled(reply)
    }
}

enum Route {
    Live(Session),
    Settled(Reply),
    Unknown,
}

/// Drop finished games to make room. Sessions busy with a request are kept.
fn evict_finished(sessions: &mut HashMap<String, Session>) {
    let before = sessions.len();
    sessions.retain(|_, session| session.try_lock().map_or(true, |c| !c.is_finished()));
    if sessions.len() < before {
        tracing::info!(evicted = before - sessions.len(), "finished sessions evicted");
    }
}

/// Accept connections until the listener fails.
pub async fn serve(listener: TcpListener, registry: Arc<SessionRegistry>) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "engine listening");

    let mut incoming = TcpListenerStream::new(listener);
    while let Some(stream) = incoming.next().await {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
                continue;
            }
        };
        let peer = stream.peer_addr().ok();
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, registry).await {
                tracing::warn!(peer = ?peer, error = %e, "connection ended with error");
            }
        });
    }
    Ok(())
}

pub async fn bind(config: &EngineConfig) -> std::io::Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

async fn handle_connection(stream: TcpStream, registry: Arc<SessionRegistry>) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    tracing::debug!(%peer, "client connected");

    let (reader, mut writer) = stream.into_split();
    let mut lines = LinesStream::new(BufReader::new(reader).lines());

    while let Some(line) = lines.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => registry.dispatch(request).await,
            Err(e) => {
                tracing::warn!(%peer, error = %e, "malformed request line");
                Response {
                    game_id: String::new(),
                    reply: Reply::malformed(e),
                }
            }
        };

        let mut out = serde_json::to_vec(&response).map_err(std::io::Error::other)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
    }

    tracing::debug!(%peer, "client disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::carcassonne::types::GameState;

    fn request(game_id: &str, action: Action) -> Request {
        Request {
            game_id: game_id.to_string(),
            action,
        }
    }

    #[tokio::test]
    async fn test_games_are_independent() {
        let registry = SessionRegistry::new(4, Some(1));
        registry.dispatch(request("a", Action::Init { num_players: 2 })).await;
        registry.dispatch(request("b", Action::Init { num_players: 3 })).await;
        registry.dispatch(request("a", Action::DrawTile { player: 0 })).await;

        let a = registry.dispatch(request("a", Action::QueryGameInfo)).await;
        let b = registry.dispatch(request("b", Action::QueryGameInfo)).await;
        assert!(matches!(a.reply, Reply::GameInfo { state: GameState::PlaceTile, num_players: 2, .. }));
        assert!(matches!(b.reply, Reply::GameInfo { state: GameState::DrawTile, num_players: 3, .. }));
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_game_is_not_created() {
        let registry = SessionRegistry::new(4, None);
        let response = registry.dispatch(request("ghost", Action::DrawTile { player: 0 })).await;
        assert_eq!(response.reply.code(), 20);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_session_limit_and_exit() {
        let registry = SessionRegistry::new(1, None);
        registry.dispatch(request("a", Action::Init { num_players: 2 })).await;
        let refused = registry.dispatch(request("b", Action::Init { num_players: 2 })).await;
        assert_eq!(refused.reply.code(), SESSION_LIMIT_CODE);

        let bye = registry.dispatch(request("a", Action::Exit)).await;
        assert_eq!(bye.reply, Reply::Bye);
        assert!(registry.is_empty().await);
        let accepted = registry.dispatch(request("b", Action::Init { num_players: 2 })).await;
        assert!(!accepted.reply.is_rejected());
    }

    #[tokio::test]
    async fn test_rejected_init_takes_no_slot() {
        let registry = SessionRegistry::new(1, None);
        let refused = registry.dispatch(request("x", Action::Init { num_players: 1 })).await;
        assert_eq!(refused.reply.code(), 24);
        assert!(registry.is_empty().await);

        let accepted = registry.dispatch(request("y", Action::Init { num_players: 2 })).await;
        assert!(matches!(accepted.reply, Reply::Started { num_players: 2, .. }));
        assert_eq!(registry.len().await, 1);
        let info = registry.dispatch(request("x", Action::QueryGameInfo)).await;
        assert_eq!(info.reply.code(), 20);
    }

    #[tokio::test]
    async fn test_finished_games_make_room_at_the_limit() {
        use crate::games::carcassonne::board::test_support::tile;
        use crate::games::carcassonne::draw_pile::DrawPile;
        use crate::games::carcassonne::game::Game;
        use crate::games::carcassonne::types::BOARD_CENTER;

        // A one-tile pile: the opening turn is also the last.
        let mut game = Game::with_pile(2, DrawPile::stacked(tile("road_straight", 0), Vec::new()));
        game.draw_tile(0).unwrap();
        game.place_tile(0, BOARD_CENTER, BOARD_CENTER).unwrap();
        assert!(game.end_turn().game_over);

        let registry = SessionRegistry::new(1, None);
        registry.sessions.lock().await.insert(
            "done".to_string(),
            Arc::new(Mutex::new(TurnController::with_game(game))),
        );
        let info = registry.dispatch(request("done", Action::QueryGameInfo)).await;
        assert!(matches!(info.reply, Reply::GameInfo { state: GameState::EndGame, .. }));

        let accepted = registry.dispatch(request("next", Action::Init { num_players: 2 })).await;
        assert!(!accepted.reply.is_rejected());
        assert_eq!(registry.len().await, 1);
        let gone = registry.dispatch(request("done", Action::QueryGameInfo)).await;
        assert_eq!(gone.reply.code(), 20);
    }

    #[tokio::test]
    async fn test_tcp_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let registry = Arc::new(SessionRegistry::new(8, Some(7)));
        tokio::spawn(serve(listener, registry));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer
            .write_all(b"{\"game_id\":\"g\",\"action\":\"init\",\"num_players\":2}\nnot json\n")
            .await
            .unwrap();

        let started: Response = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(started.game_id, "g");
        assert!(matches!(started.reply, Reply::Started { num_players: 2, .. }));

        let malformed: Response = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(malformed.reply.code(), crate::engine::models::MALFORMED_REQUEST_CODE);
    }
}
