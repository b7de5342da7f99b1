//! The lobby: matchmaking queue, live games, and the public counters.
//!
//! Every operation is synchronous and returns an [`Outcome`]; the caller
//! delivers the messages and starts the persistence work. The lobby is
//! not thread-safe on its own. The server keeps it behind the same mutex
//! as the session registry so pairing and registration never interleave.
//!
//! # Queue
//!
//! The queue is a single waiting slot. A player who joins while the slot
//! is empty takes it; the next player to join is paired with them at once.
//!
//! # Counters
//!
//! `players_in_queue` goes up by one per queue join, down by two when a
//! queued pair is made, and down by one when the waiting player leaves or
//! is pulled out by a friend pairing. `active_games` follows game creation
//! and teardown. Both are broadcast on every change.

use std::collections::HashMap;

use broadside_protocol::{AttackResult, GameId, ServerMessage};
use broadside_session::Identity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::{
    Coord, GameError, GameSession, Outcome, Phase, RecordRequest, Seat,
    validate_fleet,
};

/// Matchmaking and game bookkeeping for the whole server.
pub struct Lobby {
    /// The player waiting to be paired, if any.
    waiting: Option<Identity>,
    players_in_queue: u32,
    active_games: u32,
    games: HashMap<GameId, GameSession>,
    /// Which game each seated player is in. A player is in at most one.
    seated: HashMap<String, GameId>,
    next_game_id: u64,
    /// Decides who fires first.
    rng: StdRng,
}

impl Lobby {
    /// Creates an empty lobby with an OS-seeded coin.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates an empty lobby whose coin flips are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            waiting: None,
            players_in_queue: 0,
            active_games: 0,
            games: HashMap::new(),
            seated: HashMap::new(),
            next_game_id: 1,
            rng,
        }
    }

    pub fn players_in_queue(&self) -> u32 {
        self.players_in_queue
    }

    pub fn active_games(&self) -> u32 {
        self.active_games
    }

    /// The player currently holding the waiting slot.
    pub fn waiting(&self) -> Option<&Identity> {
        self.waiting.as_ref()
    }

    /// The game `username` is seated in.
    pub fn game_of(&self, username: &str) -> Option<&GameSession> {
        self.seated.get(username).and_then(|id| self.games.get(id))
    }

    // -----------------------------------------------------------------
    // Matchmaking
    // -----------------------------------------------------------------

    /// Puts `player` in the queue, pairing them with the waiting player if
    /// there is one. Joining while already waiting does nothing.
    pub fn join_queue(&mut self, player: &Identity) -> Outcome {
        let mut out = Outcome::new();

        if self.seated.contains_key(&player.username) {
            out.send(&player.username, error(GameError::AlreadyInGame));
            return out;
        }
        if self.is_waiting(&player.username) {
            tracing::debug!(username = %player.username, "already waiting in queue");
            return out;
        }

        self.players_in_queue += 1;
        out.broadcast(self.queue_count());

        match self.waiting.take() {
            Some(waiting) => {
                self.players_in_queue = self.players_in_queue.saturating_sub(2);
                out.broadcast(self.queue_count());
                self.pair(player.clone(), waiting, &mut out);
            }
            None => {
                tracing::info!(username = %player.username, "waiting for opponent");
                self.waiting = Some(player.clone());
            }
        }
        out
    }

    /// Takes `username` out of the waiting slot. A no-op for anyone else.
    pub fn leave_queue(&mut self, username: &str) -> Outcome {
        let mut out = Outcome::new();
        if self.vacate_slot(username, &mut out) {
            tracing::info!(%username, "left queue");
        }
        out
    }

    /// Pairs `player` directly with `friend`, bypassing the queue.
    ///
    /// `friend` is the registry's answer for the requested username; `None`
    /// means nobody by that name is connected.
    pub fn join_friend(&mut self, player: &Identity, friend: Option<&Identity>) -> Outcome {
        let mut out = Outcome::new();

        if self.seated.contains_key(&player.username) {
            out.send(&player.username, error(GameError::AlreadyInGame));
            return out;
        }

        let Some(friend) = friend else {
            out.send(&player.username, friend_not_found(Some("Friend not found")));
            return out;
        };
        if friend.username == player.username {
            out.send(&player.username, friend_not_found(None));
            return out;
        }
        if self.seated.contains_key(&friend.username) {
            out.send(
                &player.username,
                friend_not_found(Some("Friend is already in a game")),
            );
            return out;
        }

        self.vacate_slot(&player.username, &mut out);
        self.vacate_slot(&friend.username, &mut out);
        self.pair(player.clone(), friend.clone(), &mut out);
        out
    }

    // -----------------------------------------------------------------
    // Gameplay
    // -----------------------------------------------------------------

    /// Validates and stores `username`'s fleet. Starts the battle once
    /// both fleets are in.
    pub fn submit_fleet(&mut self, username: &str, ships: &Value) -> Outcome {
        let mut out = Outcome::new();

        let Some(game) = self.seated_game_mut(username) else {
            out.send(username, error(GameError::NotInGame));
            return out;
        };
        let Some(seat) = game.seat_of(username) else {
            out.send(username, error(GameError::NotInGame));
            return out;
        };
        if let Err(e) = game.ensure_fleet_open() {
            out.send(username, error(e));
            return out;
        }

        let fleet = match validate_fleet(ships) {
            Ok(fleet) => fleet,
            Err(e) => {
                tracing::debug!(%username, error = %e, "fleet rejected");
                out.send(
                    username,
                    ServerMessage::ShipsValidationError { error: e.to_string() },
                );
                return out;
            }
        };

        match game.submit_fleet(seat, fleet) {
            Ok(started) => {
                out.send(username, ServerMessage::ShipsAccepted {});
                if started {
                    let first = game.identity(game.turn()).username.clone();
                    let second = game.identity(game.turn().other()).username.clone();
                    out.send(&first, ServerMessage::YourTurn {});
                    out.send(&second, ServerMessage::OpponentTurn {});
                }
            }
            Err(e) => out.send(username, error(e)),
        }
        out
    }

    /// `username` fires at `(x, y)` on their opponent's board.
    pub fn attack(&mut self, username: &str, x: i32, y: i32) -> Outcome {
        let mut out = Outcome::new();

        let Some(game) = self.seated_game_mut(username) else {
            out.send(username, error(GameError::NotInGame));
            return out;
        };
        let Some(seat) = game.seat_of(username) else {
            out.send(username, error(GameError::NotInGame));
            return out;
        };
        if let Err(e) = game.ensure_can_attack(seat) {
            out.send(username, error(e));
            return out;
        }
        let Some(target) = Coord::new(i64::from(x), i64::from(y)) else {
            out.send(username, error(GameError::InvalidCoordinates { x, y }));
            return out;
        };

        let strike = match game.attack(seat, target) {
            Ok(strike) => strike,
            Err(e) => {
                out.send(username, error(e));
                return out;
            }
        };

        let game_id = game.id();
        let attacker = game.identity(seat).clone();
        let defender = game.identity(seat.other()).clone();
        let result = AttackResult::from_hit(strike.hit);

        out.send(&attacker.username, ServerMessage::AttackResult { x, y, result });
        out.send(&defender.username, ServerMessage::OpponentAttack { x, y, result });

        if let Some(index) = strike.sunk {
            let wreck = game
                .fleet(seat.other())
                .and_then(|fleet| fleet.ships().get(index))
                .map(|ship| ship.to_wire(index));
            if let Some(ship) = wreck {
                out.send(&attacker.username, ServerMessage::ShipDestroyed { ship });
            }
        }

        if strike.fleet_sunk {
            let duration = game.elapsed();
            out.send(&attacker.username, ServerMessage::YouWin {});
            out.send(&defender.username, ServerMessage::YouLose {});
            out.record(RecordRequest::Complete {
                game: game_id,
                winner: attacker.user_id,
                loser: defender.user_id,
                duration,
            });
            tracing::info!(
                game_id = %game_id,
                winner = %attacker.username,
                loser = %defender.username,
                duration_secs = duration.as_secs(),
                "game won"
            );
            self.teardown(game_id, &mut out);
        } else if strike.hit {
            out.send(&attacker.username, ServerMessage::YourTurn {});
            out.send(&defender.username, ServerMessage::OpponentTurn {});
        } else {
            out.send(&defender.username, ServerMessage::YourTurn {});
            out.send(&attacker.username, ServerMessage::OpponentTurn {});
        }
        out
    }

    /// Cleans up after a closed connection: vacates the waiting slot and
    /// forfeits any game in progress to the opponent.
    pub fn disconnect(&mut self, username: &str) -> Outcome {
        let mut out = Outcome::new();
        self.vacate_slot(username, &mut out);

        let Some(game_id) = self.seated.get(username).copied() else {
            return out;
        };
        if let Some(game) = self.games.get_mut(&game_id) {
            game.forfeit();
            if let Some(seat) = game.seat_of(username) {
                let opponent = &game.identity(seat.other()).username;
                out.send(opponent, ServerMessage::OpponentDisconnected {});
                tracing::info!(
                    game_id = %game_id,
                    %username,
                    winner = %opponent,
                    "game abandoned"
                );
            }
            out.record(RecordRequest::Abandon { game: game_id });
        }
        self.teardown(game_id, &mut out);
        out
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn is_waiting(&self, username: &str) -> bool {
        self.waiting.as_ref().is_some_and(|w| w.username == username)
    }

    /// Empties the waiting slot if `username` holds it. Returns whether it did.
    fn vacate_slot(&mut self, username: &str, out: &mut Outcome) -> bool {
        if !self.is_waiting(username) {
            return false;
        }
        self.waiting = None;
        self.players_in_queue = self.players_in_queue.saturating_sub(1);
        out.broadcast(self.queue_count());
        true
    }

    fn seated_game_mut(&mut self, username: &str) -> Option<&mut GameSession> {
        let id = self.seated.get(username)?;
        self.games.get_mut(id)
    }

    /// Starts a game. `first` is the player who triggered the pairing.
    fn pair(&mut self, first: Identity, second: Identity, out: &mut Outcome) {
        let id = GameId(self.next_game_id);
        self.next_game_id += 1;

        let first_turn = if self.rng.random_bool(0.5) {
            Seat::First
        } else {
            Seat::Second
        };

        out.send(&first.username, ServerMessage::StartGame {});
        out.send(&second.username, ServerMessage::StartGame {});
        out.record(RecordRequest::Open {
            game: id,
            players: [first.user_id, second.user_id],
        });

        tracing::info!(
            game_id = %id,
            first = %first.username,
            second = %second.username,
            "players paired"
        );

        self.seated.insert(first.username.clone(), id);
        self.seated.insert(second.username.clone(), id);
        self.games.insert(id, GameSession::new(id, [first, second], first_turn));

        self.active_games += 1;
        out.broadcast(self.game_count());
    }

    /// Removes a finished game and frees both players.
    fn teardown(&mut self, id: GameId, out: &mut Outcome) {
        let Some(game) = self.games.remove(&id) else {
            return;
        };
        debug_assert_eq!(game.phase(), Phase::Over);

        for seat in [Seat::First, Seat::Second] {
            self.seated.remove(&game.identity(seat).username);
        }
        self.active_games = self.active_games.saturating_sub(1);
        out.broadcast(self.game_count());
        tracing::debug!(game_id = %id, "game torn down");
    }

    fn queue_count(&self) -> ServerMessage {
        ServerMessage::PlayersInQueue { count: self.players_in_queue }
    }

    fn game_count(&self) -> ServerMessage {
        ServerMessage::ActiveGames { count: self.active_games }
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

fn error(e: GameError) -> ServerMessage {
    ServerMessage::Error { message: e.to_string() }
}

fn friend_not_found(message: Option<&str>) -> ServerMessage {
    ServerMessage::FriendNotFound { message: message.map(str::to_string) }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use broadside_protocol::UserId;

    use super::*;
    use crate::fleet::tests::standard_fleet;

    fn alice() -> Identity {
        Identity::new(UserId(1), "alice")
    }

    fn bob() -> Identity {
        Identity::new(UserId(2), "bob")
    }

    fn paired_lobby() -> Lobby {
        let mut lobby = Lobby::with_seed(7);
        lobby.join_queue(&bob());
        lobby.join_queue(&alice());
        lobby
    }

    // =====================================================================
    // join_queue / leave_queue
    // =====================================================================

    #[test]
    fn test_join_queue_first_player_waits() {
        let mut lobby = Lobby::with_seed(1);
        let out = lobby.join_queue(&alice());

        assert_eq!(lobby.waiting(), Some(&alice()));
        assert_eq!(lobby.players_in_queue(), 1);
        assert_eq!(
            out.broadcasts().collect::<Vec<_>>(),
            [&ServerMessage::PlayersInQueue { count: 1 }]
        );
        assert!(out.records.is_empty());
    }

    #[test]
    fn test_join_queue_second_player_pairs() {
        let mut lobby = Lobby::with_seed(1);
        lobby.join_queue(&bob());
        let out = lobby.join_queue(&alice());

        assert!(lobby.waiting().is_none());
        assert_eq!(lobby.players_in_queue(), 0);
        assert_eq!(lobby.active_games(), 1);

        let game = lobby.game_of("alice").expect("alice seated");
        assert_eq!(game.identity(Seat::First).username, "alice");
        assert_eq!(game.identity(Seat::Second).username, "bob");
        assert_eq!(game.phase(), Phase::AwaitingFleets);

        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::StartGame {}]
        );
        assert_eq!(
            out.messages_for("bob").collect::<Vec<_>>(),
            [&ServerMessage::StartGame {}]
        );
        assert_eq!(
            out.records,
            [RecordRequest::Open { game: game.id(), players: [UserId(1), UserId(2)] }]
        );
    }

    #[test]
    fn test_join_queue_twice_is_ignored() {
        let mut lobby = Lobby::with_seed(1);
        lobby.join_queue(&alice());
        let out = lobby.join_queue(&alice());

        assert!(out.messages.is_empty());
        assert_eq!(lobby.players_in_queue(), 1);
    }

    #[test]
    fn test_join_queue_while_in_game_is_error() {
        let mut lobby = paired_lobby();
        let out = lobby.join_queue(&alice());

        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::Error { message: "Already in a game".into() }]
        );
        assert_eq!(lobby.players_in_queue(), 0);
    }

    #[test]
    fn test_leave_queue_only_affects_occupant() {
        let mut lobby = Lobby::with_seed(1);
        lobby.join_queue(&alice());

        let out = lobby.leave_queue("bob");
        assert!(out.messages.is_empty());
        assert_eq!(lobby.players_in_queue(), 1);

        let out = lobby.leave_queue("alice");
        assert!(lobby.waiting().is_none());
        assert_eq!(lobby.players_in_queue(), 0);
        assert_eq!(
            out.broadcasts().collect::<Vec<_>>(),
            [&ServerMessage::PlayersInQueue { count: 0 }]
        );

        assert!(lobby.leave_queue("alice").messages.is_empty());
    }

    // =====================================================================
    // join_friend
    // =====================================================================

    #[test]
    fn test_join_friend_pairs_without_touching_queue() {
        let mut lobby = Lobby::with_seed(1);
        let out = lobby.join_friend(&alice(), Some(&bob()));

        assert_eq!(lobby.players_in_queue(), 0);
        assert_eq!(lobby.active_games(), 1);
        assert!(
            out.broadcasts()
                .all(|m| !matches!(m, ServerMessage::PlayersInQueue { .. }))
        );
        assert_eq!(
            lobby.game_of("bob").map(GameSession::id),
            lobby.game_of("alice").map(GameSession::id)
        );
    }

    #[test]
    fn test_join_friend_self_is_not_found() {
        let mut lobby = Lobby::with_seed(1);
        let out = lobby.join_friend(&alice(), Some(&alice()));

        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::FriendNotFound { message: None }]
        );
        assert!(lobby.game_of("alice").is_none());
        assert_eq!(lobby.active_games(), 0);
    }

    #[test]
    fn test_join_friend_absent_is_not_found() {
        let mut lobby = Lobby::with_seed(1);
        let out = lobby.join_friend(&alice(), None);
        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::FriendNotFound { message: Some("Friend not found".into()) }]
        );
    }

    #[test]
    fn test_join_friend_busy_friend_is_not_found() {
        let mut lobby = paired_lobby();
        let carol = Identity::new(UserId(3), "carol");
        let out = lobby.join_friend(&carol, Some(&bob()));

        assert_eq!(
            out.messages_for("carol").collect::<Vec<_>>(),
            [&ServerMessage::FriendNotFound {
                message: Some("Friend is already in a game".into())
            }]
        );
        assert_eq!(lobby.active_games(), 1);
    }

    #[test]
    fn test_join_friend_pulls_waiting_player_out_of_queue() {
        let mut lobby = Lobby::with_seed(1);
        lobby.join_queue(&bob());
        let out = lobby.join_friend(&alice(), Some(&bob()));

        assert!(lobby.waiting().is_none());
        assert_eq!(lobby.players_in_queue(), 0);
        assert!(
            out.broadcasts()
                .any(|m| *m == ServerMessage::PlayersInQueue { count: 0 })
        );
    }

    // =====================================================================
    // submit_fleet
    // =====================================================================

    #[test]
    fn test_submit_fleet_without_game_is_error() {
        let mut lobby = Lobby::with_seed(1);
        let out = lobby.submit_fleet("alice", &standard_fleet());
        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::Error { message: "Not in a game".into() }]
        );
    }

    #[test]
    fn test_submit_fleet_invalid_reports_reason() {
        let mut lobby = paired_lobby();
        let out = lobby.submit_fleet("alice", &serde_json::json!("nope"));
        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::ShipsValidationError {
                error: "Ships data must be an array".into()
            }]
        );
        assert!(lobby.game_of("alice").unwrap().fleet(Seat::First).is_none());
    }

    #[test]
    fn test_submit_fleet_both_fleets_start_battle() {
        let mut lobby = paired_lobby();
        let out = lobby.submit_fleet("alice", &standard_fleet());
        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::ShipsAccepted {}]
        );

        let out = lobby.submit_fleet("bob", &standard_fleet());
        let game = lobby.game_of("bob").unwrap();
        assert_eq!(game.phase(), Phase::Playing);

        let holder = game.identity(game.turn()).username.clone();
        let waiter = game.identity(game.turn().other()).username.clone();
        assert!(out.messages_for(&holder).any(|m| *m == ServerMessage::YourTurn {}));
        assert!(out.messages_for(&waiter).any(|m| *m == ServerMessage::OpponentTurn {}));
    }

    #[test]
    fn test_submit_fleet_after_battle_start_is_error() {
        let mut lobby = paired_lobby();
        lobby.submit_fleet("alice", &standard_fleet());
        lobby.submit_fleet("bob", &standard_fleet());

        let out = lobby.submit_fleet("alice", &standard_fleet());
        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::Error { message: "Ships already placed".into() }]
        );
    }

    // =====================================================================
    // attack / disconnect
    // =====================================================================

    #[test]
    fn test_attack_before_battle_is_error() {
        let mut lobby = paired_lobby();
        let out = lobby.attack("alice", 0, 0);
        assert_eq!(
            out.messages_for("alice").collect::<Vec<_>>(),
            [&ServerMessage::Error { message: "Game has not started".into() }]
        );
    }

    #[test]
    fn test_attack_off_grid_keeps_turn() {
        let mut lobby = paired_lobby();
        lobby.submit_fleet("alice", &standard_fleet());
        lobby.submit_fleet("bob", &standard_fleet());
        let game = lobby.game_of("alice").unwrap();
        let holder = game.identity(game.turn()).username.clone();

        let out = lobby.attack(&holder, 10, 0);
        assert_eq!(
            out.messages_for(&holder).collect::<Vec<_>>(),
            [&ServerMessage::Error { message: "Invalid attack coordinates: (10, 0)".into() }]
        );
        let game = lobby.game_of("alice").unwrap();
        assert_eq!(game.identity(game.turn()).username, holder);
    }

    #[test]
    fn test_disconnect_waiting_player_vacates_slot() {
        let mut lobby = Lobby::with_seed(1);
        lobby.join_queue(&alice());
        let out = lobby.disconnect("alice");

        assert!(lobby.waiting().is_none());
        assert_eq!(lobby.players_in_queue(), 0);
        assert!(out.records.is_empty());
    }

    #[test]
    fn test_disconnect_mid_game_forfeits_once() {
        let mut lobby = paired_lobby();
        let game_id = lobby.game_of("alice").unwrap().id();
        let out = lobby.disconnect("alice");

        assert_eq!(
            out.messages_for("bob").collect::<Vec<_>>(),
            [&ServerMessage::OpponentDisconnected {}]
        );
        assert_eq!(out.records, [RecordRequest::Abandon { game: game_id }]);
        assert_eq!(lobby.active_games(), 0);
        assert_eq!(lobby.players_in_queue(), 0);
        assert!(lobby.game_of("bob").is_none());

        // The second player's own disconnect finds nothing left to do.
        let out = lobby.disconnect("bob");
        assert!(out.messages.is_empty());
        assert!(out.records.is_empty());
    }
}
