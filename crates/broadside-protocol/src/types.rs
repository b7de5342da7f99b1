//! Core protocol types for Broadside's wire format.
//!
//! This module defines every type that travels "on the wire": the JSON
//! frames clients send (`ClientMessage`) and the frames the server sends
//! back (`ServerMessage`), plus the small identity types both reference.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The durable id of a user account, as issued by the identity provider.
///
/// A newtype wrapper so a `UserId` can't be passed where a `GameId` is
/// expected, even though both are `u64` underneath.
/// `#[serde(transparent)]` keeps the JSON form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// Identifies one live pairing of two players.
///
/// Assigned in memory when two players are paired. Not the durable
/// session id, which the persistence store hands out separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server message.
///
/// Game logic never touches sockets. It returns `(Recipient, ServerMessage)`
/// pairs and the server delivers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected player (queue and game counters).
    All,

    /// One player, addressed by username.
    Player(String),
}

impl Recipient {
    /// Shorthand for addressing one player.
    pub fn player(username: impl Into<String>) -> Self {
        Self::Player(username.into())
    }
}

// ---------------------------------------------------------------------------
// Payload fragments
// ---------------------------------------------------------------------------

/// Whether an attack struck a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackResult {
    Hit,
    Miss,
}

impl AttackResult {
    pub fn from_hit(hit: bool) -> Self {
        if hit { Self::Hit } else { Self::Miss }
    }
}

/// A ship as reported in `ship_destroyed`.
///
/// `id` is the ship's 0-based position in the owner's fleet.
/// `rename_all = "camelCase"` gives the client's field names
/// (`posX`, `posY`, `isHorizontal`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyedShip {
    pub id: usize,
    pub pos_x: u8,
    pub pos_y: u8,
    pub length: u8,
    pub is_horizontal: bool,
}

// ---------------------------------------------------------------------------
// ClientMessage — client → server
// ---------------------------------------------------------------------------

/// Every message kind a client can send.
///
/// `#[serde(tag = "type")]` makes this an "internally tagged" enum:
///   `{ "type": "attack", "x": 3, "y": 4 }`
///
/// Unit-like kinds are written as empty struct variants (`JoinQueue {}`)
/// so stray fields on the wire are ignored instead of rejected.
///
/// `#[serde(other)]` catches any `type` we don't know. The handler still
/// has to name `Unknown` in its `match`, so ignoring unknown kinds is an
/// explicit decision rather than a fall-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "Pair me with the next player who shows up."
    JoinQueue {},

    /// "Take me out of the queue." A no-op if not queued.
    LeaveQueue {},

    /// "Here is my fleet."
    ///
    /// Kept as raw JSON: the fleet validator owns the structural parse so
    /// it can report which ship was malformed. A missing `ships` field
    /// decodes as `null` and fails validation as "not an array".
    ShipsData {
        #[serde(default)]
        ships: serde_json::Value,
    },

    /// "Fire at (x, y)." Coordinates are signed so out-of-grid values
    /// reach the game layer and get a proper error.
    Attack { x: i32, y: i32 },

    /// "Pair me directly with this user."
    JoinFriend { friend_username: String },

    /// In-band authentication attempt. Identity is bound at connect time,
    /// so this is always answered with an error.
    Authenticate {},

    /// Any message kind this server doesn't recognize.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// The wire name of this message kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinQueue {} => "join_queue",
            Self::LeaveQueue {} => "leave_queue",
            Self::ShipsData { .. } => "ships_data",
            Self::Attack { .. } => "attack",
            Self::JoinFriend { .. } => "join_friend",
            Self::Authenticate {} => "authenticate",
            Self::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerMessage — server → client
// ---------------------------------------------------------------------------

/// Every message kind the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    // -- Connection lifecycle --
    /// Identity verified and registered.
    ConnectionSuccess { username: String },

    /// Connection refused; the server closes the socket right after.
    ConnectionError { error: String },

    // -- Lobby counters (broadcast) --
    PlayersInQueue { count: u32 },
    ActiveGames { count: u32 },

    // -- Pairing and placement --
    /// You've been paired; place your fleet.
    StartGame {},
    ShipsAccepted {},
    ShipsValidationError { error: String },

    // -- Turns --
    YourTurn {},
    OpponentTurn {},

    // -- Combat --
    /// Sent to the attacker.
    AttackResult { x: i32, y: i32, result: AttackResult },

    /// Sent to the defender.
    OpponentAttack { x: i32, y: i32, result: AttackResult },

    /// Sent to the attacker only, after the hit that sank `ship`.
    ShipDestroyed { ship: DestroyedShip },

    // -- Endings --
    YouWin {},
    YouLose {},
    OpponentDisconnected {},

    // -- Errors --
    FriendNotFound {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// A request that can't be honored in the current state. Non-fatal.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The client speaks exact JSON shapes; these tests pin them down.

    use super::*;

    #[test]
    fn test_user_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(UserId(7).to_string(), "U-7");
        assert_eq!(GameId(3).to_string(), "G-3");
    }

    #[test]
    fn test_client_message_join_queue_without_body() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join_queue"}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinQueue {});
    }

    #[test]
    fn test_client_message_leave_queue_ignores_extra_fields() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"leave_queue","extra":1}"#)
                .unwrap();
        assert_eq!(msg, ClientMessage::LeaveQueue {});
    }

    #[test]
    fn test_client_message_attack() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"attack","x":3,"y":9}"#).unwrap();
        assert_eq!(msg, ClientMessage::Attack { x: 3, y: 9 });
    }

    #[test]
    fn test_client_message_attack_missing_field_fails() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"attack","x":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_message_join_friend() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"join_friend","friend_username":"bob"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinFriend {
                friend_username: "bob".into()
            }
        );
    }

    #[test]
    fn test_client_message_ships_data_keeps_raw_json() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"ships_data","ships":[{"posX":0,"posY":0,"length":5,"isHorizontal":true}]}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::ShipsData { ships } => {
                assert!(ships.is_array());
                assert_eq!(ships[0]["length"], 5);
            }
            other => panic!("expected ShipsData, got {other:?}"),
        }
    }

    #[test]
    fn test_client_message_ships_data_missing_ships_is_null() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"ships_data"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::ShipsData {
                ships: serde_json::Value::Null
            }
        );
    }

    #[test]
    fn test_client_message_unknown_kind() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"chat","text":"hi"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unknown);
        assert_eq!(msg.kind(), "unknown");
    }

    #[test]
    fn test_server_message_unit_kinds_have_only_type() {
        let json = serde_json::to_value(ServerMessage::StartGame {}).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "start_game" }));

        let json =
            serde_json::to_value(ServerMessage::OpponentDisconnected {})
                .unwrap();
        assert_eq!(json, serde_json::json!({ "type": "opponent_disconnected" }));
    }

    #[test]
    fn test_server_message_attack_result_shape() {
        let json = serde_json::to_value(ServerMessage::AttackResult {
            x: 1,
            y: 2,
            result: AttackResult::Hit,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "attack_result", "x": 1, "y": 2, "result": "hit" })
        );
    }

    #[test]
    fn test_server_message_ship_destroyed_uses_client_field_names() {
        let json = serde_json::to_value(ServerMessage::ShipDestroyed {
            ship: DestroyedShip {
                id: 2,
                pos_x: 4,
                pos_y: 5,
                length: 3,
                is_horizontal: false,
            },
        })
        .unwrap();
        assert_eq!(json["type"], "ship_destroyed");
        assert_eq!(
            json["ship"],
            serde_json::json!({ "id": 2, "posX": 4, "posY": 5, "length": 3, "isHorizontal": false })
        );
    }

    #[test]
    fn test_server_message_friend_not_found_omits_empty_message() {
        let bare = serde_json::to_value(ServerMessage::FriendNotFound {
            message: None,
        })
        .unwrap();
        assert_eq!(bare, serde_json::json!({ "type": "friend_not_found" }));

        let with = serde_json::to_value(ServerMessage::FriendNotFound {
            message: Some("Friend not found".into()),
        })
        .unwrap();
        assert_eq!(with["message"], "Friend not found");
    }

    #[test]
    fn test_server_message_counters() {
        let json =
            serde_json::to_value(ServerMessage::PlayersInQueue { count: 1 })
                .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "players_in_queue", "count": 1 })
        );
    }
}
