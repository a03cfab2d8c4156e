//! Core data model: positions, directions, placed tiles, and the game state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_VIEWPORT_SIZE, GENESIS_LEVEL, STARTING_TILE_ITEMS};
use crate::roman::{self, RomanChar};

/// A cell coordinate on the unbounded grid. Negative coordinates are valid;
/// there are no board edges.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring cell one step in `direction`.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Cardinal adjacency: Manhattan distance exactly one, diagonals excluded.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }
}

impl fmt::Display for Position {
    /// Canonical `"x,y"` key form, shared with the persisted tile map.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',').ok_or(())?;
        Ok(Self {
            x: x.parse().map_err(|_| ())?,
            y: y.parse().map_err(|_| ())?,
        })
    }
}

/// Input direction for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four cardinal directions, in input-scan order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit delta applied to a position. Screen convention: y grows downward.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Single-letter wire form used by the compact move log.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Up => 'U',
            Self::Down => 'D',
            Self::Left => 'L',
            Self::Right => 'R',
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'U' => Ok(Self::Up),
            'D' => Ok(Self::Down),
            'L' => Ok(Self::Left),
            'R' => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

/// A numeral written onto the grid, remembering the level it was placed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub char: RomanChar,
    pub level: u32,
}

/// Tile map serialization flattens [`Position`] keys to the canonical
/// `"x,y"` string so the persisted shape matches the wire format.
mod tiles_as_keys {
    use super::{PlacedTile, Position};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S>(
        tiles: &HashMap<Position, PlacedTile>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let keyed: HashMap<String, &PlacedTile> = tiles
            .iter()
            .map(|(pos, tile)| (pos.to_string(), tile))
            .collect();
        keyed.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<Position, PlacedTile>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let keyed = HashMap::<String, PlacedTile>::deserialize(deserializer)?;
        keyed
            .into_iter()
            .map(|(key, tile)| {
                key.parse::<Position>()
                    .map(|pos| (pos, tile))
                    .map_err(|()| D::Error::custom(format!("malformed tile key {key:?}")))
            })
            .collect()
    }
}

/// The complete game snapshot.
///
/// Values are persistent: every transition builds a new state and never
/// mutates the previous one in place, so concurrent readers can never
/// observe a torn update. The authoritative source of truth is the move
/// log ([`crate::timeline::GameTimeline`]); a `GameState` is always
/// derivable from it by replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Infinite grid: absence of a key means "shelter" (empty cell).
    #[serde(with = "tiles_as_keys")]
    pub tiles: HashMap<Position, PlacedTile>,
    pub player_position: Position,
    pub level: u32,
    /// Placement charges available for auto-placement.
    pub tile_items: u32,
    /// Index into `current_quest` of the next character required.
    pub quest_progress: usize,
    /// False means the player is at rest in a shelter between quests.
    pub is_on_quest: bool,
    /// Numeral string for `level`; kept consistent with it at all times.
    pub current_quest: String,
    /// Display-only; carried through state but irrelevant to game logic.
    pub viewport_size: u32,
}

impl GameState {
    /// Fresh game at the origin: level 1, one placement charge, quest "I".
    #[must_use]
    pub fn new(viewport_size: u32) -> Self {
        Self {
            tiles: HashMap::new(),
            player_position: Position::new(0, 0),
            level: GENESIS_LEVEL,
            tile_items: STARTING_TILE_ITEMS,
            quest_progress: 0,
            is_on_quest: false,
            current_quest: roman::encode(GENESIS_LEVEL).unwrap_or_default(),
            viewport_size,
        }
    }

    /// Numeral at `pos`, or `None` for a shelter cell.
    #[must_use]
    pub fn tile_at(&self, pos: Position) -> Option<RomanChar> {
        self.tiles.get(&pos).map(|tile| tile.char)
    }

    /// Full tile record at `pos`, including the level it was placed at.
    #[must_use]
    pub fn placed_tile_at(&self, pos: Position) -> Option<&PlacedTile> {
        self.tiles.get(&pos)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_SIZE)
    }
}
