//! `craftpilot-types` – shared data model for the CraftPilot control loop.
//!
//! Everything that crosses a crate boundary lives here: world geometry, the
//! per-cycle [`Snapshot`], the decoded [`Instruction`] and the process-wide
//! [`CraftError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Geometry
// ─────────────────────────────────────────────────────────────────────────────

/// A point or direction in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The block containing this point.
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

/// Integer block coordinates. `+x` is east, `+z` is south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Shift horizontally by `(dx, dz)`.
    pub const fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y, self.z + dz)
    }

    /// The horizontal neighbour in `direction`.
    pub fn neighbor(&self, direction: CompassDirection) -> Self {
        let (dx, dz) = direction.offset();
        self.offset(dx, dz)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Grow the box by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Self {
        Self {
            min: Vec3::new(self.min.x - amount, self.min.y - amount, self.min.z - amount),
            max: Vec3::new(self.max.x + amount, self.max.y + amount, self.max.z + amount),
        }
    }

    /// `true` if `p` lies inside the box (inclusive bounds).
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Where the controlled player is and which way it is heading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    /// Heading in degrees. `0` faces south (`+z`), `90` faces west.
    pub yaw_degrees: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Clear,
    Rain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
    pub biome: String,
}

/// A non-empty inventory stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub slot: u32,
    pub item_id: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    /// Unit look vector.
    pub orientation: Vec3,
    pub health: f64,
    pub hunger: i32,
    pub inventory: Vec<InventorySlot>,
}

/// Block-granular offset of an entity relative to the player's block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockOffset {
    pub dx: i32,
    pub dy: i32,
    pub dz: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearbyEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub relative_offset: BlockOffset,
}

/// The eight horizontal neighbours of a block, in snapshot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    S,
    E,
    W,
    NE,
    SE,
    SW,
    NW,
}

impl CompassDirection {
    /// Fixed order used by [`Snapshot::surrounding_blocks`].
    pub const ALL: [CompassDirection; 8] = [
        CompassDirection::N,
        CompassDirection::S,
        CompassDirection::E,
        CompassDirection::W,
        CompassDirection::NE,
        CompassDirection::SE,
        CompassDirection::SW,
        CompassDirection::NW,
    ];

    /// Horizontal `(dx, dz)` step. North is `-z`, east is `+x`.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            CompassDirection::N => (0, -1),
            CompassDirection::S => (0, 1),
            CompassDirection::E => (1, 0),
            CompassDirection::W => (-1, 0),
            CompassDirection::NE => (1, -1),
            CompassDirection::SE => (1, 1),
            CompassDirection::SW => (-1, 1),
            CompassDirection::NW => (-1, -1),
        }
    }

    /// Lower-case English name, e.g. `"northeast"`.
    pub const fn word(self) -> &'static str {
        match self {
            CompassDirection::N => "north",
            CompassDirection::S => "south",
            CompassDirection::E => "east",
            CompassDirection::W => "west",
            CompassDirection::NE => "northeast",
            CompassDirection::SE => "southeast",
            CompassDirection::SW => "southwest",
            CompassDirection::NW => "northwest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurroundingBlock {
    pub direction: CompassDirection,
    pub block_id: String,
}

/// Point-in-time capture of everything the model gets to see.
///
/// `surrounding_blocks` is a fixed-size array so that "exactly eight, in
/// [`CompassDirection::ALL`] order" holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub environment: Environment,
    pub player_state: PlayerState,
    pub nearby_entities: Vec<NearbyEntity>,
    pub surrounding_blocks: [SurroundingBlock; 8],
}

// ─────────────────────────────────────────────────────────────────────────────
// Instruction
// ─────────────────────────────────────────────────────────────────────────────

/// Relative movement direction understood by the `move` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    /// Case-insensitive lookup. Returns `None` for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "forward" => Some(MoveDirection::Forward),
            "backward" => Some(MoveDirection::Backward),
            "left" => Some(MoveDirection::Left),
            "right" => Some(MoveDirection::Right),
            _ => None,
        }
    }
}

/// A decoded model reply.
///
/// One variant per action verb the model was trained on, each with only the
/// parameters that verb carries. String parameters default to `""` and
/// numbers to zero when the reply omits them.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `direction` is kept verbatim; the dispatcher normalises it.
    Move {
        direction: String,
        distance: f64,
        jumping: bool,
    },
    UseItem {
        item: String,
    },
    InteractBlock {
        block: String,
        interaction: String,
    },
    AttackEntity {
        entity_type: String,
        weapon: String,
    },
    CraftItem {
        item: String,
        count: u32,
        ingredients: Vec<String>,
    },
    PickupItem {
        item: String,
        count: u32,
    },
    DestroyItem {
        item: String,
    },
    PlayerSleep {
        bed_position: String,
    },
    PlayerWake {
        wake_immediately: bool,
    },
    AnvilRepair {
        result_item: String,
        left_input: String,
        right_input: String,
    },
    /// `container` is the container's kind, e.g. `"ChestMenu"`.
    ContainerEvent {
        container: String,
    },
    StartDrawingBow {
        bow: String,
    },
    /// `charge` is in ticks; `power` is the derived shot strength in `0..=1`.
    ReleaseArrow {
        bow: String,
        charge: u32,
        power: f64,
    },
    /// `position` uses the prompt's `x=.., y=.., z=..` form.
    UseBonemeal {
        target_block: String,
        position: String,
    },
    /// A verb outside the known vocabulary (including an empty one).
    Unknown {
        function: String,
    },
}

impl Instruction {
    /// The action verb as it appears on the wire, e.g. `"move"`.
    pub fn function(&self) -> &str {
        match self {
            Instruction::Move { .. } => "move",
            Instruction::UseItem { .. } => "use_item",
            Instruction::InteractBlock { .. } => "interact_block",
            Instruction::AttackEntity { .. } => "attack_entity",
            Instruction::CraftItem { .. } => "craft_item",
            Instruction::PickupItem { .. } => "pickup_item",
            Instruction::DestroyItem { .. } => "destroy_item",
            Instruction::PlayerSleep { .. } => "player_sleep",
            Instruction::PlayerWake { .. } => "player_wake",
            Instruction::AnvilRepair { .. } => "anvil_repair",
            Instruction::ContainerEvent { .. } => "container_event",
            Instruction::StartDrawingBow { .. } => "start_drawing_bow",
            Instruction::ReleaseArrow { .. } => "release_arrow",
            Instruction::UseBonemeal { .. } => "use_bonemeal",
            Instruction::Unknown { function } => function,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Global error type spanning effector faults, inference and decode failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CraftError {
    #[error("Effector fault: {details}")]
    Effector { details: String },

    #[error("Unknown action: {0:?}")]
    UnknownAction(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Reply could not be parsed: {0}")]
    Parse(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}
