//! Read-only views onto the host game.
//!
//! The game engine owns the world; the control loop only ever reads it through
//! these two traits.  Implementations are free to return `None` wherever the
//! engine cannot answer, and the [`StateSampler`][crate::sampler::StateSampler]
//! degrades those gaps to defaults instead of aborting the cycle.

use craftpilot_types::{Aabb, BlockPos, Vec3};

/// Standard player hitbox width in blocks.
pub const PLAYER_WIDTH: f64 = 0.6;
/// Standard player hitbox height in blocks.
pub const PLAYER_HEIGHT: f64 = 1.8;

/// An entity the world reports near some area.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySighting {
    /// Engine-level identity, used to exclude the player from its own view.
    pub id: u64,
    /// Display name, e.g. `"Cow"`.
    pub kind: String,
    pub position: Vec3,
}

/// A raw inventory stack as the engine reports it.  Empty slots are allowed
/// and are filtered out by the sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub item_id: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, count: u32) -> Self {
        Self {
            item_id: item_id.into(),
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item_id.is_empty() || self.item_id.ends_with(".air")
    }
}

/// Level-wide state: time, weather, terrain and entities.
pub trait WorldView {
    fn is_day(&self) -> bool;

    fn is_raining(&self) -> bool;

    /// Registered biome name at `pos`, e.g. `"minecraft:plains"`.
    fn biome_at(&self, pos: BlockPos) -> Option<String>;

    /// Block identifier at `pos`, e.g. `"block.minecraft.stone"`.
    fn block_at(&self, pos: BlockPos) -> Option<String>;

    /// Every entity whose position lies inside `area`.
    fn entities_within(&self, area: &Aabb) -> Vec<EntitySighting>;
}

/// The controlled player.
pub trait PlayerView {
    fn entity_id(&self) -> u64;

    fn position(&self) -> Vec3;

    /// Unit look vector.
    fn look_direction(&self) -> Vec3;

    fn health(&self) -> f64;

    fn food_level(&self) -> i32;

    /// Main inventory, indexed by slot.
    fn inventory(&self) -> Vec<ItemStack>;

    /// Hitbox centred on the player's feet.
    fn bounding_box(&self) -> Aabb {
        let p = self.position();
        let half = PLAYER_WIDTH / 2.0;
        Aabb::new(
            Vec3::new(p.x - half, p.y, p.z - half),
            Vec3::new(p.x + half, p.y + PLAYER_HEIGHT, p.z + half),
        )
    }
}
