//! In-process world used for headless runs and tests.
//!
//! [`SimWorld`] implements both [`WorldView`] and [`PlayerView`] over a small
//! mutable model so the full control loop can run without a game client.
//! The model sits behind a mutex because teleports arrive from the inference
//! completion thread while the tick thread is reading.
//!
//! # Example
//!
//! ```rust
//! use craftpilot_perception::sim::SimWorld;
//! use craftpilot_perception::sampler::StateSampler;
//! use craftpilot_types::{BlockPos, Vec3};
//!
//! let world = SimWorld::new()
//!     .with_player_position(Vec3::new(0.5, 64.0, 0.5))
//!     .with_block(BlockPos::new(0, 64, -1), "block.minecraft.stone");
//!
//! let snapshot = StateSampler::new().sample(&world, &world);
//! assert_eq!(snapshot.surrounding_blocks[0].block_id, "block.minecraft.stone");
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use craftpilot_types::{Aabb, BlockPos, Pose, Vec3};

use crate::world::{EntitySighting, ItemStack, PlayerView, WorldView};

/// Engine id of the simulated player.
pub const SIM_PLAYER_ID: u64 = 1;

const AIR: &str = "block.minecraft.air";

#[derive(Debug, Clone)]
struct SimState {
    day: bool,
    raining: bool,
    biome: String,
    blocks: HashMap<BlockPos, String>,
    entities: Vec<EntitySighting>,
    pose: Pose,
    health: f64,
    food_level: i32,
    inventory: Vec<ItemStack>,
    walk_speed: f32,
}

/// Simulated level plus its single player.
#[derive(Debug)]
pub struct SimWorld {
    state: Mutex<SimState>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// A sunny plains world with a full-health player at the origin.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                day: true,
                raining: false,
                biome: "minecraft:plains".to_string(),
                blocks: HashMap::new(),
                entities: Vec::new(),
                pose: Pose {
                    position: Vec3::new(0.5, 64.0, 0.5),
                    yaw_degrees: 0.0,
                },
                health: 20.0,
                food_level: 20,
                inventory: Vec::new(),
                walk_speed: 0.0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn edit(mut self, f: impl FnOnce(&mut SimState)) -> Self {
        f(self.state.get_mut().unwrap_or_else(PoisonError::into_inner));
        self
    }

    pub fn with_player_position(self, position: Vec3) -> Self {
        self.edit(|s| s.pose.position = position)
    }

    pub fn with_yaw(self, yaw_degrees: f64) -> Self {
        self.edit(|s| s.pose.yaw_degrees = yaw_degrees)
    }

    pub fn with_daytime(self, day: bool) -> Self {
        self.edit(|s| s.day = day)
    }

    pub fn with_rain(self, raining: bool) -> Self {
        self.edit(|s| s.raining = raining)
    }

    pub fn with_biome(self, biome: impl Into<String>) -> Self {
        let biome = biome.into();
        self.edit(|s| s.biome = biome)
    }

    pub fn with_block(self, pos: BlockPos, block_id: impl Into<String>) -> Self {
        let block_id = block_id.into();
        self.edit(|s| {
            s.blocks.insert(pos, block_id);
        })
    }

    pub fn with_entity(self, id: u64, kind: impl Into<String>, position: Vec3) -> Self {
        let kind = kind.into();
        self.edit(|s| {
            s.entities.push(EntitySighting { id, kind, position });
        })
    }

    /// Put `stack` into `slot`, padding earlier slots with empty stacks.
    pub fn with_item(self, slot: usize, stack: ItemStack) -> Self {
        self.edit(|s| {
            if s.inventory.len() <= slot {
                s.inventory.resize(slot + 1, ItemStack::new(AIR, 0));
            }
            s.inventory[slot] = stack;
        })
    }

    /// Current position and heading of the player.
    pub fn pose(&self) -> Pose {
        self.lock().pose
    }

    /// Move the player to `target` without collision checks.
    pub fn teleport_player(&self, target: Vec3, walk_speed: f32) {
        let mut s = self.lock();
        s.pose.position = target;
        s.walk_speed = walk_speed;
    }

    /// Walk-animation speed hint from the most recent teleport.
    pub fn walk_speed(&self) -> f32 {
        self.lock().walk_speed
    }
}

impl WorldView for SimWorld {
    fn is_day(&self) -> bool {
        self.lock().day
    }

    fn is_raining(&self) -> bool {
        self.lock().raining
    }

    fn biome_at(&self, _pos: BlockPos) -> Option<String> {
        Some(self.lock().biome.clone())
    }

    fn block_at(&self, pos: BlockPos) -> Option<String> {
        Some(
            self.lock()
                .blocks
                .get(&pos)
                .cloned()
                .unwrap_or_else(|| AIR.to_string()),
        )
    }

    fn entities_within(&self, area: &Aabb) -> Vec<EntitySighting> {
        let s = self.lock();
        let mut found: Vec<EntitySighting> = s
            .entities
            .iter()
            .filter(|e| area.contains(e.position))
            .cloned()
            .collect();
        // The player is an entity of the level too.
        if area.contains(s.pose.position) {
            found.push(EntitySighting {
                id: SIM_PLAYER_ID,
                kind: "Player".to_string(),
                position: s.pose.position,
            });
        }
        found
    }
}

impl PlayerView for SimWorld {
    fn entity_id(&self) -> u64 {
        SIM_PLAYER_ID
    }

    fn position(&self) -> Vec3 {
        self.lock().pose.position
    }

    fn look_direction(&self) -> Vec3 {
        let yaw = self.lock().pose.yaw_degrees.to_radians();
        Vec3::new(-yaw.sin(), 0.0, yaw.cos())
    }

    fn health(&self) -> f64 {
        self.lock().health
    }

    fn food_level(&self) -> i32 {
        self.lock().food_level
    }

    fn inventory(&self) -> Vec<ItemStack> {
        self.lock().inventory.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_blocks_read_as_air() {
        let w = SimWorld::new();
        assert_eq!(w.block_at(BlockPos::new(5, 5, 5)).as_deref(), Some(AIR));
    }

    #[test]
    fn teleport_updates_pose_and_walk_speed() {
        let w = SimWorld::new();
        w.teleport_player(Vec3::new(3.0, 65.0, 4.0), 2.5);
        assert_eq!(w.position(), Vec3::new(3.0, 65.0, 4.0));
        assert!((w.walk_speed() - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn look_direction_faces_south_at_zero_yaw() {
        let w = SimWorld::new();
        let look = w.look_direction();
        assert!(look.x.abs() < 1e-9);
        assert!((look.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn player_is_reported_among_entities() {
        let w = SimWorld::new();
        let area = w.bounding_box().inflate(1.0);
        let seen = w.entities_within(&area);
        assert!(seen.iter().any(|e| e.id == SIM_PLAYER_ID));
    }

    #[test]
    fn with_item_pads_earlier_slots() {
        let w = SimWorld::new().with_item(2, ItemStack::new("item.minecraft.apple", 1));
        let inv = w.inventory();
        assert_eq!(inv.len(), 3);
        assert!(inv[0].is_empty());
        assert!(!inv[2].is_empty());
    }
}
