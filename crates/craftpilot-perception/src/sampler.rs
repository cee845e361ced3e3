//! [`StateSampler`] – turns the live world into an immutable [`Snapshot`].
//!
//! Sampling is a pure read: nothing is written back to the world, and two
//! calls against identical world state produce identical snapshots.  Gaps in
//! what the engine can report (an unregistered biome, an unloaded chunk) are
//! filled with [`UNKNOWN`] rather than failing the cycle.

use craftpilot_types::{
    BlockOffset, CompassDirection, Environment, InventorySlot, NearbyEntity, PlayerState,
    Snapshot, SurroundingBlock, TimeOfDay, Weather,
};
use tracing::debug;

use crate::world::{PlayerView, WorldView};

/// Entities are searched for within the player's hitbox inflated by this many
/// blocks on every side.
pub const ENTITY_SEARCH_RADIUS: f64 = 10.0;

/// Placeholder for any identifier the world could not provide.
pub const UNKNOWN: &str = "unknown";

/// Builds one [`Snapshot`] per cycle from the read-only world views.
#[derive(Debug, Default, Clone, Copy)]
pub struct StateSampler;

impl StateSampler {
    pub fn new() -> Self {
        Self
    }

    /// Capture environment, player, nearby entities and the eight blocks
    /// around the player's standing position.
    pub fn sample<W, P>(&self, world: &W, player: &P) -> Snapshot
    where
        W: WorldView + ?Sized,
        P: PlayerView + ?Sized,
    {
        let snapshot = Snapshot {
            environment: Self::environment(world, player),
            player_state: Self::player_state(player),
            nearby_entities: Self::nearby_entities(world, player),
            surrounding_blocks: Self::surrounding_blocks(world, player),
        };
        debug!(
            entities = snapshot.nearby_entities.len(),
            items = snapshot.player_state.inventory.len(),
            "sampled world state"
        );
        snapshot
    }

    fn environment<W, P>(world: &W, player: &P) -> Environment
    where
        W: WorldView + ?Sized,
        P: PlayerView + ?Sized,
    {
        let standing = player.position().block_pos();
        Environment {
            time_of_day: if world.is_day() {
                TimeOfDay::Day
            } else {
                TimeOfDay::Night
            },
            weather: if world.is_raining() {
                Weather::Rain
            } else {
                Weather::Clear
            },
            biome: world
                .biome_at(standing)
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    fn player_state<P: PlayerView + ?Sized>(player: &P) -> PlayerState {
        let inventory = player
            .inventory()
            .into_iter()
            .enumerate()
            .filter(|(_, stack)| !stack.is_empty())
            .map(|(slot, stack)| InventorySlot {
                slot: slot as u32,
                item_id: stack.item_id,
                count: stack.count,
            })
            .collect();

        PlayerState {
            position: player.position(),
            orientation: player.look_direction(),
            health: player.health(),
            hunger: player.food_level(),
            inventory,
        }
    }

    fn nearby_entities<W, P>(world: &W, player: &P) -> Vec<NearbyEntity>
    where
        W: WorldView + ?Sized,
        P: PlayerView + ?Sized,
    {
        let area = player.bounding_box().inflate(ENTITY_SEARCH_RADIUS);
        let own_id = player.entity_id();
        let origin = player.position().block_pos();

        let mut entities: Vec<NearbyEntity> = world
            .entities_within(&area)
            .into_iter()
            .filter(|e| e.id != own_id && area.contains(e.position))
            .map(|e| {
                let at = e.position.block_pos();
                NearbyEntity {
                    kind: e.kind,
                    relative_offset: BlockOffset {
                        dx: at.x - origin.x,
                        dy: at.y - origin.y,
                        dz: at.z - origin.z,
                    },
                }
            })
            .collect();

        // Engines rarely promise an iteration order.
        entities.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then(a.relative_offset.cmp(&b.relative_offset))
        });
        entities
    }

    fn surrounding_blocks<W, P>(world: &W, player: &P) -> [SurroundingBlock; 8]
    where
        W: WorldView + ?Sized,
        P: PlayerView + ?Sized,
    {
        let standing = player.position().block_pos();
        CompassDirection::ALL.map(|direction| SurroundingBlock {
            direction,
            block_id: world
                .block_at(standing.neighbor(direction))
                .unwrap_or_else(|| UNKNOWN.to_string()),
        })
    }
}
