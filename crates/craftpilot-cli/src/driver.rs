//! Headless tick driver.
//!
//! Stands in for the game's client thread: calls
//! [`AgentLoop::on_tick`] at a fixed rate against a [`SimWorld`] until the
//! shutdown flag is raised.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use craftpilot_hal::Effector;
use craftpilot_perception::SimWorld;
use craftpilot_runtime::{AgentLoop, TickOutcome};
use craftpilot_types::{CraftError, Pose, Vec3};
use tracing::{debug, info};

/// Moves the simulated player.
pub struct WorldEffector {
    world: Arc<SimWorld>,
}

impl WorldEffector {
    pub fn new(world: Arc<SimWorld>) -> Self {
        Self { world }
    }
}

impl Effector for WorldEffector {
    fn pose(&self) -> Option<Pose> {
        Some(self.world.pose())
    }

    fn move_to(&self, target: Vec3, walk_speed: f32) -> Result<(), CraftError> {
        self.world.teleport_player(target, walk_speed);
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriverStats {
    pub ticks: u64,
    pub cycles_started: u64,
}

/// Tick `agent` at `rate_hz` until `shutdown` is set or `max_ticks` is hit.
pub fn run(
    agent: &mut AgentLoop,
    world: &SimWorld,
    rate_hz: u32,
    shutdown: &AtomicBool,
    max_ticks: Option<u64>,
) -> DriverStats {
    let period = Duration::from_secs(1) / rate_hz.max(1);
    let mut stats = DriverStats::default();
    info!(rate_hz, "tick driver running");

    while !shutdown.load(Ordering::SeqCst) && max_ticks.is_none_or(|max| stats.ticks < max) {
        let started = Instant::now();
        stats.ticks += 1;
        if let TickOutcome::Started { cycle_id, .. } = agent.on_tick(world, world) {
            stats.cycles_started += 1;
            debug!(%cycle_id, tick = stats.ticks, "cycle started");
        }
        if let Some(rest) = period.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!(ticks = stats.ticks, cycles = stats.cycles_started, "tick driver stopped");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use craftpilot_runtime::{AgentLoopConfig, Inference, InferenceError};

    struct Unavailable;

    #[async_trait]
    impl Inference for Unavailable {
        async fn infer(&self, _prompt: &str) -> Result<String, InferenceError> {
            Err(InferenceError::Status(503))
        }
    }

    #[test]
    fn world_effector_moves_sim_player() {
        let world = Arc::new(SimWorld::new());
        let effector = WorldEffector::new(world.clone());
        effector
            .move_to(Vec3::new(3.0, 65.0, -2.0), 2.0)
            .expect("sim move");
        assert_eq!(world.pose().position, Vec3::new(3.0, 65.0, -2.0));
        assert_eq!(world.walk_speed(), 2.0);
        assert_eq!(effector.pose(), Some(world.pose()));
    }

    #[test]
    fn driver_stops_at_max_ticks_and_starts_one_cycle_when_still() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let world = Arc::new(SimWorld::new());
        let mut agent = AgentLoop::new(
            AgentLoopConfig::default(),
            Arc::new(Unavailable),
            Arc::new(WorldEffector::new(world.clone())),
            rt.handle().clone(),
        );
        let shutdown = AtomicBool::new(false);

        let stats = run(&mut agent, &world, 1000, &shutdown, Some(10));
        assert_eq!(stats.ticks, 10);
        assert_eq!(stats.cycles_started, 1);
    }

    #[test]
    fn raised_flag_stops_before_first_tick() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let world = Arc::new(SimWorld::new());
        let mut agent = AgentLoop::new(
            AgentLoopConfig::default(),
            Arc::new(Unavailable),
            Arc::new(WorldEffector::new(world.clone())),
            rt.handle().clone(),
        );
        let shutdown = AtomicBool::new(true);
        assert_eq!(run(&mut agent, &world, 20, &shutdown, None).ticks, 0);
    }
}
