//! [`SingleFlight`] – at most one inference cycle in flight.
//!
//! The gate is a single atomic flag.  [`SingleFlight::try_acquire`] flips it
//! from idle to busy and hands back a [`FlightPermit`]; dropping the permit
//! flips it back.  Because release happens in `Drop`, every exit path of a
//! cycle (success, error, early return, panic unwinding through the task)
//! returns the gate to idle.
//!
//! ```rust
//! use std::sync::Arc;
//! use craftpilot_runtime::single_flight::{CycleState, SingleFlight};
//!
//! let gate = Arc::new(SingleFlight::new());
//! let permit = gate.try_acquire().expect("idle gate");
//! assert!(gate.try_acquire().is_none());
//! assert_eq!(gate.state(), CycleState::Busy);
//!
//! drop(permit);
//! assert_eq!(gate.state(), CycleState::Idle);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

/// Whether a cycle currently holds the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Busy,
}

#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically move Idle → Busy.  Returns `None` if already busy.
    pub fn try_acquire(self: &Arc<Self>) -> Option<FlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                trace!("single-flight gate acquired");
                FlightPermit {
                    gate: Arc::clone(self),
                }
            })
    }

    pub fn state(&self) -> CycleState {
        if self.busy.load(Ordering::Acquire) {
            CycleState::Busy
        } else {
            CycleState::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == CycleState::Idle
    }
}

/// Proof of holding the gate.  Releases it when dropped.
#[derive(Debug)]
pub struct FlightPermit {
    gate: Arc<SingleFlight>,
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
        debug!("single-flight gate released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn new_gate_is_idle() {
        let gate = SingleFlight::new();
        assert!(gate.is_idle());
    }

    #[test]
    fn release_allows_reacquire() {
        let gate = Arc::new(SingleFlight::new());
        for _ in 0..3 {
            let permit = gate.try_acquire();
            assert!(permit.is_some());
            assert!(!gate.is_idle());
        }
        assert!(gate.is_idle());
    }

    #[test]
    fn concurrent_acquire_admits_exactly_one() {
        const THREADS: usize = 16;
        let gate = Arc::new(SingleFlight::new());
        let start = Arc::new(Barrier::new(THREADS));
        let done = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let start = Arc::clone(&start);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    start.wait();
                    let permit = gate.try_acquire();
                    let won = permit.is_some();
                    // Hold any permit until every thread has tried.
                    done.wait();
                    drop(permit);
                    won
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(gate.is_idle());
    }

    #[test]
    fn panic_while_holding_releases_gate() {
        let gate = Arc::new(SingleFlight::new());
        let g = Arc::clone(&gate);
        let result = thread::spawn(move || {
            let _permit = g.try_acquire().unwrap();
            panic!("cycle blew up");
        })
        .join();
        assert!(result.is_err());
        assert!(gate.is_idle());
    }
}
