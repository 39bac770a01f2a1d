//! At most one in-progress lifecycle per `(ecosystem, target)`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashSet;
use stack_core::models::Ecosystem;
use stack_core::AnalysisError;

type FlightKey = (Ecosystem, PathBuf);

/// Registry of running lifecycles, shared by clones.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<DashSet<FlightKey>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the key, or fail with `InFlight` if another lifecycle holds it.
    /// The claim is released when the returned guard drops.
    pub fn try_acquire(
        &self,
        ecosystem: Ecosystem,
        target: &Path,
    ) -> Result<FlightGuard, AnalysisError> {
        let key = (ecosystem, target.to_path_buf());
        if !self.in_flight.insert(key.clone()) {
            return Err(AnalysisError::InFlight {
                ecosystem: ecosystem.to_string(),
                target: target.to_path_buf(),
            });
        }
        Ok(FlightGuard {
            registry: Arc::clone(&self.in_flight),
            key,
        })
    }

    pub fn is_running(&self, ecosystem: Ecosystem, target: &Path) -> bool {
        self.in_flight.contains(&(ecosystem, target.to_path_buf()))
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct FlightGuard {
    registry: Arc<DashSet<FlightKey>>,
    key: FlightKey,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.key);
    }
}
