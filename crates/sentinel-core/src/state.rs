//! Shared environmental state between the sampling and render tasks.
//!
//! One mutex guards the (reading, classification) pair so the two fields
//! are always written and snapshotted together. The lock wait is bounded:
//! a task that cannot take the lock in time skips its cycle instead of
//! stalling.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, with_timeout};
use thiserror_no_std::Error;

use crate::reading::{Emergency, EnvironmentalReading};

/// Upper bound on waiting for the state lock.
pub const LOCK_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("shared state lock wait timed out")]
pub struct LockTimeout;

struct Latest {
    reading: EnvironmentalReading,
    emergency: Emergency,
}

/// The only resource the periodic tasks share.
///
/// Constructed once at boot and injected into each task by reference.
/// The sampling task is the single writer; the render and broadcast tasks
/// only read.
pub struct SharedEnvironmentalState {
    latest: Mutex<CriticalSectionRawMutex, Latest>,
}

impl SharedEnvironmentalState {
    pub const fn new() -> Self {
        Self {
            latest: Mutex::new(Latest {
                reading: EnvironmentalReading {
                    temperature: 0.0,
                    pressure: 0.0,
                    humidity: 0.0,
                    gas_resistance: 0.0,
                },
                emergency: Emergency::None,
            }),
        }
    }

    /// Overwrite the pair inside one critical section.
    ///
    /// Last writer wins; a timed-out publish drops the reading.
    pub async fn publish(
        &self,
        reading: EnvironmentalReading,
        emergency: Emergency,
    ) -> Result<(), LockTimeout> {
        let mut latest = with_timeout(LOCK_TIMEOUT, self.latest.lock())
            .await
            .map_err(|_| LockTimeout)?;
        latest.reading = reading;
        latest.emergency = emergency;
        Ok(())
    }

    /// Copy the pair out inside one critical section.
    ///
    /// The caller gets either the previous or the current publish in full,
    /// never a mix of the two.
    pub async fn snapshot(&self) -> Result<(EnvironmentalReading, Emergency), LockTimeout> {
        let latest = with_timeout(LOCK_TIMEOUT, self.latest.lock())
            .await
            .map_err(|_| LockTimeout)?;
        Ok((latest.reading, latest.emergency))
    }
}

impl Default for SharedEnvironmentalState {
    fn default() -> Self {
        Self::new()
    }
}
