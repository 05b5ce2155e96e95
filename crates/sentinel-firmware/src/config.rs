//! Node timing constants.

use embassy_time::Duration;

/// Pause between forced-mode sampling cycles. Any period at or above the
/// sensor conversion time is valid.
pub const SAMPLING_PERIOD: Duration = Duration::from_secs(5);

/// Render cadence. Finer than the sampling period so the alert blink is
/// visible.
pub const RENDER_PERIOD: Duration = Duration::from_millis(250);

/// Settle time between triggering a forced conversion and reading the
/// data block.
pub const CONVERSION_SETTLE: Duration = Duration::from_millis(50);

/// Pause between peer status broadcasts.
pub const BROADCAST_PERIOD: Duration = Duration::from_secs(2);
