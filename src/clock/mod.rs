pub mod elapsed;
pub mod ticker;

pub use elapsed::{ClockMode, ElapsedClock};
pub use ticker::Ticker;

use std::time::Duration;

/// Tick granularity of the authored page.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);
