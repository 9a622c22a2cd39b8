pub mod driver;
pub mod events;
pub mod state;

pub use driver::TimelineDriver;
pub use events::TimelineEvent;
pub use state::{Capabilities, PlaybackSnapshot, PlaybackState, PlaybackStatus};
