pub mod calendar;
pub mod eclipse;
pub mod event;
pub mod observer;
pub mod time;
pub mod visibility;

pub use calendar::*;
pub use eclipse::*;
pub use event::*;
pub use observer::*;
pub use time::*;
pub use visibility::*;
