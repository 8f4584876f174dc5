//! Chart state: the loaded series, the current indicator inputs and styles,
//! and the overlay handed to the chart library.

pub mod overlay;
pub mod session;

pub use overlay::{build_overlay, AreaFill, ChartOverlay, Figure};
pub use session::{ChartError, ChartSession, ChartSnapshot, PendingUpdate, SharedChart};
