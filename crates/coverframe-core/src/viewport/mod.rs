pub mod drag;
pub mod transform;

pub use drag::DragState;
pub use transform::{ViewportModel, ViewportState};
