pub mod ichimoku;
pub mod signals;
pub mod structs;

// Re-export commonly used types for convenience
pub use ichimoku::{compute_ichimoku, IchimokuLines};
pub use signals::classify;
pub use structs::{IchimokuParams, IchimokuState, Signal};
