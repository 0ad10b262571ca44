//! terminalcrypto Runner - live price watching
//!
//! Drives periodic re-fetch of a set of symbols through any `Exchange` and
//! hands each completed tick to a renderer:
//!
//! - **Board**: per-symbol sample state, owned by the loop, plus the
//!   immutable `PriceBoard` snapshots given to renderers
//! - **Refresh loop**: timer and cancellation driven state machine
//!
//! ## Architecture
//!
//! ```text
//!   interval tick        cancel (q / Ctrl+C)
//!        │                     │
//!        ▼                     ▼
//!  ┌──────────────────────────────────┐
//!  │           RefreshLoop            │
//!  │  fan-out get_price per symbol    │──────▶ Arc<dyn Exchange>
//!  │  join all, fold into WatchBoard  │
//!  └────────────────┬─────────────────┘
//!                   │ PriceBoard (one per tick)
//!                   ▼
//!            BoardRenderer
//! ```

pub mod board;
pub mod refresh;

// Re-export main types
pub use board::{BoardEntry, PriceBoard, Quote, WatchBoard};
pub use refresh::{
    BoardRenderer, DEFAULT_INTERVAL, RefreshLoop, StopReason, WatchConfig, WatchError,
    WatchSummary,
};
