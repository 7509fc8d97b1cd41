//! Developer Tooling: world inspector and frame statistics.
//!
//! # Invariants
//! - Tools only read world state; they never step or mutate it.

mod inspector;
mod stats;

pub use inspector::{BodyInfo, WorldInspector, WorldSummary};
pub use stats::FrameStats;
