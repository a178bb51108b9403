// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod columns;
pub mod dataset;
pub mod format;
pub mod grid;
pub mod ids;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod selection;
pub mod state;
pub mod store;
pub mod timers;
pub mod window;

pub use columns::*;
pub use dataset::*;
pub use format::*;
pub use grid::*;
pub use ids::*;
pub use metrics::*;
pub use model::*;
pub use pipeline::*;
pub use selection::*;
pub use state::*;
pub use store::*;
pub use timers::*;
pub use window::*;
