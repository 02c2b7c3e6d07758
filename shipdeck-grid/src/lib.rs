//! Shipdeck grid engine
//!
//! Headless state and behaviour of the editable record grid: which rows are
//! mounted, how wide each column is, which rows pass the filters and in what
//! order, the inline-edit lifecycle, bulk edits and middle-button
//! auto-scroll. Rendering is left to the host; [`RecordGrid::view`] hands it
//! everything needed to draw one frame.

pub mod autoscroll;
pub mod bulk;
pub mod cache;
pub mod column;
pub mod config;
pub mod edit;
pub mod error;
pub mod filter;
pub mod scroll;
pub mod selection;
pub mod window;

mod grid;

pub use config::GridConfig;
pub use grid::*;
