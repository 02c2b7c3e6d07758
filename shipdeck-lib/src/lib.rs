//! Shipdeck record library
//!
//! Record model, persistence traits and write coordination for the shipment
//! and ground-transport tables of the logistics console.

pub mod catalog;
pub mod derived;
pub mod error;
pub mod hooks;
pub mod model;
pub mod store;
pub mod write_queue;

pub use catalog::CatalogCache;
pub use write_queue::WriteQueue;
