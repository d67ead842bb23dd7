//! Generic collections used by the simulation.
//!
//! # Example: Quick Start
//!
//! ```rust
//! use gauntlet::game::collections::OrderedStore;
//!
//! let mut store = OrderedStore::<u32, &str>::new();
//! store.insert(7, "seven");
//! store.insert(3, "three");
//! store.remove(7);
//! assert_eq!(store.keys().collect::<Vec<_>>(), vec![3]);
//! ```

pub mod ordered_store;


pub use ordered_store::{InsertResult, OrderedStore, StoreStats, SWEEP_MIN_TOMBSTONES};
