//! # Event Bus Module
//!
//! Publish/subscribe hub used to tell the outer application what the engines
//! did (tree counter refreshes, loads, recolors, export progress) without the
//! engines knowing who listens.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use citycanopy_core::event_bus::{EventBus, EventCategory, EventFilter, SceneEvent, TreeEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Trees]),
//!     |event| {
//!         if let SceneEvent::Trees(TreeEvent::CountChanged { trees }) = event {
//!             println!("{trees} trees");
//!         }
//!     },
//! );
//!
//! bus.publish(SceneEvent::Trees(TreeEvent::CountChanged { trees: 12 }));
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
