//! ## pitwall-core::events
//! **Ordered fan-out of emitted samples to subscribers**
//!
//! The bus replaces an event-emitter: listeners are notified synchronously, in
//! subscription order, for every published sample. A listener detached while a
//! notification is in flight (for instance by an earlier listener) does not
//! receive that sample.

pub mod bus;

pub use bus::{SampleBus, Subscription};
