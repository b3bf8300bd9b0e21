//! Time utilities and abstractions
//!
//! - **Clock abstractions**: real and mock time for testing TTL behaviour
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use gameap_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now().duration_since(start), Duration::from_secs(5));
//! ```

mod clock;

pub use clock::{Clock, MockClock, SystemClock};
