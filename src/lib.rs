//! Value-type utilities for an event-loop handle wrapping layer.
//!
//! This crate collects the small, self-contained value types that a handle
//! wrapping layer needs but that have no dependency on the loop itself:
//!
//! - [`Flags`] — a type-safe bitmask combinator over a closed enumeration,
//!   for building option masks handed to handle-configuration calls;
//! - [`Addr`] and the [`net::resolver`] module — uniform host-text/port
//!   resolution over family-specific (IPv4/IPv6) socket address storage;
//! - [`FileDescriptor`] and [`WinSize`] — trivial immutable value wrappers.
//!
//! Everything here is a bounded, synchronous leaf computation over local or
//! immutable state; concurrent use needs no locks.

pub mod flags;
pub mod net;
pub mod util;

pub use flags::{Flag, Flags};
pub use net::addr::Addr;
pub use util::{FileDescriptor, WinSize};
