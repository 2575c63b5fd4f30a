//! Network address value types for the handle wrapping layer
//!
//! This module turns family-specific socket address storage into uniform
//! host-text/port values. It owns no sockets and performs no I/O: the raw
//! per-family construct/render primitives come from the platform layer, and
//! the bytes being interpreted come from an externally supplied accessor.

pub mod addr;
pub mod family;
pub mod resolver;

pub use addr::Addr;
pub use family::{AddressFamily, Ipv4, Ipv6};
pub use resolver::AddrResolver;

/// Result type for address operations
pub type Result<T> = std::result::Result<T, Error>;

/// Address resolution errors
///
/// The compatibility surface ([`AddrResolver::from_storage`],
/// [`AddrResolver::from_handle`]) absorbs all of these into
/// `Addr::default()`; the `try_` forms surface them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A family construct/render primitive returned a nonzero status.
    #[error("address primitive failed with status {0}")]
    Primitive(i32),

    /// The buffer-filling accessor reported failure.
    #[error("handle accessor failed with status {0}")]
    Accessor(i32),

    /// The accessor wrote an address family outside the supported set.
    #[error("unsupported address family: {0}")]
    UnsupportedFamily(i32),

    /// Endpoint text could not be split into host and port.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}
