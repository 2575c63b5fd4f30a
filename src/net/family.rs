//! Address-family tags and their traits table
//!
//! Exactly two families exist, IPv4 and IPv6, and each is a compile-time tag
//! implementing [`AddressFamily`]: its native storage layout plus the two
//! platform primitives (construct-from-text, render-to-text) wrapped with a
//! uniform status convention. Selection is by monomorphization, never by
//! runtime type inspection, so the dispatch table is branch-free and
//! allocation-free on the success path. The table is pure functions and
//! constants: process-wide, immutable, safe to use from any thread.

use std::ptr;

use super::{Error, Result};

// Bindings to the standard POSIX address-text primitives. This libc build does
// not export `inet_pton`/`inet_ntop`, so the symbols the code already calls are
// declared here directly; the signatures match the C library verbatim.
extern "C" {
    fn inet_pton(af: libc::c_int, src: *const libc::c_char, dst: *mut libc::c_void) -> libc::c_int;
    fn inet_ntop(
        af: libc::c_int,
        src: *const libc::c_void,
        dst: *mut libc::c_char,
        size: libc::socklen_t,
    ) -> *const libc::c_char;
}

/// Capacity that fits any rendered host text, NUL included (INET6_ADDRSTRLEN).
pub const ADDR_TEXT_CAP: usize = 46;

/// Compile-time tag for the IPv4 address family.
pub enum Ipv4 {}

/// Compile-time tag for the IPv6 address family.
pub enum Ipv6 {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Ipv4 {}
    impl Sealed for super::Ipv6 {}
}

/// The capability set of one address family.
///
/// Implemented only by [`Ipv4`] and [`Ipv6`]; the set is closed. Status codes
/// follow the platform convention: 0 is success, a negative errno value is
/// failure.
pub trait AddressFamily: sealed::Sealed {
    /// Native storage layout of this family. The two layouts are distinct and
    /// not interchangeable.
    type Storage: Copy;

    /// Numeric family tag, as the platform writes it into `ss_family`.
    const FAMILY: libc::c_int;

    /// Populates the family, address, and port fields of `out` from host
    /// text. `out` is expected zeroed; `port` is stored in network byte
    /// order. Nonzero status means the text is not parsable for this family.
    fn construct(host: &str, port: u16, out: &mut Self::Storage) -> libc::c_int;

    /// Renders the address field of `storage` as NUL-terminated host text
    /// into `buf`.
    fn render(storage: &Self::Storage, buf: &mut [u8]) -> libc::c_int;

    /// Reads the port field (network byte order) in host byte order.
    fn port(storage: &Self::Storage) -> u16;
}

impl AddressFamily for Ipv4 {
    type Storage = libc::sockaddr_in;

    const FAMILY: libc::c_int = libc::AF_INET;

    fn construct(host: &str, port: u16, out: &mut Self::Storage) -> libc::c_int {
        let Some(chost) = nul_terminated(host) else {
            return -libc::EINVAL;
        };
        let rc = unsafe {
            inet_pton(
                libc::AF_INET,
                chost.as_ptr().cast(),
                ptr::addr_of_mut!(out.sin_addr).cast(),
            )
        };
        if rc != 1 {
            return -libc::EINVAL;
        }
        out.sin_family = libc::AF_INET as libc::sa_family_t;
        out.sin_port = port.to_be();
        0
    }

    fn render(storage: &Self::Storage, buf: &mut [u8]) -> libc::c_int {
        render_text(libc::AF_INET, ptr::addr_of!(storage.sin_addr).cast(), buf)
    }

    fn port(storage: &Self::Storage) -> u16 {
        u16::from_be(storage.sin_port)
    }
}

impl AddressFamily for Ipv6 {
    type Storage = libc::sockaddr_in6;

    const FAMILY: libc::c_int = libc::AF_INET6;

    fn construct(host: &str, port: u16, out: &mut Self::Storage) -> libc::c_int {
        let Some(chost) = nul_terminated(host) else {
            return -libc::EINVAL;
        };
        let rc = unsafe {
            inet_pton(
                libc::AF_INET6,
                chost.as_ptr().cast(),
                ptr::addr_of_mut!(out.sin6_addr).cast(),
            )
        };
        if rc != 1 {
            return -libc::EINVAL;
        }
        out.sin6_family = libc::AF_INET6 as libc::sa_family_t;
        out.sin6_port = port.to_be();
        0
    }

    fn render(storage: &Self::Storage, buf: &mut [u8]) -> libc::c_int {
        render_text(libc::AF_INET6, ptr::addr_of!(storage.sin6_addr).cast(), buf)
    }

    fn port(storage: &Self::Storage) -> u16 {
        u16::from_be(storage.sin6_port)
    }
}

/// Builds a zeroed storage value for `F` and populates it from host text and
/// port.
///
/// # Examples
///
/// ```
/// use evwrap::net::family::{self, Ipv4};
///
/// assert!(family::construct::<Ipv4>("127.0.0.1", 8080).is_ok());
/// assert!(family::construct::<Ipv4>("not-an-ip", 8080).is_err());
/// ```
pub fn construct<F: AddressFamily>(host: &str, port: u16) -> Result<F::Storage> {
    // Every sealed Storage is a plain-old-data sockaddr layout; all-zero is a
    // valid value.
    let mut storage: F::Storage = unsafe { std::mem::zeroed() };
    let status = F::construct(host, port, &mut storage);
    if status == 0 {
        Ok(storage)
    } else {
        Err(Error::Primitive(status))
    }
}

/// Copies `host` into a NUL-terminated stack buffer for the C primitives.
fn nul_terminated(host: &str) -> Option<[u8; ADDR_TEXT_CAP]> {
    if host.len() >= ADDR_TEXT_CAP || host.as_bytes().contains(&0) {
        return None;
    }
    let mut buf = [0u8; ADDR_TEXT_CAP];
    buf[..host.len()].copy_from_slice(host.as_bytes());
    Some(buf)
}

fn render_text(family: libc::c_int, src: *const libc::c_void, buf: &mut [u8]) -> libc::c_int {
    let text = unsafe {
        inet_ntop(
            family,
            src,
            buf.as_mut_ptr().cast(),
            buf.len() as libc::socklen_t,
        )
    };
    if text.is_null() {
        -libc::ENOSPC
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_ipv4_fields() {
        let storage = construct::<Ipv4>("127.0.0.1", 8080).unwrap();
        assert_eq!(storage.sin_family, libc::AF_INET as libc::sa_family_t);
        assert_eq!(Ipv4::port(&storage), 8080);
        assert_eq!(u32::from_be(storage.sin_addr.s_addr), 0x7f00_0001);
    }

    #[test]
    fn test_construct_ipv6_fields() {
        let storage = construct::<Ipv6>("::1", 443).unwrap();
        assert_eq!(storage.sin6_family, libc::AF_INET6 as libc::sa_family_t);
        assert_eq!(Ipv6::port(&storage), 443);
        assert_eq!(storage.sin6_addr.s6_addr[15], 1);
    }

    #[test]
    fn test_construct_rejects_malformed_host() {
        assert!(matches!(
            construct::<Ipv4>("not-an-ip", 80),
            Err(Error::Primitive(status)) if status != 0
        ));
        // A valid IPv6 literal is not a valid IPv4 one, and vice versa.
        assert!(construct::<Ipv4>("::1", 80).is_err());
        assert!(construct::<Ipv6>("127.0.0.1", 80).is_err());
    }

    #[test]
    fn test_construct_rejects_oversized_host() {
        let long = "1".repeat(ADDR_TEXT_CAP);
        assert!(construct::<Ipv4>(&long, 80).is_err());
    }

    #[test]
    fn test_construct_rejects_embedded_nul() {
        assert!(construct::<Ipv4>("127.0.0.1\0x", 80).is_err());
    }

    #[test]
    fn test_render_round_trip() {
        let storage = construct::<Ipv4>("192.168.1.1", 0).unwrap();
        let mut buf = [0u8; ADDR_TEXT_CAP];
        assert_eq!(Ipv4::render(&storage, &mut buf), 0);
        let end = buf.iter().position(|&b| b == 0).unwrap();
        assert_eq!(&buf[..end], b"192.168.1.1");
    }

    #[test]
    fn test_render_needs_room() {
        let storage = construct::<Ipv4>("192.168.100.200", 0).unwrap();
        let mut buf = [0u8; 4];
        assert!(Ipv4::render(&storage, &mut buf) != 0);
    }
}
