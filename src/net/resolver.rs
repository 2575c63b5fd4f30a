//! Generic address resolution
//!
//! Turns family-specific or family-agnostic socket address storage into a
//! uniform [`Addr`]. Filling a generic buffer is split from interpreting it
//! as a concrete family, so one algorithm serves any address-yielding source
//! (a listening socket's local address, a connected peer's address) without
//! per-family logic at each call site.
//!
//! The `try_` functions report what went wrong; the plain functions keep the
//! historical contract of absorbing every failure into `Addr::default()`,
//! where an empty host string is the sole failure signal.

use std::io;
use std::mem;
use std::os::fd::AsRawFd;

use super::addr::Addr;
use super::family::{AddressFamily, Ipv4, Ipv6, ADDR_TEXT_CAP};
use super::{Error, Result};

/// An accessor fills a family-agnostic storage buffer from a handle and
/// reports the written length, returning 0 on success.
///
/// This is the capability boundary to the handle layer: `getsockname`,
/// `getpeername`, or a multicast membership query all fit this shape.
pub trait StorageAccessor<H>:
    FnOnce(&H, &mut libc::sockaddr_storage, &mut libc::socklen_t) -> libc::c_int
{
}

impl<H, F> StorageAccessor<H> for F where
    F: FnOnce(&H, &mut libc::sockaddr_storage, &mut libc::socklen_t) -> libc::c_int
{
}

/// Resolution algorithms over family-specific and generic address storage.
pub struct AddrResolver;

impl AddrResolver {
    /// Resolves a populated family-specific storage value into an [`Addr`].
    ///
    /// The host text is rendered into a fixed-size local buffer sized for
    /// the largest supported family; the port is read from the storage's
    /// port field (network byte order) and converted to host byte order.
    ///
    /// # Examples
    ///
    /// ```
    /// use evwrap::net::family::{self, Ipv4};
    /// use evwrap::net::AddrResolver;
    ///
    /// let storage = family::construct::<Ipv4>("127.0.0.1", 8080).unwrap();
    /// let addr = AddrResolver::try_from_storage::<Ipv4>(&storage).unwrap();
    /// assert_eq!(addr.host, "127.0.0.1");
    /// assert_eq!(addr.port, 8080);
    /// ```
    pub fn try_from_storage<F: AddressFamily>(storage: &F::Storage) -> Result<Addr> {
        let mut text = [0u8; ADDR_TEXT_CAP];
        let status = F::render(storage, &mut text);
        if status != 0 {
            return Err(Error::Primitive(status));
        }

        let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
        Ok(Addr {
            host: String::from_utf8_lossy(&text[..end]).into_owned(),
            port: F::port(storage),
        })
    }

    /// Like [`try_from_storage`](Self::try_from_storage), but absorbs any
    /// failure into `Addr::default()`.
    pub fn from_storage<F: AddressFamily>(storage: &F::Storage) -> Addr {
        Self::try_from_storage::<F>(storage).unwrap_or_else(|err| {
            log::debug!("absorbing storage render failure: {err}");
            Addr::default()
        })
    }

    /// Resolves the address of `handle` via `accessor`, interpreting the
    /// filled buffer as family `F` (a tag the caller already knows).
    ///
    /// A generic buffer sized for the largest supported family is zeroed and
    /// handed to the accessor. If the accessor reports failure the buffer is
    /// ignored, whatever it holds.
    pub fn try_from_handle<F, H, A>(accessor: A, handle: &H) -> Result<Addr>
    where
        F: AddressFamily,
        A: StorageAccessor<H>,
    {
        let storage = Self::fill_storage(accessor, handle)?;
        Self::try_from_storage::<F>(reinterpret::<F>(&storage))
    }

    /// Like [`try_from_handle`](Self::try_from_handle), but absorbs any
    /// failure into `Addr::default()`.
    pub fn from_handle<F, H, A>(accessor: A, handle: &H) -> Addr
    where
        F: AddressFamily,
        A: StorageAccessor<H>,
    {
        Self::try_from_handle::<F, H, A>(accessor, handle).unwrap_or_else(|err| {
            log::debug!("absorbing handle resolution failure: {err}");
            Addr::default()
        })
    }

    /// Resolves the address of `handle` via `accessor`, with the family
    /// taken from what the accessor wrote rather than a caller-known tag.
    ///
    /// Dispatch is a pattern match over the closed family set; a family
    /// outside it is [`Error::UnsupportedFamily`].
    pub fn try_from_handle_any<H, A>(accessor: A, handle: &H) -> Result<Addr>
    where
        A: StorageAccessor<H>,
    {
        let storage = Self::fill_storage(accessor, handle)?;
        match libc::c_int::from(storage.ss_family) {
            libc::AF_INET => Self::try_from_storage::<Ipv4>(reinterpret::<Ipv4>(&storage)),
            libc::AF_INET6 => Self::try_from_storage::<Ipv6>(reinterpret::<Ipv6>(&storage)),
            family => Err(Error::UnsupportedFamily(family)),
        }
    }

    /// Resolves the local address a socket handle is bound to.
    pub fn local_sockaddr<H: AsRawFd>(handle: &H) -> Result<Addr> {
        Self::try_from_handle_any(
            |h: &H, storage: &mut libc::sockaddr_storage, len: &mut libc::socklen_t| {
                let rc = unsafe {
                    libc::getsockname(
                        h.as_raw_fd(),
                        (storage as *mut libc::sockaddr_storage).cast(),
                        len,
                    )
                };
                errno_status(rc)
            },
            handle,
        )
    }

    /// Resolves the remote address a socket handle is connected to.
    pub fn peer_sockaddr<H: AsRawFd>(handle: &H) -> Result<Addr> {
        Self::try_from_handle_any(
            |h: &H, storage: &mut libc::sockaddr_storage, len: &mut libc::socklen_t| {
                let rc = unsafe {
                    libc::getpeername(
                        h.as_raw_fd(),
                        (storage as *mut libc::sockaddr_storage).cast(),
                        len,
                    )
                };
                errno_status(rc)
            },
            handle,
        )
    }

    /// Zeroes a generic storage buffer and lets the accessor fill it.
    fn fill_storage<H, A>(accessor: A, handle: &H) -> Result<libc::sockaddr_storage>
    where
        A: StorageAccessor<H>,
    {
        // All-zero is a valid sockaddr_storage value (family "unspecified").
        let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
        let mut len = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

        let status = accessor(handle, &mut storage, &mut len);
        if status != 0 {
            return Err(Error::Accessor(status));
        }
        Ok(storage)
    }
}

/// Splits endpoint text into host text and port.
///
/// Accepted forms are `"host:port"`, `"[v6]:port"`, bare `"[v6]"`, a bare
/// IPv6 literal (more than one colon, no brackets), and a bare host, the
/// last three taking the port from `default_port`.
///
/// # Examples
///
/// ```
/// use evwrap::net::resolver::split_host_port;
///
/// let (host, port) = split_host_port("[::1]:443", None).unwrap();
/// assert_eq!(host, "::1");
/// assert_eq!(port, 443);
/// ```
pub fn split_host_port(spec: &str, default_port: Option<u16>) -> Result<(String, u16)> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(Error::InvalidEndpoint("empty endpoint".to_string()));
    }

    // Bracketed IPv6, with or without a trailing port.
    if let Some(rest) = spec.strip_prefix('[') {
        let close = rest
            .find(']')
            .ok_or_else(|| Error::InvalidEndpoint(format!("missing ']' in {spec}")))?;
        let host = &rest[..close];
        return match &rest[close + 1..] {
            "" => Ok((host.to_string(), require_port(spec, default_port)?)),
            tail => match tail.strip_prefix(':') {
                Some(port) => Ok((host.to_string(), parse_port(port)?)),
                None => Err(Error::InvalidEndpoint(format!(
                    "unexpected text after ']' in {spec}"
                ))),
            },
        };
    }

    match spec.find(':') {
        // A second colon means an unbracketed IPv6 literal, which carries no
        // port of its own.
        Some(colon) if spec[colon + 1..].contains(':') => {
            Ok((spec.to_string(), require_port(spec, default_port)?))
        }
        Some(colon) => {
            let host = &spec[..colon];
            if host.is_empty() {
                return Err(Error::InvalidEndpoint(format!("missing host in {spec}")));
            }
            Ok((host.to_string(), parse_port(&spec[colon + 1..])?))
        }
        None => Ok((spec.to_string(), require_port(spec, default_port)?)),
    }
}

fn parse_port(text: &str) -> Result<u16> {
    text.parse::<u16>()
        .map_err(|_| Error::InvalidEndpoint(format!("bad port: {text}")))
}

fn require_port(spec: &str, default_port: Option<u16>) -> Result<u16> {
    default_port.ok_or_else(|| Error::InvalidEndpoint(format!("missing port in {spec}")))
}

/// Views a generic storage buffer as a concrete family's layout.
fn reinterpret<F: AddressFamily>(storage: &libc::sockaddr_storage) -> &F::Storage {
    // sockaddr_storage is sized and aligned for every supported family.
    unsafe { &*(storage as *const libc::sockaddr_storage).cast::<F::Storage>() }
}

/// Maps a -1/errno platform result to a negative errno status.
fn errno_status(rc: libc::c_int) -> libc::c_int {
    if rc == 0 {
        0
    } else {
        -io::Error::last_os_error()
            .raw_os_error()
            .unwrap_or(libc::EINVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::family;

    fn write_v4(storage: &mut libc::sockaddr_storage, host: &str, port: u16) {
        let src = family::construct::<Ipv4>(host, port).unwrap();
        unsafe {
            (storage as *mut libc::sockaddr_storage)
                .cast::<libc::sockaddr_in>()
                .write(src);
        }
    }

    #[test]
    fn test_storage_round_trip_ipv4() {
        let storage = family::construct::<Ipv4>("127.0.0.1", 8080).unwrap();
        let addr = AddrResolver::try_from_storage::<Ipv4>(&storage).unwrap();
        assert_eq!(addr, Addr::new("127.0.0.1", 8080));
    }

    #[test]
    fn test_storage_round_trip_ipv6() {
        let storage = family::construct::<Ipv6>("::1", 443).unwrap();
        let addr = AddrResolver::try_from_storage::<Ipv6>(&storage).unwrap();
        assert_eq!(addr, Addr::new("::1", 443));
    }

    #[test]
    fn test_handle_resolution_with_pinned_family() {
        let addr = AddrResolver::try_from_handle::<Ipv4, _, _>(
            |_h: &(), storage: &mut libc::sockaddr_storage, _len: &mut libc::socklen_t| {
                write_v4(storage, "10.0.0.7", 9000);
                0
            },
            &(),
        )
        .unwrap();
        assert_eq!(addr, Addr::new("10.0.0.7", 9000));
    }

    #[test]
    fn test_accessor_failure_wins_over_buffer_contents() {
        // The buffer holds a perfectly valid address; the reported status
        // must still take precedence.
        let accessor = |_h: &(), storage: &mut libc::sockaddr_storage, _len: &mut libc::socklen_t| {
            write_v4(storage, "10.0.0.7", 9000);
            -libc::EBADF
        };

        let err = AddrResolver::try_from_handle::<Ipv4, _, _>(accessor, &()).unwrap_err();
        assert!(matches!(err, Error::Accessor(status) if status == -libc::EBADF));
    }

    #[test]
    fn test_absorbing_surface_degrades_to_default() {
        let addr = AddrResolver::from_handle::<Ipv4, _, _>(
            |_h: &(),
             _storage: &mut libc::sockaddr_storage,
             _len: &mut libc::socklen_t| -libc::EBADF,
            &(),
        );
        assert!(addr.is_unresolved());
    }

    #[test]
    fn test_any_family_dispatch() {
        let v4 = AddrResolver::try_from_handle_any(
            |_h: &(), storage: &mut libc::sockaddr_storage, _len: &mut libc::socklen_t| {
                write_v4(storage, "192.0.2.1", 80);
                0
            },
            &(),
        )
        .unwrap();
        assert_eq!(v4, Addr::new("192.0.2.1", 80));

        let v6 = AddrResolver::try_from_handle_any(
            |_h: &(), storage: &mut libc::sockaddr_storage, _len: &mut libc::socklen_t| {
                let src = family::construct::<Ipv6>("2001:db8::1", 8443).unwrap();
                unsafe {
                    (storage as *mut libc::sockaddr_storage)
                        .cast::<libc::sockaddr_in6>()
                        .write(src);
                }
                0
            },
            &(),
        )
        .unwrap();
        assert_eq!(v6, Addr::new("2001:db8::1", 8443));
    }

    #[test]
    fn test_any_family_rejects_unknown_family() {
        let err = AddrResolver::try_from_handle_any(
            |_h: &(), storage: &mut libc::sockaddr_storage, _len: &mut libc::socklen_t| {
                storage.ss_family = libc::AF_UNIX as libc::sa_family_t;
                0
            },
            &(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFamily(family) if family == libc::AF_UNIX));
    }

    #[test]
    fn test_split_host_port_forms() {
        assert_eq!(
            split_host_port("127.0.0.1:8080", None).unwrap(),
            ("127.0.0.1".to_string(), 8080)
        );
        assert_eq!(
            split_host_port("[::1]:443", None).unwrap(),
            ("::1".to_string(), 443)
        );
        assert_eq!(
            split_host_port("[::1]", Some(80)).unwrap(),
            ("::1".to_string(), 80)
        );
        assert_eq!(
            split_host_port("::1", Some(80)).unwrap(),
            ("::1".to_string(), 80)
        );
        assert_eq!(
            split_host_port("localhost", Some(80)).unwrap(),
            ("localhost".to_string(), 80)
        );
    }

    #[test]
    fn test_split_host_port_rejects_malformed() {
        assert!(split_host_port("", None).is_err());
        assert!(split_host_port("[::1", None).is_err());
        assert!(split_host_port("[::1]x", None).is_err());
        assert!(split_host_port(":8080", None).is_err());
        assert!(split_host_port("host:notaport", None).is_err());
        assert!(split_host_port("host:99999", None).is_err());
        // No port anywhere and no default to fall back on.
        assert!(split_host_port("localhost", None).is_err());
    }

    #[test]
    fn test_split_then_construct() {
        let (host, port) = split_host_port("[2001:db8::2]:9999", None).unwrap();
        let storage = family::construct::<Ipv6>(&host, port).unwrap();
        let addr = AddrResolver::try_from_storage::<Ipv6>(&storage).unwrap();
        assert_eq!(addr, Addr::new("2001:db8::2", 9999));
    }
}
