//! Low-level async netlink transport.

use std::future::Future;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicU32, Ordering};

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use super::error::{Result, TransportError};

/// Default receive buffer size.
///
/// The kernel sizes dump datagrams to the largest buffer the reader has
/// offered, so a dump never outgrows it. A larger datagram (an oversized
/// event) is reported as [`TransportError::Truncated`] rather than cut short.
pub const DEFAULT_RECV_BUFFER: usize = 8192;

/// A datagram channel to the kernel's Generic Netlink bus.
///
/// Implemented by [`NetlinkSocket`]; the protocol layers above are generic
/// over it so they can also run over an in-memory transport.
pub trait Transport: Send + Sync {
    /// Send one framed message (or a concatenation of several).
    fn send(&self, msg: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive the next datagram.
    fn recv_msg(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Join a multicast group.
    fn add_membership(&mut self, group: u32) -> Result<()>;

    /// Leave a multicast group.
    fn drop_membership(&mut self, group: u32) -> Result<()>;

    /// Allocate the next sequence number.
    fn next_seq(&self) -> u32;

    /// Local port ID.
    fn pid(&self) -> u32;
}

/// Async `NETLINK_GENERIC` socket.
///
/// Owns the file descriptor; dropping the socket closes it.
pub struct NetlinkSocket {
    /// The underlying async file descriptor.
    fd: AsyncFd<Socket>,
    /// Sequence number counter.
    seq: AtomicU32,
    /// Local port ID (assigned by kernel).
    pid: u32,
    /// Capacity of each receive buffer.
    recv_buffer: usize,
}

impl NetlinkSocket {
    /// Open a Generic Netlink socket bound to a kernel-assigned port.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Result<Self> {
        let mut socket = Socket::new(protocols::NETLINK_GENERIC)
            .map_err(TransportError::SocketCreation)?;
        socket
            .set_non_blocking(true)
            .map_err(TransportError::SocketCreation)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr).map_err(TransportError::Bind)?;
        socket
            .get_address(&mut addr)
            .map_err(TransportError::Bind)?;
        let pid = addr.port_number();

        // Extended ACK only improves error detail
        socket.set_ext_ack(true).ok();

        let fd = AsyncFd::new(socket).map_err(TransportError::SocketCreation)?;
        tracing::debug!(pid, "opened generic netlink socket");

        Ok(Self {
            fd,
            seq: AtomicU32::new(1),
            pid,
            recv_buffer: DEFAULT_RECV_BUFFER,
        })
    }

    /// Set the receive buffer size.
    pub fn with_recv_buffer(mut self, size: usize) -> Self {
        self.recv_buffer = size;
        self
    }

    /// Receive buffer size.
    pub fn recv_buffer(&self) -> usize {
        self.recv_buffer
    }
}

/// Fail if a datagram of `len` bytes did not fit a `capacity`-byte buffer.
///
/// `len` is what `recv` reports under `MSG_TRUNC`: the datagram's real size.
fn check_received(len: usize, capacity: usize) -> Result<usize> {
    if len > capacity {
        return Err(TransportError::Truncated { len, capacity }.into());
    }
    Ok(len)
}

impl Transport for NetlinkSocket {
    async fn send(&self, msg: &[u8]) -> Result<()> {
        loop {
            let mut guard = self
                .fd
                .ready(Interest::WRITABLE)
                .await
                .map_err(TransportError::Send)?;

            match guard.try_io(|inner| inner.get_ref().send(msg, 0)) {
                Ok(result) => {
                    let n = result.map_err(TransportError::Send)?;
                    tracing::trace!(len = n, "sent netlink datagram");
                    return Ok(());
                }
                Err(_would_block) => continue,
            }
        }
    }

    async fn recv_msg(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(self.recv_buffer);

        loop {
            let mut guard = self
                .fd
                .ready(Interest::READABLE)
                .await
                .map_err(TransportError::Receive)?;

            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, libc::MSG_TRUNC)) {
                Ok(result) => {
                    let n = result.map_err(TransportError::Receive)?;
                    check_received(n, buf.capacity())?;
                    tracing::trace!(len = n, "received netlink datagram");
                    // recv advanced buf, so buf[..] is exactly the datagram
                    return Ok(buf.to_vec());
                }
                Err(_would_block) => continue,
            }
        }
    }

    fn add_membership(&mut self, group: u32) -> Result<()> {
        self.fd
            .get_mut()
            .add_membership(group)
            .map_err(|source| TransportError::Membership { group, source })?;
        tracing::debug!(group, "joined multicast group");
        Ok(())
    }

    fn drop_membership(&mut self, group: u32) -> Result<()> {
        self.fd
            .get_mut()
            .drop_membership(group)
            .map_err(|source| TransportError::Membership { group, source })?;
        tracing::debug!(group, "left multicast group");
        Ok(())
    }

    fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn pid(&self) -> u32 {
        self.pid
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.get_ref().as_raw_fd()
    }
}

impl std::fmt::Debug for NetlinkSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetlinkSocket")
            .field("fd", &self.as_raw_fd())
            .field("pid", &self.pid)
            .field("recv_buffer", &self.recv_buffer)
            .finish()
    }
}
