// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Host implementations of the transport and uptime traits, for running the sync engine on a
//! workstation against a real server.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time;

use log::debug;

use crate::error::TransportError;
use crate::platform::Uptime;
use crate::transport::{Datagram, DatagramTransport, Handle};

// Larger than any SNTP reply so oversized datagrams are seen whole and rejected on size.
const RECV_BUFFER_SIZE: usize = 512;

/// [`DatagramTransport`] over a non-blocking [`UdpSocket`].
pub struct UdpTransport {
    socket: Option<UdpSocket>,
    local_port: Option<u16>,
    dhcp_time_server: Ipv4Addr,
    buf: [u8; RECV_BUFFER_SIZE],
}

impl UdpTransport {
    /// Bind the port the engine asks for (123, which needs privileges on most systems).
    pub fn new() -> Self {
        UdpTransport {
            socket: None,
            local_port: None,
            dhcp_time_server: Ipv4Addr::UNSPECIFIED,
            buf: [0; RECV_BUFFER_SIZE],
        }
    }

    /// Bind `port` instead of the one the engine asks for. `0` picks an ephemeral port.
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = Some(port);
        self
    }

    /// Pretend DHCP advertised `server` as the time server.
    pub fn with_dhcp_time_server(mut self, server: Ipv4Addr) -> Self {
        self.dhcp_time_server = server;
        self
    }

    /// Local address of the open socket.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DatagramTransport for UdpTransport {
    fn begin(&mut self, port: u16) -> Result<Handle, TransportError> {
        let port = self.local_port.unwrap_or(port);
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))
            .map_err(|e| {
                debug!("bind to port {} failed: {}", port, e);
                TransportError::Bind { port }
            })?;
        socket.set_nonblocking(true)?;
        let bound = socket.local_addr()?.port();
        debug!("{:?}", socket.local_addr());
        self.socket = Some(socket);
        Ok(Handle(i32::from(bound)))
    }

    fn send_to(
        &mut self,
        _handle: Handle,
        payload: &[u8],
        ip: Ipv4Addr,
        port: u16,
    ) -> Result<(), TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotOpen)?;
        let sent = socket.send_to(payload, SocketAddrV4::new(ip, port))?;
        if sent != payload.len() {
            return Err(TransportError::Send);
        }
        Ok(())
    }

    fn recv_from(&mut self, _handle: Handle) -> Option<Datagram<'_>> {
        let socket = self.socket.as_ref()?;
        match socket.recv_from(&mut self.buf) {
            Ok((len, SocketAddr::V4(source))) => Some(Datagram {
                payload: &self.buf[..len],
                source: *source.ip(),
                source_port: source.port(),
            }),
            Ok((_, SocketAddr::V6(source))) => {
                debug!("ignoring datagram from {}", source);
                None
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => None,
            Err(e) => {
                debug!("recv failed: {}", e);
                None
            }
        }
    }

    fn end(&mut self, _port: u16) {
        self.socket = None;
    }

    fn dhcp_time_server(&self) -> Ipv4Addr {
        self.dhcp_time_server
    }
}

/// [`Uptime`] measured from when the value was created.
#[derive(Clone, Copy, Debug)]
pub struct StdUptime {
    boot: time::Instant,
}

impl StdUptime {
    /// Start counting from now.
    pub fn new() -> Self {
        StdUptime {
            boot: time::Instant::now(),
        }
    }
}

impl Default for StdUptime {
    fn default() -> Self {
        Self::new()
    }
}

impl Uptime for StdUptime {
    fn millis(&self) -> u32 {
        // Truncation matches a 32-bit millisecond counter wrapping.
        self.boot.elapsed().as_millis() as u32
    }
}
