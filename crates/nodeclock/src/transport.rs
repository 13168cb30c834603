// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The datagram transport the sync engine talks through.
//!
//! On the node this is the firmware's own UDP stack, polled from the main loop. The engine only
//! needs to open one endpoint, fire a request and poll for replies, so the trait is shaped around
//! that: receive never blocks and hands out a payload borrowed from the stack's buffer.

use core::net::Ipv4Addr;

use crate::error::TransportError;

/// Identifies an open endpoint.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle(pub i32);

/// A received datagram, borrowed from the transport.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Datagram<'a> {
    /// The payload bytes.
    pub payload: &'a [u8],
    /// Sender address.
    pub source: Ipv4Addr,
    /// Sender port.
    pub source_port: u16,
}

/// A non-blocking IPv4 datagram service.
pub trait DatagramTransport {
    /// Open an endpoint bound to the local `port`.
    fn begin(&mut self, port: u16) -> Result<Handle, TransportError>;

    /// Queue `payload` for `ip:port`.
    fn send_to(
        &mut self,
        handle: Handle,
        payload: &[u8],
        ip: Ipv4Addr,
        port: u16,
    ) -> Result<(), TransportError>;

    /// Take the next pending datagram, if any. Never blocks.
    fn recv_from(&mut self, handle: Handle) -> Option<Datagram<'_>>;

    /// Close the endpoint bound to `port`.
    fn end(&mut self, port: u16);

    /// Give the stack a chance to process traffic while the caller busy-waits.
    fn poll(&mut self) {}

    /// Time server address learned from DHCP option 42, `0.0.0.0` if none.
    fn dhcp_time_server(&self) -> Ipv4Addr {
        Ipv4Addr::UNSPECIFIED
    }
}

impl<T: DatagramTransport + ?Sized> DatagramTransport for &mut T {
    fn begin(&mut self, port: u16) -> Result<Handle, TransportError> {
        (**self).begin(port)
    }

    fn send_to(
        &mut self,
        handle: Handle,
        payload: &[u8],
        ip: Ipv4Addr,
        port: u16,
    ) -> Result<(), TransportError> {
        (**self).send_to(handle, payload, ip, port)
    }

    fn recv_from(&mut self, handle: Handle) -> Option<Datagram<'_>> {
        (**self).recv_from(handle)
    }

    fn end(&mut self, port: u16) {
        (**self).end(port)
    }

    fn poll(&mut self) {
        (**self).poll()
    }

    fn dhcp_time_server(&self) -> Ipv4Addr {
        (**self).dhcp_time_server()
    }
}
