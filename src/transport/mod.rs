//! The two channels that carry output: UDP datagrams to a linked peer, and a local line
//!  channel (serial console, stdout) while unlinked. [selector::TransportSelector] picks
//!  between them per send.

pub mod local;
pub mod selector;
pub mod udp;

use std::net::{Ipv4Addr, SocketAddr};

use async_trait::async_trait;


#[async_trait]
pub trait DatagramChannel: Sync + Send {
    async fn send_to(&self, to: SocketAddr, buf: &[u8]) -> anyhow::Result<()>;

    /// This node's IP address as the given peer sees it, for handshake acknowledgements
    async fn local_ip_towards(&self, peer: Ipv4Addr) -> Ipv4Addr;
}

#[async_trait]
pub trait LineSink: Sync + Send {
    /// Writes text as it is, i.e. without appending a line separator
    async fn write_text(&self, text: &str) -> anyhow::Result<()>;
}
