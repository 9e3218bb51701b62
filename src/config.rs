use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use anyhow::bail;

use crate::protocol::sample_format::DEFAULT_SCALAR_TIMESTAMP_THRESHOLD_MS;


/// UDP port on which plotting clients expect devices to listen for handshakes
pub const DEFAULT_LISTEN_PORT: u16 = 47268;

#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Address of the UDP listener that receives handshakes and commands. Peers are IPv4 only,
    ///  so this must be an IPv4 address.
    pub listen_addr: SocketAddr,

    /// If binding the listener fails (e.g. because the network is not up yet), binding is
    ///  retried with this interval until it succeeds.
    pub bind_retry_interval: Duration,

    /// The address sent to peers in handshake acknowledgements. If this is `None`, it is
    ///  determined per peer from the routing table.
    pub local_ip: Option<Ipv4Addr>,

    /// Size of the receive buffer; longer datagrams are truncated
    pub max_datagram_size: usize,

    pub scalar_timestamp_threshold_ms: u32,

    /// Number of received local lines that are buffered before the local reader waits
    pub local_line_capacity: usize,
}

impl LinkConfig {
    pub fn new(listen_addr: SocketAddr) -> LinkConfig {
        LinkConfig {
            listen_addr,
            bind_retry_interval: Duration::from_millis(2000),
            local_ip: None,
            max_datagram_size: 1500,
            scalar_timestamp_threshold_ms: DEFAULT_SCALAR_TIMESTAMP_THRESHOLD_MS,
            local_line_capacity: 64,
        }
    }

    /// listening on all interfaces
    pub fn for_port(port: u16) -> LinkConfig {
        Self::new(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.listen_addr.is_ipv4() {
            bail!("listen address {} is not an IPv4 address", self.listen_addr);
        }
        if self.bind_retry_interval.is_zero() {
            bail!("bind retry interval must not be zero");
        }
        if self.max_datagram_size == 0 {
            bail!("max datagram size must not be zero");
        }
        if self.local_line_capacity == 0 {
            bail!("local line capacity must not be zero");
        }
        if let Some(ip) = self.local_ip {
            if ip.is_unspecified() {
                bail!("local IP must not be the unspecified address");
            }
        }
        Ok(())
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::for_port(DEFAULT_LISTEN_PORT)
    }
}
