use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::LinkConfig;
use crate::transport::DatagramChannel;


/// The UDP listener. The same socket receives handshakes and commands and sends datagrams to
///  the linked peer. It becomes available when binding succeeds and stays bound from then on.
pub struct UdpChannel {
    listen_addr: SocketAddr,
    local_ip: Option<Ipv4Addr>,
    socket: RwLock<Option<Arc<UdpSocket>>>,
}
impl UdpChannel {
    pub fn new(config: &LinkConfig) -> UdpChannel {
        UdpChannel {
            listen_addr: config.listen_addr,
            local_ip: config.local_ip,
            socket: Default::default(),
        }
    }

    /// Returns whether the listener is available after the call
    pub async fn try_bind(&self) -> bool {
        let mut socket = self.socket.write().await;
        if socket.is_some() {
            return true;
        }

        match UdpSocket::bind(self.listen_addr).await {
            Ok(s) => {
                info!(addr = ?s.local_addr().ok(), "listening for UDP");
                *socket = Some(Arc::new(s));
                true
            }
            Err(e) => {
                warn!(addr = ?self.listen_addr, "UDP listen failed: {}", e);
                false
            }
        }
    }

    pub async fn socket(&self) -> Option<Arc<UdpSocket>> {
        self.socket.read().await.clone()
    }

    pub async fn is_available(&self) -> bool {
        self.socket.read().await.is_some()
    }

    /// the actual listen address, which differs from the configured address for port 0
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.socket().await
            .and_then(|s| s.local_addr().ok())
    }
}

#[async_trait]
impl DatagramChannel for UdpChannel {
    async fn send_to(&self, to: SocketAddr, buf: &[u8]) -> anyhow::Result<()> {
        let socket = match self.socket().await {
            Some(socket) => socket,
            None => bail!("UDP listener is not bound (yet)"),
        };
        socket.send_to(buf, to).await?;
        Ok(())
    }

    async fn local_ip_towards(&self, peer: Ipv4Addr) -> Ipv4Addr {
        if let Some(ip) = self.local_ip {
            return ip;
        }
        if let SocketAddr::V4(addr) = self.listen_addr {
            if !addr.ip().is_unspecified() {
                return *addr.ip();
            }
        }

        match route_local_ip(peer).await {
            Ok(ip) => ip,
            Err(e) => {
                warn!(%peer, "unable to determine local IP address, falling back to localhost: {}", e);
                Ipv4Addr::LOCALHOST
            }
        }
    }
}

/// 'Connecting' a UDP socket sends nothing, but it makes the OS pick the outgoing interface
///  for the destination.
async fn route_local_ip(peer: Ipv4Addr) -> anyhow::Result<Ipv4Addr> {
    let probe = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    probe.connect((peer, 9)).await?;
    match probe.local_addr()? {
        SocketAddr::V4(addr) => Ok(*addr.ip()),
        SocketAddr::V6(addr) => bail!("expected an IPv4 address, was {}", addr),
    }
}
