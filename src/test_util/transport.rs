use std::net::{Ipv4Addr, SocketAddr};

use anyhow::bail;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::transport::{DatagramChannel, LineSink};


#[derive(Debug)]
pub struct TrackingDatagramChannel {
    local_ip: Ipv4Addr,
    fail: bool,
    tracker: RwLock<Vec<(SocketAddr, String)>>,
}
impl TrackingDatagramChannel {
    pub fn new(local_ip: Ipv4Addr) -> Self {
        TrackingDatagramChannel {
            local_ip,
            fail: false,
            tracker: Default::default(),
        }
    }

    /// every send fails as if the socket were not bound
    pub fn failing(local_ip: Ipv4Addr) -> Self {
        TrackingDatagramChannel {
            fail: true,
            ..Self::new(local_ip)
        }
    }

    /// returns sent datagrams, clearing the internal buffer
    pub async fn sent(&self) -> Vec<(SocketAddr, String)> {
        let mut lock = self.tracker.write().await;
        std::mem::take(&mut *lock)
    }
}

#[async_trait]
impl DatagramChannel for TrackingDatagramChannel {
    async fn send_to(&self, to: SocketAddr, buf: &[u8]) -> anyhow::Result<()> {
        if self.fail {
            bail!("UDP listener is not bound");
        }
        self.tracker.write().await
            .push((to, String::from_utf8_lossy(buf).into_owned()));
        Ok(())
    }

    async fn local_ip_towards(&self, _peer: Ipv4Addr) -> Ipv4Addr {
        self.local_ip
    }
}

#[derive(Debug, Default)]
pub struct TrackingLineSink {
    fail: bool,
    tracker: RwLock<Vec<String>>,
}
impl TrackingLineSink {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn failing() -> Self {
        TrackingLineSink {
            fail: true,
            tracker: Default::default(),
        }
    }

    /// returns written text chunks, clearing the internal buffer
    pub async fn written(&self) -> Vec<String> {
        let mut lock = self.tracker.write().await;
        std::mem::take(&mut *lock)
    }
}

#[async_trait]
impl LineSink for TrackingLineSink {
    async fn write_text(&self, text: &str) -> anyhow::Result<()> {
        if self.fail {
            bail!("local line channel is closed");
        }
        self.tracker.write().await
            .push(text.to_string());
        Ok(())
    }
}
