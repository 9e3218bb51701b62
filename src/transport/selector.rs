use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{trace, warn};

use crate::link::link_state::{LinkState, PeerAddress};
use crate::transport::{DatagramChannel, LineSink};


/// Routes output according to the current link state. Sending is best effort: failures are
///  logged and the text is dropped.
pub struct TransportSelector {
    link_state: Arc<Mutex<LinkState>>,
    datagrams: Arc<dyn DatagramChannel>,
    local: Arc<dyn LineSink>,
}
impl TransportSelector {
    pub fn new(link_state: Arc<Mutex<LinkState>>, datagrams: Arc<dyn DatagramChannel>, local: Arc<dyn LineSink>) -> TransportSelector {
        TransportSelector {
            link_state,
            datagrams,
            local,
        }
    }

    /// The link state is held until the write completes, so a handshake can not redirect
    ///  output halfway through a send.
    pub async fn send(&self, text: &str) {
        let link_state = self.link_state.lock().await;
        match *link_state {
            LinkState::Linked(peer) => self.send_to_peer(peer, text).await,
            LinkState::Unlinked => self.send_local(text).await,
        }
    }

    pub async fn send_to_peer(&self, peer: PeerAddress, text: &str) {
        trace!(?peer, text, "sending datagram");
        if let Err(e) = self.datagrams.send_to(peer.socket_addr(), text.as_bytes()).await {
            warn!(?peer, "dropping output: {}", e);
        }
    }

    async fn send_local(&self, text: &str) {
        if let Err(e) = self.local.write_text(text).await {
            warn!("dropping local output: {}", e);
        }
    }

    pub async fn local_ip_towards(&self, peer: Ipv4Addr) -> Ipv4Addr {
        self.datagrams.local_ip_towards(peer).await
    }
}
