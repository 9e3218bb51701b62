use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::link::link_state::{LinkEvent, LinkState, PeerAddress};
use crate::link::resolver::{resolve_host, NameResolver};
use crate::protocol::handshake::{ControlLine, HandshakeMessage};
use crate::transport::selector::TransportSelector;


/// The application's consumer of received lines that are not handshake commands.
pub trait InputHandler: Send + Sync {
    fn on_input(&self, line: &str);
}
impl<F> InputHandler for F
where F: Fn(&str) + Send + Sync
{
    fn on_input(&self, line: &str) {
        self(line)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InboundChannel {
    Udp(SocketAddr),
    Local,
}

/// Interprets every received line: handshake commands drive the link state, everything else
///  goes to the registered [InputHandler].
pub struct LinkController {
    link_state: Arc<Mutex<LinkState>>,
    selector: Arc<TransportSelector>,
    resolver: Arc<dyn NameResolver>,
    input_handler: RwLock<Option<Arc<dyn InputHandler>>>,
}
impl LinkController {
    pub fn new(link_state: Arc<Mutex<LinkState>>, selector: Arc<TransportSelector>, resolver: Arc<dyn NameResolver>) -> LinkController {
        LinkController {
            link_state,
            selector,
            resolver,
            input_handler: Default::default(),
        }
    }

    /// There is a single consumer: registering a handler replaces the previous one
    pub async fn set_input_handler(&self, handler: Arc<dyn InputHandler>) {
        if self.input_handler.write().await
            .replace(handler)
            .is_some()
        {
            debug!("replacing previously registered input handler");
        }
    }

    pub async fn on_line_received(&self, received: &str, channel: InboundChannel) {
        let line = received.trim();
        trace!(?channel, line, "received line");

        match ControlLine::try_decode(line) {
            None => self.forward_input(line).await,
            Some(control_line) => match control_line.to_handshake() {
                Some(handshake) => self.on_handshake(handshake).await,
                None => debug!(command = control_line.raw_command, host = control_line.host, port = control_line.port, "ignoring unknown command"),
            },
        }
    }

    async fn forward_input(&self, line: &str) {
        let handler = self.input_handler.read().await.clone();
        match handler {
            Some(handler) => handler.on_input(line),
            None => debug!(line, "no input handler registered - dropping input"),
        }
    }

    /// Name resolution happens before the link state is locked, so a slow lookup does not hold
    ///  up output. From the transition to the state update the state stays locked, and no
    ///  output is routed in between.
    async fn on_handshake(&self, handshake: HandshakeMessage) {
        let ip = match resolve_host(handshake.host(), self.resolver.as_ref()).await {
            Ok(ip) => ip,
            Err(e) => {
                warn!("ignoring handshake {:?}: {}", handshake, e);
                return;
            }
        };

        let mut link_state = self.link_state.lock().await;

        let peer = PeerAddress::new(ip, handshake.port());
        let event = match handshake {
            HandshakeMessage::Connect { .. } => LinkEvent::Connect(peer),
            HandshakeMessage::Disconnect { .. } => LinkEvent::Disconnect(peer),
        };

        let transition = link_state.on_event(event);

        if let Some(reply) = transition.reply {
            let local_ip = self.selector.local_ip_towards(reply.to().ip).await;
            self.selector.send_to_peer(reply.to(), &reply.encode(local_ip)).await;
        }

        match (*link_state, transition.next) {
            (_, LinkState::Linked(peer)) => info!(?peer, "linked (CONNECT acknowledged)"),
            (LinkState::Linked(previous), LinkState::Unlinked) => info!(?previous, ?peer, "unlinked (DISCONNECT acknowledged)"),
            (LinkState::Unlinked, LinkState::Unlinked) => debug!(?peer, "DISCONNECT while not linked - ignoring"),
        }

        *link_state = transition.next;
    }
}
