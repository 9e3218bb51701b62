use std::fmt::{Debug, Display, Formatter};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::protocol::handshake::HandshakeReply;


/// A plotting client's address: the resolved host and the port on which it receives samples.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct PeerAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}
impl PeerAddress {
    pub fn new(ip: Ipv4Addr, port: u16) -> PeerAddress {
        PeerAddress { ip, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}
impl Debug for PeerAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}]", self.ip, self.port)
    }
}
impl Display for PeerAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Decides where output goes: to the local line channel while unlinked, to the peer's UDP
///  receive port while linked.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum LinkState {
    #[default]
    Unlinked,
    Linked(PeerAddress),
}

/// A handshake after its host was resolved
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LinkEvent {
    Connect(PeerAddress),
    Disconnect(PeerAddress),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Transition {
    pub next: LinkState,
    pub reply: Option<HandshakeReply>,
}

impl LinkState {
    pub fn peer(&self) -> Option<PeerAddress> {
        match self {
            LinkState::Unlinked => None,
            LinkState::Linked(peer) => Some(*peer),
        }
    }

    pub fn is_linked(&self) -> bool {
        self.peer().is_some()
    }

    /// The link's transition function. CONNECT always (re)links to the peer it names, replacing
    ///  any previous peer. DISCONNECT unlinks without checking that it comes from the current
    ///  peer, and is acknowledged to the address it names rather than to the current peer.
    pub fn on_event(&self, event: LinkEvent) -> Transition {
        match (self, event) {
            (_, LinkEvent::Connect(peer)) => Transition {
                next: LinkState::Linked(peer),
                reply: Some(HandshakeReply::Connect(peer)),
            },
            (LinkState::Linked(_), LinkEvent::Disconnect(target)) => Transition {
                next: LinkState::Unlinked,
                reply: Some(HandshakeReply::Disconnect(target)),
            },
            (LinkState::Unlinked, LinkEvent::Disconnect(_)) => Transition {
                next: LinkState::Unlinked,
                reply: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    fn peer(n: u8, port: u16) -> PeerAddress {
        PeerAddress::new(Ipv4Addr::new(10, 0, 0, n), port)
    }

    #[rstest]
    #[case::connect_unlinked(LinkState::Unlinked, LinkEvent::Connect(peer(1, 4000)), LinkState::Linked(peer(1, 4000)), Some(HandshakeReply::Connect(peer(1, 4000))))]
    #[case::connect_same_peer(LinkState::Linked(peer(1, 4000)), LinkEvent::Connect(peer(1, 4000)), LinkState::Linked(peer(1, 4000)), Some(HandshakeReply::Connect(peer(1, 4000))))]
    #[case::connect_replaces_peer(LinkState::Linked(peer(1, 4000)), LinkEvent::Connect(peer(2, 5000)), LinkState::Linked(peer(2, 5000)), Some(HandshakeReply::Connect(peer(2, 5000))))]
    #[case::disconnect_linked(LinkState::Linked(peer(1, 4000)), LinkEvent::Disconnect(peer(1, 4000)), LinkState::Unlinked, Some(HandshakeReply::Disconnect(peer(1, 4000))))]
    #[case::disconnect_from_other_peer(LinkState::Linked(peer(1, 4000)), LinkEvent::Disconnect(peer(9, 9000)), LinkState::Unlinked, Some(HandshakeReply::Disconnect(peer(9, 9000))))]
    #[case::disconnect_unlinked(LinkState::Unlinked, LinkEvent::Disconnect(peer(1, 4000)), LinkState::Unlinked, None)]
    fn test_on_event(#[case] state: LinkState, #[case] event: LinkEvent, #[case] expected_next: LinkState, #[case] expected_reply: Option<HandshakeReply>) {
        let transition = state.on_event(event);
        assert_eq!(transition, Transition {
            next: expected_next,
            reply: expected_reply,
        });
    }

    #[test]
    fn test_peer_formatting() {
        let peer = peer(3, 47269);
        assert_eq!(format!("{:?}", peer), "[10.0.0.3:47269]");
        assert_eq!(peer.to_string(), "10.0.0.3:47269");
        assert_eq!(peer.socket_addr(), "10.0.0.3:47269".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_default_is_unlinked() {
        let state = LinkState::default();
        assert_eq!(state, LinkState::Unlinked);
        assert!(!state.is_linked());
        assert_eq!(LinkState::Linked(peer(1, 1)).peer(), Some(peer(1, 1)));
    }
}
