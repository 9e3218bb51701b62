use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

use crate::link::link_state::PeerAddress;
use crate::protocol::NEWLINE;


/// The command part of a control line, decoded once by exact (case sensitive) comparison.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HandshakeCommand {
    Connect,
    Disconnect,
    Unknown,
}
impl HandshakeCommand {
    pub fn decode(raw: &str) -> HandshakeCommand {
        match raw {
            "CONNECT" => HandshakeCommand::Connect,
            "DISCONNECT" => HandshakeCommand::Disconnect,
            _ => HandshakeCommand::Unknown,
        }
    }
}

/// A syntactically valid `CMD:HOST:PORT` line. The grammar is lax: the line is split at its
///  first and last `:`, so everything in between is the host.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ControlLine<'a> {
    pub raw_command: &'a str,
    pub command: HandshakeCommand,
    pub host: &'a str,
    pub port: u16,
}
impl<'a> ControlLine<'a> {
    /// Returns `None` if the (already trimmed) line is not a control line, in which case it is
    ///  application input.
    pub fn try_decode(line: &'a str) -> Option<ControlLine<'a>> {
        let first = line.find(':')?;
        let last = line.rfind(':')?;
        if first == 0 || last <= first {
            return None;
        }

        let host = &line[first + 1..last];
        if host.is_empty() {
            return None;
        }

        let port = parse_port(&line[last + 1..])?;
        let raw_command = &line[..first];

        Some(ControlLine {
            raw_command,
            command: HandshakeCommand::decode(raw_command),
            host,
            port,
        })
    }

    pub fn to_handshake(&self) -> Option<HandshakeMessage> {
        let host = self.host.to_string();
        let port = self.port;
        match self.command {
            HandshakeCommand::Connect => Some(HandshakeMessage::Connect { host, port }),
            HandshakeCommand::Disconnect => Some(HandshakeMessage::Disconnect { host, port }),
            HandshakeCommand::Unknown => None,
        }
    }
}

/// The whole field must be a decimal number. Trailing characters or inner whitespace make the
///  line application input rather than a handshake.
fn parse_port(s: &str) -> Option<u16> {
    match s.parse::<i64>() {
        Ok(port) if (1..=u16::MAX as i64).contains(&port) => Some(port as u16),
        _ => None,
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum HandshakeMessage {
    Connect { host: String, port: u16 },
    Disconnect { host: String, port: u16 },
}
impl HandshakeMessage {
    pub fn host(&self) -> &str {
        match self {
            HandshakeMessage::Connect { host, .. } => host,
            HandshakeMessage::Disconnect { host, .. } => host,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            HandshakeMessage::Connect { port, .. } => *port,
            HandshakeMessage::Disconnect { port, .. } => *port,
        }
    }
}

/// Acknowledgement of a handshake, addressed to the peer that the handshake named.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HandshakeReply {
    Connect(PeerAddress),
    Disconnect(PeerAddress),
}
impl HandshakeReply {
    pub fn to(&self) -> PeerAddress {
        match self {
            HandshakeReply::Connect(peer) => *peer,
            HandshakeReply::Disconnect(peer) => *peer,
        }
    }

    /// `local_ip` is the device's own address as seen from the peer
    pub fn encode(&self, local_ip: Ipv4Addr) -> String {
        format!("{}:{}:{}{}", self, local_ip, self.to().port, NEWLINE)
    }
}
impl Display for HandshakeReply {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HandshakeReply::Connect(_) => write!(f, "CONNECT"),
            HandshakeReply::Disconnect(_) => write!(f, "DISCONNECT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case::connect("CONNECT:192.168.0.10:47269", Some(("CONNECT", HandshakeCommand::Connect, "192.168.0.10", 47269)))]
    #[case::disconnect("DISCONNECT:host.local:1", Some(("DISCONNECT", HandshakeCommand::Disconnect, "host.local", 1)))]
    #[case::max_port("CONNECT:h:65535", Some(("CONNECT", HandshakeCommand::Connect, "h", 65535)))]
    #[case::unknown_command("HELLO:h:80", Some(("HELLO", HandshakeCommand::Unknown, "h", 80)))]
    #[case::lowercase("connect:h:80", Some(("connect", HandshakeCommand::Unknown, "h", 80)))]
    #[case::host_with_colons("CONNECT:a:b:c:80", Some(("CONNECT", HandshakeCommand::Connect, "a:b:c", 80)))]
    #[case::no_colon("hello world", None)]
    #[case::leading_colon(":host:80", None)]
    #[case::single_colon("CONNECT:80", None)]
    #[case::empty_host("CONNECT::80", None)]
    #[case::port_zero("CONNECT:h:0", None)]
    #[case::port_too_big("CONNECT:h:65536", None)]
    #[case::port_negative("CONNECT:h:-1", None)]
    #[case::port_huge("CONNECT:h:99999999999999999999", None)]
    #[case::port_not_numeric("CONNECT:h:abc", None)]
    #[case::port_empty("CONNECT:h:", None)]
    #[case::port_trailing_garbage("CONNECT:h:80abc", None)]
    #[case::port_leading_space("CONNECT:h: 80", None)]
    #[case::port_plus_sign("CONNECT:h:+80", Some(("CONNECT", HandshakeCommand::Connect, "h", 80)))]
    fn test_try_decode(#[case] line: &str, #[case] expected: Option<(&str, HandshakeCommand, &str, u16)>) {
        let expected = expected.map(|(raw_command, command, host, port)| ControlLine {
            raw_command,
            command,
            host,
            port,
        });
        assert_eq!(ControlLine::try_decode(line), expected);
    }

    #[rstest]
    #[case("CONNECT")]
    #[case("DISCONNECT")]
    #[case("X")]
    #[case("")]
    fn test_out_of_range_port_is_never_a_control_line(#[case] command: &str) {
        for port in ["0", "65536", "70000", "-80"] {
            let line = format!("{}:10.0.0.1:{}", command, port);
            assert_eq!(ControlLine::try_decode(&line), None, "{}", line);
        }
    }

    #[rstest]
    #[case::connect("CONNECT:10.0.0.1:4000", Some(HandshakeMessage::Connect { host: "10.0.0.1".to_string(), port: 4000 }))]
    #[case::disconnect("DISCONNECT:pc:4000", Some(HandshakeMessage::Disconnect { host: "pc".to_string(), port: 4000 }))]
    #[case::unknown("PING:pc:4000", None)]
    fn test_to_handshake(#[case] line: &str, #[case] expected: Option<HandshakeMessage>) {
        let control_line = ControlLine::try_decode(line).unwrap();
        assert_eq!(control_line.to_handshake(), expected);
    }

    #[rstest]
    #[case::connect(HandshakeReply::Connect(PeerAddress::new(Ipv4Addr::new(10, 0, 0, 1), 4000)), "CONNECT:192.168.1.7:4000\r\n")]
    #[case::disconnect(HandshakeReply::Disconnect(PeerAddress::new(Ipv4Addr::new(10, 0, 0, 1), 5)), "DISCONNECT:192.168.1.7:5\r\n")]
    fn test_encode_reply(#[case] reply: HandshakeReply, #[case] expected: &str) {
        assert_eq!(reply.encode(Ipv4Addr::new(192, 168, 1, 7)), expected);
    }
}
