use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, SocketAddr};

use anyhow::bail;
use async_trait::async_trait;
use tracing::trace;


/// Name resolution capability used for hosts that are not IPv4 literals. Implementations own
///  retries and timeouts, if any.
#[async_trait]
pub trait NameResolver: Sync + Send {
    async fn lookup(&self, host: &str) -> anyhow::Result<Ipv4Addr>;
}

/// Resolves names through the system resolver, picking the first IPv4 address
pub struct DnsResolver;

#[async_trait]
impl NameResolver for DnsResolver {
    async fn lookup(&self, host: &str) -> anyhow::Result<Ipv4Addr> {
        for addr in tokio::net::lookup_host((host, 0)).await? {
            if let SocketAddr::V4(addr) = addr {
                trace!(host, ip = %addr.ip(), "resolved host");
                return Ok(*addr.ip());
            }
        }
        bail!("no IPv4 address for {}", host)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolutionError {
    pub host: String,
    pub reason: String,
}
impl Display for ResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unable to resolve host {:?}: {}", self.host, self.reason)
    }
}
impl Error for ResolutionError {}

/// IPv4 literals are used as they are, everything else goes to the resolver. The unspecified
///  address is never a valid peer, regardless of where it came from.
pub async fn resolve_host(host: &str, resolver: &dyn NameResolver) -> Result<Ipv4Addr, ResolutionError> {
    let ip = match host.parse::<Ipv4Addr>() {
        Ok(ip) => ip,
        Err(_) => resolver.lookup(host).await
            .map_err(|e| ResolutionError {
                host: host.to_string(),
                reason: e.to_string(),
            })?,
    };

    if ip.is_unspecified() {
        return Err(ResolutionError {
            host: host.to_string(),
            reason: "resolved to the unspecified address".to_string(),
        });
    }
    Ok(ip)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use crate::test_util::resolver::StaticResolver;
    use super::*;

    #[rstest]
    #[case::literal("192.168.0.20", Some(Ipv4Addr::new(192, 168, 0, 20)), 0)]
    #[case::name("plotter.local", Some(Ipv4Addr::new(10, 0, 0, 7)), 1)]
    #[case::unknown_name("not-a-real-host", None, 1)]
    #[case::unspecified_literal("0.0.0.0", None, 0)]
    #[case::name_resolving_to_unspecified("nowhere", None, 1)]
    #[case::ipv6_literal_is_a_name("::1", None, 1)]
    #[tokio::test]
    async fn test_resolve_host(#[case] host: &str, #[case] expected: Option<Ipv4Addr>, #[case] expected_lookups: usize) {
        let resolver = StaticResolver::new(&[
            ("plotter.local", Ipv4Addr::new(10, 0, 0, 7)),
            ("nowhere", Ipv4Addr::UNSPECIFIED),
        ]);

        let actual = resolve_host(host, &resolver).await;
        match expected {
            Some(ip) => assert_eq!(actual, Ok(ip)),
            None => assert_eq!(actual.unwrap_err().host, host),
        }
        assert_eq!(resolver.num_lookups(), expected_lookups);
    }

    #[test]
    fn test_resolution_error_display() {
        let e = ResolutionError {
            host: "x".to_string(),
            reason: "no such host".to_string(),
        };
        assert_eq!(e.to_string(), "unable to resolve host \"x\": no such host");
    }

    #[tokio::test]
    async fn test_dns_resolver_literal() {
        let ip = DnsResolver.lookup("127.0.0.1").await.unwrap();
        assert_eq!(ip, Ipv4Addr::LOCALHOST);
    }
}
