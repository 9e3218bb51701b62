use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::link::resolver::NameResolver;


/// Resolves a fixed set of names, failing for everything else. Counts lookups.
pub struct StaticResolver {
    entries: HashMap<String, Ipv4Addr>,
    num_lookups: AtomicUsize,
}
impl StaticResolver {
    pub fn new(entries: &[(&str, Ipv4Addr)]) -> StaticResolver {
        StaticResolver {
            entries: entries.iter()
                .map(|(name, ip)| (name.to_string(), *ip))
                .collect(),
            num_lookups: AtomicUsize::new(0),
        }
    }

    pub fn num_lookups(&self) -> usize {
        self.num_lookups.load(Ordering::Acquire)
    }
}

#[async_trait]
impl NameResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> anyhow::Result<Ipv4Addr> {
        self.num_lookups.fetch_add(1, Ordering::AcqRel);
        self.entries.get(host)
            .copied()
            .ok_or_else(|| anyhow!("unknown host {}", host))
    }
}
