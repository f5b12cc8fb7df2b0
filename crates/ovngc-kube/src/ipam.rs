//! In-memory view of allocated addresses
//!
//! Refreshed from the IP records before every pass and consulted by the
//! static route reconciler.

use std::collections::HashSet;
use std::sync::RwLock;

use ovngc_common::model::IpRecord;
use ovngc_engine::AddressSpace;
use tracing::debug;

/// Set of currently allocated addresses
#[derive(Debug, Default)]
pub struct Ipam {
    addresses: RwLock<HashSet<String>>,
}

impl Ipam {
    /// Create an empty address space
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known addresses with those held by `records`
    pub fn sync(&self, records: &[IpRecord]) {
        let addresses: HashSet<String> = records
            .iter()
            .flat_map(|r| r.addresses.iter())
            .flat_map(|a| a.split(','))
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();
        debug!(count = addresses.len(), "refreshed allocated addresses");
        *self.addresses.write().unwrap_or_else(|e| e.into_inner()) = addresses;
    }

    /// Number of allocated addresses
    pub fn len(&self) -> usize {
        self.addresses.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no address is allocated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AddressSpace for Ipam {
    fn contains_address(&self, address: &str) -> bool {
        self.addresses
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(address)
    }
}
