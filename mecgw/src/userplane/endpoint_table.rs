//! endpoint_table - which TEID reaches which UE address, learned from uplink traffic

use async_std::sync::Mutex;
use gtpu::Teid;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

struct Binding {
    teid: Teid,
    stamp: u64,
}

struct Table {
    bindings: HashMap<Ipv4Addr, Binding>,
    capacity: usize,
    // Monotonic write counter used as the eviction stamp.
    clock: u64,
}

// Shared by the two pipelines: uplink writes, downlink reads.
#[derive(Clone)]
pub struct EndpointTable(Arc<Mutex<Table>>);

impl EndpointTable {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1);
        Self(Arc::new(Mutex::new(Table {
            bindings: HashMap::new(),
            capacity,
            clock: 0,
        })))
    }

    /// Record the TEID for a UE address, displacing any previous binding.
    ///
    /// The last learned binding wins.  When the table is over capacity, the
    /// binding refreshed longest ago is evicted.
    pub async fn update(&self, addr: Ipv4Addr, teid: Teid) {
        let mut table = self.0.lock().await;
        table.clock += 1;
        let stamp = table.clock;
        table.bindings.insert(addr, Binding { teid, stamp });

        if table.bindings.len() > table.capacity {
            let oldest = table
                .bindings
                .iter()
                .min_by_key(|(_, binding)| binding.stamp)
                .map(|(addr, _)| *addr);
            if let Some(oldest) = oldest {
                table.bindings.remove(&oldest);
            }
        }
    }

    /// The learned TEID for a UE address.  The reserved zero TEID never
    /// routes, so it reads back as no binding.
    pub async fn lookup(&self, addr: Ipv4Addr) -> Option<Teid> {
        self.0
            .lock()
            .await
            .bindings
            .get(&addr)
            .map(|binding| binding.teid)
            .filter(|teid| !teid.is_reserved())
    }

    pub async fn binding_count(&self) -> usize {
        self.0.lock().await.bindings.len()
    }
}
