use super::EndpointTable;
use atomic_counter::{AtomicCounter, RelaxedCounter};
use slog::{Logger, info, warn};
use std::sync::Arc;
use std::time::Duration;
use stop_token::StopToken;
use stop_token::prelude::*;

pub mod downlink_counter_indices {
    pub const DL_RX_PKTS: usize = 0;
    pub const DL_RX_BYTES: usize = 1;
    pub const DL_TX_PKTS: usize = 2;
    pub const DL_DROP_TOO_SHORT: usize = 3;
    pub const DL_DROP_NOT_IPV4: usize = 4;
    pub const DL_DROP_NO_BINDING: usize = 5;
    pub const DL_DROP_OVERSIZE: usize = 6;
    pub const DL_NUM_COUNTERS: usize = 7;
}

pub mod uplink_counter_indices {
    pub const UL_RX_PKTS: usize = 0;
    pub const UL_RX_BYTES: usize = 1;
    pub const UL_TX_PKTS: usize = 2;
    pub const UL_DROP_TRUNCATED: usize = 3;
    pub const UL_DROP_BAD_HEADER: usize = 4;
    pub const UL_DROP_LENGTH_MISMATCH: usize = 5;
    pub const UL_DROP_NOT_IPV4: usize = 6;
    pub const UL_NUM_COUNTERS: usize = 7;
}

use downlink_counter_indices::*;
use uplink_counter_indices::*;

pub type DownlinkCounters = [RelaxedCounter; DL_NUM_COUNTERS];
pub type UplinkCounters = [RelaxedCounter; UL_NUM_COUNTERS];

pub fn new_downlink_counters() -> DownlinkCounters {
    std::array::from_fn(|_| RelaxedCounter::new(0))
}

pub fn new_uplink_counters() -> UplinkCounters {
    std::array::from_fn(|_| RelaxedCounter::new(0))
}

/// Log traffic deltas at info and drop deltas at warn, every five seconds,
/// staying silent while nothing changes.
pub async fn dump_stats(
    logger: Logger,
    endpoint_table: EndpointTable,
    dl: Arc<DownlinkCounters>,
    ul: Arc<UplinkCounters>,
    stop_token: StopToken,
) {
    let mut last_dl = [0usize; DL_NUM_COUNTERS];
    let mut last_ul = [0usize; UL_NUM_COUNTERS];
    const FIRST_DL_WARN_IDX: usize = DL_DROP_TOO_SHORT;
    const FIRST_UL_WARN_IDX: usize = UL_DROP_TRUNCATED;

    loop {
        if async_std::task::sleep(Duration::new(5, 0))
            .timeout_at(stop_token.clone())
            .await
            .is_err()
        {
            break;
        }

        if dl[DL_RX_PKTS].get() != last_dl[DL_RX_PKTS]
            || ul[UL_RX_PKTS].get() != last_ul[UL_RX_PKTS]
        {
            last_dl[DL_RX_PKTS] = dl[DL_RX_PKTS].get();
            last_dl[DL_RX_BYTES] = dl[DL_RX_BYTES].get();
            last_dl[DL_TX_PKTS] = dl[DL_TX_PKTS].get();
            last_ul[UL_RX_PKTS] = ul[UL_RX_PKTS].get();
            last_ul[UL_RX_BYTES] = ul[UL_RX_BYTES].get();
            last_ul[UL_TX_PKTS] = ul[UL_TX_PKTS].get();

            info!(
                &logger,
                "DL pkts={} bytes={} tx={} UL pkts={} bytes={} tx={} bindings={}",
                last_dl[DL_RX_PKTS],
                last_dl[DL_RX_BYTES],
                last_dl[DL_TX_PKTS],
                last_ul[UL_RX_PKTS],
                last_ul[UL_RX_BYTES],
                last_ul[UL_TX_PKTS],
                endpoint_table.binding_count().await
            );
        }

        let mut dl_warn_needed = false;
        for idx in FIRST_DL_WARN_IDX..DL_NUM_COUNTERS {
            if last_dl[idx] != dl[idx].get() {
                dl_warn_needed = true;
            }
            last_dl[idx] = dl[idx].get();
        }
        let mut ul_warn_needed = false;
        for idx in FIRST_UL_WARN_IDX..UL_NUM_COUNTERS {
            if last_ul[idx] != ul[idx].get() {
                ul_warn_needed = true;
            }
            last_ul[idx] = ul[idx].get();
        }

        if dl_warn_needed {
            warn!(
                &logger,
                "DL DROPS too_short={} not_ipv4={} no_binding={} oversize={}",
                last_dl[DL_DROP_TOO_SHORT],
                last_dl[DL_DROP_NOT_IPV4],
                last_dl[DL_DROP_NO_BINDING],
                last_dl[DL_DROP_OVERSIZE]
            );
        }

        if ul_warn_needed {
            warn!(
                &logger,
                "UL DROPS truncated={} bad_header={} length_mismatch={} not_ipv4={}",
                last_ul[UL_DROP_TRUNCATED],
                last_ul[UL_DROP_BAD_HEADER],
                last_ul[UL_DROP_LENGTH_MISMATCH],
                last_ul[UL_DROP_NOT_IPV4]
            );
        }
    }
}
