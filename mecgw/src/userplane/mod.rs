mod counters;
mod downlink_pipeline;
mod endpoint_table;
mod relay;
mod sinks;
mod task;
mod uplink_pipeline;

use downlink_pipeline::DownlinkPipeline;

pub use counters::{
    DownlinkCounters, UplinkCounters, downlink_counter_indices, uplink_counter_indices,
};
pub use endpoint_table::EndpointTable;
pub use relay::TunnelRelay;
pub use sinks::{InterfaceSink, PeerSink, TunSink, UdpPeerSink};
pub use task::UserplaneTask;
pub use uplink_pipeline::UplinkPipeline;

const IPV4_HEADER_LEN: usize = 20;
