mod data;
mod mecgw;
mod shutdown_handle;
mod userplane;

pub use data::Config;
pub use mecgw::MecGw;
pub use shutdown_handle::ShutdownHandle;
pub use userplane::{
    DownlinkCounters, EndpointTable, InterfaceSink, PeerSink, TunSink, TunnelRelay, UdpPeerSink,
    UplinkCounters, UplinkPipeline, downlink_counter_indices, uplink_counter_indices,
};
