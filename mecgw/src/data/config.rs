use gtpu::LengthCheck;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug, Clone)]
pub struct Config {
    // Local address, used to bind the GTP-U socket.
    pub ip_addr: IpAddr,

    // Name of the tun device facing the edge network.
    pub tun_name: String,

    // S1-U address of the eNB - the far end of every tunnel.
    pub enb_addr: Ipv4Addr,

    // UDP port for GTP-U in both directions.  Usually 2152.
    pub gtpu_port: u16,

    // Most learned UE address to TEID bindings kept at once.
    pub endpoint_capacity: usize,

    // Whether to reject uplink datagrams whose GTP length field is wrong.
    pub length_check: LengthCheck,
}
