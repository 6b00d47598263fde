use anyhow::Result;
use gtpu::Teid;
use mecgw_tests::framework::*;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[async_std::test]
async fn uplink_teaches_the_downlink_route() -> Result<()> {
    let (relay, interface, peer, _logger) = build_relay(test_config());
    let ue = Ipv4Addr::new(10, 0, 0, 5);
    let server = Ipv4Addr::new(192, 168, 1, 10);

    // An uplink G-PDU with TEID 42 from the UE...
    let inner = build_ipv4_udp_packet(ue, server);
    relay.process_uplink(&build_gpdu(42, &inner)).await?;

    // ...is delivered to the edge network exactly once...
    assert_eq!(interface.delivered().await, vec![inner.clone()]);

    // ...and leaves its binding behind.
    assert_eq!(relay.endpoint_table().lookup(ue).await, Some(Teid(42)));

    // The downlink reply is wrapped with the learned TEID and sent to the
    // eNB on the configured port.
    let reply = build_ipv4_udp_packet(server, ue);
    relay.process_downlink(&reply).await?;
    let sent = peer.sent().await;
    assert_eq!(sent.len(), 1);
    let (datagram, peer_addr) = &sent[0];
    assert_eq!(
        *peer_addr,
        SocketAddr::new(IpAddr::V4(ENB_ADDR), gtpu::GTPU_PORT)
    );
    assert_eq!(datagram[..8], [0x30, 0xff, 0x00, reply.len() as u8, 0, 0, 0, 42]);
    assert_eq!(&datagram[8..], &reply);
    Ok(())
}

#[async_std::test]
async fn relearning_moves_the_binding() -> Result<()> {
    let (relay, _interface, peer, _logger) = build_relay(test_config());
    let ue = Ipv4Addr::new(10, 0, 0, 5);
    let server = Ipv4Addr::new(192, 168, 1, 10);
    let inner = build_ipv4_udp_packet(ue, server);

    // The UE reappears with a new TEID, e.g. after an eNB restart.  The
    // last learned binding wins.
    relay.process_uplink(&build_gpdu(42, &inner)).await?;
    relay.process_uplink(&build_gpdu(1042, &inner)).await?;
    assert_eq!(relay.endpoint_table().lookup(ue).await, Some(Teid(1042)));

    relay
        .process_downlink(&build_ipv4_udp_packet(server, ue))
        .await?;
    let sent = peer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0[4..8], 1042u32.to_be_bytes());
    Ok(())
}

#[async_std::test]
async fn each_ue_keeps_its_own_binding() -> Result<()> {
    let (relay, _interface, peer, _logger) = build_relay(test_config());
    let first_ue = Ipv4Addr::new(10, 0, 0, 5);
    let second_ue = Ipv4Addr::new(10, 0, 0, 6);
    let server = Ipv4Addr::new(192, 168, 1, 10);

    relay
        .process_uplink(&build_gpdu(5, &build_ipv4_udp_packet(first_ue, server)))
        .await?;
    relay
        .process_uplink(&build_gpdu(6, &build_ipv4_udp_packet(second_ue, server)))
        .await?;

    relay
        .process_downlink(&build_ipv4_udp_packet(server, second_ue))
        .await?;
    relay
        .process_downlink(&build_ipv4_udp_packet(server, first_ue))
        .await?;

    let sent = peer.sent().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0[4..8], 6u32.to_be_bytes());
    assert_eq!(sent[1].0[4..8], 5u32.to_be_bytes());
    Ok(())
}
