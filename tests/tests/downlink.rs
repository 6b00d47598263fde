use anyhow::Result;
use atomic_counter::AtomicCounter;
use mecgw::downlink_counter_indices::*;
use mecgw_tests::framework::*;
use std::net::Ipv4Addr;

#[async_std::test]
async fn unknown_destination_is_dropped() -> Result<()> {
    let (relay, _interface, peer, _logger) = build_relay(test_config());
    let ue = Ipv4Addr::new(10, 0, 0, 5);
    let server = Ipv4Addr::new(192, 168, 1, 10);

    // Nothing has been learned for this UE, so nothing goes on the wire.
    relay
        .process_downlink(&build_ipv4_udp_packet(server, ue))
        .await?;
    assert!(peer.sent().await.is_empty());
    assert_eq!(relay.downlink_counters()[DL_DROP_NO_BINDING].get(), 1);
    Ok(())
}

#[async_std::test]
async fn reserved_teid_never_routes() -> Result<()> {
    let (relay, interface, peer, _logger) = build_relay(test_config());
    let ue = Ipv4Addr::new(10, 0, 0, 5);
    let server = Ipv4Addr::new(192, 168, 1, 10);

    // A G-PDU carrying the reserved TEID 0 still has its inner packet
    // delivered...
    let inner = build_ipv4_udp_packet(ue, server);
    relay.process_uplink(&build_gpdu(0, &inner)).await?;
    assert_eq!(interface.delivered().await.len(), 1);

    // ...but 0 is no binding, so the reply is dropped.
    relay
        .process_downlink(&build_ipv4_udp_packet(server, ue))
        .await?;
    assert!(peer.sent().await.is_empty());
    assert_eq!(relay.downlink_counters()[DL_DROP_NO_BINDING].get(), 1);
    Ok(())
}

#[async_std::test]
async fn short_and_non_ipv4_packets_are_dropped() -> Result<()> {
    let (relay, _interface, peer, _logger) = build_relay(test_config());

    relay.process_downlink(&[]).await?;
    relay.process_downlink(&[0x45; 10]).await?;
    assert_eq!(relay.downlink_counters()[DL_DROP_TOO_SHORT].get(), 2);

    // An IPv6 version nibble.
    relay.process_downlink(&[0x60; 40]).await?;
    assert_eq!(relay.downlink_counters()[DL_DROP_NOT_IPV4].get(), 1);

    assert!(peer.sent().await.is_empty());
    Ok(())
}

#[async_std::test]
async fn oversize_packet_is_dropped() -> Result<()> {
    let (relay, _interface, peer, _logger) = build_relay(test_config());
    let ue = Ipv4Addr::new(10, 0, 0, 5);
    let server = Ipv4Addr::new(192, 168, 1, 10);

    relay
        .process_uplink(&build_gpdu(42, &build_ipv4_udp_packet(ue, server)))
        .await?;

    // Larger than the GTP length field can describe.
    let mut oversize = build_ipv4_udp_packet(server, ue);
    oversize.resize(gtpu::MAX_PAYLOAD + 1, 0);
    relay.process_downlink(&oversize).await?;

    assert!(peer.sent().await.is_empty());
    assert_eq!(relay.downlink_counters()[DL_DROP_OVERSIZE].get(), 1);
    Ok(())
}

#[async_std::test]
async fn exactly_max_payload_is_sent() -> Result<()> {
    let (relay, _interface, peer, _logger) = build_relay(test_config());
    let ue = Ipv4Addr::new(10, 0, 0, 5);
    let server = Ipv4Addr::new(192, 168, 1, 10);

    relay
        .process_uplink(&build_gpdu(42, &build_ipv4_udp_packet(ue, server)))
        .await?;

    // The largest packet the length field can describe still goes out.
    let mut reply = build_ipv4_udp_packet(server, ue);
    reply.resize(gtpu::MAX_PAYLOAD, 0);
    relay.process_downlink(&reply).await?;

    let sent = peer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.len(), gtpu::HEADER_LEN + gtpu::MAX_PAYLOAD);
    assert_eq!(sent[0].0[2..4], (gtpu::MAX_PAYLOAD as u16).to_be_bytes());
    assert_eq!(relay.downlink_counters()[DL_DROP_OVERSIZE].get(), 0);
    Ok(())
}

#[async_std::test]
async fn ip_options_leave_the_destination_in_place() -> Result<()> {
    let (relay, _interface, peer, _logger) = build_relay(test_config());
    let ue = Ipv4Addr::new(10, 0, 0, 5);
    let server = Ipv4Addr::new(192, 168, 1, 10);

    relay
        .process_uplink(&build_gpdu(42, &build_ipv4_udp_packet(ue, server)))
        .await?;

    // A reply whose IP header carries four bytes of options.  The
    // destination field sits before the options, so the route is unchanged.
    let mut reply = build_ipv4_udp_packet(server, ue);
    reply[0] = 0x46; // header length 6 words
    reply[3] += 4; // total length
    reply.splice(20..20, [0x01, 0x01, 0x01, 0x00]); // three NOPs and an EOL

    relay.process_downlink(&reply).await?;
    let sent = peer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0[4..8], 42u32.to_be_bytes());
    assert_eq!(&sent[0].0[8..], &reply);
    Ok(())
}
