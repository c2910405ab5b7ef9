use std::net::{IpAddr, Ipv4Addr};

use crate::packetgen::{Packet, PacketFlow};

fn flow() -> PacketFlow {
    PacketFlow::new("10.1.1.1", "10.2.2.2", 33000, 80)
}

fn v4(a: u8, b: u8, c: u8, d: u8) -> Option<IpAddr> {
    Some(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
}

#[test]
fn new_flow_is_empty() {
    let f = flow();
    assert!(f.is_empty());
    assert_eq!(f.len(), 0);
    assert!(f.nth_packet(0).is_none());
    assert!(f.syn_packets().is_empty());
    assert_eq!(f.src_addr(), "10.1.1.1");
    assert_eq!(f.dst_addr(), "10.2.2.2");
    assert_eq!(f.src_port(), 33000);
    assert_eq!(f.dst_port(), 80);
}

#[test]
fn handshake_sequence_and_ack_numbers_chain() {
    let mut f = flow();
    let pkts = f.generate_handshake().expect("handshake");
    assert_eq!(pkts.len(), 3);

    let (p1, p2, p3) = (&pkts[0], &pkts[1], &pkts[2]);
    let seq = |p: &Packet| p.sequence_number().expect("seq");
    let ack = |p: &Packet| p.acknowledgment_number().expect("ack");

    assert_eq!(seq(p1), 0);
    assert_eq!(ack(p1), 0);
    assert_eq!(seq(p2), 0);
    assert_eq!(ack(p2), seq(p1) + 1);
    assert_eq!(seq(p3), ack(p2));
    assert_eq!(ack(p3), seq(p2) + 1);
}

#[test]
fn handshake_flags_follow_syn_synack_ack() {
    let mut f = flow();
    let pkts = f.generate_handshake().expect("handshake");

    assert_eq!(pkts[0].flags().expect("flags").label(), "S");
    assert_eq!(pkts[1].flags().expect("flags").label(), "SA");
    assert_eq!(pkts[2].flags().expect("flags").label(), "A");
}

#[test]
fn handshake_directions_follow_initiator() {
    let mut f = flow();
    let pkts = f.generate_handshake().expect("handshake");

    let client = pkts[0].ip_layer().expect("ip");
    assert_eq!(client.src, v4(10, 1, 1, 1));
    assert_eq!(client.dst, v4(10, 2, 2, 2));
    let tcp = pkts[0].tcp_layer().expect("tcp");
    assert_eq!((tcp.src_port, tcp.dst_port), (33000, 80));

    let server = pkts[1].ip_layer().expect("ip");
    assert_eq!(server.src, v4(10, 2, 2, 2));
    assert_eq!(server.dst, v4(10, 1, 1, 1));
    let tcp = pkts[1].tcp_layer().expect("tcp");
    assert_eq!((tcp.src_port, tcp.dst_port), (80, 33000));

    let tcp = pkts[2].tcp_layer().expect("tcp");
    assert_eq!((tcp.src_port, tcp.dst_port), (33000, 80));
}

#[test]
fn syn_packets_returns_only_first_handshake_packet() {
    let mut f = flow();
    f.generate_handshake().expect("handshake");
    let syns = f.syn_packets();
    assert_eq!(syns.len(), 1);
    assert_eq!(syns[0], f.nth_packet(0).expect("first"));
}

#[test]
fn syn_ack_and_ack_filters() {
    let mut f = flow();
    f.generate_handshake().expect("handshake");
    let syn_acks = f.syn_ack_packets();
    assert_eq!(syn_acks.len(), 1);
    assert_eq!(syn_acks[0], f.nth_packet(1).expect("second"));

    let acks = f.ack_packets();
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0], f.nth_packet(2).expect("third"));
}

#[test]
fn nth_packet_is_bounds_checked() {
    let mut f = flow();
    f.generate_handshake().expect("handshake");
    for i in 0..3 {
        assert_eq!(f.nth_packet(i), Some(&f.packets()[i]));
    }
    assert!(f.nth_packet(3).is_none());
    assert!(f.nth_packet(usize::MAX).is_none());
}

#[test]
fn second_handshake_appends_another_triplet() {
    let mut f = flow();
    f.generate_handshake().expect("first");
    let second = f.generate_handshake().expect("second").to_vec();
    assert_eq!(second.len(), 3);
    assert_eq!(f.len(), 6);
    assert_eq!(f.packets()[..3], second[..]);
    assert_eq!(f.syn_packets().len(), 2);
}

#[test]
fn handshake_with_payload_appends_data_segment() {
    let mut f = flow();
    let pkts = f.generate_handshake_with_payload(b"GET / HTTP/1.1\r\n\r\n").expect("flow");
    assert_eq!(pkts.len(), 4);

    let ack = &pkts[2];
    let data = &pkts[3];
    assert_eq!(data.flags().expect("flags").label(), "PA");
    assert_eq!(data.sequence_number(), ack.sequence_number());
    assert_eq!(data.acknowledgment_number(), ack.acknowledgment_number());
    assert_eq!(data.payload(), b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(f.ack_packets().len(), 2);
}

#[test]
fn to_bytes_serializes_every_packet_in_order() {
    let mut f = flow();
    f.generate_handshake().expect("handshake");
    let all = f.to_bytes().expect("serialize");
    assert_eq!(all.len(), 3);
    for (i, bytes) in all.iter().enumerate() {
        let parsed = Packet::parse(bytes).expect("parse");
        assert_eq!(parsed.flags(), f.packets()[i].flags());
        assert_eq!(parsed.tcp_checksum(), f.packets()[i].tcp_checksum());
        assert_eq!(parsed.ip_checksum(), f.packets()[i].ip_checksum());
    }
}

#[test]
fn symbolic_endpoints_build_handshake() {
    let mut f = PacketFlow::new("client", "server", 1, 2);
    let pkts = f.generate_handshake().expect("tolerated");
    assert_eq!(pkts.len(), 3);
    assert_eq!(pkts[0].ip_layer().expect("ip").src, None);
    assert!(f.to_bytes().is_ok());
}
