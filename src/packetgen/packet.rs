//! 单个合成 IPv4/TCP 报文
//!
//! 先 `add_ip_layer` 再 `add_tcp_layer`，修改字段后调用 `serialize` 得到
//! 不含以太网头的字节序列。校验和与长度只在序列化后有效。

use std::net::{IpAddr, Ipv4Addr};

use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::{self, Ipv4Packet, MutableIpv4Packet};
use pnet::packet::tcp::{self, MutableTcpPacket, TcpPacket};
use pnet::util::MacAddr;
use tracing::{debug, trace, warn};

use super::error::{Layer, PacketError, Result};
use super::layers::{IpLayer, TcpFlags, TcpLayer};

pub const ETHERNET_HEADER_LEN: usize = 14;
pub const IPV4_HEADER_LEN: usize = 20;
pub const TCP_HEADER_LEN: usize = 20;

/// 链路层占位地址，序列化后随以太网头一起被剥掉
const PLACEHOLDER_SRC_MAC: MacAddr = MacAddr(0xFF, 0xAA, 0xFA, 0xAA, 0xFF, 0xAA);
const PLACEHOLDER_DST_MAC: MacAddr = MacAddr(0xBD, 0xBD, 0xBD, 0xBD, 0xBD, 0xBD);

/// 地址字面量的解析策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressMode {
    /// 无法解析的字面量只记 warn，对应字段留空（序列化为 0.0.0.0）。
    /// 测试夹具常用符号名代替真实地址。
    #[default]
    Permissive,
    /// 无法解析的字面量返回 [`PacketError::InvalidAddress`]
    Strict,
}

/// 合成报文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    mode: AddressMode,
    ip: Option<IpLayer>,
    tcp: Option<TcpLayer>,
    payload: Vec<u8>,
}

impl Packet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address_mode(mode: AddressMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn address_mode(&self) -> AddressMode {
        self.mode
    }

    fn parse_address(&self, literal: &str) -> Result<Option<IpAddr>> {
        match literal.parse::<IpAddr>() {
            Ok(addr) => Ok(Some(addr)),
            Err(_) => match self.mode {
                AddressMode::Strict => Err(PacketError::InvalidAddress(literal.to_string())),
                AddressMode::Permissive => {
                    warn!(literal, "non-ip target, leaving address unset");
                    Ok(None)
                }
            },
        }
    }

    /// 添加 IP 层（version 4, TTL 64, protocol TCP）。
    ///
    /// 已存在时返回 `LayerAlreadySet`，原有 IP 层保持不变。
    pub fn add_ip_layer(&mut self, src: &str, dst: &str) -> Result<()> {
        if self.ip.is_some() {
            return Err(PacketError::LayerAlreadySet(Layer::Ip));
        }
        let src = self.parse_address(src)?;
        let dst = self.parse_address(dst)?;
        trace!(?src, ?dst, "ip layer added");
        self.ip = Some(IpLayer::new(src, dst));
        Ok(())
    }

    /// 添加 TCP 层，字段取默认值（window 1505, seq 11050, ack 0，标志全清）。
    ///
    /// 伪首部校验和在序列化时绑定到 IP 层。
    pub fn add_tcp_layer(&mut self, src_port: u16, dst_port: u16) -> Result<()> {
        if self.tcp.is_some() {
            return Err(PacketError::LayerAlreadySet(Layer::Tcp));
        }
        trace!(src_port, dst_port, "tcp layer added");
        self.tcp = Some(TcpLayer::new(src_port, dst_port));
        Ok(())
    }

    fn tcp_mut(&mut self) -> Result<&mut TcpLayer> {
        self.tcp.as_mut().ok_or(PacketError::MissingLayer(Layer::Tcp))
    }

    pub fn set_sequence_number(&mut self, seq: u32) -> Result<()> {
        self.tcp_mut()?.sequence = seq;
        Ok(())
    }

    pub fn set_acknowledgment_number(&mut self, ack: u32) -> Result<()> {
        self.tcp_mut()?.acknowledgment = ack;
        Ok(())
    }

    pub fn set_window(&mut self, window: u16) -> Result<()> {
        self.tcp_mut()?.window = window;
        Ok(())
    }

    // SYN/ACK/FIN 三个标志整体覆盖，不是增量修改。
    fn set_handshake_flags(&mut self, syn: bool, ack: bool, fin: bool) -> Result<()> {
        let flags = &mut self.tcp_mut()?.flags;
        flags.syn = syn;
        flags.ack = ack;
        flags.fin = fin;
        Ok(())
    }

    pub fn set_syn(&mut self) -> Result<()> {
        self.set_handshake_flags(true, false, false)
    }

    pub fn set_syn_ack(&mut self) -> Result<()> {
        self.set_handshake_flags(true, true, false)
    }

    pub fn set_ack(&mut self) -> Result<()> {
        self.set_handshake_flags(false, true, false)
    }

    /// 数据段：ACK + PSH
    pub fn set_psh_ack(&mut self) -> Result<()> {
        self.set_handshake_flags(false, true, false)?;
        self.tcp_mut()?.flags.psh = true;
        Ok(())
    }

    /// 设置 TCP 载荷，序列化时追加在 TCP 头之后
    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) -> Result<()> {
        self.tcp_mut()?;
        self.payload = payload.into();
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn syn(&self) -> bool {
        self.tcp.as_ref().is_some_and(|t| t.flags.syn)
    }

    pub fn ack(&self) -> bool {
        self.tcp.as_ref().is_some_and(|t| t.flags.ack)
    }

    pub fn fin(&self) -> bool {
        self.tcp.as_ref().is_some_and(|t| t.flags.fin)
    }

    pub fn flags(&self) -> Option<TcpFlags> {
        self.tcp.as_ref().map(|t| t.flags)
    }

    pub fn sequence_number(&self) -> Option<u32> {
        self.tcp.as_ref().map(|t| t.sequence)
    }

    pub fn acknowledgment_number(&self) -> Option<u32> {
        self.tcp.as_ref().map(|t| t.acknowledgment)
    }

    /// 最近一次序列化算出的 IP 头校验和
    pub fn ip_checksum(&self) -> Option<u16> {
        self.ip.as_ref().map(|ip| ip.checksum)
    }

    /// 最近一次序列化算出的 TCP 校验和
    pub fn tcp_checksum(&self) -> Option<u16> {
        self.tcp.as_ref().map(|t| t.checksum)
    }

    pub fn ip_layer(&self) -> Option<IpLayer> {
        self.ip.clone()
    }

    pub fn tcp_layer(&self) -> Option<TcpLayer> {
        self.tcp.clone()
    }

    /// 序列化为 IPv4 + TCP (+ payload) 字节。
    ///
    /// 按 以太网 -> IPv4 -> TCP 顺序写入并修正长度、计算校验和，最后去掉以太网头。
    /// 计算出的长度和校验和会回写到层记录中。
    pub fn serialize(&mut self) -> Result<Vec<u8>> {
        let ip = self.ip.as_ref().ok_or(PacketError::MissingLayer(Layer::Ip))?;
        let tcp = self.tcp.as_ref().ok_or(PacketError::MissingLayer(Layer::Tcp))?;
        let src = ipv4_or_unspecified(ip.src)?;
        let dst = ipv4_or_unspecified(ip.dst)?;

        let ip_len = IPV4_HEADER_LEN + TCP_HEADER_LEN + self.payload.len();
        let total_length = u16::try_from(ip_len)
            .map_err(|_| PacketError::Encode("payload exceeds IPv4 total length"))?;
        let mut buf = vec![0u8; ETHERNET_HEADER_LEN + ip_len];

        {
            let mut eth = MutableEthernetPacket::new(&mut buf[..])
                .ok_or(PacketError::Encode("buffer too small for ethernet header"))?;
            eth.set_source(PLACEHOLDER_SRC_MAC);
            eth.set_destination(PLACEHOLDER_DST_MAC);
            eth.set_ethertype(EtherTypes::Ipv4);
        }

        let ip_checksum = {
            let mut ip_pkt = MutableIpv4Packet::new(&mut buf[ETHERNET_HEADER_LEN..])
                .ok_or(PacketError::Encode("buffer too small for IPv4 header"))?;
            ip_pkt.set_version(ip.version);
            ip_pkt.set_header_length((IPV4_HEADER_LEN / 4) as u8);
            ip_pkt.set_total_length(total_length);
            ip_pkt.set_ttl(ip.ttl);
            ip_pkt.set_next_level_protocol(IpNextHeaderProtocol::new(ip.protocol));
            ip_pkt.set_source(src);
            ip_pkt.set_destination(dst);
            let checksum = ipv4::checksum(&ip_pkt.to_immutable());
            ip_pkt.set_checksum(checksum);
            checksum
        };

        let tcp_checksum = {
            let tcp_start = ETHERNET_HEADER_LEN + IPV4_HEADER_LEN;
            let mut tcp_pkt = MutableTcpPacket::new(&mut buf[tcp_start..])
                .ok_or(PacketError::Encode("buffer too small for TCP header"))?;
            tcp_pkt.set_source(tcp.src_port);
            tcp_pkt.set_destination(tcp.dst_port);
            tcp_pkt.set_sequence(tcp.sequence);
            tcp_pkt.set_acknowledgement(tcp.acknowledgment);
            tcp_pkt.set_data_offset((TCP_HEADER_LEN / 4) as u8);
            tcp_pkt.set_flags(tcp.flags.bits().into());
            tcp_pkt.set_window(tcp.window);
            tcp_pkt.set_urgent_ptr(tcp.urgent);
            tcp_pkt.set_payload(&self.payload);
            let checksum = tcp::ipv4_checksum(&tcp_pkt.to_immutable(), &src, &dst);
            tcp_pkt.set_checksum(checksum);
            checksum
        };

        if let Some(ip) = self.ip.as_mut() {
            ip.total_length = total_length;
            ip.checksum = ip_checksum;
        }
        if let Some(tcp) = self.tcp.as_mut() {
            tcp.data_offset = (TCP_HEADER_LEN / 4) as u8;
            tcp.checksum = tcp_checksum;
        }
        debug!(len = ip_len, ip_checksum, tcp_checksum, "packet serialized");

        Ok(buf.split_off(ETHERNET_HEADER_LEN))
    }

    /// 从 IPv4 + TCP 字节解析出报文（不校验校验和）。
    pub fn parse(bytes: &[u8]) -> Result<Packet> {
        let ip_pkt = Ipv4Packet::new(bytes).ok_or(PacketError::Decode("truncated IPv4 header"))?;
        if ip_pkt.get_version() != 4 {
            return Err(PacketError::Decode("not an IPv4 packet"));
        }
        if ip_pkt.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
            return Err(PacketError::Decode("not a TCP segment"));
        }
        let ihl = ip_pkt.get_header_length() as usize * 4;
        let total = (ip_pkt.get_total_length() as usize).min(bytes.len());
        if ihl < IPV4_HEADER_LEN || total < ihl + TCP_HEADER_LEN {
            return Err(PacketError::Decode("truncated TCP header"));
        }

        let segment = &bytes[ihl..total];
        let tcp_pkt = TcpPacket::new(segment).ok_or(PacketError::Decode("truncated TCP header"))?;
        let offset = tcp_pkt.get_data_offset() as usize * 4;
        if offset < TCP_HEADER_LEN || offset > segment.len() {
            return Err(PacketError::Decode("bad TCP data offset"));
        }

        let ip = IpLayer {
            src: Some(IpAddr::V4(ip_pkt.get_source())),
            dst: Some(IpAddr::V4(ip_pkt.get_destination())),
            version: ip_pkt.get_version(),
            ttl: ip_pkt.get_ttl(),
            protocol: ip_pkt.get_next_level_protocol().0,
            total_length: ip_pkt.get_total_length(),
            checksum: ip_pkt.get_checksum(),
        };
        let tcp = TcpLayer {
            src_port: tcp_pkt.get_source(),
            dst_port: tcp_pkt.get_destination(),
            sequence: tcp_pkt.get_sequence(),
            acknowledgment: tcp_pkt.get_acknowledgement(),
            window: tcp_pkt.get_window(),
            urgent: tcp_pkt.get_urgent_ptr(),
            flags: TcpFlags::from_bits((tcp_pkt.get_flags() & 0xFF) as u8),
            data_offset: tcp_pkt.get_data_offset(),
            checksum: tcp_pkt.get_checksum(),
        };

        Ok(Packet {
            mode: AddressMode::Strict,
            ip: Some(ip),
            tcp: Some(tcp),
            payload: segment[offset..].to_vec(),
        })
    }
}

fn ipv4_or_unspecified(addr: Option<IpAddr>) -> Result<Ipv4Addr> {
    match addr {
        Some(IpAddr::V4(v4)) => Ok(v4),
        // ::ffff:a.b.c.d 按其 IPv4 地址写入
        Some(IpAddr::V6(v6)) => v6
            .to_ipv4_mapped()
            .ok_or(PacketError::NotIpv4(IpAddr::V6(v6))),
        None => {
            trace!("unset address serialized as 0.0.0.0");
            Ok(Ipv4Addr::UNSPECIFIED)
        }
    }
}
