//! 合成 TCP 流
//!
//! 四元组始终描述发起方（client）。握手报文的 seq/ack 按以下关系生成：
//! - SYN:     client -> server, seq = 0, ack = 0
//! - SYN-ACK: server -> client, seq = 0, ack = syn.seq + 1
//! - ACK:     client -> server, seq = synack.ack, ack = synack.seq + 1

use tracing::debug;

use super::error::Result;
use super::packet::Packet;

/// 一条双端交互的有序报文序列；只增不减。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketFlow {
    src_addr: String,
    dst_addr: String,
    src_port: u16,
    dst_port: u16,
    packets: Vec<Packet>,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    ClientToServer,
    ServerToClient,
}

impl PacketFlow {
    pub fn new(
        src_addr: impl Into<String>,
        dst_addr: impl Into<String>,
        src_port: u16,
        dst_port: u16,
    ) -> Self {
        Self {
            src_addr: src_addr.into(),
            dst_addr: dst_addr.into(),
            src_port,
            dst_port,
            packets: Vec::new(),
        }
    }

    pub fn src_addr(&self) -> &str {
        &self.src_addr
    }

    pub fn dst_addr(&self) -> &str {
        &self.dst_addr
    }

    pub fn src_port(&self) -> u16 {
        self.src_port
    }

    pub fn dst_port(&self) -> u16 {
        self.dst_port
    }

    fn new_packet(&self, dir: Direction) -> Result<Packet> {
        let mut pkt = Packet::new();
        match dir {
            Direction::ClientToServer => {
                pkt.add_ip_layer(&self.src_addr, &self.dst_addr)?;
                pkt.add_tcp_layer(self.src_port, self.dst_port)?;
            }
            Direction::ServerToClient => {
                pkt.add_ip_layer(&self.dst_addr, &self.src_addr)?;
                pkt.add_tcp_layer(self.dst_port, self.src_port)?;
            }
        }
        Ok(pkt)
    }

    // 三个报文全部构造成功后才追加，失败时流保持不变。
    fn build_handshake(&self) -> Result<[Packet; 3]> {
        let mut syn = self.new_packet(Direction::ClientToServer)?;
        syn.set_syn()?;
        syn.set_sequence_number(0)?;
        syn.set_acknowledgment_number(0)?;
        let syn_seq = syn.sequence_number().unwrap_or_default();

        let mut syn_ack = self.new_packet(Direction::ServerToClient)?;
        syn_ack.set_syn_ack()?;
        syn_ack.set_sequence_number(0)?;
        syn_ack.set_acknowledgment_number(syn_seq.wrapping_add(1))?;
        let syn_ack_seq = syn_ack.sequence_number().unwrap_or_default();
        let syn_ack_ack = syn_ack.acknowledgment_number().unwrap_or_default();

        let mut ack = self.new_packet(Direction::ClientToServer)?;
        ack.set_ack()?;
        ack.set_sequence_number(syn_ack_ack)?;
        ack.set_acknowledgment_number(syn_ack_seq.wrapping_add(1))?;

        Ok([syn, syn_ack, ack])
    }

    /// 追加一组三次握手报文，返回新追加的三个报文。
    ///
    /// 重复调用会再追加一组，不会替换已有报文。
    #[tracing::instrument(
        skip(self),
        fields(src = %self.src_addr, dst = %self.dst_addr, sport = self.src_port, dport = self.dst_port)
    )]
    pub fn generate_handshake(&mut self) -> Result<&[Packet]> {
        let start = self.packets.len();
        let triplet = self.build_handshake()?;
        self.packets.extend(triplet);
        debug!(total = self.packets.len(), "handshake appended");
        Ok(&self.packets[start..])
    }

    /// 握手之后追加一个带载荷的 PSH-ACK 数据段（client -> server），
    /// 返回新追加的四个报文。
    #[tracing::instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub fn generate_handshake_with_payload(&mut self, payload: &[u8]) -> Result<&[Packet]> {
        let start = self.packets.len();
        let triplet = self.build_handshake()?;
        let last_ack = &triplet[2];

        let mut data = self.new_packet(Direction::ClientToServer)?;
        data.set_psh_ack()?;
        data.set_sequence_number(last_ack.sequence_number().unwrap_or_default())?;
        data.set_acknowledgment_number(
            last_ack.acknowledgment_number().unwrap_or_default(),
        )?;
        data.set_payload(payload)?;

        self.packets.extend(triplet);
        self.packets.push(data);
        debug!(total = self.packets.len(), "handshake with payload appended");
        Ok(&self.packets[start..])
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// 第 `index` 个报文，越界返回 `None`
    pub fn nth_packet(&self, index: usize) -> Option<&Packet> {
        self.packets.get(index)
    }

    fn filter(&self, syn: bool, ack: bool) -> Vec<&Packet> {
        self.packets
            .iter()
            .filter(|p| p.syn() == syn && p.ack() == ack && !p.fin())
            .collect()
    }

    /// SYN 且非 ACK、非 FIN
    pub fn syn_packets(&self) -> Vec<&Packet> {
        self.filter(true, false)
    }

    /// SYN + ACK，非 FIN
    pub fn syn_ack_packets(&self) -> Vec<&Packet> {
        self.filter(true, true)
    }

    /// ACK 且非 SYN、非 FIN（包括 PSH-ACK 数据段）
    pub fn ack_packets(&self) -> Vec<&Packet> {
        self.filter(false, true)
    }

    /// 按顺序序列化全部报文
    pub fn to_bytes(&mut self) -> Result<Vec<Vec<u8>>> {
        self.packets.iter_mut().map(Packet::serialize).collect()
    }
}
