//! 报文头记录
//!
//! 只保存字段值；字节编码在 [`super::Packet::serialize`] 中完成。

use std::net::IpAddr;

/// 新建 IP 层的默认 TTL
pub const DEFAULT_TTL: u8 = 64;
/// 新建 TCP 层的默认窗口
pub const DEFAULT_WINDOW: u16 = 1505;
/// 新建 TCP 层的默认序列号
pub const DEFAULT_SEQUENCE: u32 = 11050;
/// IANA 协议号：TCP
pub const IP_PROTOCOL_TCP: u8 = 6;

/// IPv4 头字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpLayer {
    /// 解析失败时为 `None`
    pub src: Option<IpAddr>,
    pub dst: Option<IpAddr>,
    pub version: u8,
    pub ttl: u8,
    pub protocol: u8,
    /// 序列化后回填
    pub total_length: u16,
    /// 序列化后回填
    pub checksum: u16,
}

impl IpLayer {
    pub fn new(src: Option<IpAddr>, dst: Option<IpAddr>) -> Self {
        Self {
            src,
            dst,
            version: 4,
            ttl: DEFAULT_TTL,
            protocol: IP_PROTOCOL_TCP,
            total_length: 0,
            checksum: 0,
        }
    }
}

/// TCP 标志位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpFlags {
    pub fin: bool,
    pub syn: bool,
    pub rst: bool,
    pub psh: bool,
    pub ack: bool,
    pub urg: bool,
    pub ece: bool,
    pub cwr: bool,
}

impl TcpFlags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
    pub const ECE: u8 = 0x40;
    pub const CWR: u8 = 0x80;

    /// 编码为 TCP 头中的标志字节
    pub fn bits(&self) -> u8 {
        [
            (self.fin, Self::FIN),
            (self.syn, Self::SYN),
            (self.rst, Self::RST),
            (self.psh, Self::PSH),
            (self.ack, Self::ACK),
            (self.urg, Self::URG),
            (self.ece, Self::ECE),
            (self.cwr, Self::CWR),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .fold(0, |acc, (_, bit)| acc | bit)
    }

    pub fn from_bits(bits: u8) -> Self {
        Self {
            fin: bits & Self::FIN != 0,
            syn: bits & Self::SYN != 0,
            rst: bits & Self::RST != 0,
            psh: bits & Self::PSH != 0,
            ack: bits & Self::ACK != 0,
            urg: bits & Self::URG != 0,
            ece: bits & Self::ECE != 0,
            cwr: bits & Self::CWR != 0,
        }
    }

    /// 紧凑标签，如 `S`、`SA`、`A`、`PA`
    pub fn label(&self) -> String {
        let mut s = String::new();
        for (set, c) in [
            (self.fin, 'F'),
            (self.syn, 'S'),
            (self.rst, 'R'),
            (self.psh, 'P'),
            (self.ack, 'A'),
            (self.urg, 'U'),
            (self.ece, 'E'),
            (self.cwr, 'C'),
        ] {
            if set {
                s.push(c);
            }
        }
        s
    }
}

/// TCP 头字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpLayer {
    pub src_port: u16,
    pub dst_port: u16,
    pub sequence: u32,
    pub acknowledgment: u32,
    pub window: u16,
    pub urgent: u16,
    pub flags: TcpFlags,
    /// 32 位字为单位，序列化后回填
    pub data_offset: u8,
    /// 序列化后回填
    pub checksum: u16,
}

impl TcpLayer {
    pub fn new(src_port: u16, dst_port: u16) -> Self {
        Self {
            src_port,
            dst_port,
            sequence: DEFAULT_SEQUENCE,
            acknowledgment: 0,
            window: DEFAULT_WINDOW,
            urgent: 0,
            flags: TcpFlags::default(),
            data_offset: 0,
            checksum: 0,
        }
    }
}
