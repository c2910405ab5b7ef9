//! 合成报文生成
//!
//! 构造 IPv4/TCP 报文及三次握手流，用于在没有真实网络栈的情况下驱动执行路径。

mod error;
mod flow;
mod layers;
mod packet;

pub use error::{Layer, PacketError, Result};
pub use flow::PacketFlow;
pub use layers::{
    DEFAULT_SEQUENCE, DEFAULT_TTL, DEFAULT_WINDOW, IP_PROTOCOL_TCP, IpLayer, TcpFlags, TcpLayer,
};
pub use packet::{AddressMode, ETHERNET_HEADER_LEN, IPV4_HEADER_LEN, Packet, TCP_HEADER_LEN};
