//! Error types for synthetic packet construction.

use std::fmt;
use std::net::IpAddr;

use thiserror::Error;

/// Which header a packet operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Ip,
    Tcp,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Ip => f.write_str("IP"),
            Layer::Tcp => f.write_str("TCP"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    /// The packet already carries this layer; it is never overwritten.
    #[error("{0} layer already exists")]
    LayerAlreadySet(Layer),

    /// The operation needs a layer that has not been added yet.
    #[error("{0} layer has not been added")]
    MissingLayer(Layer),

    /// Address literal rejected in strict mode.
    #[error("invalid address literal: {0:?}")]
    InvalidAddress(String),

    /// An IPv6 address cannot be written into an IPv4 header.
    #[error("address {0} is not IPv4")]
    NotIpv4(IpAddr),

    /// Internal inconsistency while encoding headers.
    #[error("serialization failed: {0}")]
    Encode(&'static str),

    /// Bytes do not hold an IPv4/TCP packet.
    #[error("decode failed: {0}")]
    Decode(&'static str),
}

pub type Result<T> = std::result::Result<T, PacketError>;
