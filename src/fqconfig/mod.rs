//! NFQUEUE 队列号分配
//!
//! 将一段连续的队列号空间按方向（application / network）和握手阶段
//! （syn / ack / svc）切分成若干子区间，供防火墙规则生成方使用。

mod params;
mod queue_config;
mod range;

pub use params::QueueConfigParams;
pub use queue_config::QueueConfig;
pub use range::QueueRange;

/// 默认是否按包类型分队列
pub const DEFAULT_QUEUE_SEPARATION: bool = true;
/// 每类默认队列数
pub const DEFAULT_NUMBER_OF_QUEUES: u16 = 4;
/// 默认起始队列号
pub const DEFAULT_QUEUE_START: u16 = 0;
/// 默认队列长度
pub const DEFAULT_QUEUE_SIZE: u32 = 500;
/// raw 链上默认打的 mark
pub const DEFAULT_MARK_VALUE: u32 = 0x1111;
