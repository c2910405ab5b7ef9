//! 队列配置
//!
//! 构造后只读。application 区间从 `start` 开始，network 区间紧随其后。

use serde::Serialize;
use tracing::debug;

use super::range::QueueRange;
use super::{
    DEFAULT_MARK_VALUE, DEFAULT_NUMBER_OF_QUEUES, DEFAULT_QUEUE_SEPARATION, DEFAULT_QUEUE_SIZE,
    DEFAULT_QUEUE_START,
};

/// NFQUEUE 队列配置
///
/// 开启队列分离时六个区间依次为
/// `app-syn, app-ack, app-svc, net-syn, net-ack, net-svc`，互不重叠；
/// 关闭时每个方向只有一个区间，ack/svc 与 syn 相同。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueConfig {
    queue_separation: bool,
    mark_value: u32,

    application_queue_start: u16,
    num_application_queues: u16,
    application_queue_size: u32,

    network_queue_start: u16,
    num_network_queues: u16,
    network_queue_size: u32,

    application_queue_syn: QueueRange,
    application_queue_ack: QueueRange,
    application_queue_svc: QueueRange,
    network_queue_syn: QueueRange,
    network_queue_ack: QueueRange,
    network_queue_svc: QueueRange,
}

/// 按 syn/ack/svc 顺序切出三段（或一段复用三次），返回 (三段区间, 实际占用队列数)。
fn partition(separation: bool, start: u16, count: u16) -> ([QueueRange; 3], u16) {
    if separation {
        let syn = QueueRange::from_start(start, count);
        let ack = QueueRange::from_start(start.wrapping_add(count), count);
        let svc = QueueRange::from_start(start.wrapping_add(count.wrapping_mul(2)), count);
        ([syn, ack, svc], count.wrapping_mul(3))
    } else {
        let only = QueueRange::from_start(start, count);
        ([only; 3], count)
    }
}

impl QueueConfig {
    /// 计算队列区间。
    ///
    /// `network_queues` / `application_queues` 是每一类（syn/ack/svc）的队列数；
    /// 开启分离时实际占用为其 3 倍。不做溢出检查。
    pub fn new(
        queue_separation: bool,
        mark_value: u32,
        queue_start: u16,
        network_queues: u16,
        application_queues: u16,
        network_queue_size: u32,
        application_queue_size: u32,
    ) -> Self {
        let ([app_syn, app_ack, app_svc], num_application_queues) =
            partition(queue_separation, queue_start, application_queues);

        let network_queue_start = queue_start.wrapping_add(num_application_queues);
        let ([net_syn, net_ack, net_svc], num_network_queues) =
            partition(queue_separation, network_queue_start, network_queues);

        let cfg = Self {
            queue_separation,
            mark_value,
            application_queue_start: queue_start,
            num_application_queues,
            application_queue_size,
            network_queue_start,
            num_network_queues,
            network_queue_size,
            application_queue_syn: app_syn,
            application_queue_ack: app_ack,
            application_queue_svc: app_svc,
            network_queue_syn: net_syn,
            network_queue_ack: net_ack,
            network_queue_svc: net_svc,
        };
        debug!(
            separation = queue_separation,
            app_syn = %cfg.application_queue_syn,
            app_ack = %cfg.application_queue_ack,
            app_svc = %cfg.application_queue_svc,
            net_syn = %cfg.network_queue_syn,
            net_ack = %cfg.network_queue_ack,
            net_svc = %cfg.network_queue_svc,
            "队列区间已分配"
        );
        cfg
    }

    /// 默认配置：分离开启，mark 0x1111，起始 0，每类 4 个队列，长度 500。
    pub fn with_defaults() -> Self {
        Self::new(
            DEFAULT_QUEUE_SEPARATION,
            DEFAULT_MARK_VALUE,
            DEFAULT_QUEUE_START,
            DEFAULT_NUMBER_OF_QUEUES,
            DEFAULT_NUMBER_OF_QUEUES,
            DEFAULT_QUEUE_SIZE,
            DEFAULT_QUEUE_SIZE,
        )
    }

    pub fn queue_separation(&self) -> bool {
        self.queue_separation
    }

    /// iptables MARK 动作使用的值
    pub fn mark_value(&self) -> u32 {
        self.mark_value
    }

    pub fn network_queue_start(&self) -> u16 {
        self.network_queue_start
    }

    pub fn num_network_queues(&self) -> u16 {
        self.num_network_queues
    }

    pub fn network_queue_size(&self) -> u32 {
        self.network_queue_size
    }

    pub fn application_queue_start(&self) -> u16 {
        self.application_queue_start
    }

    pub fn num_application_queues(&self) -> u16 {
        self.num_application_queues
    }

    pub fn application_queue_size(&self) -> u32 {
        self.application_queue_size
    }

    pub fn network_queue_syn(&self) -> QueueRange {
        self.network_queue_syn
    }

    pub fn network_queue_ack(&self) -> QueueRange {
        self.network_queue_ack
    }

    pub fn network_queue_svc(&self) -> QueueRange {
        self.network_queue_svc
    }

    pub fn application_queue_syn(&self) -> QueueRange {
        self.application_queue_syn
    }

    pub fn application_queue_ack(&self) -> QueueRange {
        self.application_queue_ack
    }

    pub fn application_queue_svc(&self) -> QueueRange {
        self.application_queue_svc
    }

    /// `first:last` 形式，直接用于 `--queue-balance`
    pub fn network_queue_syn_str(&self) -> String {
        self.network_queue_syn.to_string()
    }

    pub fn network_queue_ack_str(&self) -> String {
        self.network_queue_ack.to_string()
    }

    pub fn network_queue_svc_str(&self) -> String {
        self.network_queue_svc.to_string()
    }

    pub fn application_queue_syn_str(&self) -> String {
        self.application_queue_syn.to_string()
    }

    pub fn application_queue_ack_str(&self) -> String {
        self.application_queue_ack.to_string()
    }

    pub fn application_queue_svc_str(&self) -> String {
        self.application_queue_svc.to_string()
    }

    /// 六个区间，按 app-syn, app-ack, app-svc, net-syn, net-ack, net-svc 排列
    pub fn ranges(&self) -> [QueueRange; 6] {
        [
            self.application_queue_syn,
            self.application_queue_ack,
            self.application_queue_svc,
            self.network_queue_syn,
            self.network_queue_ack,
            self.network_queue_svc,
        ]
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}
