use serde::{Deserialize, Serialize};

use super::queue_config::QueueConfig;
use super::{
    DEFAULT_MARK_VALUE, DEFAULT_NUMBER_OF_QUEUES, DEFAULT_QUEUE_SEPARATION, DEFAULT_QUEUE_SIZE,
    DEFAULT_QUEUE_START,
};

/// 队列分配参数；缺省字段取默认配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfigParams {
    pub queue_separation: bool,
    pub mark_value: u32,
    pub queue_start: u16,
    /// 每类 network 队列数
    pub network_queues: u16,
    /// 每类 application 队列数
    pub application_queues: u16,
    pub network_queue_size: u32,
    pub application_queue_size: u32,
}

impl Default for QueueConfigParams {
    fn default() -> Self {
        Self {
            queue_separation: DEFAULT_QUEUE_SEPARATION,
            mark_value: DEFAULT_MARK_VALUE,
            queue_start: DEFAULT_QUEUE_START,
            network_queues: DEFAULT_NUMBER_OF_QUEUES,
            application_queues: DEFAULT_NUMBER_OF_QUEUES,
            network_queue_size: DEFAULT_QUEUE_SIZE,
            application_queue_size: DEFAULT_QUEUE_SIZE,
        }
    }
}

impl QueueConfigParams {
    pub fn build(&self) -> QueueConfig {
        QueueConfig::new(
            self.queue_separation,
            self.mark_value,
            self.queue_start,
            self.network_queues,
            self.application_queues,
            self.network_queue_size,
            self.application_queue_size,
        )
    }
}
