//! 队列号区间

use std::fmt;

/// 闭区间 `[first, last]`，渲染为 iptables 的 `first:last` 形式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueRange {
    pub first: u16,
    pub last: u16,
}

impl QueueRange {
    /// 从 `start` 开始、宽度为 `count` 的区间。
    ///
    /// 与 16 位队列号一致按回绕计算：`count == 0` 时 `last = start - 1`（回绕），
    /// `start > 0` 时得到空区间，`start == 0` 时回绕成 `0:65535`。
    /// 溢出属于调用方的参数问题。
    pub fn from_start(start: u16, count: u16) -> Self {
        Self {
            first: start,
            last: start.wrapping_add(count).wrapping_sub(1),
        }
    }

    /// 区间内队列个数
    pub fn len(&self) -> usize {
        if self.last < self.first {
            return 0;
        }
        (self.last - self.first) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, queue: u16) -> bool {
        self.first <= queue && queue <= self.last
    }

    pub fn overlaps(&self, other: &QueueRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.first <= other.last
            && other.first <= self.last
    }
}

impl fmt::Display for QueueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

impl serde::Serialize for QueueRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
