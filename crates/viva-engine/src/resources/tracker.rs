use std::collections::BTreeSet;
use std::fmt;

/// Kind of registry resource, used to label tracked allocations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ResourceKind {
    Texture,
    Font,
    Sprite,
    Animation,
    Dynamic,
    Text,
    Line,
    Mesh,
    Routine,
}

/// One outstanding allocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Allocation {
    pub kind: ResourceKind,
    pub index: usize,
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.index)
    }
}

/// Ledger of handed-out registry handles.
///
/// Every `alloc` must be matched by exactly one `free`. Anything left over is
/// reported as a leak; nothing is ever aborted.
#[derive(Debug, Default)]
pub struct LeakTracker {
    live: BTreeSet<Allocation>,
    total: usize,
}

impl LeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: ResourceKind, index: usize) {
        let a = Allocation { kind, index };
        if !self.live.insert(a) {
            log::warn!("{a} allocated twice");
        }
        self.total += 1;
    }

    /// Returns `false` (and warns) when `kind/index` is not live.
    pub fn free(&mut self, kind: ResourceKind, index: usize) -> bool {
        let a = Allocation { kind, index };
        let known = self.live.remove(&a);
        if !known {
            log::warn!("free of untracked {a}");
        }
        known
    }

    pub fn contains(&self, kind: ResourceKind, index: usize) -> bool {
        self.live.contains(&Allocation { kind, index })
    }

    #[inline]
    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Allocations made over the tracker's lifetime.
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Logs every outstanding allocation and returns them in kind/index order.
    pub fn report(&self) -> Vec<Allocation> {
        for a in &self.live {
            log::warn!("not freed: {a}");
        }
        self.live.iter().copied().collect()
    }
}
