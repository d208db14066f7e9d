//! Work-item id interning.
//!
//! Maps work-item id strings to dense integer indices so the graph passes can
//! run over plain vectors.

use rustc_hash::FxHashMap;

/// Dense index of a work item inside one `ScheduleGraph`.
pub type NodeIdx = u32;

/// Bidirectional work-item id <-> index map. Indices follow insertion order.
#[derive(Debug, Clone, Default)]
pub struct WorkItemIndex {
    to_idx: FxHashMap<String, NodeIdx>,
    ids: Vec<String>,
}

impl WorkItemIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_idx: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Insert a new id. Returns `None` if it was already present.
    pub fn insert(&mut self, id: &str) -> Option<NodeIdx> {
        if self.to_idx.contains_key(id) {
            return None;
        }
        let idx = self.ids.len() as NodeIdx;
        self.ids.push(id.to_string());
        self.to_idx.insert(id.to_string(), idx);
        Some(idx)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<NodeIdx> {
        self.to_idx.get(id).copied()
    }

    /// Id string for an index. Panics on an index not issued by this map.
    #[inline]
    pub fn id(&self, idx: NodeIdx) -> &str {
        &self.ids[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
