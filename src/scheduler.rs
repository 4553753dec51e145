// Copyright (c) 2026 rezky_nightky

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct FrameRequestId;
}

pub struct FrameScheduler<T> {
    pending: SlotMap<FrameRequestId, T>,
    order: Vec<FrameRequestId>,
    frame: u64,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: SlotMap::with_key(),
            order: Vec::new(),
            frame: 0,
        }
    }

    pub fn request(&mut self, task: T) -> FrameRequestId {
        let id = self.pending.insert(task);
        self.order.push(id);
        id
    }

    pub fn cancel(&mut self, id: FrameRequestId) -> bool {
        self.pending.remove(id).is_some()
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: FrameRequestId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &T> {
        self.pending.values()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn take_due(&mut self) -> Vec<(FrameRequestId, T)> {
        self.frame = self.frame.wrapping_add(1);
        // Anything requested from here on waits for the next frame.
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|id| self.pending.remove(id).map(|t| (id, t)))
            .collect()
    }
}
