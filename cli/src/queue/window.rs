use std::collections::{HashSet, VecDeque};

/// Number of message ids remembered by default
pub(crate) const CAPACITY: usize = 1000;

/// Ids of recently displayed messages
///
/// Holds at most `capacity` ids and forgets the oldest first, so a message is
/// shown at most once while its id is in the window.
#[derive(Debug)]
pub(crate) struct SeenMessageWindow {
    capacity: usize,
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl Default for SeenMessageWindow {
    fn default() -> Self {
        Self::with_capacity(CAPACITY)
    }
}

impl SeenMessageWindow {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        SeenMessageWindow {
            capacity,
            order: VecDeque::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    /// Remember the id, returns false if it is already in the window
    pub(crate) fn insert(&mut self, id: &str) -> bool {
        if self.capacity == 0 || self.ids.contains(id) {
            return false;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }

        self.order.push_back(id.to_string());
        self.ids.insert(id.to_string());
        true
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.ids.clear();
    }
}
