use std::collections::VecDeque;

/// Serialized messages waiting for the transport to open (FIFO)
#[derive(Debug, Default)]
pub struct OutboundQueue {
    messages: VecDeque<String>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: String) {
        self.messages.push_back(message);
    }

    /// Remove and return every queued message in original order
    pub fn drain(&mut self) -> Vec<String> {
        self.messages.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
