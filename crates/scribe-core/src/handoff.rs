use parking_lot::Mutex;

/// Single-slot handoff for AI-generated text crossing the explorer → composer
/// navigation boundary. Overwrite-on-write, read-once-and-clear; not a queue.
#[derive(Default)]
pub struct GeneratedQuoteSlot {
    slot: Mutex<Option<String>>,
}

impl GeneratedQuoteSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store text, replacing whatever was there.
    pub fn put(&self, text: impl Into<String>) {
        *self.slot.lock() = Some(text.into());
    }

    /// Take the stored text, clearing the slot.
    pub fn take(&self) -> Option<String> {
        self.slot.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears_slot() {
        let slot = GeneratedQuoteSlot::new();
        slot.put("a generated quote");
        assert_eq!(slot.take().as_deref(), Some("a generated quote"));
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let slot = GeneratedQuoteSlot::new();
        slot.put("first");
        slot.put("second");
        assert_eq!(slot.take().as_deref(), Some("second"));
    }
}
