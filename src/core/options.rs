//! Purpose: Configure a decoder tree: who hears recovery events and how much of a node errors keep.
//! Exports: `DecodeOptions`.
//! Role: Passed to `Decoder::with_options` and inherited by nested object decoders.
//! Invariants: Defaults use `Notifier::global()` and keep snapshots untruncated.

use crate::core::notify::Notifier;

#[derive(Clone, Debug)]
pub struct DecodeOptions {
    pub notifier: Notifier,
    pub snapshot_limit: Option<usize>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self {
            notifier: Notifier::global().clone(),
            snapshot_limit: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_snapshot_limit(mut self, limit: usize) -> Self {
        self.snapshot_limit = Some(limit);
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::DecodeOptions;
    use crate::core::notify::Notifier;

    #[test]
    fn defaults_use_global_registry_and_no_limit() {
        let options = DecodeOptions::default();
        assert!(options.notifier.same_registry(Notifier::global()));
        assert_eq!(options.snapshot_limit, None);
    }

    #[test]
    fn builders_override_defaults() {
        let notifier = Notifier::new();
        let options = DecodeOptions::new()
            .with_notifier(notifier.clone())
            .with_snapshot_limit(64);
        assert!(options.notifier.same_registry(&notifier));
        assert!(!options.notifier.same_registry(Notifier::global()));
        assert_eq!(options.snapshot_limit, Some(64));
    }
}
