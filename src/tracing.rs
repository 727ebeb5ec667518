//! Diagnostics macros used throughout the crate.
//!
//! `trace!`, `debug!` and `warn!` take `tracing`-style arguments.  With the
//! `tracing` feature they become the real [`tracing`] macros; without it
//! they vanish, arguments included.  An expansion to nothing is not an
//! expression, so a match arm that only logs must wrap the call in a block.

#![allow(unused_macros)]

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($tt:tt)*) => { tracing::trace!($($tt)*) }
}

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($tt:tt)*) => { tracing::debug!($($tt)*) }
}

#[cfg(feature = "tracing")]
macro_rules! warn {
    ($($tt:tt)*) => { tracing::warn!($($tt)*) }
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($tt:tt)*) => {};
}

/// Records the level of every event emitted while it is the default
/// subscriber.  Spans are accepted and ignored.
#[cfg(all(test, feature = "tracing"))]
#[derive(Clone, Default)]
pub(crate) struct LevelLog(std::sync::Arc<std::sync::Mutex<Vec<::tracing::Level>>>);

#[cfg(all(test, feature = "tracing"))]
impl LevelLog {
    pub(crate) fn count(&self, level: ::tracing::Level) -> usize {
        self.0
            .lock()
            .map(|seen| seen.iter().filter(|&&l| l == level).count())
            .unwrap_or(0)
    }
}

#[cfg(all(test, feature = "tracing"))]
impl ::tracing::Subscriber for LevelLog {
    fn enabled(&self, _: &::tracing::Metadata<'_>) -> bool {
        true
    }
    fn new_span(&self, _: &::tracing::span::Attributes<'_>) -> ::tracing::span::Id {
        ::tracing::span::Id::from_u64(1)
    }
    fn record(&self, _: &::tracing::span::Id, _: &::tracing::span::Record<'_>) {}
    fn record_follows_from(&self, _: &::tracing::span::Id, _: &::tracing::span::Id) {}
    fn event(&self, event: &::tracing::Event<'_>) {
        if let Ok(mut seen) = self.0.lock() {
            seen.push(*event.metadata().level());
        }
    }
    fn enter(&self, _: &::tracing::span::Id) {}
    fn exit(&self, _: &::tracing::span::Id) {}
}
