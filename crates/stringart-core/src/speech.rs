//! Text-to-speech abstraction.

use std::sync::Arc;

/// A platform speech capability.
///
/// Calls are fire-and-forget. Starting an utterance replaces whatever is
/// currently being spoken; nothing is queued.
pub trait Narrator: Send + Sync {
    /// Speak `utterance`, interrupting any utterance in flight.
    fn speak(&self, utterance: &str);

    /// Stop the utterance in flight, if any.
    fn cancel(&self);
}

/// Hands out narrators, one per playback session.
///
/// A narrator's `cancel` stops whatever it is saying, so two sessions must
/// never share one.
pub trait NarratorFactory: Send + Sync {
    /// A narrator with nothing in flight.
    fn create(&self) -> Arc<dyn Narrator>;
}

impl<F> NarratorFactory for F
where
    F: Fn() -> Arc<dyn Narrator> + Send + Sync,
{
    fn create(&self) -> Arc<dyn Narrator> {
        self()
    }
}
