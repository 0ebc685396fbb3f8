//! Subscription handles.

use std::fmt;

/// Opaque token returned by [`EventBus::subscribe`][crate::EventBus::subscribe].
///
/// Ids are issued from a per-bus counter and never reused, so a handle stays
/// meaningful after sibling subscribers are removed, and a stale handle can
/// never remove somebody else's callback.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}
