use std::hash::{DefaultHasher, Hash, Hasher};
use std::io;

use crossterm::event::{Event, EventStream};
use futures::{StreamExt, stream::BoxStream};

use super::{SubscriptionId, SubscriptionSource};

/// Terminal input events from crossterm's `EventStream`.
///
/// Read errors are forwarded as `Err` items instead of ending the stream, so the
/// application decides whether a failing terminal is fatal.
///
/// # Example
///
/// ```rust
/// use folio::subscription::{Subscription, terminal::TerminalEvents};
///
/// enum Message {
///     Input(crossterm::event::Event),
///     InputError(String),
/// }
///
/// let sub = Subscription::new(TerminalEvents::new()).map(|result| match result {
///     Ok(event) => Message::Input(event),
///     Err(e) => Message::InputError(e.to_string()),
/// });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalEvents;

impl TerminalEvents {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SubscriptionSource for TerminalEvents {
    type Output = Result<Event, io::Error>;

    fn stream(&self) -> BoxStream<'static, Self::Output> {
        EventStream::new().boxed()
    }

    fn id(&self) -> SubscriptionId {
        // there is only one terminal, so every instance is the same subscription
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        SubscriptionId::of::<Self>(hasher.finish())
    }
}

impl Hash for TerminalEvents {
    fn hash<H: Hasher>(&self, state: &mut H) {
        "terminal".hash(state);
    }
}
