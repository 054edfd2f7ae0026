//! Subscriptions: long-lived sources of messages.
//!
//! A [`Subscription`] wraps a [`SubscriptionSource`] (terminal input, a cached
//! query, ...). After every update the runtime asks the application for its
//! current subscriptions and diffs them by [`SubscriptionId`]: new ones are
//! started, missing ones are cancelled. Cancellation is how a screen that is
//! left stops receiving results for the data it was showing.

pub mod terminal;

use std::any::TypeId;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::command::Action;

/// Identity of a subscription, used to diff subscriptions between updates.
///
/// Two subscriptions with the same source type and the same hash are the same
/// subscription; the running one is kept instead of being restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    type_id: TypeId,
    hash: u64,
}

impl SubscriptionId {
    /// Creates an id for source type `T` with the given hash of its parameters.
    #[must_use]
    pub fn of<T: 'static>(hash: u64) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            hash,
        }
    }
}

/// A source of values that can back a [`Subscription`].
pub trait SubscriptionSource: Send + 'static {
    /// The type of values produced.
    type Output;

    /// Creates a fresh stream of values.
    fn stream(&self) -> BoxStream<'static, Self::Output>;

    /// Returns the identity of this source.
    fn id(&self) -> SubscriptionId;
}

/// A subscription producing messages of type `Msg`.
pub struct Subscription<Msg> {
    pub(crate) id: SubscriptionId,
    pub(crate) spawn: Box<dyn Fn() -> BoxStream<'static, Msg> + Send>,
}

impl<Msg: Send + 'static> Subscription<Msg> {
    /// Creates a subscription from a source.
    pub fn new<S>(source: S) -> Self
    where
        S: SubscriptionSource<Output = Msg>,
    {
        Self {
            id: source.id(),
            spawn: Box::new(move || source.stream()),
        }
    }

    /// Maps the messages produced by this subscription.
    ///
    /// The id is unchanged, so mapping does not restart a running subscription.
    pub fn map<F, NewMsg>(self, f: F) -> Subscription<NewMsg>
    where
        F: Fn(Msg) -> NewMsg + Send + Sync + 'static,
        NewMsg: Send + 'static,
    {
        let spawn = self.spawn;
        let f = Arc::new(f);
        Subscription {
            id: self.id,
            spawn: Box::new(move || {
                let f = Arc::clone(&f);
                spawn().map(move |msg| f(msg)).boxed()
            }),
        }
    }

    /// Ties this subscription to `scope`.
    ///
    /// The same source under two scopes is two subscriptions with separate
    /// streams. Use it when the receiver of the mapped messages can be replaced
    /// while the source stays the same, as with a screen that is left and
    /// entered again.
    #[must_use]
    pub fn scoped(mut self, scope: impl Hash) -> Self {
        let mut hasher = DefaultHasher::new();
        self.id.hash.hash(&mut hasher);
        scope.hash(&mut hasher);
        self.id.hash = hasher.finish();
        self
    }

    /// Returns the identity of this subscription.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Handle for a running subscription task
pub struct Handle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Handle {
    pub const fn new(token: CancellationToken, join: JoinHandle<()>) -> Self {
        Self { token, join }
    }

    /// Signal cancellation without waiting.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Cancel the subscription and wait for task completion
    pub async fn cancel(self) {
        self.token.cancel();
        let _ = self.join.await;
    }
}

/// Starts and stops subscription tasks as the application's subscriptions change.
pub(crate) struct SubscriptionManager<Msg> {
    running: HashMap<SubscriptionId, Handle>,
    tx: mpsc::UnboundedSender<Action<Msg>>,
}

impl<Msg: Send + 'static> SubscriptionManager<Msg> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Action<Msg>>) -> Self {
        Self {
            running: HashMap::new(),
            tx,
        }
    }

    /// Reconciles running tasks with `subscriptions`.
    pub(crate) fn update(&mut self, subscriptions: impl IntoIterator<Item = Subscription<Msg>>) {
        let mut next = HashMap::new();

        for sub in subscriptions {
            if next.contains_key(&sub.id) {
                continue;
            }
            let handle = match self.running.remove(&sub.id) {
                Some(handle) => handle,
                None => self.start(&sub),
            };
            next.insert(sub.id, handle);
        }

        for (id, handle) in self.running.drain() {
            trace!(?id, "stopping subscription");
            handle.stop();
        }
        self.running = next;
    }

    /// Cancels every running subscription and waits for the tasks to finish.
    pub(crate) async fn shutdown(&mut self) {
        for (_, handle) in self.running.drain() {
            handle.cancel().await;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.running.len()
    }

    fn start(&self, sub: &Subscription<Msg>) -> Handle {
        trace!(id = ?sub.id, "starting subscription");
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        let mut stream = (sub.spawn)();

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    // checked first: nothing is delivered once cancelled
                    biased;
                    () = cancelled.cancelled() => break,
                    item = stream.next() => match item {
                        Some(msg) => {
                            if tx.send(Action::Message(msg)).is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        Handle::new(token, join)
    }
}
