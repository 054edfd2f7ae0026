//! Mutations: one-off writes such as creating a resource.
//!
//! Unlike queries, which are subscriptions, a mutation is a discrete side effect
//! with a clear start and end, so it is expressed as a [`Command`]. After a
//! successful mutation, invalidate the affected queries so that subscribed
//! screens refetch.
//!
//! # Example
//!
//! ```rust,ignore
//! fn update(&mut self, msg: Message) -> Command<Message> {
//!     match msg {
//!         Message::Submit(post) => {
//!             let api = self.api.clone();
//!             Mutation::mutate(post, move |input| {
//!                 Box::pin(async move { api.create_post(input).await })
//!             })
//!             .map(Message::Created)
//!         }
//!         Message::Created(Ok(_)) => {
//!             self.query_client.invalidate("posts");
//!             Command::none()
//!         }
//!         Message::Created(Err(_)) => Command::none(),
//!     }
//! }
//! ```

use std::marker::PhantomData;

use futures::future::BoxFuture;

use crate::command::Command;

use super::error::QueryError;

/// The state of a mutation as tracked by the screen that issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<T> {
    /// Mutation is idle (not yet started).
    Idle,
    /// Mutation is in progress.
    Loading,
    /// Mutation succeeded with a result.
    Success(T),
    /// Mutation failed with an error.
    Error(QueryError),
}

impl<T> MutationState<T> {
    /// Returns the result data if the mutation succeeded, otherwise `None`.
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Returns `true` if the mutation is currently in progress.
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` if the mutation succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` if the mutation failed.
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

/// A mutation for performing data modifications.
///
/// Mutations don't cache results and are never retried.
pub struct Mutation<I, O> {
    _phantom: PhantomData<(I, O)>,
}

impl<I, O> Mutation<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Executes a mutation and returns a `Command`.
    ///
    /// The returned command produces `Result<O, QueryError>` which can be mapped
    /// to your application's message type using [`Command::map`].
    pub fn mutate<F>(input: I, mutator: F) -> Command<Result<O, QueryError>>
    where
        F: FnOnce(I) -> BoxFuture<'static, Result<O, QueryError>> + Send + 'static,
    {
        Command::future(async move { mutator(input).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Action;
    use futures::StreamExt;

    #[test]
    fn test_mutation_state_data() {
        assert_eq!(MutationState::Success(42).data(), Some(&42));
        assert_eq!(MutationState::<i32>::Idle.data(), None);
        assert_eq!(MutationState::<i32>::Loading.data(), None);
        assert_eq!(
            MutationState::<i32>::Error(QueryError::Validation("bad".to_string())).data(),
            None
        );
    }

    #[test]
    fn test_mutation_state_predicates() {
        let idle = MutationState::<i32>::default();
        assert!(!idle.is_loading());
        assert!(!idle.is_success());
        assert!(!idle.is_error());

        assert!(MutationState::<i32>::Loading.is_loading());
        assert!(MutationState::Success(1).is_success());
        assert!(MutationState::<i32>::Error(QueryError::Network("x".to_string())).is_error());
    }

    #[tokio::test]
    async fn test_mutate_runs_mutator_with_input() {
        let cmd = Mutation::mutate("title".to_string(), |input: String| {
            Box::pin(async move { Ok::<usize, QueryError>(input.len()) })
        });

        let mut stream = cmd.stream.expect("mutation should produce a stream");
        match stream.next().await {
            Some(Action::Message(result)) => assert_eq!(result, Ok(5)),
            _ => panic!("expected a message"),
        }
    }

    #[tokio::test]
    async fn test_mutate_propagates_error() {
        let cmd = Mutation::<(), ()>::mutate((), |()| {
            Box::pin(async { Err(QueryError::Validation("title is required".to_string())) })
        });

        let mut stream = cmd.stream.expect("mutation should produce a stream");
        match stream.next().await {
            Some(Action::Message(result)) => {
                assert_eq!(result, Err(QueryError::Validation("title is required".to_string())));
            }
            _ => panic!("expected a message"),
        }
    }
}
