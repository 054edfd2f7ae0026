use futures::{
    FutureExt, Stream, StreamExt,
    stream::{self, BoxStream, select_all},
};

/// An action that can be performed by a command.
///
/// Actions are emitted by command streams and processed by the runtime.
pub enum Action<Msg> {
    /// Send a message to the application's update function.
    Message(Msg),

    /// Request the application to quit.
    Quit,
}

/// A command that can be executed to perform side effects.
///
/// Commands represent asynchronous operations that produce messages or actions,
/// such as HTTP requests issued by a mutation. They are returned from
/// `Application::new` and `Application::update` and executed by the runtime.
///
/// # Examples
///
/// ```
/// use folio::command::Command;
///
/// enum Message {
///     Loaded(usize),
/// }
///
/// let cmd = Command::future(async { Message::Loaded(3) });
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) stream: Option<BoxStream<'static, Action<Msg>>>,
}

impl<Msg: Send + 'static> Command<Msg> {
    /// Create a command that does nothing.
    pub fn none() -> Self {
        Self { stream: None }
    }

    /// Returns `true` if this command performs no side effects.
    pub const fn is_none(&self) -> bool {
        self.stream.is_none()
    }

    /// Create a command from a future that produces a message.
    pub fn future(future: impl Future<Output = Msg> + Send + 'static) -> Self {
        Self {
            stream: Some(future.into_stream().map(Action::Message).boxed()),
        }
    }

    /// Create a command that delivers `msg` to the next update.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::command::Command;
    ///
    /// enum Message {
    ///     GoHome,
    /// }
    ///
    /// let cmd = Command::message(Message::GoHome);
    /// ```
    pub fn message(msg: Msg) -> Self {
        Self::effect(Action::Message(msg))
    }

    /// Create a command that performs a single action immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::command::{Action, Command};
    ///
    /// let cmd: Command<i32> = Command::effect(Action::Quit);
    /// ```
    pub fn effect(action: Action<Msg>) -> Self {
        Self {
            stream: Some(stream::once(async move { action }).boxed()),
        }
    }

    /// Batch multiple commands into a single command.
    ///
    /// All commands will be executed concurrently. The order in which
    /// messages arrive is not guaranteed. Commands that are `Command::none()`
    /// are automatically filtered out.
    pub fn batch(commands: impl IntoIterator<Item = Self>) -> Self {
        let streams: Vec<_> = commands.into_iter().filter_map(|cmd| cmd.stream).collect();

        if streams.is_empty() {
            Self::none()
        } else {
            Self {
                stream: Some(select_all(streams).boxed()),
            }
        }
    }

    /// Create a command from a stream of messages.
    pub fn stream(stream: impl Stream<Item = Msg> + Send + 'static) -> Self {
        Self {
            stream: Some(stream.map(Action::Message).boxed()),
        }
    }

    /// Convert the messages produced by this command.
    ///
    /// This is how a screen's command is lifted into the application's message
    /// type. `Quit` actions pass through unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::command::Command;
    ///
    /// enum Message {
    ///     Counted(usize),
    /// }
    ///
    /// let cmd = Command::future(async { 2 }).map(Message::Counted);
    /// ```
    pub fn map<NewMsg>(self, f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static) -> Command<NewMsg>
    where
        NewMsg: Send + 'static,
    {
        Command {
            stream: self.stream.map(|stream| {
                stream
                    .map(move |action| match action {
                        Action::Message(msg) => Action::Message(f(msg)),
                        Action::Quit => Action::Quit,
                    })
                    .boxed()
            }),
        }
    }
}
