use ratatui::Frame;

use crate::{command::Command, subscription::Subscription};

/// A TUI application following the Elm Architecture.
///
/// # Type Parameters
///
/// * `Message` - The messages your application handles. Must be `Send + 'static`.
/// * `Flags` - Data passed at initialization, such as configuration and injected
///   services.
///
/// # Example
///
/// ```
/// use ratatui::Frame;
/// use folio::{application::Application, command::Command, subscription::Subscription};
///
/// enum Message {
///     Next,
/// }
///
/// struct Pager {
///     page: usize,
/// }
///
/// impl Application for Pager {
///     type Message = Message;
///     type Flags = usize;
///
///     fn new(page: usize) -> (Self, Command<Message>) {
///         (Pager { page }, Command::none())
///     }
///
///     fn update(&mut self, msg: Message) -> Command<Message> {
///         match msg {
///             Message::Next => self.page += 1,
///         }
///         Command::none()
///     }
///
///     fn view(&self, _frame: &mut Frame<'_>) {}
///
///     fn subscriptions(&self) -> Vec<Subscription<Message>> {
///         vec![]
///     }
/// }
/// ```
pub trait Application: Sized {
    /// The type of messages your application processes.
    ///
    /// Messages are produced by user input, subscriptions and commands.
    type Message: Send + 'static;

    /// Configuration data for initializing your application.
    type Flags: Clone + Send;

    /// Initialize the application with the given flags.
    ///
    /// Returns the initial state and a command to run at startup.
    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>);

    /// Process a message and update the application state.
    ///
    /// All state changes happen here. The returned command is executed by the
    /// runtime; its messages come back through this method.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render the application's user interface.
    ///
    /// This should only read from `self`; state changes belong in `update()`.
    fn view(&self, frame: &mut Frame<'_>);

    /// The subscriptions the application currently wants.
    ///
    /// Called after initialization and after every update. Subscriptions that
    /// are no longer returned are cancelled, new ones are started and
    /// unchanged ones keep running.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>>;
}
