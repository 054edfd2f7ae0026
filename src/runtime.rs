use std::time::Duration;

use color_eyre::eyre::Result;
use futures::stream::StreamExt;
use ratatui::{Terminal, prelude::Backend};
use tokio::{sync::mpsc, time::sleep};
use tracing::trace;

use crate::{
    application::Application,
    command::{Action, Command},
    subscription::SubscriptionManager,
};

/// Owns an [`Application`] and drives its event loop.
///
/// Each iteration draws a frame, then waits for the next action (or the frame
/// deadline) and applies every action that is ready. After each update the
/// application's subscriptions are reconciled. The loop ends on
/// [`Action::Quit`], after which all subscriptions are cancelled.
pub struct Runtime<A: Application> {
    app: A,
    init: Option<Command<A::Message>>,
    tx: mpsc::UnboundedSender<Action<A::Message>>,
    rx: mpsc::UnboundedReceiver<Action<A::Message>>,
    subscription_manager: SubscriptionManager<A::Message>,
    frame_rate: u32,
}

impl<A: Application> Runtime<A> {
    /// Creates the application from `flags`; nothing runs until [`Runtime::run`].
    pub fn new(flags: A::Flags, frame_rate: u32) -> Self {
        let (app, init) = A::new(flags);
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription_manager = SubscriptionManager::new(tx.clone());

        Self {
            app,
            init: Some(init),
            tx,
            rx,
            subscription_manager,
            frame_rate: frame_rate.max(1),
        }
    }

    /// Runs until the application quits.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing to the terminal fails.
    pub async fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let frame_duration = Duration::from_millis(1000 / u64::from(self.frame_rate));

        if let Some(init) = self.init.take() {
            self.execute(init);
        }
        self.subscription_manager.update(self.app.subscriptions());

        loop {
            terminal.draw(|frame| self.app.view(frame))?;

            let first = tokio::select! {
                action = self.rx.recv() => action,
                () = sleep(frame_duration) => None,
            };

            let mut quit = false;
            let mut pending = first;
            while let Some(action) = pending {
                if self.handle(action) {
                    quit = true;
                    break;
                }
                pending = self.rx.try_recv().ok();
            }

            if quit {
                break;
            }
        }

        self.subscription_manager.shutdown().await;
        Ok(())
    }

    /// Applies one action. Returns `true` if the application should quit.
    fn handle(&mut self, action: Action<A::Message>) -> bool {
        match action {
            Action::Quit => true,
            Action::Message(msg) => {
                let cmd = self.app.update(msg);
                self.execute(cmd);
                self.subscription_manager.update(self.app.subscriptions());
                trace!(
                    subscriptions = self.subscription_manager.len(),
                    "subscriptions reconciled"
                );
                false
            }
        }
    }

    fn execute(&self, cmd: Command<A::Message>) {
        if let Some(mut stream) = cmd.stream {
            let tx = self.tx.clone();
            tokio::spawn(async move {
                while let Some(action) = stream.next().await {
                    if tx.send(action).is_err() {
                        break;
                    }
                }
            });
        }
    }
}
