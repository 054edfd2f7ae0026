//! The application shell: routing between screens and global keys.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use tracing::{error, info};

use crate::application::Application;
use crate::command::{Action, Command};
use crate::config::Config;
use crate::subscription::{Subscription, terminal::TerminalEvents};
use crate::views::create::{self, CreateView};
use crate::views::detail::{self, DetailView};
use crate::views::list::{self, ListView};
use crate::views::{Route, Services};

/// Everything the application needs to start.
#[derive(Clone)]
pub struct Flags {
    pub config: Config,
    pub services: Services,
}

#[derive(Debug)]
pub enum Message {
    Terminal(Event),
    TerminalError(String),
    Navigate(Route),
    Quit,
    List(list::Message),
    Detail(detail::Message),
    Create(create::Message),
}

/// The screen currently shown.
pub enum Screen {
    List(ListView),
    Detail(DetailView),
    Create(CreateView),
}

pub struct App {
    config: Config,
    services: Services,
    route: Route,
    screen: Screen,
    /// Bumped on every navigation; scopes the screen's subscriptions.
    visit: u64,
}

impl App {
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    fn screen_for(&self, route: &Route) -> Screen {
        let services = self.services.clone();
        match route {
            Route::Home => Screen::List(ListView::new(services)),
            Route::Detail(id) => Screen::Detail(DetailView::new(services, id.as_str())),
            Route::Create => {
                Screen::Create(CreateView::new(services, self.config.post_defaults.clone()))
            }
        }
    }

    fn navigate(&mut self, route: Route) -> Command<Message> {
        if route == self.route {
            return Command::none();
        }
        info!(from = ?self.route, to = ?route, "navigating");
        self.screen = self.screen_for(&route);
        self.route = route;
        self.visit += 1;
        Command::none()
    }

    /// Subscriptions of the current screen.
    ///
    /// The list and detail screens both read the post list. Scoping by visit
    /// keeps a new screen from inheriting a stream mapped into the one it
    /// replaced.
    fn screen_subscriptions(&self) -> Vec<Subscription<Message>> {
        let visit = self.visit;
        match &self.screen {
            Screen::List(view) => view
                .subscriptions()
                .into_iter()
                .map(|s| s.map(Message::List).scoped(visit))
                .collect(),
            Screen::Detail(view) => view
                .subscriptions()
                .into_iter()
                .map(|s| s.map(Message::Detail).scoped(visit))
                .collect(),
            Screen::Create(view) => view
                .subscriptions()
                .into_iter()
                .map(|s| s.map(Message::Create).scoped(visit))
                .collect(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Command<Message> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Command::effect(Action::Quit);
        }

        let msg = match &self.screen {
            // every letter is text on the form
            Screen::List(_) | Screen::Detail(_) if key.code == KeyCode::Char('q') => {
                Some(Message::Quit)
            }
            Screen::List(view) => view.on_key(key).map(Message::List),
            Screen::Detail(view) => view.on_key(key).map(Message::Detail),
            Screen::Create(view) => view.on_key(key).map(Message::Create),
        };

        match msg {
            Some(msg) => self.update(msg),
            None => Command::none(),
        }
    }
}

impl Application for App {
    type Message = Message;
    type Flags = Flags;

    fn new(flags: Flags) -> (Self, Command<Message>) {
        let Flags { config, services } = flags;
        let app = Self {
            screen: Screen::List(ListView::new(services.clone())),
            route: Route::Home,
            config,
            services,
            visit: 0,
        };
        (app, Command::none())
    }

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => self.on_key(key),
            Message::Terminal(_) => Command::none(),
            Message::TerminalError(e) => {
                error!(error = %e, "terminal input failed");
                Command::effect(Action::Quit)
            }
            Message::Quit => Command::effect(Action::Quit),
            Message::Navigate(route)
            | Message::List(list::Message::Navigate(route))
            | Message::Detail(detail::Message::Navigate(route))
            | Message::Create(create::Message::Navigate(route)) => self.navigate(route),
            // messages for a screen that is no longer shown are dropped
            Message::List(msg) => match &mut self.screen {
                Screen::List(view) => view.update(msg).map(Message::List),
                _ => Command::none(),
            },
            Message::Detail(msg) => match &mut self.screen {
                Screen::Detail(view) => view.update(msg).map(Message::Detail),
                _ => Command::none(),
            },
            Message::Create(msg) => match &mut self.screen {
                Screen::Create(view) => view.update(msg).map(Message::Create),
                _ => Command::none(),
            },
        }
    }

    fn view(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        match &self.screen {
            Screen::List(view) => view.render(frame, area),
            Screen::Detail(view) => view.render(frame, area),
            Screen::Create(view) => view.render(frame, area),
        }
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        let mut subs = vec![
            Subscription::new(TerminalEvents::new()).map(|result| match result {
                Ok(event) => Message::Terminal(event),
                Err(e) => Message::TerminalError(e.to_string()),
            }),
        ];
        subs.extend(self.screen_subscriptions());
        subs
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use super::*;
    use crate::api::MemoryBlogs;
    use crate::query::QueryState;
    use crate::subscription::SubscriptionManager;
    use crate::views::detail::Status;
    use crate::views::testing::{post, services, take};

    fn app(blogs: Arc<MemoryBlogs>) -> App {
        let flags = Flags {
            config: Config::with_api_url(None).expect("default config"),
            services: services(blogs),
        };
        App::new(flags).0
    }

    fn press(code: KeyCode) -> Message {
        Message::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    /// Feeds the messages of a command back into the app until it settles.
    async fn run(app: &mut App, cmd: Command<Message>) -> bool {
        let mut pending = vec![cmd];
        while let Some(cmd) = pending.pop() {
            if let Some(mut stream) = cmd.stream {
                while let Some(action) = stream.next().await {
                    match action {
                        Action::Message(msg) => pending.push(app.update(msg)),
                        Action::Quit => return true,
                    }
                }
            }
        }
        false
    }

    #[tokio::test]
    async fn test_starts_on_list() {
        let app = app(Arc::new(MemoryBlogs::new()));
        assert_eq!(app.route(), &Route::Home);
        assert!(matches!(app.screen(), Screen::List(_)));
        // terminal input plus the post list
        assert_eq!(app.subscriptions().len(), 2);
    }

    #[tokio::test]
    async fn test_q_quits_outside_the_form() {
        let mut app = app(Arc::new(MemoryBlogs::new()));
        let cmd = app.update(press(KeyCode::Char('q')));
        assert!(run(&mut app, cmd).await);
    }

    #[tokio::test]
    async fn test_q_is_text_on_the_form() {
        let mut app = app(Arc::new(MemoryBlogs::new()));
        let cmd = app.update(press(KeyCode::Char('n')));
        assert!(!run(&mut app, cmd).await);
        assert_eq!(app.route(), &Route::Create);

        let cmd = app.update(press(KeyCode::Char('q')));
        assert!(!run(&mut app, cmd).await);
        match app.screen() {
            Screen::Create(view) => assert_eq!(view.draft().title, "q"),
            _ => panic!("expected the create form"),
        }
    }

    /// Screen subscriptions driven through a real manager, as the runtime
    /// does, minus terminal input.
    struct Driver {
        manager: SubscriptionManager<Message>,
        rx: mpsc::UnboundedReceiver<Action<Message>>,
    }

    impl Driver {
        fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                manager: SubscriptionManager::new(tx),
                rx,
            }
        }

        /// Delivers subscription messages until none arrive for a while.
        async fn settle(&mut self, app: &mut App) {
            self.manager.update(app.screen_subscriptions());
            while let Ok(Some(action)) = timeout(Duration::from_millis(100), self.rx.recv()).await {
                if let Action::Message(msg) = action {
                    let cmd = app.update(msg);
                    run(app, cmd).await;
                }
                self.manager.update(app.screen_subscriptions());
            }
        }

        async fn press(&mut self, app: &mut App, code: KeyCode) {
            let cmd = app.update(press(code));
            run(app, cmd).await;
            self.settle(app).await;
        }
    }

    fn list_loaded(app: &App) -> bool {
        matches!(
            app.screen(),
            Screen::List(view) if matches!(view.posts(), QueryState::Success { .. })
        )
    }

    fn detail(app: &App) -> (Status, Vec<String>) {
        match app.screen() {
            Screen::Detail(view) => (
                view.status(),
                view.related().iter().map(|p| p.id.clone()).collect(),
            ),
            _ => panic!("expected the detail screen"),
        }
    }

    #[tokio::test]
    async fn test_list_to_detail_and_back() {
        let blogs = Arc::new(MemoryBlogs::with_posts([post("1", 1), post("2", 2)]));
        let mut app = app(Arc::clone(&blogs));
        let mut driver = Driver::new();

        driver.settle(&mut app).await;
        assert!(list_loaded(&app));

        driver.press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.route(), &Route::Detail("2".to_string()));
        assert_eq!(detail(&app), (Status::Ready, vec!["1".to_string()]));

        driver.press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.route(), &Route::Home);
        assert!(list_loaded(&app));

        // the list was served from the cache every time
        assert_eq!(blogs.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_related_to_related() {
        let blogs = Arc::new(MemoryBlogs::with_posts([post("1", 1), post("2", 2)]));
        let mut app = app(Arc::clone(&blogs));
        let mut driver = Driver::new();

        driver.settle(&mut app).await;
        driver.press(&mut app, KeyCode::Enter).await;
        driver.press(&mut app, KeyCode::Char('1')).await;

        assert_eq!(app.route(), &Route::Detail("1".to_string()));
        assert_eq!(detail(&app), (Status::Ready, vec!["2".to_string()]));
        assert_eq!(blogs.get_calls(), 2);
    }

    #[test]
    fn test_screen_subscriptions_are_scoped_by_visit() {
        let blogs = Arc::new(MemoryBlogs::with_posts([post("1", 1)]));
        let mut app = app(blogs);
        let home = app.screen_subscriptions()[0].id();

        let _ = app.update(Message::Navigate(Route::Detail("1".to_string())));
        let related = app.screen_subscriptions()[1].id();
        assert_ne!(home, related);

        let _ = app.update(Message::Navigate(Route::Home));
        assert_ne!(app.screen_subscriptions()[0].id(), home);
        assert_eq!(app.subscriptions().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_screen_messages_are_dropped() {
        let blogs = Arc::new(MemoryBlogs::with_posts([post("1", 1)]));
        let mut app = app(Arc::clone(&blogs));
        let _ = app.update(Message::Navigate(Route::Detail("1".to_string())));

        let list_sub = ListView::new(services(blogs)).subscriptions().remove(0);
        for msg in take(&list_sub, 2).await {
            assert!(app.update(Message::List(msg)).is_none());
        }
        assert!(matches!(app.screen(), Screen::Detail(_)));
    }

    #[tokio::test]
    async fn test_publish_returns_to_fresh_list() {
        let blogs = Arc::new(MemoryBlogs::with_posts([post("1", 1)]));
        let mut app = app(Arc::clone(&blogs));

        let cmd = app.update(Message::Navigate(Route::Create));
        run(&mut app, cmd).await;
        for msg in [
            create::Message::Input('X'),
            create::Message::NextField,
            create::Message::NextField,
            create::Message::Input('d'),
            create::Message::NextField,
            create::Message::Input('c'),
        ] {
            let _ = app.update(Message::Create(msg));
        }

        let cmd = app.update(press(KeyCode::Enter));
        run(&mut app, cmd).await;
        assert_eq!(app.route(), &Route::Home);

        let subs = app.subscriptions();
        let results = take(&subs[1], 2).await;
        match results.last() {
            Some(Message::List(list::Message::Posts(result))) => {
                assert_eq!(result.data().map(Vec::len), Some(2));
            }
            other => panic!("expected posts, got {other:?}"),
        }
    }
}
