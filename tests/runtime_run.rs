// End-to-end runs of the runtime against an off-screen terminal.
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use folio::{
    api::{BlogPost, BlogSource, MemoryBlogs},
    application::Application,
    command::{Action, Command},
    query::{Query, QueryClient, QueryKey, QueryResult, QueryState},
    runtime::Runtime,
    subscription::Subscription,
};
use ratatui::{Frame, Terminal, backend::TestBackend, widgets::Paragraph};
use tokio::time::{Duration, sleep, timeout};

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

struct MessageApp {
    received: Vec<String>,
}

impl Application for MessageApp {
    type Message = String;
    type Flags = ();

    fn new(_: ()) -> (Self, Command<String>) {
        let cmd = Command::batch(vec![
            Command::future(async { "msg1".to_string() }),
            Command::future(async { "msg2".to_string() }),
            Command::message("msg3".to_string()),
        ]);
        (Self { received: vec![] }, cmd)
    }

    fn update(&mut self, msg: String) -> Command<String> {
        self.received.push(msg);
        if self.received.len() >= 3 {
            Command::effect(Action::Quit)
        } else {
            Command::none()
        }
    }

    fn view(&self, frame: &mut Frame<'_>) {
        frame.render_widget(Paragraph::new(self.received.join(",")), frame.area());
    }

    fn subscriptions(&self) -> Vec<Subscription<String>> {
        vec![]
    }
}

#[tokio::test]
async fn test_runtime_processes_batched_commands() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let runtime = Runtime::<MessageApp>::new((), 60);

    let result = timeout(Duration::from_secs(1), runtime.run(&mut terminal)).await;

    assert!(result.is_ok());
    assert!(result.unwrap().is_ok());
}

/// Shows the title of one post read through the query cache.
struct PostApp {
    blogs: Arc<MemoryBlogs>,
    client: Arc<QueryClient>,
    post: QueryState<BlogPost>,
}

enum PostMessage {
    Post(QueryResult<BlogPost>),
    Quit,
}

impl Application for PostApp {
    type Message = PostMessage;
    type Flags = (Arc<MemoryBlogs>, Arc<QueryClient>);

    fn new((blogs, client): Self::Flags) -> (Self, Command<PostMessage>) {
        let app = Self {
            blogs,
            client,
            post: QueryState::Loading,
        };
        (app, Command::none())
    }

    fn update(&mut self, msg: PostMessage) -> Command<PostMessage> {
        match msg {
            PostMessage::Post(result) => {
                self.post = result.state;
                if matches!(self.post, QueryState::Loading) {
                    return Command::none();
                }
                // let at least one frame show the result
                Command::future(async {
                    sleep(Duration::from_millis(50)).await;
                    PostMessage::Quit
                })
            }
            PostMessage::Quit => Command::effect(Action::Quit),
        }
    }

    fn view(&self, frame: &mut Frame<'_>) {
        let text = match &self.post {
            QueryState::Loading => "loading".to_string(),
            QueryState::Success { data, .. } => format!("title: {}", data.title),
            QueryState::Error(e) => format!("error: {e}"),
        };
        frame.render_widget(Paragraph::new(text), frame.area());
    }

    fn subscriptions(&self) -> Vec<Subscription<PostMessage>> {
        let blogs = Arc::clone(&self.blogs);
        let query = Query::new(
            QueryKey::item("posts", "1"),
            move || {
                let blogs = Arc::clone(&blogs);
                Box::pin(async move { blogs.get_post("1").await })
            },
            Arc::clone(&self.client),
        );
        vec![Subscription::new(query).map(PostMessage::Post)]
    }
}

fn hello_post() -> BlogPost {
    serde_json::from_value(serde_json::json!({
        "id": "1",
        "title": "Hello",
        "category": ["TECH"],
        "date": "2024-03-01"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_runtime_renders_query_result() {
    let blogs = Arc::new(MemoryBlogs::with_posts([hello_post()]));
    let client = Arc::new(QueryClient::new());

    let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
    let runtime = Runtime::<PostApp>::new((Arc::clone(&blogs), client), 60);
    let result = timeout(Duration::from_secs(1), runtime.run(&mut terminal)).await;

    assert!(result.is_ok());
    assert!(result.unwrap().is_ok());
    assert!(screen_text(&terminal).contains("title: Hello"));
    assert_eq!(blogs.get_calls(), 1);
}

#[tokio::test]
async fn test_runtime_renders_query_failure() {
    let blogs = Arc::new(MemoryBlogs::with_posts([hello_post()]));
    blogs.set_offline(true);

    let mut terminal = Terminal::new(TestBackend::new(60, 4)).unwrap();
    let runtime = Runtime::<PostApp>::new((blogs, Arc::new(QueryClient::new())), 60);
    let result = timeout(Duration::from_secs(1), runtime.run(&mut terminal)).await;

    assert!(result.is_ok());
    assert!(result.unwrap().is_ok());
    assert!(screen_text(&terminal).contains("error: Network error: connection refused"));
}
