use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use tracing::trace;

use crate::api::BlogPost;
use crate::command::Command;
use crate::query::{QueryKey, QueryResult, QueryState};
use crate::subscription::Subscription;

use super::{POSTS, Route, Services};

/// Most posts listed under "related".
pub const RELATED_LIMIT: u16 = 4;

#[derive(Debug, Clone)]
pub enum Message {
    Post(QueryResult<BlogPost>),
    Related(QueryResult<Vec<BlogPost>>),
    /// Opens the n-th related post, counting from zero.
    OpenRelated(usize),
    Navigate(Route),
}

/// What the main panel of the detail screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loading,
    NotFound,
    Failed,
    Ready,
}

/// A single post plus a short list of other posts.
///
/// The post and the related list are independent reads; a failing related
/// list never hides the post.
pub struct DetailView {
    services: Services,
    id: String,
    post: QueryState<BlogPost>,
    related: QueryState<Vec<BlogPost>>,
}

impl DetailView {
    #[must_use]
    pub fn new(services: Services, id: impl Into<String>) -> Self {
        Self {
            services,
            id: id.into(),
            post: QueryState::Loading,
            related: QueryState::Loading,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn post(&self) -> &QueryState<BlogPost> {
        &self.post
    }

    #[must_use]
    pub fn status(&self) -> Status {
        match &self.post {
            QueryState::Loading => Status::Loading,
            QueryState::Error(e) if e.is_not_found() => Status::NotFound,
            QueryState::Error(_) => Status::Failed,
            QueryState::Success { .. } => Status::Ready,
        }
    }

    /// Up to [`RELATED_LIMIT`] posts other than this one, newest first.
    #[must_use]
    pub fn related(&self) -> Vec<&BlogPost> {
        match &self.related {
            QueryState::Success { data, .. } => data
                .iter()
                .filter(|post| post.id != self.id)
                .take(usize::from(RELATED_LIMIT))
                .collect(),
            _ => vec![],
        }
    }

    #[must_use]
    pub fn on_key(&self, key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                Some(Message::Navigate(Route::Home))
            }
            KeyCode::Char(c @ '1'..='4') => c
                .to_digit(10)
                .and_then(|n| usize::try_from(n).ok())
                .map(|n| Message::OpenRelated(n - 1)),
            _ => None,
        }
    }

    pub fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Post(result) => {
                if result.key == QueryKey::item(POSTS, self.id.as_str()) {
                    self.post = result.state;
                } else {
                    trace!(key = %result.key, showing = %self.id, "discarding result for another post");
                }
                Command::none()
            }
            Message::Related(result) => {
                if result.key == QueryKey::list(POSTS) {
                    self.related = result.state;
                }
                Command::none()
            }
            Message::OpenRelated(index) => match self.related().get(index) {
                Some(post) => Command::message(Message::Navigate(Route::Detail(post.id.clone()))),
                None => Command::none(),
            },
            // routed by the application before it reaches the screen
            Message::Navigate(_) => Command::none(),
        }
    }

    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription<Message>> {
        vec![
            Subscription::new(self.services.post_query(&self.id)).map(Message::Post),
            Subscription::new(self.services.posts_query()).map(Message::Related),
        ]
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let [main, related] = Layout::vertical([
            Constraint::Min(5),
            Constraint::Length(RELATED_LIMIT + 2),
        ])
        .areas(area);

        self.render_post(frame, main);
        self.render_related(frame, related);
    }

    fn render_post(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = match &self.post {
            QueryState::Success { is_stale: true, .. } => "Post (refreshing) Esc back",
            _ => "Post Esc back",
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        let text = match &self.post {
            QueryState::Loading => Text::from("Loading post..."),
            QueryState::Error(e) if e.is_not_found() => Text::from(vec![
                Line::from("Post not found").bold(),
                Line::from(format!("There is no post with id {}.", self.id)),
            ]),
            QueryState::Error(e) => Text::from(format!("Failed to load post: {e}")),
            QueryState::Success { data: post, .. } => {
                let category = post.primary_category().unwrap_or("Uncategorized");
                Text::from(vec![
                    Line::from(post.title.as_str()).bold(),
                    Line::from(format!("{category} | {}", post.display_date())),
                    Line::default(),
                    Line::from(post.description.as_str()).italic(),
                    Line::default(),
                    Line::from(post.content.as_str()),
                ])
            }
        };

        frame.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: false }).block(block),
            area,
        );
    }

    fn render_related(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Related posts 1-4 open");

        let placeholder = match &self.related {
            QueryState::Loading => Some("Loading related posts..."),
            QueryState::Error(_) => Some("Related posts unavailable"),
            QueryState::Success { .. } if self.related().is_empty() => Some("No related posts"),
            QueryState::Success { .. } => None,
        };

        if let Some(text) = placeholder {
            frame.render_widget(Paragraph::new(text).block(block), area);
            return;
        }

        let items: Vec<ListItem> = self
            .related()
            .into_iter()
            .enumerate()
            .map(|(i, post)| ListItem::new(format!("{}. {}", i + 1, post.title)))
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::api::MemoryBlogs;
    use crate::query::QueryError;
    use crate::views::testing::{messages, post, render, services, take};

    fn view(id: &str) -> DetailView {
        DetailView::new(services(Arc::new(MemoryBlogs::new())), id)
    }

    fn post_result(id: &str, state: QueryState<BlogPost>) -> Message {
        Message::Post(QueryResult {
            key: QueryKey::item(POSTS, id),
            state,
        })
    }

    fn related_result(state: QueryState<Vec<BlogPost>>) -> Message {
        Message::Related(QueryResult {
            key: QueryKey::list(POSTS),
            state,
        })
    }

    fn ready<T>(data: T) -> QueryState<T> {
        QueryState::Success {
            data,
            is_stale: false,
        }
    }

    fn draw(view: &DetailView) -> String {
        render(60, 16, |frame| {
            let area = frame.area();
            view.render(frame, area);
        })
    }

    #[test]
    fn test_discards_results_for_other_posts() {
        let mut view = view("43");

        let _ = view.update(post_result("42", ready(post("42", 1))));
        assert_eq!(view.status(), Status::Loading);

        let _ = view.update(post_result("43", ready(post("43", 2))));
        let _ = view.update(post_result("42", ready(post("42", 1))));
        assert_eq!(view.post(), &ready(post("43", 2)));
    }

    #[test]
    fn test_not_found_has_its_own_state() {
        let mut view = view("missing-id");
        let _ = view.update(post_result(
            "missing-id",
            QueryState::Error(QueryError::NotFound("post missing-id".to_string())),
        ));

        assert_eq!(view.status(), Status::NotFound);
        let screen = draw(&view);
        assert!(screen.contains("Post not found"));
        assert!(!screen.contains("Loading post"));
    }

    #[test]
    fn test_other_failures_render_generic_message() {
        let mut view = view("1");
        let _ = view.update(post_result(
            "1",
            QueryState::Error(QueryError::Network("HTTP 500".to_string())),
        ));

        assert_eq!(view.status(), Status::Failed);
        assert!(draw(&view).contains("Failed to load post"));
    }

    #[test]
    fn test_related_failure_does_not_hide_post() {
        let mut view = view("1");
        let _ = view.update(post_result("1", ready(post("1", 1))));
        let _ = view.update(related_result(QueryState::Error(QueryError::Network(
            "HTTP 503".to_string(),
        ))));

        let screen = draw(&view);
        assert!(screen.contains("Post 1"));
        assert!(screen.contains("Body of 1"));
        assert!(screen.contains("Related posts unavailable"));
    }

    #[test]
    fn test_related_excludes_current_and_is_capped() {
        let mut view = view("3");
        let all: Vec<_> = (1..=6).rev().map(|n| post(&n.to_string(), n)).collect();
        let _ = view.update(related_result(ready(all)));

        let ids: Vec<_> = view.related().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["6", "5", "4", "2"]);

        let screen = draw(&view);
        assert!(screen.contains("1. Post 6"));
        assert!(screen.contains("4. Post 2"));
    }

    #[tokio::test]
    async fn test_open_related() {
        let mut view = view("1");
        let _ = view.update(related_result(ready(vec![post("2", 2), post("1", 1)])));

        let key = view
            .on_key(KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE))
            .expect("digit opens a related post");
        let out = messages(view.update(key)).await;
        assert!(matches!(
            out.as_slice(),
            [Message::Navigate(Route::Detail(id))] if id == "2"
        ));

        assert!(view.update(Message::OpenRelated(3)).is_none());
    }

    #[test]
    fn test_escape_goes_home() {
        let view = view("1");
        assert!(matches!(
            view.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Message::Navigate(Route::Home))
        ));
    }

    #[tokio::test]
    async fn test_subscriptions_read_post_and_list() {
        let blogs = Arc::new(MemoryBlogs::with_posts([post("1", 1), post("2", 2)]));
        let mut view = DetailView::new(services(Arc::clone(&blogs)), "1");

        let subs = view.subscriptions();
        assert_eq!(subs.len(), 2);
        for sub in &subs {
            for msg in take(sub, 2).await {
                let _ = view.update(msg);
            }
        }

        assert_eq!(view.status(), Status::Ready);
        assert_eq!(view.related().len(), 1);
        assert_eq!(blogs.get_calls(), 1);
        assert_eq!(blogs.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_post_renders_not_found() {
        let blogs = Arc::new(MemoryBlogs::with_posts([post("1", 1)]));
        let mut view = DetailView::new(services(blogs), "missing-id");

        let subs = view.subscriptions();
        for msg in take(&subs[0], 2).await {
            let _ = view.update(msg);
        }

        assert_eq!(view.status(), Status::NotFound);
        assert!(draw(&view).contains("Post not found"));
    }
}
