use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::api::BlogPost;
use crate::command::Command;
use crate::query::{QueryResult, QueryState};
use crate::subscription::Subscription;

use super::{Route, Services};

#[derive(Debug, Clone)]
pub enum Message {
    Posts(QueryResult<Vec<BlogPost>>),
    Up,
    Down,
    Open,
    Navigate(Route),
}

/// The home screen: every post, newest first.
pub struct ListView {
    services: Services,
    posts: QueryState<Vec<BlogPost>>,
    selected: usize,
}

impl ListView {
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self {
            services,
            posts: QueryState::Loading,
            selected: 0,
        }
    }

    #[must_use]
    pub const fn posts(&self) -> &QueryState<Vec<BlogPost>> {
        &self.posts
    }

    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    fn loaded(&self) -> &[BlogPost] {
        match &self.posts {
            QueryState::Success { data, .. } => data.as_slice(),
            _ => &[],
        }
    }

    /// Translates a key press into a message for this screen.
    #[must_use]
    pub fn on_key(&self, key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Message::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::Down),
            KeyCode::Enter => Some(Message::Open),
            KeyCode::Char('n') => Some(Message::Navigate(Route::Create)),
            _ => None,
        }
    }

    pub fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Posts(result) => {
                self.posts = result.state;
                self.selected = self.selected.min(self.loaded().len().saturating_sub(1));
                Command::none()
            }
            Message::Up => {
                self.selected = self.selected.saturating_sub(1);
                Command::none()
            }
            Message::Down => {
                self.selected = (self.selected + 1).min(self.loaded().len().saturating_sub(1));
                Command::none()
            }
            Message::Open => match self.loaded().get(self.selected) {
                Some(post) => Command::message(Message::Navigate(Route::Detail(post.id.clone()))),
                None => Command::none(),
            },
            // routed by the application before it reaches the screen
            Message::Navigate(_) => Command::none(),
        }
    }

    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription<Message>> {
        vec![Subscription::new(self.services.posts_query()).map(Message::Posts)]
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let refreshing = matches!(self.posts, QueryState::Success { is_stale: true, .. });
        let title = if refreshing {
            "Posts (refreshing) ↑/↓ select, Enter open, n new, q quit"
        } else {
            "Posts ↑/↓ select, Enter open, n new, q quit"
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        match &self.posts {
            QueryState::Loading => {
                frame.render_widget(Paragraph::new("Loading posts...").block(block), area);
            }
            QueryState::Error(e) => {
                let text = format!("Failed to load posts: {e}");
                frame.render_widget(
                    Paragraph::new(text).wrap(Wrap { trim: true }).block(block),
                    area,
                );
            }
            QueryState::Success { data, .. } if data.is_empty() => {
                frame.render_widget(
                    Paragraph::new("No posts yet. Press n to write one.").block(block),
                    area,
                );
            }
            QueryState::Success { data, .. } => {
                let items: Vec<ListItem> = data
                    .iter()
                    .enumerate()
                    .map(|(i, post)| {
                        let marker = if i == self.selected { ">" } else { " " };
                        let category = post.primary_category().unwrap_or("-");
                        ListItem::new(format!(
                            "{marker} {}  [{category}] {}",
                            post.title,
                            post.display_date()
                        ))
                    })
                    .collect();
                frame.render_widget(List::new(items).block(block), area);
            }
        }
    }
}
