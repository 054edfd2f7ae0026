use std::sync::Arc;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::{debug, warn};

use crate::api::{BlogPost, NewBlogPost, PostDraft};
use crate::command::Command;
use crate::config::PostDefaults;
use crate::query::{Mutation, MutationState, QueryError};
use crate::subscription::Subscription;

use super::{POSTS, Route, Services};

/// A field of the create form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Category,
    Description,
    Content,
    CoverImage,
}

impl Field {
    const ALL: [Self; 5] = [
        Self::Title,
        Self::Category,
        Self::Description,
        Self::Content,
        Self::CoverImage,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title *",
            Self::Category => "Category",
            Self::Description => "Description *",
            Self::Content => "Content *",
            Self::CoverImage => "Cover image URL",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Input(char),
    Backspace,
    NextField,
    PrevField,
    Submit,
    Created(Result<BlogPost, QueryError>),
    Navigate(Route),
}

/// The form for writing a new post.
///
/// Submitting runs a single mutation. While it is pending the form is locked
/// and further submits are ignored. On success the cached post list is
/// invalidated before the screen asks to go back to the list.
pub struct CreateView {
    services: Services,
    defaults: PostDefaults,
    draft: PostDraft,
    focus: Field,
    mutation: MutationState<BlogPost>,
    missing: Vec<&'static str>,
}

impl CreateView {
    #[must_use]
    pub fn new(services: Services, defaults: PostDefaults) -> Self {
        Self {
            services,
            defaults,
            draft: PostDraft::default(),
            focus: Field::Title,
            mutation: MutationState::Idle,
            missing: vec![],
        }
    }

    #[must_use]
    pub const fn draft(&self) -> &PostDraft {
        &self.draft
    }

    #[must_use]
    pub const fn focus(&self) -> Field {
        self.focus
    }

    #[must_use]
    pub const fn mutation(&self) -> &MutationState<BlogPost> {
        &self.mutation
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.mutation.is_loading()
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Title => &mut self.draft.title,
            Field::Category => &mut self.draft.category,
            Field::Description => &mut self.draft.description,
            Field::Content => &mut self.draft.content,
            Field::CoverImage => &mut self.draft.cover_image,
        }
    }

    const fn field(&self, field: Field) -> &String {
        match field {
            Field::Title => &self.draft.title,
            Field::Category => &self.draft.category,
            Field::Description => &self.draft.description,
            Field::Content => &self.draft.content,
            Field::CoverImage => &self.draft.cover_image,
        }
    }

    /// Translates a key press into a message for this screen.
    ///
    /// Every printable key is text input here, so the form has no single-letter
    /// shortcuts.
    #[must_use]
    pub fn on_key(&self, key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Esc => Some(Message::Navigate(Route::Home)),
            KeyCode::Enter => Some(Message::Submit),
            KeyCode::Tab => Some(Message::NextField),
            KeyCode::BackTab => Some(Message::PrevField),
            KeyCode::Backspace => Some(Message::Backspace),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Message::Input(c))
            }
            _ => None,
        }
    }

    pub fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Input(c) => {
                if !self.is_submitting() {
                    self.field_mut().push(c);
                }
                Command::none()
            }
            Message::Backspace => {
                if !self.is_submitting() {
                    self.field_mut().pop();
                }
                Command::none()
            }
            Message::NextField => {
                self.focus = self.focus.next();
                Command::none()
            }
            Message::PrevField => {
                self.focus = self.focus.prev();
                Command::none()
            }
            Message::Submit => self.submit(),
            Message::Created(Ok(post)) => {
                debug!(id = %post.id, "post published");
                self.mutation = MutationState::Success(post);
                Command::message(Message::Navigate(Route::Home))
            }
            Message::Created(Err(e)) => {
                warn!(error = %e, "publishing failed");
                self.mutation = MutationState::Error(e);
                Command::none()
            }
            // routed by the application before it reaches the screen
            Message::Navigate(_) => Command::none(),
        }
    }

    fn submit(&mut self) -> Command<Message> {
        if self.is_submitting() {
            debug!("submit ignored while publishing");
            return Command::none();
        }

        self.missing = self.draft.missing_fields();
        if !self.missing.is_empty() {
            return Command::none();
        }

        let post = NewBlogPost::from_draft(&self.draft, &self.defaults, Utc::now());
        self.mutation = MutationState::Loading;

        let api = Arc::clone(&self.services.api);
        let client = Arc::clone(&self.services.query_client);
        Mutation::mutate(post, move |post| {
            Box::pin(async move {
                let created = api.create_post(post).await?;
                // the mutation outlives the screen if it is left mid-flight
                client.invalidate(POSTS);
                Ok::<_, QueryError>(created)
            })
        })
        .map(Message::Created)
    }

    /// The form reads nothing from the cache.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription<Message>> {
        vec![]
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut constraints: Vec<Constraint> = Field::ALL
            .iter()
            .map(|field| match field {
                Field::Content => Constraint::Min(3),
                _ => Constraint::Length(3),
            })
            .collect();
        constraints.push(Constraint::Length(3));
        let areas = Layout::vertical(constraints).split(area);

        for (field, area) in Field::ALL.iter().zip(areas.iter()) {
            let focused = *field == self.focus;
            let style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let mut value = self.field(*field).clone();
            if focused && !self.is_submitting() {
                value.push('_');
            }

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(field.label());
            frame.render_widget(
                Paragraph::new(value).wrap(Wrap { trim: false }).block(block),
                *area,
            );
        }

        let status = match &self.mutation {
            MutationState::Loading => "Publishing...".to_string(),
            MutationState::Error(e) => format!("Failed to publish: {e}"),
            MutationState::Success(_) => "Published".to_string(),
            MutationState::Idle if !self.missing.is_empty() => {
                format!("Required: {}", self.missing.join(", "))
            }
            MutationState::Idle => "Tab next field, Enter publish, Esc cancel".to_string(),
        };
        if let Some(area) = areas.last() {
            frame.render_widget(
                Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("New post")),
                *area,
            );
        }
    }
}
