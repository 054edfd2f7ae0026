use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PostDefaults;

/// A blog post as stored by the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Assigned by the server; numeric ids are accepted and held as text.
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    pub title: String,
    /// Ordered labels; the first one is the primary category.
    #[serde(default, deserialize_with = "wire::category")]
    pub category: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(with = "wire::date")]
    pub date: DateTime<Utc>,
}

impl BlogPost {
    /// The label shown next to the post, if it has any category.
    #[must_use]
    pub fn primary_category(&self) -> Option<&str> {
        self.category.first().map(String::as_str)
    }

    /// The publication date in long form, e.g. `March 1, 2024`.
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }
}

/// The payload of a create request: a post without its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogPost {
    pub title: String,
    pub category: Vec<String>,
    pub description: String,
    pub content: String,
    pub cover_image: String,
    #[serde(with = "wire::date")]
    pub date: DateTime<Utc>,
}

impl NewBlogPost {
    /// Builds the payload for a form submitted at `now`.
    ///
    /// Blank category and cover image fall back to `defaults`; every text field
    /// is trimmed.
    #[must_use]
    pub fn from_draft(draft: &PostDraft, defaults: &PostDefaults, now: DateTime<Utc>) -> Self {
        let category = match draft.category.trim() {
            "" => defaults.category.clone(),
            label => label.to_string(),
        };
        let cover_image = match draft.cover_image.trim() {
            "" => defaults.cover_image.clone(),
            url => url.to_string(),
        };

        Self {
            title: draft.title.trim().to_string(),
            category: vec![category],
            description: draft.description.trim().to_string(),
            content: draft.content.trim().to_string(),
            cover_image,
            date: now,
        }
    }

    /// Attaches a server-assigned id.
    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> BlogPost {
        BlogPost {
            id: id.into(),
            title: self.title,
            category: self.category,
            description: self.description,
            content: self.content,
            cover_image: self.cover_image,
            date: self.date,
        }
    }
}

/// Raw input of the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub category: String,
    pub description: String,
    pub content: String,
    pub cover_image: String,
}

impl PostDraft {
    /// Names of required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("content", &self.content),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Orders posts newest first. Posts with equal dates keep their relative order.
pub fn sort_newest_first(posts: &mut [BlogPost]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Lenient decoders for records written by other clients.
mod wire {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(D::Error::custom(format!("invalid post id: {other}"))),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Labels {
        One(String),
        Many(Vec<String>),
    }

    pub fn category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Option::<Labels>::deserialize(deserializer)? {
            Some(Labels::Many(labels)) => labels,
            Some(Labels::One(label)) if !label.is_empty() => vec![label],
            Some(Labels::One(_)) | None => Vec::new(),
        })
    }

    pub mod date {
        use chrono::{DateTime, SecondsFormat, Utc};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<DateTime<Utc>, D::Error> {
            let raw = String::deserialize(deserializer)?;
            super::parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
        }
    }

    /// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
    pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|date| date.and_utc())
    }
}
