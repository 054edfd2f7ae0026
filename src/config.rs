//! Runtime configuration.
//!
//! The only external setting is the API base address, read from
//! [`API_URL_ENV`]. Everything else is a named constant carried on [`Config`] so
//! tests can override it.

use reqwest::Url;
use thiserror::Error;

/// Environment variable holding the API base address.
pub const API_URL_ENV: &str = "FOLIO_API_URL";

/// Base address used when [`API_URL_ENV`] is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Category given to posts created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Cover image given to posts created without one.
pub const DEFAULT_COVER_IMAGE: &str =
    "https://images.unsplash.com/photo-1499750310159-5b9887b50d56?w=800&q=80";

pub const DEFAULT_FRAME_RATE: u32 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {API_URL_ENV} `{value}`: {reason}")]
    InvalidApiUrl { value: String, reason: String },
}

/// Values substituted into blank fields of the create form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDefaults {
    pub category: String,
    pub cover_image: String,
}

impl Default for PostDefaults {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            cover_image: DEFAULT_COVER_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the blog API; `/blogs` is resolved against it.
    pub api_url: Url,
    pub post_defaults: PostDefaults,
    pub frame_rate: u32,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if [`API_URL_ENV`] is set to something that is not an
    /// absolute `http` or `https` URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_api_url(std::env::var(API_URL_ENV).ok().as_deref())
    }

    /// Builds a configuration for the given base address, or the default one.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not an absolute `http` or `https` URL.
    pub fn with_api_url(api_url: Option<&str>) -> Result<Self, ConfigError> {
        let value = api_url.map_or(DEFAULT_API_URL, str::trim);
        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            value: value.to_string(),
            reason,
        };

        let api_url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", api_url.scheme())));
        }

        Ok(Self {
            api_url,
            post_defaults: PostDefaults::default(),
            frame_rate: DEFAULT_FRAME_RATE,
        })
    }
}
