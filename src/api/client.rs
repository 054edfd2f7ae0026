use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use tracing::{debug, warn};

use crate::query::QueryError;

use super::BlogSource;
use super::post::{BlogPost, NewBlogPost, sort_newest_first};

/// [`BlogSource`] backed by a JSON collection served over HTTP.
///
/// Posts live under `{base_url}/blogs`.
///
/// # Example
///
/// ```rust,no_run
/// use folio::api::{BlogClient, BlogSource};
/// use reqwest::Url;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BlogClient::new(Url::parse("http://localhost:3001")?);
/// let posts = client.list_posts().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BlogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BlogClient {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Uses a preconfigured `reqwest` client, e.g. one with custom timeouts.
    #[must_use]
    pub const fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url, QueryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| QueryError::Network(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push("blogs")
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl BlogSource for BlogClient {
    async fn list_posts(&self) -> Result<Vec<BlogPost>, QueryError> {
        let url = self.url(&[])?;
        debug!(%url, "listing posts");

        let response = self.http.get(url).send().await.map_err(network)?;
        let response = success(response)
            .await
            .map_err(|failure| QueryError::Network(failure.detail()))?;

        let mut posts: Vec<BlogPost> = response.json().await.map_err(network)?;
        sort_newest_first(&mut posts);
        debug!(count = posts.len(), "listed posts");
        Ok(posts)
    }

    async fn get_post(&self, id: &str) -> Result<BlogPost, QueryError> {
        let url = self.url(&[id])?;
        debug!(%url, "fetching post");

        let response = self.http.get(url).send().await.map_err(network)?;
        let response = success(response).await.map_err(|failure| {
            if failure.status == StatusCode::NOT_FOUND {
                QueryError::NotFound(format!("post {id}"))
            } else {
                QueryError::Network(failure.detail())
            }
        })?;

        response.json().await.map_err(network)
    }

    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPost, QueryError> {
        let url = self.url(&[])?;
        debug!(%url, title = %post.title, "creating post");

        let response = self.http.post(url).json(&post).send().await.map_err(network)?;
        let response = success(response).await.map_err(|failure| {
            if matches!(
                failure.status,
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
            ) {
                QueryError::Validation(failure.detail())
            } else {
                QueryError::Network(failure.detail())
            }
        })?;

        let created: BlogPost = response.json().await.map_err(network)?;
        debug!(id = %created.id, "created post");
        Ok(created)
    }
}

/// A non-success response: its status and whatever body text it carried.
struct Failure {
    status: StatusCode,
    body: String,
}

impl Failure {
    fn detail(&self) -> String {
        match self.body.trim() {
            "" => format!("HTTP {}", self.status),
            body => format!("HTTP {}: {body}", self.status),
        }
    }
}

async fn success(response: Response) -> Result<Response, Failure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(%status, "request failed");
    Err(Failure { status, body })
}

#[allow(clippy::needless_pass_by_value)]
fn network(e: reqwest::Error) -> QueryError {
    QueryError::Network(e.to_string())
}
