//! Blog entries stored as `BlogEntries` records

use anyhow::{bail, Context, Result};
use netmera_sdk::{NetmeraClient, NetmeraContent, SortOrder};

pub const KIND: &str = "BlogEntries";
const TITLE: &str = "title";
const TEXT: &str = "text";
const SORT_FIELD: &str = "creationdate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub path: Option<String>,
    pub title: String,
    pub text: String,
}

impl Post {
    fn from_content(content: &NetmeraContent) -> Self {
        Self {
            path: content.path().map(str::to_string),
            title: content.get_string(TITLE).unwrap_or_default().to_string(),
            text: content.get_string(TEXT).unwrap_or_default().to_string(),
        }
    }
}

pub struct Blog {
    client: NetmeraClient,
}

impl Blog {
    pub fn new(client: NetmeraClient) -> Self {
        Self { client }
    }

    /// Publish an entry and return its server path
    pub async fn add(&self, title: &str, text: &str) -> Result<String> {
        if title.trim().is_empty() {
            bail!("title must not be empty");
        }
        if text.trim().is_empty() {
            bail!("text must not be empty");
        }

        let mut post = self.client.content(KIND);
        post.add(TITLE, title)?;
        post.add(TEXT, text)?;
        post.create().await.context("failed to publish entry")?;

        post.path()
            .map(str::to_string)
            .context("server did not return a path for the new entry")
    }

    /// Newest entries first
    pub async fn list(&self, max: i64) -> Result<Vec<Post>> {
        let mut query = self.client.service(KIND);
        query
            .set_sort_by(SORT_FIELD)
            .set_sort_order(SortOrder::Descending)
            .set_max(max);
        let found = query.search().await.context("failed to list entries")?;
        Ok(found.iter().map(Post::from_content).collect())
    }

    pub async fn search(&self, text: &str) -> Result<Vec<Post>> {
        let mut query = self.client.service(KIND);
        query.add_search_text(text);
        let found = query.search().await.context("search failed")?;
        Ok(found.iter().map(Post::from_content).collect())
    }
}
