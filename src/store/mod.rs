pub mod dto;
pub mod memory;

use std::env;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};

use crate::error::{ConfigError, StoreError};

pub use memory::InMemoryContentStore;

const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    Other,
}

impl EntryKind {
    pub fn from_github(kind: &str) -> Self {
        match kind {
            "file" => EntryKind::File,
            "dir" => EntryKind::Dir,
            "symlink" => EntryKind::Symlink,
            "submodule" => EntryKind::Submodule,
            _ => EntryKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Directory(Vec<DirEntry>),
    NotADirectory,
}

/// Read-only access to a directory + blob store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_directory(&self, path: &str) -> Result<Listing, StoreError>;
    async fn read_file_raw(&self, path: &str) -> Result<String, StoreError>;
}

#[derive(Clone, Debug)]
pub struct GitHubConfig {
    pub api_token: String,
    pub owner: String,
    pub repo: String,
    pub git_ref: Option<String>,
    pub api_url: String,
}

impl GitHubConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let api_token = env::var("GITHUB_TOKEN").map_err(|_| ConfigError::Missing("GITHUB_TOKEN"))?;
        let owner = env::var("GITHUB_REPO_OWNER").map_err(|_| ConfigError::Missing("GITHUB_REPO_OWNER"))?;
        let repo = env::var("GITHUB_REPO_NAME").map_err(|_| ConfigError::Missing("GITHUB_REPO_NAME"))?;
        let git_ref = env::var("GITHUB_REPO_REF").ok().filter(|r| !r.is_empty());
        let api_url = env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_token,
            owner,
            repo,
            git_ref,
            api_url,
        })
    }
}

pub struct GitHubContentStore {
    client: Client,
    config: GitHubConfig,
    base: Url,
}

impl GitHubContentStore {
    pub fn new(config: GitHubConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.api_url).map_err(|e| ConfigError::Invalid {
            name: "GITHUB_API_URL",
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                name: "GITHUB_API_URL",
                reason: "not a base URL".to_string(),
            });
        }
        let client = Client::builder()
            .user_agent(concat!("coursehub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: "http client",
                reason: e.to_string(),
            })?;
        Ok(Self { client, config, base })
    }

    fn contents_url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", self.config.owner.as_str(), self.config.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        if let Some(git_ref) = &self.config.git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        url
    }

    async fn get_contents(&self, path: &str, media_type: &str) -> Result<reqwest::Response, StoreError> {
        let url = self.contents_url(path);
        tracing::debug!("GET {}", url);

        let response = self.client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_token))
            .header(ACCEPT, media_type)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("request to GitHub failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<dto::ApiErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(StoreError::Unavailable(format!("GitHub API error {}: {}", status, message)));
        }

        Ok(response)
    }
}

#[async_trait]
impl ContentStore for GitHubContentStore {
    async fn list_directory(&self, path: &str) -> Result<Listing, StoreError> {
        let response = self.get_contents(path, JSON_MEDIA_TYPE).await?;
        let body_text = response
            .text()
            .await
            .map_err(|e| StoreError::Unavailable(format!("failed to read GitHub response: {}", e)))?;

        let parsed: dto::ContentsResponse = serde_json::from_str(&body_text).map_err(|e| {
            tracing::error!("Failed to parse contents of {}: {}", path, e);
            StoreError::Unavailable(format!("unexpected GitHub response for '{}': {}", path, e))
        })?;

        Ok(match parsed {
            dto::ContentsResponse::Directory(items) => Listing::Directory(
                items
                    .into_iter()
                    .map(|item| DirEntry {
                        kind: EntryKind::from_github(&item.kind),
                        name: item.name,
                        path: item.path,
                        size: item.size,
                        download_url: item.download_url,
                    })
                    .collect(),
            ),
            dto::ContentsResponse::Single(_) => Listing::NotADirectory,
        })
    }

    async fn read_file_raw(&self, path: &str) -> Result<String, StoreError> {
        let response = self.get_contents(path, RAW_MEDIA_TYPE).await?;
        response
            .text()
            .await
            .map_err(|e| StoreError::Unavailable(format!("failed to read '{}': {}", path, e)))
    }
}
