//! REST client for the GitHub API and raw content host

use super::wire::{CommitResponse, RepoResponse, TreeResponse};
use super::{ACCEPT_V3, RepoHost, TreeListing};
use crate::config::GitHubConfig;
use crate::error::{RevoError, RevoResult};
use crate::types::{RepoMetadata, RepositoryIdentifier};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

/// GitHub REST + raw content client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: Url,
    raw_base: Url,
}

impl GitHubClient {
    /// Create a client from provider settings
    pub fn new(config: GitHubConfig) -> RevoResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));
        if let Some(token) = config.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|_| RevoError::config("GitHub token contains invalid characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RevoError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: Url::parse(&config.api_base)?,
            raw_base: Url::parse(&config.raw_base)?,
        })
    }

    fn join(base: &Url, segments: &[&str]) -> RevoResult<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| RevoError::config(format!("'{}' cannot be a base URL", base)))?
            .pop_if_empty()
            .extend(segments.iter().flat_map(|s| s.split('/')).filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn repo_url(&self, repo: &RepositoryIdentifier, tail: &[&str]) -> RevoResult<Url> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str()];
        segments.extend_from_slice(tail);
        Self::join(&self.api_base, &segments)
    }

    async fn get(&self, url: Url) -> RevoResult<Response> {
        debug!(%url, "GET");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RevoError::http(format!("{} returned {}", url.path(), status)));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> RevoResult<T> {
        let response = self.get(url).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RepoHost for GitHubClient {
    #[instrument(skip(self, repo), fields(repo = %repo), level = "debug")]
    async fn repository(&self, repo: &RepositoryIdentifier) -> RevoResult<RepoMetadata> {
        let url = self.repo_url(repo, &[])?;
        let response = self.http.get(url).send().await.map_err(|e| {
            RevoError::metadata(format!("request failed: {}", e))
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(RevoError::metadata(status.as_u16().to_string()));
        }
        let body: RepoResponse = response
            .json()
            .await
            .map_err(|e| RevoError::metadata(format!("invalid response: {}", e)))?;
        Ok(body.into_metadata(&repo.full_name()))
    }

    #[instrument(skip(self, repo), fields(repo = %repo), level = "debug")]
    async fn tree(&self, repo: &RepositoryIdentifier, reference: &str) -> RevoResult<TreeListing> {
        let mut url = self.repo_url(repo, &["git", "trees", reference])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let body: TreeResponse = self.get_json(url).await?;
        Ok(TreeListing {
            entries: body.tree.unwrap_or_default(),
            truncated: body.truncated,
        })
    }

    #[instrument(skip(self, repo), fields(repo = %repo), level = "debug")]
    async fn commit_tree_sha(
        &self,
        repo: &RepositoryIdentifier,
        branch: &str,
    ) -> RevoResult<String> {
        let url = self.repo_url(repo, &["commits", branch])?;
        let body: CommitResponse = self.get_json(url).await?;
        body.tree_sha()
            .map(str::to_string)
            .ok_or_else(|| RevoError::tree(format!("commit on '{}' has no tree reference", branch)))
    }

    async fn raw_file(
        &self,
        repo: &RepositoryIdentifier,
        branch: &str,
        path: &str,
        max_bytes: usize,
    ) -> RevoResult<String> {
        let url = Self::join(
            &self.raw_base,
            &[repo.owner.as_str(), repo.name.as_str(), branch, path],
        )?;
        let response = self.get(url).await?;

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
            if body.len() >= max_bytes {
                body.truncate(max_bytes);
                break;
            }
        }
        Ok(decode_prefix(&body))
    }
}

/// Decode a body prefix, dropping a code point cut off at the end
fn decode_prefix(bytes: &[u8]) -> String {
    let end = match std::str::from_utf8(bytes) {
        Err(err) if err.error_len().is_none() => err.valid_up_to(),
        _ => bytes.len(),
    };
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
