//! [`Provider`] implementation over the GitHub REST contents API.

use std::time::Duration;

use ureq::{Agent, AgentBuilder, Request};

use pilot_sync::{Provider, ProviderError, RevisionRef};

use crate::contents::{
    contents_url, decode_content, encode_content, error_message, DeleteFile, FileContents,
    PutFile, PutResponse,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GitHubProvider {
    agent: Agent,
    token: String,
    api_url: String,
}

impl GitHubProvider {
    /// Provider authenticated with `token`. `api_url` defaults to
    /// [`DEFAULT_API_URL`]; set it for GitHub Enterprise.
    pub fn new(token: impl Into<String>, api_url: Option<&str>) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .user_agent(concat!("git-pilot/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            token: token.into(),
            api_url: api_url.unwrap_or(DEFAULT_API_URL).to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: &str, repo: &str, path: &str) -> Request {
        self.agent
            .request(method, &contents_url(&self.api_url, repo, path))
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Fetch the file record, `None` on 404.
    fn fetch(&self, repo: &str, branch: &str, path: &str) -> Result<Option<FileContents>, ProviderError> {
        let response = self.request("GET", repo, path).query("ref", branch).call();
        match response {
            Ok(resp) => resp
                .into_json::<FileContents>()
                .map(Some)
                .map_err(|e| ProviderError::Decode(format!("{path}: {e}"))),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(err) => Err(map_error(err)),
        }
    }
}

fn map_error(err: ureq::Error) -> ProviderError {
    match err {
        ureq::Error::Status(status, resp) => {
            let body = resp.into_string().unwrap_or_default();
            ProviderError::Status {
                status,
                message: error_message(&body),
            }
        }
        ureq::Error::Transport(transport) => ProviderError::Transport(transport.to_string()),
    }
}

impl Provider for GitHubProvider {
    fn id(&self) -> &str {
        "github"
    }

    fn sync_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<RevisionRef, ProviderError> {
        let existing = self.fetch(repo, branch, path)?;
        let current_sha = match &existing {
            Some(file) => {
                // Byte-exact: the caller records fingerprint(content) on success.
                if decode_content(file)? == content {
                    tracing::debug!("{repo}@{branch}: {path} already up to date remotely");
                    return Ok(RevisionRef(file.sha.clone()));
                }
                Some(file.sha.as_str())
            }
            None => None,
        };

        let body = PutFile {
            message,
            content: encode_content(content),
            branch,
            sha: current_sha,
        };
        let resp = self
            .request("PUT", repo, path)
            .send_json(&body)
            .map_err(map_error)?;
        let put: PutResponse = resp
            .into_json()
            .map_err(|e| ProviderError::Decode(format!("{path}: {e}")))?;
        Ok(RevisionRef(put.commit.sha))
    }

    fn delete_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
    ) -> Result<(), ProviderError> {
        let Some(existing) = self.fetch(repo, branch, path)? else {
            return Err(ProviderError::NotFound {
                repo: repo.to_string(),
                branch: branch.to_string(),
                path: path.to_string(),
            });
        };
        let body = DeleteFile {
            message,
            sha: &existing.sha,
            branch,
        };
        match self.request("DELETE", repo, path).send_json(&body) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(404, _)) => Err(ProviderError::NotFound {
                repo: repo.to_string(),
                branch: branch.to_string(),
                path: path.to_string(),
            }),
            Err(err) => Err(map_error(err)),
        }
    }

    fn get_content(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>, ProviderError> {
        match self.fetch(repo, branch, path)? {
            Some(file) => decode_content(&file).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_public_api() {
        let provider = GitHubProvider::new("t", None);
        assert_eq!(provider.api_url(), DEFAULT_API_URL);
        assert_eq!(provider.id(), "github");
    }

    #[test]
    fn enterprise_url_is_kept() {
        let provider = GitHubProvider::new("t", Some("https://ghe.example.com/api/v3"));
        assert_eq!(provider.api_url(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        let provider = GitHubProvider::new("t", Some("http://127.0.0.1:9"));
        let err = provider.get_content("acme/svc", "main", "ci.yml").unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)), "got: {err}");
    }
}
