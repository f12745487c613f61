//! Wire types and helpers for the GitHub repository contents API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use pilot_sync::ProviderError;

/// `GET /repos/{repo}/contents/{path}` for a single file.
#[derive(Debug, Deserialize)]
pub(crate) struct FileContents {
    pub sha: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

/// Body of `PUT /repos/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(crate) struct PutFile<'a> {
    pub message: &'a str,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// Body of `DELETE /repos/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(crate) struct DeleteFile<'a> {
    pub message: &'a str,
    pub sha: &'a str,
    pub branch: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRef {
    pub sha: String,
}

/// Response of a successful PUT.
#[derive(Debug, Deserialize)]
pub(crate) struct PutResponse {
    pub commit: CommitRef,
}

/// Error body GitHub sends with 4xx/5xx answers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extract GitHub's `message` from an error body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().to_string(),
    }
}

pub(crate) fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

/// Decode a contents-API payload. GitHub wraps base64 at 60 columns.
pub(crate) fn decode_content(file: &FileContents) -> Result<String, ProviderError> {
    if !file.encoding.is_empty() && file.encoding != "base64" {
        return Err(ProviderError::Decode(format!(
            "unsupported content encoding '{}'",
            file.encoding
        )));
    }
    let compact: String = file.content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ProviderError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ProviderError::Decode(e.to_string()))
}

/// Percent-encode a repository path, keeping `/` separators.
pub(crate) fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.trim_start_matches('/').bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// `{api}/repos/{repo}/contents/{path}`.
pub(crate) fn contents_url(api_url: &str, repo: &str, path: &str) -> String {
    format!(
        "{}/repos/{}/contents/{}",
        api_url.trim_end_matches('/'),
        repo,
        encode_path(path)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://api.github.com", ".github/workflows/ci.yml", "https://api.github.com/repos/acme/svc/contents/.github/workflows/ci.yml")]
    #[case("https://ghe.example.com/api/v3/", "ci.yml", "https://ghe.example.com/api/v3/repos/acme/svc/contents/ci.yml")]
    #[case("https://api.github.com", "/docs/my file.md", "https://api.github.com/repos/acme/svc/contents/docs/my%20file.md")]
    fn builds_contents_urls(#[case] api: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(contents_url(api, "acme/svc", path), expected);
    }

    #[test]
    fn decodes_wrapped_base64() {
        let encoded = encode_content("name: scan\non: push\n");
        let (head, tail) = encoded.split_at(8);
        let file = FileContents {
            sha: "abc".into(),
            content: format!("{head}\n{tail}\n"),
            encoding: "base64".into(),
        };
        assert_eq!(decode_content(&file).unwrap(), "name: scan\non: push\n");
    }

    #[test]
    fn rejects_unknown_encoding() {
        let file = FileContents {
            sha: "abc".into(),
            content: String::new(),
            encoding: "none".into(),
        };
        assert!(matches!(decode_content(&file), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(error_message(r#"{"message":"Not Found","documentation_url":"x"}"#), "Not Found");
        assert_eq!(error_message("  bad gateway \n"), "bad gateway");
    }

    #[test]
    fn put_body_omits_sha_for_creates() {
        let body = PutFile {
            message: "m",
            content: encode_content("x"),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["content"], "eA==");
    }
}
