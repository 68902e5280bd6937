use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// On-disk shape of the config file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(rename = "HF_TOKEN", default, skip_serializing_if = "Option::is_none")]
    hf_token: Option<String>,
}

/// Persisted Hugging Face access token, stored as JSON at a fixed path.
///
/// An absent file is empty configuration, never an error. The composition
/// root is the only reader; the token is threaded through calls from there.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read config file: {:?}", self.path))
            }
        };

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", self.path))?;

        Ok(config.hf_token.filter(|t| !t.is_empty()))
    }

    pub fn save(&self, token: &str) -> Result<()> {
        let config = ConfigFile {
            hf_token: Some(token.to_string()),
        };
        let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write config file: {:?}", self.path))?;
        Ok(())
    }
}

/// Result of the offline token format check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Missing,
    TooShort,
    WrongPrefix,
    FormatOk,
}

impl TokenCheck {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Missing => "no token present",
            Self::TooShort => "token is incomplete (too short)",
            Self::WrongPrefix => "token has wrong format (should start with 'hf_')",
            Self::FormatOk => "token format looks valid",
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, Self::FormatOk)
    }
}

/// Offline plausibility check of a token. Does not contact any service.
pub fn check_format(token: &str) -> TokenCheck {
    if token.is_empty() {
        TokenCheck::Missing
    } else if token.len() < 20 {
        TokenCheck::TooShort
    } else if !token.starts_with("hf_") {
        TokenCheck::WrongPrefix
    } else {
        TokenCheck::FormatOk
    }
}

/// Mask a token for display, keeping a short prefix and suffix. Counts
/// characters, not bytes; stored tokens are not guaranteed to be ASCII.
pub fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 11 {
        let head: String = chars[..7].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

#[derive(Debug, Deserialize)]
struct WhoamiResponse {
    name: String,
}

/// Validate a token against the Hugging Face account endpoint. Returns the
/// account name the token belongs to.
pub async fn validate_remote(token: &str) -> Result<String> {
    let client = Client::new();
    let response = client
        .get("https://huggingface.co/api/whoami-v2")
        .bearer_auth(token)
        .send()
        .await
        .context("Failed to reach huggingface.co")?;

    if !response.status().is_success() {
        let status = response.status();
        anyhow::bail!("Token rejected: {}", status);
    }

    let whoami: WhoamiResponse = response
        .json()
        .await
        .context("Failed to parse whoami response")?;
    Ok(whoami.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("config.json"));
        store.save("hf_abcdefghijklmnopqrstuvwx").unwrap();
        assert_eq!(
            store.load().unwrap().as_deref(),
            Some("hf_abcdefghijklmnopqrstuvwx")
        );
    }

    #[test]
    fn test_empty_token_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"HF_TOKEN": ""}"#).unwrap();
        let store = TokenStore::new(path);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let store = TokenStore::new(path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_check_format() {
        assert_eq!(check_format(""), TokenCheck::Missing);
        assert_eq!(check_format("hf_short"), TokenCheck::TooShort);
        assert_eq!(check_format("xx_abcdefghijklmnopqrstuvwx"), TokenCheck::WrongPrefix);
        assert_eq!(check_format("hf_abcdefghijklmnopqrstuvwx"), TokenCheck::FormatOk);
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("hf_abcdefghijklmnopqrstuvwx"), "hf_abcd...uvwx");
        assert_eq!(mask("hf_short"), "***");
    }

    #[test]
    fn test_mask_multibyte_token() {
        // Stored tokens are arbitrary strings; masking must not split a
        // multi-byte character.
        assert_eq!(mask("hf_ääääääääääääääääää"), "hf_ääää...ääää");
        assert_eq!(mask("ääääääää"), "***");
    }
}
