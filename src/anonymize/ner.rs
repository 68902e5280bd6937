use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Entity categories the anonymizer replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Person,
    Location,
    Organization,
}

impl EntityLabel {
    /// Map a recognizer tag to a category, if it is one we anonymize.
    /// Geo-political entities fold into locations.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim_start_matches("B-").trim_start_matches("I-");
        match tag {
            "PER" | "PERSON" => Some(Self::Person),
            "LOC" | "LOCATION" | "GPE" => Some(Self::Location),
            "ORG" | "ORGANIZATION" => Some(Self::Organization),
            _ => None,
        }
    }

    /// Placeholder text substituted for an entity of this category.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Person => "[PER]",
            Self::Location => "[LOC]",
            Self::Organization => "[ORG]",
        }
    }
}

/// A recognized entity span. Offsets are character positions into the
/// analyzed text, end-exclusive.
#[derive(Debug, Clone)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
}

/// Boundary to a named-entity recognizer for German text.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    async fn entities(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Entity recognizer backed by a Hugging Face token-classification endpoint.
pub struct HfNerClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HfNerClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            token,
        }
    }
}

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct NerEntity {
    #[serde(alias = "entity")]
    entity_group: String,
    start: usize,
    end: usize,
}

#[async_trait]
impl EntityRecognizer for HfNerClient {
    async fn entities(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let mut request = self.client.post(&self.endpoint).json(&NerRequest { inputs: text });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to NER endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("NER endpoint error: {} - {}", status, body);
        }

        let entities: Vec<NerEntity> = response
            .json()
            .await
            .context("Failed to parse NER response")?;

        Ok(entities
            .iter()
            .filter_map(|e| {
                EntityLabel::from_tag(&e.entity_group).map(|label| EntitySpan {
                    start: e.start,
                    end: e.end,
                    label,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_tag() {
        assert_eq!(EntityLabel::from_tag("PER"), Some(EntityLabel::Person));
        assert_eq!(EntityLabel::from_tag("B-PER"), Some(EntityLabel::Person));
        assert_eq!(EntityLabel::from_tag("I-LOC"), Some(EntityLabel::Location));
        assert_eq!(EntityLabel::from_tag("GPE"), Some(EntityLabel::Location));
        assert_eq!(EntityLabel::from_tag("ORG"), Some(EntityLabel::Organization));
        assert_eq!(EntityLabel::from_tag("MISC"), None);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(EntityLabel::Person.placeholder(), "[PER]");
        assert_eq!(EntityLabel::Location.placeholder(), "[LOC]");
        assert_eq!(EntityLabel::Organization.placeholder(), "[ORG]");
    }
}
