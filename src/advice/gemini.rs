use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::advice::models::{AdviceRequest, Citation, ProviderReply, Source};
use crate::advice::{AdviceError, AdviceProvider};

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    location_model: String,
}

impl GeminiProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        default_model: String,
        location_model: String,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            default_model,
            location_model,
        }
    }
}

/// Gemini's wire format tags assistant turns with role "model".
fn gemini_role(role: &str) -> &str {
    if role == "assistant" {
        "model"
    } else {
        role
    }
}

fn parse_citations(metadata: &serde_json::Value) -> Vec<Citation> {
    let chunks = match metadata["groundingChunks"].as_array() {
        Some(c) => c,
        None => return Vec::new(),
    };

    chunks
        .iter()
        .filter_map(|chunk| {
            let (kind, entry) = if chunk.get("web").is_some() {
                ("web", &chunk["web"])
            } else if chunk.get("maps").is_some() {
                ("maps", &chunk["maps"])
            } else {
                return None;
            };

            let uri = entry["uri"].as_str()?.to_string();
            let title = entry["title"].as_str().unwrap_or(&uri).to_string();
            let source = Source { title, uri };

            Some(match kind {
                "maps" => Citation::Place(source),
                _ => Citation::Web(source),
            })
        })
        .collect()
}

#[async_trait]
impl AdviceProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &AdviceRequest) -> Result<ProviderReply, AdviceError> {
        let contents: Vec<serde_json::Value> = request
            .turns
            .iter()
            .map(|t| {
                json!({
                    "role": gemini_role(&t.role),
                    "parts": [{ "text": t.text }],
                })
            })
            .collect();

        let mut body = json!({
            "system_instruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": contents,
        });

        // Location presence is a capability toggle: it selects the
        // maps-grounded model and attaches a retrieval bias. Without it the
        // request gets plain web-search grounding and no location parameter.
        let model = if let Some(point) = &request.location {
            body["tools"] = json!([{ "google_maps": {} }, { "google_search": {} }]);
            body["toolConfig"] = json!({
                "retrievalConfig": {
                    "latLng": { "latitude": point.lat, "longitude": point.lng }
                }
            });
            &self.location_model
        } else {
            body["tools"] = json!([{ "google_search": {} }]);
            &self.default_model
        };

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdviceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(AdviceError::RateLimited);
            }
            return Err(AdviceError::Api(format!("Gemini Error {}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdviceError::Network(e.to_string()))?;

        let candidate = &json["candidates"][0];
        if candidate.is_null() {
            return Err(AdviceError::InvalidResponse);
        }

        // An empty answer is not an error here: the composer substitutes its
        // own fallback text for it.
        let text = candidate["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let citations = parse_citations(&candidate["groundingMetadata"]);

        Ok(ProviderReply { text, citations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounding_chunks_map_to_tagged_citations() {
        let metadata = json!({
            "groundingChunks": [
                { "web": { "uri": "https://example.com/a", "title": "Feeding guide" } },
                { "maps": { "uri": "https://maps.example.com/p", "title": "Lakeside Vet" } },
                { "other": { "uri": "ignored" } }
            ]
        });

        let citations = parse_citations(&metadata);
        assert_eq!(citations.len(), 2);
        assert_eq!(
            citations[0],
            Citation::Web(Source {
                title: "Feeding guide".to_string(),
                uri: "https://example.com/a".to_string(),
            })
        );
        assert!(matches!(citations[1], Citation::Place(_)));
    }

    #[test]
    fn missing_title_falls_back_to_uri() {
        let metadata = json!({
            "groundingChunks": [{ "web": { "uri": "https://example.com/a" } }]
        });
        let citations = parse_citations(&metadata);
        assert_eq!(citations[0].clone().into_source().title, "https://example.com/a");
    }

    #[test]
    fn assistant_role_maps_to_model() {
        assert_eq!(gemini_role("assistant"), "model");
        assert_eq!(gemini_role("user"), "user");
    }
}
