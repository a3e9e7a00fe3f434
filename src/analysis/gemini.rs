//! Gemini generative language client.
//!
//! Sends the image inline with a text prompt to `models/{model}:generateContent`
//! and pulls text or inline image parts out of the first candidate.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::StatusCode;
use serde_json::{Value, json};

use super::prompts::{caption_prompt, segmentation_prompt, translation_prompt};
use super::{RegionRequest, VisionCapability};
use crate::capture::image::ImageAsset;
use crate::config::RegionLensConfig;
use crate::domain::Language;
use crate::error::Error;

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    caption_model: String,
    segmentation_model: String,
    translation_model: String,
}

impl GeminiClient {
    pub fn new(config: &RegionLensConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            caption_model: config.caption_model.clone(),
            segmentation_model: config.segmentation_model.clone(),
            translation_model: config.translation_model.clone(),
        })
    }

    async fn generate(&self, model: &str, body: Value) -> Result<Value> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let json = parse_response(status, &body)?;

        log::debug!(
            "{model} answered in {} ms ({} tokens)",
            start.elapsed().as_millis(),
            json["usageMetadata"]["totalTokenCount"].as_u64().unwrap_or(0)
        );
        Ok(json)
    }
}

/// Status first: error pages from proxies are often not JSON
fn parse_response(status: StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        let msg = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| json["error"]["message"].as_str().map(str::to_owned))
            .unwrap_or_else(|| body.trim().chars().take(200).collect());
        bail!("Gemini API error {status}: {msg}");
    }
    serde_json::from_str(body).with_context(|| format!("invalid JSON in {status} response"))
}

fn inline_image_part(image: &ImageAsset) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime(),
            "data": STANDARD.encode(image.bytes())
        }
    })
}

fn parts_of(json: &Value) -> impl Iterator<Item = &Value> {
    json["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .into_iter()
        .flatten()
}

/// Concatenated text parts of the first candidate
pub fn response_text(json: &Value) -> Option<String> {
    let text: String = parts_of(json)
        .filter_map(|part| part["text"].as_str())
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

/// First inline image part of the first candidate
pub fn response_image(json: &Value) -> Option<ImageAsset> {
    parts_of(json).find_map(|part| {
        let inline = part.get("inlineData")?;
        let data = inline["data"].as_str()?;
        let mime = inline["mimeType"].as_str().unwrap_or("image/png");
        match STANDARD.decode(data) {
            Ok(bytes) => Some(ImageAsset::new(bytes, mime)),
            Err(err) => {
                log::warn!("Skipping undecodable inline image part: {err}");
                None
            }
        }
    })
}

impl VisionCapability for GeminiClient {
    async fn caption(
        &self,
        image: &ImageAsset,
        request: RegionRequest,
    ) -> Result<Option<String>, Error> {
        let body = json!({
            "contents": [{
                "parts": [
                    inline_image_part(image),
                    { "text": caption_prompt(request.region) }
                ]
            }]
        });
        let json = self.generate(&self.caption_model, body).await?;
        Ok(response_text(&json))
    }

    async fn segment(
        &self,
        image: &ImageAsset,
        request: RegionRequest,
    ) -> Result<Option<ImageAsset>, Error> {
        let body = json!({
            "contents": [{
                "parts": [
                    inline_image_part(image),
                    { "text": segmentation_prompt(request.region, request.dimensions) }
                ]
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE", "TEXT"]
            }
        });
        let json = self.generate(&self.segmentation_model, body).await?;
        Ok(response_image(&json))
    }

    async fn translate(&self, text: &str, language: Language) -> Result<String, Error> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": translation_prompt(text, language) }]
            }]
        });
        let json = self
            .generate(&self.translation_model, body)
            .await
            .map_err(|e| Error::TranslationFailed(format!("{e:#}")))?;
        response_text(&json)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| Error::TranslationFailed("empty response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_parts_are_concatenated() {
        let json = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "A red apple " }, { "text": "on a table." }] }
            }]
        });
        assert_eq!(response_text(&json).as_deref(), Some("A red apple on a table."));
    }

    #[test]
    fn blank_or_missing_text_is_none() {
        assert_eq!(response_text(&json!({})), None);
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert_eq!(response_text(&blank), None);
    }

    #[test]
    fn error_status_survives_a_non_json_body() {
        let page = "<html><body>502 Bad Gateway</body></html>";
        let err = parse_response(StatusCode::BAD_GATEWAY, page).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("502 Bad Gateway"), "{msg}");
        assert!(msg.contains("<html>"), "{msg}");
    }

    #[test]
    fn api_error_message_is_preferred() {
        let body = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        let err = parse_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(err.to_string(), "Gemini API error 400 Bad Request: API key not valid");
    }

    #[test]
    fn success_body_is_parsed() {
        let json = parse_response(StatusCode::OK, r#"{"candidates":[]}"#).unwrap();
        assert_eq!(json["candidates"], json!([]));
        assert!(parse_response(StatusCode::OK, "not json").is_err());
    }

    #[test]
    fn first_inline_image_is_extracted() {
        let json = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is the cutout" },
                    { "inlineData": { "mimeType": "image/png", "data": STANDARD.encode(b"one") } },
                    { "inlineData": { "mimeType": "image/png", "data": STANDARD.encode(b"two") } }
                ] }
            }]
        });
        let image = response_image(&json).unwrap();
        assert_eq!(image.bytes(), b"one");
        assert_eq!(image.mime(), "image/png");
    }

    #[test]
    fn text_only_segmentation_has_no_image() {
        let json = json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot do that." }] } }]
        });
        assert!(response_image(&json).is_none());
    }

    #[test]
    fn inline_part_is_base64() {
        let part = inline_image_part(&ImageAsset::new(b"abc".to_vec(), "image/jpeg"));
        assert_eq!(part["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(part["inlineData"]["data"], "YWJj");
    }
}
