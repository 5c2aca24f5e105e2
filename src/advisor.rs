//! Free-text financial advice from an external language model.
//!
//! Replies are passed back untouched. The only check is that the call
//! produced some text.

use crate::{
	constants::{ADVISOR_BASE_URL, ADVISOR_CONNECT_TIMEOUT_SECS, ADVISOR_TIMEOUT_SECS},
	models::{Budget, Expense},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
	#[error("advisor request failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("advisor returned {status}: {body}")]
	Status { status: u16, body: String },
	#[error("advisor returned no text")]
	EmptyReply,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Advisor: Send + Sync {
	async fn generate(&self, prompt: String) -> Result<String, AdvisorError>;
}

const PREAMBLE: &str = "You are \"Flow\", a friendly and encouraging financial advisor inside a \
personal expense tracker. Give simple, actionable and positive advice. Only analyse the user's \
data when the question asks for it.

RULES
- All monetary values are Indian Rupees (INR); say so whenever you mention an amount.
- Answer in two or three short paragraphs of plain text, without any markdown.
- Stay supportive, and ground specific advice in the JSON data below.";

/// Assembles the full prompt: fixed rules, the caller's data as JSON, then the question.
pub fn build_prompt(
	recent_expenses: &[Expense],
	budgets: &[Budget],
	question: &str,
) -> Result<String, serde_json::Error> {
	let expenses_json = serde_json::to_string(recent_expenses)?;
	let budgets_json = serde_json::to_string(budgets)?;
	Ok(format!(
		"{PREAMBLE}\n\n---\n\nUSER'S FINANCIAL CONTEXT (INR)\n* Recent expenses (JSON): \
		 {expenses_json}\n* Budgets (JSON): {budgets_json}\n\n---\n\nUSER'S QUESTION\n\"{question}\"\n\n\
		 Using the rules and the data above, give a helpful and concise answer."
	))
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
	contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
	parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
	text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
	#[serde(default)]
	content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
struct CandidatePart {
	#[serde(default)]
	text: Option<String>,
}

impl GenerateResponse {
	fn into_text(self) -> Option<String> {
		let text: String = self
			.candidates
			.into_iter()
			.next()?
			.content?
			.parts
			.into_iter()
			.filter_map(|p| p.text)
			.collect();
		(!text.trim().is_empty()).then_some(text)
	}
}

/// Google Generative Language `generateContent` client.
pub struct GeminiAdvisor {
	http: reqwest::Client,
	api_key: String,
	model: String,
	base_url: String,
}

impl GeminiAdvisor {
	pub fn new(api_key: String, model: String) -> Result<Self, AdvisorError> {
		Self::with_endpoint(
			api_key,
			model,
			ADVISOR_BASE_URL.to_string(),
			Duration::from_secs(ADVISOR_TIMEOUT_SECS),
		)
	}

	/// A call that has not completed within `timeout` fails with
	/// [`AdvisorError::Request`].
	fn with_endpoint(
		api_key: String,
		model: String,
		base_url: String,
		timeout: Duration,
	) -> Result<Self, AdvisorError> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.connect_timeout(Duration::from_secs(ADVISOR_CONNECT_TIMEOUT_SECS))
			.build()?;
		Ok(Self { http, api_key, model, base_url })
	}
}

#[async_trait]
impl Advisor for GeminiAdvisor {
	async fn generate(&self, prompt: String) -> Result<String, AdvisorError> {
		let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
		let body = GenerateRequest { contents: [Content { parts: [Part { text: &prompt }] }] };

		let response = self
			.http
			.post(&url)
			.header("x-goog-api-key", &self.api_key)
			.json(&body)
			.send()
			.await
			.inspect_err(|e| {
				if e.is_timeout() {
					log::warn!("Advisor call to {} timed out", self.model);
				}
			})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(AdvisorError::Status { status: status.as_u16(), body });
		}

		let parsed: GenerateResponse = response.json().await?;
		parsed.into_text().ok_or(AdvisorError::EmptyReply)
	}
}
