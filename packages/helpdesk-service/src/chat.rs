use serde::{Deserialize, Serialize};

use crate::{HelpService, PlanRequest, RecommendMethod, Recommendation};
use helpdesk_domain::{DialogPlan, HelpCard, Language};
use helpdesk_providers::completion::CompletionParams;

/// Cards recommended per chat turn.
pub const CHAT_CARD_LIMIT: usize = 3;

const CHAT_RESPONSE_KIND: &str = "cards";

const REPLY_INSTRUCTIONS: &str = "\
You are the customer support chatbot of a sign-language and video-call app.
Answer briefly and kindly, in the language given by `lang` (ko, en, or ja) and nothing else.
Point the user to the recommended cards first.
If the cards are marked weak, ask one short clarifying question instead of guessing.
If you do not know, say so.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub context: ChatContext,
	#[serde(default)]
	pub history: Vec<HistoryItem>,
}
impl ChatRequest {
	pub fn category(&self) -> &str {
		self.context.category.as_deref().unwrap_or_default()
	}

	pub fn language(&self) -> Language {
		Language::from_tag(self.context.lang.as_deref())
	}

	pub fn plan_request(&self) -> PlanRequest<'_> {
		PlanRequest {
			message: &self.message,
			category: self.category(),
			last_question: self.context.last_q.as_deref().unwrap_or_default(),
			language: self.language(),
			history: &self.history,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
	pub category: Option<String>,
	pub last_q: Option<String>,
	pub lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
	#[serde(default)]
	pub role: String,
	#[serde(default)]
	pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub text: String,
	pub matched: Vec<String>,
	pub method: RecommendMethod,
	pub confidence: f32,
	pub plan: DialogPlan,
}

impl HelpService {
	/// One chat turn: recommend cards, then ask for a short reply and a dialog plan concurrently.
	/// Provider failures degrade to a canned reply and the fallback plan.
	pub async fn chat(&self, request: &ChatRequest) -> ChatResponse {
		let language = request.language();
		let recommendation = self.recommend(request.category(), &request.message, CHAT_CARD_LIMIT).await;
		let weak = recommendation.method == RecommendMethod::Embeddings
			&& !recommendation.is_confident(self.cfg.recommend.confidence_threshold);
		let input = build_reply_input(request, language, &recommendation.cards, weak);
		let plan_request = request.plan_request();
		let (reply, plan) = tokio::join!(self.reply(&input), self.plan(&plan_request));
		let text = reply.unwrap_or_else(|| language.cards_notice().to_string());

		tracing::debug!(
			matched = recommendation.cards.len(),
			method = ?recommendation.method,
			confidence = recommendation.confidence,
			weak,
			intent = plan.intent.as_str(),
			"Chat turn answered."
		);

		let Recommendation { cards, confidence, method } = recommendation;

		ChatResponse {
			kind: CHAT_RESPONSE_KIND,
			text,
			matched: cards.into_iter().map(|card| card.id).collect(),
			method,
			confidence,
			plan,
		}
	}

	pub async fn plan_for_request(&self, request: &ChatRequest) -> DialogPlan {
		self.plan(&request.plan_request()).await
	}

	async fn reply(&self, input: &str) -> Option<String> {
		let cfg = &self.cfg.providers.llm;
		let params = CompletionParams::from_config(cfg, false);

		match self.providers.completion.complete(cfg, REPLY_INSTRUCTIONS, input, params).await {
			Ok(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
			Err(err) => {
				crate::log_provider_failure("chat_reply", &err, None);

				None
			},
		}
	}
}

/// `- [id] title` per card, one per line.
pub fn card_brief(cards: &[HelpCard]) -> String {
	cards.iter().map(|card| format!("- [{}] {}", card.id, card.title)).collect::<Vec<_>>().join("\n")
}

pub fn build_reply_input(
	request: &ChatRequest,
	language: Language,
	cards: &[HelpCard],
	weak: bool,
) -> String {
	let heading = if weak { "cards (weak match):" } else { "cards:" };

	format!(
		"lang: {}\ncategory: {}\nuserMsg: {}\n{heading}\n{}",
		language.as_str(),
		request.category().trim(),
		request.message.trim(),
		card_brief(cards),
	)
}
