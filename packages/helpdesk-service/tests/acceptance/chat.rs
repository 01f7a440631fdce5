use std::sync::Arc;

use helpdesk_domain::{Intent, Language, NextQuestionType};
use helpdesk_service::{CHAT_CARD_LIMIT, ChatContext, ChatRequest, RecommendMethod};
use helpdesk_testkit::ScriptedCompletion;

use super::{axis_cards, axis_embedding, bundled_service, cache_path, service, temp_dir};

fn request(message: &str, category: Option<&str>, lang: &str) -> ChatRequest {
	ChatRequest {
		message: message.to_string(),
		context: ChatContext {
			category: category.map(str::to_string),
			last_q: None,
			lang: Some(lang.to_string()),
		},
		history: Vec::new(),
	}
}

#[tokio::test]
async fn failed_reply_uses_canned_notice() {
	let dir = temp_dir();
	let service = bundled_service(
		helpdesk_testkit::test_config(cache_path(&dir)),
		ScriptedCompletion::failing(),
	);
	let response = service.chat(&request("camera not detected", Some("camera"), "en")).await;

	assert_eq!(response.kind, "cards");
	assert_eq!(response.text, Language::En.cards_notice());
	assert_eq!(response.matched.first().map(String::as_str), Some("cam-001"));
	assert!(response.matched.len() <= CHAT_CARD_LIMIT);
	assert_eq!(response.method, RecommendMethod::None);
	assert_eq!(response.plan.next_question_type, NextQuestionType::AskProblemType);
}

#[tokio::test]
async fn blank_reply_uses_canned_notice() {
	let dir = temp_dir();
	let service = bundled_service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		ScriptedCompletion::new(None, Some("   ")),
	);
	let response = service.chat(&request("", None, "ko")).await;

	assert_eq!(response.text, Language::Ko.cards_notice());
	assert_eq!(response.matched, vec!["cam-001", "cam-004", "cam-005"]);
}

#[tokio::test]
async fn reply_and_plan_are_combined() {
	let dir = temp_dir();
	let completion = Arc::new(ScriptedCompletion::new(
		Some(r#"{"intent":"PROBLEM","category":"call","text":"Same room id on both sides?","nextQuestionType":"ASK_NETWORK_FAIL","stateEnded":false}"#),
		Some(" Check the room card first. "),
	));
	let service = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		helpdesk_domain::CardCatalog::bundled().expect("Bundled catalog must parse.").cards().to_vec(),
		Arc::new(axis_embedding()),
		completion.clone(),
	);
	let response = service.chat(&request("cannot join room", Some("call"), "en")).await;

	assert_eq!(response.text, "Check the room card first.");
	assert_eq!(response.matched.first().map(String::as_str), Some("call-001"));
	assert_eq!(response.plan.intent, Intent::Problem);
	assert_eq!(response.plan.next_question_type, NextQuestionType::AskNetworkFail);

	let inputs = completion.inputs();

	assert_eq!(inputs.len(), 2);
	assert!(inputs.iter().any(|input| input.contains("- [call-001] Cannot join the call room")));
}

#[tokio::test]
async fn weak_semantic_matches_are_flagged_to_the_reply_model() {
	let dir = temp_dir();
	let completion = Arc::new(ScriptedCompletion::new(None, Some("Could you say more?")));
	let service = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		axis_cards(),
		Arc::new(axis_embedding()),
		completion.clone(),
	);

	service.rebuild_embeddings().await;

	let response = service.chat(&request("gamma", None, "en")).await;

	assert_eq!(response.method, RecommendMethod::Embeddings);
	assert_eq!(response.confidence, 0.0);
	assert!(completion.inputs().iter().any(|input| input.contains("cards (weak match):")));

	let strong = service.chat(&request("alpha", None, "en")).await;

	assert_eq!(strong.matched.first().map(String::as_str), Some("a-1"));
	assert!(completion.inputs().iter().filter(|input| input.contains("weak match")).count() == 1);
}
