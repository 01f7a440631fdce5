use std::sync::Arc;

use helpdesk_domain::{Category, Intent, Language, NextQuestionType};
use helpdesk_service::{ChatContext, ChatRequest, HelpService, HistoryItem, Providers};
use helpdesk_testkit::ScriptedCompletion;

use super::{bundled_service, cache_path, temp_dir};

fn request(message: &str, category: &str, lang: &str) -> ChatRequest {
	ChatRequest {
		message: message.to_string(),
		context: ChatContext {
			category: Some(category.to_string()),
			last_q: None,
			lang: Some(lang.to_string()),
		},
		history: Vec::new(),
	}
}

#[tokio::test]
async fn plan_back_fills_missing_fields_from_caller() {
	let dir = temp_dir();
	let service = bundled_service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		ScriptedCompletion::new(Some(r#"{"intent":"PROBLEM","text":"Which room id?"}"#), None),
	);
	let plan = service.plan_for_request(&request("room is empty", "call", "en")).await;

	assert_eq!(plan.intent, Intent::Problem);
	assert_eq!(plan.text, "Which room id?");
	assert_eq!(plan.category, Category::Call);
	assert_eq!(plan.next_question_type, NextQuestionType::AskFollowup);
	assert!(!plan.state_ended);
}

#[tokio::test]
async fn chitchat_plan_ends_the_state() {
	let dir = temp_dir();
	let reply = "```json\n{\"intent\":\"CHITCHAT\",\"category\":\"camera\",\"text\":\"Ha, nice. Busy day?\",\"nextQuestionType\":\"NONE\",\"stateEnded\":false}\n```";
	let service = bundled_service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		ScriptedCompletion::new(Some(reply), None),
	);
	let plan = service.plan_for_request(&request("just testing", "", "en")).await;

	assert_eq!(plan.intent, Intent::Chitchat);
	assert_eq!(plan.next_question_type, NextQuestionType::None);
	assert!(plan.state_ended);
}

#[tokio::test]
async fn failed_call_yields_fallback_plan() {
	let dir = temp_dir();
	let service = bundled_service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		ScriptedCompletion::failing(),
	);
	let plan = service.plan_for_request(&request("help", "error", "ja")).await;

	assert_eq!(plan.intent, Intent::Problem);
	assert_eq!(plan.text, Language::Ja.problem_prompt());
	assert_eq!(plan.category, Category::Error);
	assert_eq!(plan.next_question_type, NextQuestionType::AskProblemType);
	assert!(!plan.state_ended);
}

#[tokio::test]
async fn unparseable_reply_yields_fallback_with_default_category() {
	let dir = temp_dir();
	let service = bundled_service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		ScriptedCompletion::new(Some("I think this is a camera problem."), None),
	);
	let plan = service.plan_for_request(&request("help", "billing", "ko")).await;

	assert_eq!(plan.category, Category::Camera);
	assert_eq!(plan.text, Language::Ko.problem_prompt());
	assert_eq!(plan.next_question_type, NextQuestionType::AskProblemType);
}

#[tokio::test]
async fn keyless_default_provider_never_leaves_the_process() {
	let dir = temp_dir();
	let service = HelpService::with_providers(
		helpdesk_testkit::test_config(cache_path(&dir)),
		helpdesk_domain::CardCatalog::bundled().expect("Bundled catalog must parse."),
		Providers::default(),
	);
	let plan = service.plan_for_request(&request("camera broken", "camera", "en")).await;

	assert_eq!(plan.text, Language::En.problem_prompt());
	assert_eq!(plan.next_question_type, NextQuestionType::AskProblemType);
}

#[tokio::test]
async fn plan_input_carries_windowed_history() {
	let dir = temp_dir();
	let mut cfg = helpdesk_testkit::ready_config(cache_path(&dir));

	cfg.dialog.max_history_turns = 2;

	let completion = Arc::new(ScriptedCompletion::new(Some(r#"{"intent":"ENV_HINT"}"#), None));
	let service = HelpService::with_providers(
		cfg,
		helpdesk_domain::CardCatalog::bundled().expect("Bundled catalog must parse."),
		Providers::new(Arc::new(super::axis_embedding()), completion.clone()),
	);
	let mut req = request("Chrome on macOS", "camera", "en");

	req.context.last_q = Some("Which browser?".to_string());
	req.history = ["first", "second", "third"]
		.iter()
		.map(|text| HistoryItem { role: "user".to_string(), text: text.to_string() })
		.collect();

	let plan = service.plan_for_request(&req).await;

	assert_eq!(plan.intent, Intent::EnvHint);

	let inputs = completion.inputs();

	assert_eq!(inputs.len(), 1);
	assert!(inputs[0].contains("lastQ: Which browser?"));
	assert!(inputs[0].contains("history(last 2 turns):\nuser: second\nuser: third\n"));
	assert!(!inputs[0].contains("first"));
}
