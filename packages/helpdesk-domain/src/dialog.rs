use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
	Chitchat,
	Problem,
	EnvHint,
	Frustration,
}
impl Intent {
	pub const ALL: [Self; 4] = [Self::Chitchat, Self::Problem, Self::EnvHint, Self::Frustration];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Chitchat => "CHITCHAT",
			Self::Problem => "PROBLEM",
			Self::EnvHint => "ENV_HINT",
			Self::Frustration => "FRUSTRATION",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();

		Self::ALL.into_iter().find(|intent| intent.as_str().eq_ignore_ascii_case(raw))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	Camera,
	Call,
	Error,
}
impl Category {
	pub const ALL: [Self; 3] = [Self::Camera, Self::Call, Self::Error];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Camera => "camera",
			Self::Call => "call",
			Self::Error => "error",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();

		Self::ALL.into_iter().find(|category| category.as_str().eq_ignore_ascii_case(raw))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextQuestionType {
	AskProblemType,
	AskDevice,
	AskErrorLine,
	AskNetworkFail,
	AskFollowup,
	None,
}
impl NextQuestionType {
	pub const ALL: [Self; 6] = [
		Self::AskProblemType,
		Self::AskDevice,
		Self::AskErrorLine,
		Self::AskNetworkFail,
		Self::AskFollowup,
		Self::None,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::AskProblemType => "ASK_PROBLEM_TYPE",
			Self::AskDevice => "ASK_DEVICE",
			Self::AskErrorLine => "ASK_ERROR_LINE",
			Self::AskNetworkFail => "ASK_NETWORK_FAIL",
			Self::AskFollowup => "ASK_FOLLOWUP",
			Self::None => "NONE",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();

		Self::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
	}
}

/// Reply language. Unknown tags resolve to Korean, the product's home language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
	#[default]
	Ko,
	En,
	Ja,
}
impl Language {
	pub fn from_tag(tag: Option<&str>) -> Self {
		match tag.map(|tag| tag.trim().to_ascii_lowercase()).as_deref() {
			Some("en") => Self::En,
			Some("ja") => Self::Ja,
			_ => Self::Ko,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Ko => "ko",
			Self::En => "en",
			Self::Ja => "ja",
		}
	}

	pub fn pick(self, ko: &'static str, en: &'static str, ja: &'static str) -> &'static str {
		match self {
			Self::Ko => ko,
			Self::En => en,
			Self::Ja => ja,
		}
	}

	/// Opening prompt used whenever a plan has no usable reply text.
	pub fn problem_prompt(self) -> &'static str {
		self.pick("오케이. 지금 뭐가 안 돼?", "Okay, what's not working?", "オッケー。今なにが動かない？")
	}

	/// Chat reply used when the completion provider gives nothing back.
	pub fn cards_notice(self) -> &'static str {
		self.pick(
			"관련 해결 방법을 찾았어! 아래 카드부터 확인해봐.",
			"Found some related fixes! Check the cards below first.",
			"関連する解決方法を見つけたよ！下のカードから確認してみて。",
		)
	}
}

/// Structured classification of one chat turn. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogPlan {
	pub intent: Intent,
	pub text: String,
	pub category: Category,
	pub next_question_type: NextQuestionType,
	pub state_ended: bool,
}
impl DialogPlan {
	/// Deterministic plan used when the provider cannot be consulted or its reply is unusable.
	pub fn fallback(language: Language, category: Category) -> Self {
		Self {
			intent: Intent::Problem,
			text: language.problem_prompt().to_string(),
			category,
			next_question_type: NextQuestionType::AskProblemType,
			state_ended: false,
		}
	}
}
