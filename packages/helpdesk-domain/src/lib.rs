pub mod card;
pub mod catalog;
pub mod dialog;
pub mod embedding_text;
pub mod text;

mod error;

pub use card::{CatalogFile, HelpCard, Step};
pub use catalog::CardCatalog;
pub use dialog::{Category, DialogPlan, Intent, Language, NextQuestionType};
pub use error::{Error, Result};
