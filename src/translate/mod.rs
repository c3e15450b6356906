pub mod interface;
pub mod languages;

pub use interface::{model_pair, TranslationRequest};
pub use languages::{find_by_code, find_by_name, resolve, SupportedLanguage, SUPPORTED_LANGUAGES};
