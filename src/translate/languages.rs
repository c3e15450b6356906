use serde::Serialize;

/// A language the translation models can handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportedLanguage {
    pub name: &'static str,
    /// Code used by the translation model family (`jap`, not `ja`)
    pub code: &'static str,
}

/// Supported languages, in resolution order
pub static SUPPORTED_LANGUAGES: [SupportedLanguage; 11] = [
    SupportedLanguage { name: "English", code: "en" },
    SupportedLanguage { name: "French", code: "fr" },
    SupportedLanguage { name: "Spanish", code: "es" },
    SupportedLanguage { name: "German", code: "de" },
    SupportedLanguage { name: "Italian", code: "it" },
    SupportedLanguage { name: "Russian", code: "ru" },
    SupportedLanguage { name: "Chinese (Simplified)", code: "zh" },
    SupportedLanguage { name: "Japanese", code: "jap" },
    SupportedLanguage { name: "Arabic", code: "ar" },
    SupportedLanguage { name: "Hindi", code: "hi" },
    SupportedLanguage { name: "Portuguese", code: "pt" },
];

/// Map a detected language code onto the supported set.
///
/// A candidate matches when the detected code starts with its code, or when
/// an alias applies: `ja` maps to `jap`, and any `zh*` variant (`zh-cn`,
/// `zh-tw`) maps to `zh`. The first match in declared order wins.
pub fn resolve<'a>(detected: &str, supported: &'a [SupportedLanguage]) -> Option<&'a SupportedLanguage> {
    let detected = detected.trim().to_lowercase();
    supported.iter().find(|candidate| {
        detected.starts_with(candidate.code)
            || (candidate.code == "jap" && detected == "ja")
            || (candidate.code == "zh" && detected.starts_with("zh"))
    })
}

pub fn find_by_code(code: &str) -> Option<&'static SupportedLanguage> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|language| language.code.eq_ignore_ascii_case(code.trim()))
}

pub fn find_by_name(name: &str) -> Option<&'static SupportedLanguage> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|language| language.name.eq_ignore_ascii_case(name.trim()))
}
