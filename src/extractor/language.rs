use whatlang::{Lang, detect};

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_LENGTH: usize = 50;

/// Language of a cleaned page, as far as it can be told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedLanguage {
    lang: Lang,
}

impl DetectedLanguage {
    /// ISO 639-1 code where one exists (`en`, `hi`, ...).
    pub fn code(&self) -> String {
        lang_to_code(self.lang)
    }

    /// English name, used in extraction instructions.
    pub fn name(&self) -> &'static str {
        self.lang.eng_name()
    }

    pub fn is_english(&self) -> bool {
        self.lang == Lang::Eng
    }
}

pub fn detect_language(text: &str) -> Option<DetectedLanguage> {
    // Skip detection for very short text
    if text.trim().len() < MIN_TEXT_LENGTH {
        return None;
    }

    if let Some(info) = detect(text)
        && info.confidence() >= MIN_CONFIDENCE
    {
        return Some(DetectedLanguage { lang: info.lang() });
    }

    None
}

fn lang_to_code(lang: Lang) -> String {
    match lang {
        Lang::Eng => "en".to_string(),
        Lang::Hin => "hi".to_string(),
        Lang::Ben => "bn".to_string(),
        Lang::Mar => "mr".to_string(),
        Lang::Tel => "te".to_string(),
        Lang::Tam => "ta".to_string(),
        Lang::Guj => "gu".to_string(),
        Lang::Kan => "kn".to_string(),
        Lang::Mal => "ml".to_string(),
        Lang::Pan => "pa".to_string(),
        Lang::Ori => "or".to_string(),
        Lang::Urd => "ur".to_string(),
        Lang::Nep => "ne".to_string(),
        _ => lang.code().to_string(),
    }
}
