use crate::{drafting::schema::NOT_SPECIFIED, entities::PostType, extractor::DetectedLanguage};

const COMMON_SCHEMA: &str = r#"  "title": "string, the notice title (e.g. UPSC Civil Services Recruitment 2025)",
  "organization": "string, the recruiting or conducting body",
  "postDate": "string, YYYY-MM-DD if the text allows, otherwise the text's own wording",
  "description": "string, a concise 2-3 sentence summary",
  "importantDates": [{ "label": "string", "date": "string" }],
  "importantLinks": [{ "label": "string", "url": "absolute http(s) url" }],
  "confidence": "number between 0 and 1, how sure you are the fields are correct""#;

const JOB_NOTIFICATION_SCHEMA: &str = r#"  "totalVacancy": "string, number of posts",
  "applicationFee": "string, fee per category (e.g. Gen: 100, SC/ST: Nil)",
  "ageLimit": "string, age eligibility",
  "qualification": "string, education requirements",
  "patternChanged": "boolean, true if the text announces a change to the exam pattern or syllabus",
  "patternChangeSummary": "string or null, what changed when patternChanged is true""#;

const EXAM_NOTICE_SCHEMA: &str = r#"  "totalVacancy": "string, number of posts the exam recruits for""#;

fn role(post_type: PostType) -> &'static str {
    match post_type {
        PostType::JobNotification => {
            "Extract the recruitment notification described in the text: who is hiring, for how \
             many posts, who is eligible, what it costs to apply and the deadlines."
        }
        PostType::AdmitCard => {
            "Extract the admit card / hall ticket announcement described in the text: which exam, \
             when and where it is held, and where candidates download the admit card."
        }
        PostType::Result => {
            "Extract the result announcement described in the text: which exam, when the result \
             was declared, and where candidates check it."
        }
    }
}

/// Full instruction for one classification, with the page text embedded.
/// `text` is expected to be bounded by the caller.
pub fn build_prompt(
    post_type: PostType,
    text: &str,
    source_url: &str,
    language: Option<&DetectedLanguage>,
) -> String {
    let extra_schema = match post_type {
        PostType::JobNotification => JOB_NOTIFICATION_SCHEMA,
        PostType::AdmitCard | PostType::Result => EXAM_NOTICE_SCHEMA,
    };

    let language_rule = match language {
        Some(lang) if !lang.is_english() => format!(
            "6. The text is written in {}. Write every field value in English.\n",
            lang.name()
        ),
        _ => String::new(),
    };

    format!(
        "You are a data extractor for a government job portal.\n\
         {role}\n\n\
         Respond with a single JSON object with exactly these fields:\n\
         {{\n{COMMON_SCHEMA},\n{extra_schema}\n}}\n\n\
         Rules:\n\
         1. Use only the provided text. Do not hallucinate or fabricate any value.\n\
         2. If a string field is not stated in the text, use \"{NOT_SPECIFIED}\". \
         If a list has no entries, use an empty array.\n\
         3. Format dates as YYYY-MM-DD if possible, otherwise keep the original wording.\n\
         4. Be precise with numbers (vacancies, fees, ages).\n\
         5. Relative links are resolved against {source_url}.\n\
         {language_rule}\n\
         TEXT:\n{text}\n",
        role = role(post_type),
    )
}
