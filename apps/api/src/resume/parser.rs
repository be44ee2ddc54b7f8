//! Résumé structuring: turns extracted résumé text into a `ResumeProfile` dashboard.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm_client::prompts::{render, FIDELITY_INSTRUCTION};
use crate::llm_client::{
    complete_json, lenient, lenient_vec, CompletionProvider, CompletionRequest, GenerationOptions,
    ResponseShape, Structured,
};
use crate::resume::prompts::{RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactProfile {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient")]
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient")]
    pub dates: String,
    #[serde(default, deserialize_with = "lenient")]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGroups {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub programming: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tools_platforms: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub libraries_frameworks: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub soft_skills: Vec<String>,
}

impl SkillGroups {
    pub fn is_empty(&self) -> bool {
        self.programming.is_empty()
            && self.tools_platforms.is_empty()
            && self.libraries_frameworks.is_empty()
            && self.soft_skills.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient")]
    pub dates: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub link: String,
}

/// Structured résumé as shown on the preview dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(default, deserialize_with = "lenient")]
    pub profile: ContactProfile,
    #[serde(default, deserialize_with = "lenient")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "lenient")]
    pub skills: SkillGroups,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub projects: Vec<ProjectEntry>,
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": string() })
}

fn object(properties: Value) -> Value {
    json!({ "type": "OBJECT", "properties": properties })
}

impl ResponseShape for ResumeProfile {
    const REQUIRED_FIELDS: &'static [&'static str] = &["profile", "skills", "experience"];

    fn schema() -> Option<Value> {
        Some(object(json!({
            "profile": object(json!({
                "name": string(),
                "email": string(),
                "phone": string(),
                "linkedin": string(),
                "github": string(),
            })),
            "summary": string(),
            "education": {
                "type": "ARRAY",
                "items": object(json!({
                    "degree": string(),
                    "institution": string(),
                    "dates": string(),
                    "details": string(),
                })),
            },
            "skills": object(json!({
                "programming": string_array(),
                "tools_platforms": string_array(),
                "libraries_frameworks": string_array(),
                "soft_skills": string_array(),
            })),
            "experience": {
                "type": "ARRAY",
                "items": object(json!({
                    "role": string(),
                    "company": string(),
                    "dates": string(),
                    "responsibilities": string_array(),
                })),
            },
            "projects": {
                "type": "ARRAY",
                "items": object(json!({
                    "name": string(),
                    "description": string(),
                    "link": string(),
                })),
            },
        })))
    }
}

/// Asks the model to structure `resume_text` into a `ResumeProfile`.
pub async fn parse_resume(
    resume_text: &str,
    llm: &dyn CompletionProvider,
) -> Result<Structured<ResumeProfile>, AppError> {
    let prompt = render(RESUME_PARSE_PROMPT, &[("resume_text", resume_text)]);
    let system = format!("{RESUME_PARSE_SYSTEM} {FIDELITY_INSTRUCTION}");
    let request = CompletionRequest::single(system, prompt).with_options(GenerationOptions::PRECISE);

    complete_json::<ResumeProfile>(llm, request)
        .await
        .map_err(AppError::from)
}
