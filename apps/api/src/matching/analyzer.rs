//! Résumé-vs-JD scoring: the 10-point analysis dashboard.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::{render, FIDELITY_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{
    complete_json, lenient, lenient_score, lenient_vec, CompletionProvider, CompletionRequest,
    GenerationOptions, ResponseShape, Structured,
};
use crate::matching::prompts::{ANALYSIS_PROMPT, ANALYSIS_SYSTEM};

const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(90);

/// Experience relevance below this is flagged for tailoring.
pub const RELEVANCE_WARNING_THRESHOLD: u32 = 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub contact: String,
    #[serde(default, deserialize_with = "lenient")]
    pub education: String,
    #[serde(default, deserialize_with = "lenient")]
    pub experience_years: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub key_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsMatch {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub matched: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub missing: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub recommended: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordOptimization {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub missing_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub weak_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationCheck {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub missing: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub suggested: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftSkillsAnalysis {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub found: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattingNotes {
    #[serde(default, deserialize_with = "lenient")]
    pub structure: String,
    #[serde(default, deserialize_with = "lenient")]
    pub issues: String,
    #[serde(default, deserialize_with = "lenient")]
    pub friendliness: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    #[serde(default, deserialize_with = "lenient_score")]
    pub resume_score: u32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub jd_match_score: u32,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub missing_skills_list: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub suggested_improvements: Vec<String>,
}

/// Full analysis of one résumé against one job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub profile_summary: ProfileSummary,
    #[serde(default, deserialize_with = "lenient_score")]
    pub ats_match_score: u32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub keyword_score: u32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub experience_relevance_score: u32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub formatting_score: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub skills_match: SkillsMatch,
    #[serde(default, deserialize_with = "lenient")]
    pub keyword_optimization: KeywordOptimization,
    #[serde(default, deserialize_with = "lenient")]
    pub education_certifications: CertificationCheck,
    #[serde(default, deserialize_with = "lenient")]
    pub soft_skills_analysis: SoftSkillsAnalysis,
    #[serde(default, deserialize_with = "lenient")]
    pub formatting_ats: FormattingNotes,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub improvement_suggestions: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub final_report: FinalReport,
}

impl ResponseShape for ResumeAnalysis {
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "ats_match_score",
        "keyword_score",
        "experience_relevance_score",
        "formatting_score",
        "skills_match",
    ];
}

impl ResumeAnalysis {
    pub fn needs_tailoring(&self) -> bool {
        self.experience_relevance_score < RELEVANCE_WARNING_THRESHOLD
    }
}

/// Runs the 10-point analysis of `resume_text` against `jd_text`.
pub async fn analyze_resume(
    resume_text: &str,
    jd_text: &str,
    llm: &dyn CompletionProvider,
) -> Result<Structured<ResumeAnalysis>, AppError> {
    let prompt = render(
        ANALYSIS_PROMPT,
        &[("resume_text", resume_text), ("jd_text", jd_text)],
    );
    let system = format!("{ANALYSIS_SYSTEM} {FIDELITY_INSTRUCTION} {JSON_ONLY_SYSTEM}");
    let request = CompletionRequest::single(system, prompt)
        .with_options(GenerationOptions::PRECISE)
        .with_timeout(ANALYSIS_TIMEOUT);

    complete_json::<ResumeAnalysis>(llm, request)
        .await
        .map_err(AppError::from)
}
