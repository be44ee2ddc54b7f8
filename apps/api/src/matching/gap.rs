//! Gap analysis: fit score, skill gaps and next steps for one JD.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::{render, FIDELITY_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{
    complete_json, lenient, lenient_score, lenient_vec, CompletionProvider, CompletionRequest,
    GenerationOptions, ResponseShape, Structured,
};
use crate::matching::prompts::{GAP_PROMPT, GAP_SYSTEM};

const GAP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub missing_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub unique_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub strengths: String,
    #[serde(default, deserialize_with = "lenient")]
    pub gaps: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NextStep {
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub suggestion: String,
    #[serde(default, deserialize_with = "lenient")]
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    #[serde(default, deserialize_with = "lenient_score")]
    pub overall_fit_score: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub analysis_summary: String,
    #[serde(default, deserialize_with = "lenient")]
    pub skill_analysis: SkillAnalysis,
    #[serde(default, deserialize_with = "lenient")]
    pub experience_analysis: ExperienceAnalysis,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub next_steps: Vec<NextStep>,
}

impl ResponseShape for GapAnalysis {
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["overall_fit_score", "analysis_summary", "skill_analysis"];
}

impl GapAnalysis {
    /// Headline score shown on the compare screen.
    pub fn fit_score(&self) -> u32 {
        self.overall_fit_score
    }
}

/// Compares `resume_text` with `jd_text` and returns the gap report.
pub async fn analyze_gaps(
    resume_text: &str,
    jd_text: &str,
    llm: &dyn CompletionProvider,
) -> Result<Structured<GapAnalysis>, AppError> {
    let prompt = render(
        GAP_PROMPT,
        &[("resume_text", resume_text), ("jd_text", jd_text)],
    );
    let system = format!("{GAP_SYSTEM} {FIDELITY_INSTRUCTION} {JSON_ONLY_SYSTEM}");
    let request = CompletionRequest::single(system, prompt)
        .with_options(GenerationOptions::PRECISE)
        .with_timeout(GAP_TIMEOUT);

    complete_json::<GapAnalysis>(llm, request)
        .await
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::ScriptedProvider;
    use crate::llm_client::LlmError;

    #[tokio::test]
    async fn test_gap_report_decodes() {
        let llm = ScriptedProvider::replying(
            r#"{
                "overall_fit_score": 64,
                "analysis_summary": "Solid backend base, no Kubernetes.",
                "skill_analysis": {"matched_skills": ["Python"], "missing_skills": ["Kubernetes"],
                                   "unique_skills": ["Rust"]},
                "experience_analysis": {"strengths": "APIs at scale.", "gaps": "No on-call."},
                "next_steps": [{"title": "Bridge Your Skill Gaps", "suggestion": "Learn k8s",
                                "action": "Go to the 'Roadmap' Module"}]
            }"#,
        );

        let gap = analyze_gaps("resume", "jd", &llm).await.unwrap();

        assert_eq!(gap.value.fit_score(), 64);
        assert_eq!(gap.value.skill_analysis.unique_skills, vec!["Rust"]);
        assert_eq!(gap.value.next_steps.len(), 1);
        assert_eq!(gap.value.next_steps[0].action, "Go to the 'Roadmap' Module");
        assert!(gap.missing_fields.is_empty());
    }

    #[tokio::test]
    async fn test_next_step_with_missing_keys_is_kept() {
        let llm = ScriptedProvider::replying(
            r#"{"overall_fit_score": 50, "analysis_summary": "ok", "skill_analysis": {},
                "next_steps": [{"title": "Tailor Your Resume"}]}"#,
        );

        let gap = analyze_gaps("r", "j", &llm).await.unwrap();

        assert_eq!(gap.value.next_steps[0].title, "Tailor Your Resume");
        assert_eq!(gap.value.next_steps[0].suggestion, "");
        assert!(gap.value.skill_analysis.matched_skills.is_empty());
    }

    #[tokio::test]
    async fn test_request_uses_gap_timeout() {
        let llm = ScriptedProvider::replying("{}");
        analyze_gaps("r", "j", &llm).await.unwrap();
        assert_eq!(llm.last_request().timeout, GAP_TIMEOUT);
    }

    #[tokio::test]
    async fn test_prose_reply_is_a_decode_error() {
        let llm = ScriptedProvider::replying("The candidate is a good fit overall.");
        let err = analyze_gaps("r", "j", &llm).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::Decode { .. })));
    }
}
