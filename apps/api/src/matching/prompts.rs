// Résumé-vs-job-description prompt templates.
// Both prompts carry their output structure inline; replies are requested as JSON
// without a server-side schema.

pub const ANALYSIS_SYSTEM: &str = "\
You are an expert HR analyst and career coach. \
You perform deep, critical comparisons between a candidate's resume and a job description. \
Your primary goal is accuracy.";

pub const ANALYSIS_PROMPT: &str = r#"Perform a 10-point analysis comparing the following resume with the job description.

**Resume Text:**
---
{resume_text}
---

**Job Description Text:**
---
{jd_text}
---

**JSON Output Structure:**
{
  "profile_summary": {
    "name": "<Extracted Full Name>",
    "contact": "<Extracted Email & Phone>",
    "education": "<Highest Degree and Institution>",
    "experience_years": "<Total years of experience, e.g. '3+ years' or 'Entry-level'>",
    "key_skills": ["<Top 5 most relevant skills found in the resume>"]
  },
  "ats_match_score": <Integer 0-100, keyword alignment and structural integrity>,
  "keyword_score": <Integer 0-100, direct skill and keyword overlap>,
  "experience_relevance_score": <Integer 0-100, how well the work experience fits the JD>,
  "formatting_score": <Integer 0-100, clarity, bullet points, standard sections>,
  "skills_match": {
    "matched": ["<Skills present in both documents>"],
    "missing": ["<Critical JD skills NOT in the resume>"],
    "recommended": ["<2-3 industry-standard skills for this role mentioned in neither>"]
  },
  "keyword_optimization": {
    "missing_keywords": ["<Top 5 JD keywords to add>"],
    "weak_keywords": ["<Weak phrases like 'responsible for' found in the resume>"]
  },
  "education_certifications": {
    "missing": ["<Required certifications from the JD not in the resume>"],
    "suggested": ["<2-3 certifications that would strengthen the resume>"]
  },
  "soft_skills_analysis": {
    "found": ["<Soft skills found in the resume>"],
    "missing": ["<Soft skills the JD asks for that the resume lacks>"]
  },
  "formatting_ats": {
    "structure": "<'Clear and well-structured' or which standard sections are missing>",
    "issues": "<'None detected' or a brief description of issues>",
    "friendliness": "<Percentage string, e.g. '90%'>"
  },
  "improvement_suggestions": ["<Concrete, actionable tips>"],
  "final_report": {
    "resume_score": <Integer, overall quality and readiness>,
    "jd_match_score": <Integer, same as ats_match_score>,
    "missing_skills_list": ["<Same as skills_match.missing>"],
    "suggested_improvements": ["<Same as improvement_suggestions>"]
  }
}"#;

pub const GAP_SYSTEM: &str = "\
You are an expert HR analyst and career coach. \
You perform detailed gap analyses between a candidate's resume and a job description \
and always close with actionable next steps.";

pub const GAP_PROMPT: &str = r#"Perform a highly detailed gap analysis between this resume and job description.

Here is the candidate's resume:
---
{resume_text}
---

Here is the job description:
---
{jd_text}
---

Return a single JSON object with this structure:
{
  "overall_fit_score": <Integer 0-100>,
  "analysis_summary": "<2-3 sentences on fit, key strengths and gaps>",
  "skill_analysis": {
    "matched_skills": ["<Top 5-7 skills found in BOTH documents>"],
    "missing_skills": ["<Top 5-7 critical JD skills MISSING from the resume>"],
    "unique_skills": ["<2-3 valuable skills the candidate has that the JD does not require>"]
  },
  "experience_analysis": {
    "strengths": "<One sentence on where experience aligns, citing an example>",
    "gaps": "<One sentence naming specific experience gaps>"
  },
  "next_steps": [
    {"title": "Bridge Your Skill Gaps", "suggestion": "<How a learning plan would close the missing skills>", "action": "Go to the 'Roadmap' Module"},
    {"title": "Tailor Your Resume", "suggestion": "<Why and how to tailor to this JD>", "action": "Go to the 'Analysis' Module"},
    {"title": "Prepare for the Interview", "suggestion": "<What to rehearse given the unique skills>", "action": "Go to the 'AI Mentor' Module"}
  ]
}"#;
