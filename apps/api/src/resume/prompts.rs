// Résumé structuring prompt templates.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are an expert resume parsing assistant. \
Read the resume text meticulously and extract every detail into the requested JSON structure. \
Do not miss any information. Pay close attention to dates, job responsibilities, \
project descriptions and skill categorization. \
Leave a field out rather than guessing its value.";

pub const RESUME_PARSE_PROMPT: &str = r#"Extract the following resume into the structured format.

Resume Text:
---
{resume_text}
---

Categorize skills as: programming languages, tools and platforms, libraries and frameworks, soft skills.
List each job's responsibilities as separate strings, in the order they appear."#;
