// Shared prompt fragments and the template renderer.
// Each feature module keeps its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every prompt that reads a résumé.
pub const FIDELITY_INSTRUCTION: &str = "\
    Read both documents in context. Copy proper nouns (names, schools, companies) exactly \
    as written. Never invent experience, credentials or contact details that are not in the text.";

/// Replaces every `{name}` placeholder in `template` with its value.
///
/// The template is scanned once, so braces inside inserted values are never
/// expanded. Unknown placeholders are left as-is.
pub fn render(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let field = fields.iter().find(|(name, _)| {
            after
                .strip_prefix(*name)
                .is_some_and(|tail| tail.starts_with('}'))
        });
        match field {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
