//! Prompt composition
//!
//! Pure assembly of the instruction envelope sent to the completion service:
//! a fixed directive, the question, the file summaries in supplied order, and
//! a strict output contract. Same inputs produce a byte-identical prompt.

/// Builds the prompt from the question and the `(name, summary)` pairs.
/// Summary order is preserved as supplied; callers provide entries already
/// sorted by name.
pub fn compose(question: &str, summaries: &[(String, String)]) -> String {
    let mut prompt = format!("Answer this question directly and concisely: {question}\n");

    if !summaries.is_empty() {
        prompt.push_str("File contents:\n");
        for (name, summary) in summaries {
            prompt.push_str(&format!("--- {name} ---\n{summary}\n\n"));
        }
    }

    prompt.push_str("Return ONLY the answer value, nothing else. No explanations.");
    prompt
}
