//! Tool exposure strategy for a single conversation turn.

/// Prefix an executor answers with when it refuses an unclear task.
pub const ESCALATION_MARKER: &str = "ESCALATE:";

/// Greeting terms that mark short input as conversational.
const GREETING_TERMS: [&str; 6] = [
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
];

/// Word count below which input may be treated as a greeting.
const CONVERSATIONAL_MAX_WORDS: usize = 5;

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Detect short greeting-only input, for which tools are hidden.
///
/// Input qualifies when it has fewer than five words and contains a greeting
/// term as whole words.
pub fn is_conversational_prompt(text: &str) -> bool {
    if text.split_whitespace().count() >= CONVERSATIONAL_MAX_WORDS {
        return false;
    }

    let tokens = words(text);
    GREETING_TERMS.iter().any(|term| {
        let term_words = words(term);
        tokens
            .windows(term_words.len())
            .any(|window| window == term_words.as_slice())
    })
}

/// First tool, in registration order, whose name appears verbatim in `prompt`.
pub fn forced_tool<'a, I>(prompt: &str, tool_names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    tool_names
        .into_iter()
        .find(|name| !name.is_empty() && prompt.contains(name))
}

/// Whether an executor answer is an escalation rather than an artifact.
pub fn is_escalation(answer: &str) -> bool {
    answer.trim_start().starts_with(ESCALATION_MARKER)
}
