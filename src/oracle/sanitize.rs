//! Cleanup applied to raw completion text before JSON parsing.

/// Strips one surrounding Markdown code fence.
///
/// Removes a leading fence line made of three backticks and an optional alphabetic language
/// tag, and a trailing `\n` followed by three backticks. Text without fences is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```")
        && let Some(newline) = rest.find('\n')
        && rest[..newline].chars().all(|c| c.is_ascii_alphabetic())
    {
        body = &rest[newline + 1..];
    }

    if let Some(rest) = body.strip_suffix("\n```") {
        body = rest;
    }

    body
}

/// Like [`strip_code_fences`], but also drops a bare `json` tag line and stray fences.
///
/// Used by the extraction pathway, which sees more free-form output than the matcher.
pub fn strip_code_fences_lenient(text: &str) -> &str {
    let mut body = strip_code_fences(text).trim();
    body = body.trim_start_matches("```").trim_end_matches("```").trim();
    if let Some(rest) = body.strip_prefix("json") {
        body = rest.trim_start();
    }
    body
}
