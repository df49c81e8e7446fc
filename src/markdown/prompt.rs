//! System instruction sent with every chunk

/// Rules the generation backend must follow when rewriting page content
pub const SYSTEM_INSTRUCTION: &str = "\
You convert webpage content into clean, readable Markdown without losing information or links.

Rules:
1. Keep every piece of meaningful content: headings, paragraphs, lists, tables and links. Keep the original structure.
2. Never invent, infer or add content that is not present in the input.
3. Drop noise such as advertisements, leftover scripts and repeated navigation.
4. Use proper Markdown syntax for headings, lists, code blocks and images.
5. Keep raw HTML only when it appears inside <pre> or <code> in the input. Drop every other HTML element and never add new ones.
6. Do not write notes or comments about what was removed.
7. Return the Markdown only, with no explanation, metadata or placeholders.

When unsure whether something is noise, keep it.";

/// Builds the user turn for one chunk
pub fn user_prompt(chunk_text: &str) -> String {
    format!("Input:\n{}", chunk_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_mentions_code_exception() {
        assert!(SYSTEM_INSTRUCTION.contains("<pre>"));
        assert!(SYSTEM_INSTRUCTION.contains("<code>"));
    }

    #[test]
    fn test_user_prompt_wraps_chunk() {
        assert_eq!(user_prompt("<h1>Hi</h1>"), "Input:\n<h1>Hi</h1>");
    }
}
