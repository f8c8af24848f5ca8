//! Prompt assembly for the conversational agent

use super::{QueryResult, QueryStatus};

/// Formatting rules prepended to every prompt
pub const FORMATTING_RULES: &str = "You are a helpful AI assistant. Please format your responses according to these rules:\n\
1. If providing a list of items, use numbered points (1., 2., etc.) with each point on a new line\n\
2. If explaining concepts, separate different points with line breaks\n\
3. For any lists or steps, add a line break before and after the list\n\
4. Keep paragraphs concise and separated by line breaks\n\
5. Use bullet points (•) for sub-items or related points\n\n";

const CONTEXT_HEADER: &str = "Previous conversation context:\n";

const CLOSING_INSTRUCTION: &str = "\n\nPlease provide a helpful response that builds on the previous context if relevant. \
Remember to format your response according to the rules above.";

/// Build the prompt for `query` given the conversation so far
///
/// Only completed entries contribute context. Each one is labelled with its
/// 1-based position in the full history, so skipped failures leave gaps in
/// the numbering.
pub fn build_prompt(history: &[QueryResult], query: &str) -> String {
    let mut prompt = String::with_capacity(FORMATTING_RULES.len() + query.len() + 256);
    prompt.push_str(FORMATTING_RULES);

    if !history.is_empty() {
        prompt.push_str(CONTEXT_HEADER);
        for (index, previous) in history.iter().enumerate() {
            if previous.status != QueryStatus::Completed {
                continue;
            }
            prompt.push_str(&format!(
                "{}. Q: {}\n   A: {}\n\n",
                index + 1,
                previous.query,
                previous.answer
            ));
        }
    }

    prompt.push_str("Current query: ");
    prompt.push_str(query);
    prompt.push_str(CLOSING_INSTRUCTION);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(query: &str, answer: &str, status: QueryStatus) -> QueryResult {
        let mut result = QueryResult::started(query);
        result.answer = answer.to_string();
        result.status = status;
        result
    }

    #[test]
    fn empty_history_has_no_context_block() {
        let prompt = build_prompt(&[], "what is rust?");
        assert!(prompt.starts_with(FORMATTING_RULES));
        assert!(!prompt.contains(CONTEXT_HEADER));
        assert!(prompt.contains("Current query: what is rust?\n\n"));
        assert!(prompt.ends_with("according to the rules above."));
    }

    #[test]
    fn failed_entries_are_skipped_but_keep_their_slot() {
        let history = vec![
            entry("first", "one", QueryStatus::Completed),
            entry("second", "Error: down", QueryStatus::Failed),
            entry("third", "three", QueryStatus::Completed),
        ];
        let prompt = build_prompt(&history, "fourth");

        assert!(prompt.contains("1. Q: first\n   A: one\n\n"));
        assert!(prompt.contains("3. Q: third\n   A: three\n\n"));
        assert!(!prompt.contains("second"));
        assert!(!prompt.contains("Error: down"));
        assert!(prompt.find("1. Q: first").unwrap() < prompt.find("3. Q: third").unwrap());
    }

    #[test]
    fn header_is_written_even_when_every_entry_failed() {
        let history = vec![entry("only", "Error: x", QueryStatus::Failed)];
        let prompt = build_prompt(&history, "again");
        assert!(prompt.contains(CONTEXT_HEADER));
        assert_eq!(prompt.matches(". Q: ").count(), 0);
    }
}
