//! Prompt assembly for the two answer modes.
//!
//! Retrieval mode stuffs the retrieved chunks into a fixed instruction
//! template; direct mode forwards the question with at most a bare mention of
//! the referenced file.

/// Instructions placed ahead of the retrieved context in the grounded prompt.
const GROUNDED_PREAMBLE: &str = "Use the following pieces of context to answer the question at the \
end. If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Build the retrieval-mode prompt: instructions, numbered context passages,
/// then the question. An empty context list produces the same template with a
/// placeholder instead of passages.
pub fn grounded_prompt(question: &str, context: &[&str]) -> String {
    let mut prompt = String::from(GROUNDED_PREAMBLE);
    prompt.push_str("\n\n");
    if context.is_empty() {
        prompt.push_str("(No document context is available for this question.)\n\n");
    } else {
        for (position, chunk) in context.iter().enumerate() {
            prompt.push_str(&format!("[{}] {}\n\n", position + 1, chunk));
        }
    }
    prompt.push_str(&format!("Question: {question}\nHelpful Answer:"));
    prompt
}

/// Build the direct-mode prompt: the question plus a bare mention of the file
/// reference. The document's contents are never included.
pub fn direct_prompt(question: &str, file_reference: Option<&str>) -> String {
    match file_reference {
        Some(reference) => format!(
            "{question}\n\n(The question concerns the document at {reference}; \
its contents are not included.)"
        ),
        None => question.to_string(),
    }
}
