//! Retrieval-augmented prompt assembly.
//!
//! The composer trusts the retriever's ordering: chunks appear in the prompt
//! exactly as ranked, each already carrying its `[page]` citation.

use crate::error::DocQaError;
use crate::error::Result;

const SEARCH_RESULTS_HEADING: &str = "search results:";

const INSTRUCTIONS: &str = "Instructions: Compose a comprehensive reply to the query using the search results given. \
Cite each reference using [ Page Number] notation (every result has this number at the beginning). \
Citation should be done at the end of each sentence. If the search results mention multiple subjects \
with the same name, create separate answers for each. Only include information found in the results and \
don't add any additional information content. If the text does not relate to the query, simply state 'Text Not Found in PDF'. Ignore outlier \
search results which have nothing to do with the question. Only answer what is asked. The \
answer should be short and concise. Answer step-by-step.";

/// Reply the instructions ask for when no result is relevant.
pub const NOT_FOUND_REPLY: &str = "Text Not Found in PDF";

#[derive(Debug, Clone, Default)]
pub struct AnswerComposer {
    preamble: String,
}

impl AnswerComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text placed ahead of the search results, e.g. a persona line.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    /// Build the prompt for `question` from the ranked `top_chunks`.
    ///
    /// The question appears exactly once, after the instruction block.
    pub fn compose<S: AsRef<str>>(&self, top_chunks: &[S], question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DocQaError::EmptyQuery);
        }

        let mut prompt = String::new();
        if !self.preamble.is_empty() {
            prompt.push_str(&self.preamble);
            prompt.push_str("\n\n");
        }

        prompt.push_str(SEARCH_RESULTS_HEADING);
        prompt.push_str("\n\n");
        for chunk in top_chunks {
            prompt.push_str(chunk.as_ref());
            prompt.push_str("\n\n");
        }

        prompt.push_str(INSTRUCTIONS);
        prompt.push_str("\n\nQuery: ");
        prompt.push_str(question);
        prompt.push_str("\nAnswer: ");
        Ok(prompt)
    }
}
