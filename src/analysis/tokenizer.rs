use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;
}

/// Canonical tokenizer, shared by the indexing and query paths so the two
/// always agree on what a term is: lower-case, split on non-alphanumeric
/// boundaries (Unicode word segmentation), drop tokens shorter than
/// `min_token_len`. No stemming.
#[derive(Debug, Clone)]
pub struct StandardTokenizer {
    pub min_token_len: usize,
    pub max_token_len: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            min_token_len: 1,
            max_token_len: 255,
        }
    }
}

impl StandardTokenizer {
    pub fn new(min_token_len: usize) -> Self {
        StandardTokenizer {
            min_token_len,
            ..Default::default()
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let lowered = text.to_lowercase();

        let mut tokens = Vec::new();
        let mut position = 0u32;
        for word in lowered.unicode_words() {
            if word.len() < self.min_token_len || word.len() > self.max_token_len {
                continue;
            }
            tokens.push(Token::new(word.to_string(), position));
            position += 1;
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }
}
