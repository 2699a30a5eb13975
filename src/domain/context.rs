//! Token-budgeted selection of retrieved chunks for a prompt.

use tracing::warn;

use crate::domain::{errors::DomainError, ports::Tokenizer, ContextReport};

/// Text cut down to a token allowance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub text: String,
    pub tokens: usize,
    pub truncated: bool,
}

/// Cuts `text` to at most `max_tokens` tokens by decoding a prefix of its
/// token ids. The decoded text is re-counted and the slice shortened until
/// it fits, since decoding can merge or split tokens at the cut.
pub fn truncate_to_tokens(
    tokenizer: &dyn Tokenizer,
    text: &str,
    max_tokens: usize,
) -> Result<Truncated, DomainError> {
    let ids = tokenizer.encode(text)?;
    if ids.len() <= max_tokens {
        return Ok(Truncated {
            text: text.to_string(),
            tokens: ids.len(),
            truncated: false,
        });
    }
    truncate_ids(tokenizer, &ids, max_tokens)
}

fn truncate_ids(
    tokenizer: &dyn Tokenizer,
    ids: &[u32],
    max_tokens: usize,
) -> Result<Truncated, DomainError> {
    let mut take = max_tokens.min(ids.len());
    while take > 0 {
        let text = tokenizer.decode(&ids[..take])?;
        let tokens = tokenizer.count_tokens(&text)?;
        if tokens <= max_tokens {
            return Ok(Truncated {
                text,
                tokens,
                truncated: true,
            });
        }
        take -= 1;
    }
    Ok(Truncated {
        text: String::new(),
        tokens: 0,
        truncated: true,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPiece {
    /// Position of the chunk in the input sequence.
    pub index: usize,
    pub text: String,
    pub tokens: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSelection {
    pub pieces: Vec<ContextPiece>,
    pub budget: usize,
    pub used_tokens: usize,
    pub truncated: bool,
    /// Input chunks that did not make it in at all.
    pub dropped: usize,
}

impl ContextSelection {
    pub fn report(&self) -> ContextReport {
        ContextReport {
            budget: self.budget,
            used_tokens: self.used_tokens,
            truncated: self.truncated,
            dropped: self.dropped,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.truncated || self.dropped > 0
    }
}

/// Selects a prefix of `chunks` whose total token count fits `budget`.
///
/// Chunks are taken whole while they fit. The first chunk that does not fit
/// is truncated to whatever budget remains and selection stops there. Order
/// is preserved and only the last selected piece can be truncated.
///
/// Emits a warning event on the `docsearch::context` target whenever a chunk
/// is truncated or dropped.
pub fn assemble_context<S: AsRef<str>>(
    tokenizer: &dyn Tokenizer,
    chunks: &[S],
    budget: usize,
) -> Result<ContextSelection, DomainError> {
    if budget == 0 {
        return Err(DomainError::configuration("context token budget must be positive"));
    }

    let mut pieces = Vec::with_capacity(chunks.len());
    let mut used_tokens = 0;
    let mut truncated = false;

    for (index, chunk) in chunks.iter().enumerate() {
        let remaining = budget - used_tokens;
        if remaining == 0 {
            break;
        }

        let text = chunk.as_ref();
        let ids = tokenizer.encode(text)?;
        if ids.len() <= remaining {
            used_tokens += ids.len();
            pieces.push(ContextPiece {
                index,
                text: text.to_string(),
                tokens: ids.len(),
                truncated: false,
            });
            continue;
        }

        let cut = truncate_ids(tokenizer, &ids, remaining)?;
        if !cut.text.is_empty() {
            used_tokens += cut.tokens;
            truncated = true;
            pieces.push(ContextPiece {
                index,
                text: cut.text,
                tokens: cut.tokens,
                truncated: true,
            });
        }
        break;
    }

    let dropped = chunks.len() - pieces.len();
    if truncated || dropped > 0 {
        warn!(
            target: "docsearch::context",
            budget,
            used_tokens,
            truncated,
            dropped,
            candidates = chunks.len(),
            "context budget exceeded"
        );
    }

    Ok(ContextSelection {
        pieces,
        budget,
        used_tokens,
        truncated,
        dropped,
    })
}
