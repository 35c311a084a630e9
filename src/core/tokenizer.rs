//! Tokenizer for raw command lines.
//!
//! Splits a line into a label and argument tokens. Quoted spans keep their
//! whitespace so a greedy argument can be fed as one token or many.

use thiserror::Error;

/// A tokenized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// The command label (first token).
    pub label: &'a str,
    /// The remaining tokens.
    pub args: Vec<&'a str>,
    /// The untouched input.
    pub raw: &'a str,
}

/// Tokenize error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("empty input")]
    EmptyInput,
    #[error("unterminated string at position {position}")]
    UnterminatedString { position: usize },
}

/// Tokenize a command line into label and arguments.
///
/// # Syntax
///
/// - Tokens are separated by whitespace
/// - Single or double quotes group words into one token
/// - A backslash inside quotes escapes the next character (kept verbatim)
///
/// # Examples
///
/// ```
/// use bevy_commander::tokenize;
///
/// let line = tokenize("give alice sword").unwrap();
/// assert_eq!(line.label, "give");
/// assert_eq!(line.args, vec!["alice", "sword"]);
///
/// let line = tokenize(r#"say "hello there!""#).unwrap();
/// assert_eq!(line.args, vec!["hello there!"]);
/// ```
pub fn tokenize(input: &str) -> Result<CommandLine<'_>, TokenizeError> {
    let mut tokens = tokenize_string(input)?.into_iter();
    let label = tokens.next().ok_or(TokenizeError::EmptyInput)?;
    Ok(CommandLine {
        label,
        args: tokens.collect(),
        raw: input,
    })
}

/// Split a string into tokens, label included.
pub fn tokenize_string(input: &str) -> Result<Vec<&str>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => continue,

            '"' | '\'' => {
                let quote = c;
                let content_start = start + 1;
                let mut end = content_start;
                let mut found_end = false;

                while let Some((i, ch)) = chars.next() {
                    if ch == quote {
                        found_end = true;
                        break;
                    }
                    if ch == '\\' {
                        // Escaped character stays in the slice
                        if let Some((j, escaped)) = chars.next() {
                            end = j + escaped.len_utf8();
                        }
                    } else {
                        end = i + ch.len_utf8();
                    }
                }

                if !found_end {
                    return Err(TokenizeError::UnterminatedString { position: start });
                }

                tokens.push(&input[content_start..end]);
            }

            _ => {
                let mut end = start + c.len_utf8();

                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_whitespace() || ch == '"' || ch == '\'' {
                        break;
                    }
                    end = i + ch.len_utf8();
                    chars.next();
                }

                tokens.push(&input[start..end]);
            }
        }
    }

    Ok(tokens)
}
