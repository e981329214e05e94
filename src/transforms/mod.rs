//! Text transforms backed by external services.
//!
//! Every transform is single-shot: text in, one output plus an optional
//! warning out. Service failures become warnings with an empty result, and
//! empty input short-circuits before any service is contacted.

mod classify;
mod speech;
mod sql;
mod translate;

pub use classify::{
    classify_emotion, classify_sentiment, Classifier, Emotion, EmotionScores, HuggingFaceClassifier,
    Sentiment, HF_TOKEN_ENV,
};
pub use speech::{OpenAiSynthesizer, PlaybackHandle, SpeechService, SpeechSynthesizer};
pub use sql::natural_language_to_sql;
pub use translate::{GoogleTranslator, Language, TranslationService, Translator};

use serde::Serialize;

/// A transform result with the reason it may be degraded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warned<T> {
    pub value: T,
    pub warning: Option<String>,
}

impl<T> Warned<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn warn(value: T, warning: impl Into<String>) -> Self {
        Self {
            value,
            warning: Some(warning.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.warning.is_none()
    }
}

/// A piece of split text and the separator that followed it in the input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Piece {
    pub text: String,
    pub separator: &'static str,
}

impl Piece {
    fn new(text: impl Into<String>, separator: &'static str) -> Self {
        Self {
            text: text.into(),
            separator,
        }
    }
}

/// Split text into pieces of at most `max_chars` characters.
///
/// Pieces break at line boundaries where possible. A single line longer than
/// the limit is broken at the last space before the limit, or hard-split when
/// it has none. [`rejoin`] with each piece's separator restores the input.
pub(crate) fn split_for_limit(text: &str, max_chars: usize) -> Vec<Piece> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if let Some((buf, _)) = current.take() {
                pieces.push(Piece::new(buf, "\n"));
            }
            let mut parts = break_line(line, max_chars);
            // The tail of the line may still take following lines.
            current = parts.pop().map(|p| {
                let len = p.text.chars().count();
                (p.text, len)
            });
            pieces.extend(parts);
            continue;
        }

        let fits = matches!(&current, Some((_, len)) if len + 1 + line_len <= max_chars);
        match (fits, current.as_mut()) {
            (true, Some((buf, len))) => {
                buf.push('\n');
                buf.push_str(line);
                *len += 1 + line_len;
            }
            _ => {
                pieces.extend(current.take().map(|(buf, _)| Piece::new(buf, "\n")));
                current = Some((line.to_string(), line_len));
            }
        }
    }

    if let Some((buf, _)) = current {
        pieces.push(Piece::new(buf, ""));
    }
    pieces
}

/// Join processed pieces back together with their original separators.
pub(crate) fn rejoin<I>(parts: I) -> String
where
    I: IntoIterator<Item = (String, &'static str)>,
{
    parts.into_iter().fold(String::new(), |mut out, (text, separator)| {
        out.push_str(&text);
        out.push_str(separator);
        out
    })
}

/// Break one over-long line. The space a piece breaks at becomes its
/// separator; hard splits have none.
fn break_line(line: &str, max_chars: usize) -> Vec<Piece> {
    let mut parts = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut start = 0;

    while chars.len() - start > max_chars {
        let window = &chars[start..start + max_chars + 1];
        match window.iter().rposition(|c| *c == ' ').filter(|pos| *pos > 0) {
            Some(pos) => {
                parts.push(Piece::new(chars[start..start + pos].iter().collect::<String>(), " "));
                start += pos + 1;
            }
            None => {
                parts.push(Piece::new(
                    chars[start..start + max_chars].iter().collect::<String>(),
                    "",
                ));
                start += max_chars;
            }
        }
    }
    parts.push(Piece::new(chars[start..].iter().collect::<String>(), ""));
    parts
}
