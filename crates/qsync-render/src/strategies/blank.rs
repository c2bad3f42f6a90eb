//! Blank filling: every blank in the stem is filled with its answer.

use qsync_core::{Artifact, ItemKind, RawItem, RenderError};
use serde_json::Value;

use super::{Composer, stem};
use crate::fragment::Fragment;

pub(super) fn render(kind: ItemKind, item: &RawItem) -> Result<Artifact, RenderError> {
    let mut composer = Composer::new(kind);
    composer.materials(item)?;

    let answers = answers(item)?;
    let (mut fragment, blanks) = Fragment::parse_with_blanks(stem(item)?);

    if blanks.is_empty() {
        composer.body(fragment);
        composer.point("Answer", Fragment::plain(answers.join("; ")));
    } else {
        if answers.len() < blanks.len() {
            return Err(RenderError::InvalidField {
                field: "answer",
                reason: format!("{} blanks but {} answers", blanks.len(), answers.len()),
            });
        }
        for (index, (token, answer)) in blanks.iter().zip(&answers).enumerate() {
            let filled = format!(" [{}: {answer}] ", index + 1);
            fragment.text = fragment.text.replacen(token.as_str(), &filled, 1);
            fragment.assets.insert(token.clone(), filled);
        }
        fragment.text = fragment.text.trim().to_string();
        composer.body(fragment);
    }

    composer.trailing_points(item);
    Ok(composer.finish())
}

fn answers(item: &RawItem) -> Result<Vec<String>, RenderError> {
    let answers: Vec<String> = match item.field("answer") {
        None => return Err(RenderError::MissingField("answer")),
        Some(Value::Array(values)) => values.iter().map(answer_text).collect(),
        Some(value) => vec![answer_text(value)],
    };
    if answers.iter().all(|a| a.is_empty()) {
        return Err(RenderError::MissingField("answer"));
    }
    Ok(answers)
}

fn answer_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
