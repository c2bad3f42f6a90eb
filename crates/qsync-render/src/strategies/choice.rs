//! Choice kinds: single, multiple, cloze, reading comprehension and
//! true-or-false (two fixed options when the item carries none).

use std::collections::BTreeSet;
use std::sync::LazyLock;

use qsync_core::{Artifact, ItemKind, RawItem, RenderError};
use regex::Regex;
use serde_json::Value;

use super::{Composer, stem};
use crate::fragment::Fragment;

static CLOZE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p>(\d+)</p>").expect("valid cloze pattern"));

const TRUE_OR_FALSE: [&str; 2] = ["True", "False"];

pub(super) fn render(kind: ItemKind, item: &RawItem) -> Result<Artifact, RenderError> {
    let mut composer = Composer::new(kind);
    composer.materials(item)?;

    let stem = stem(item)?;
    let stem = if kind == ItemKind::Cloze {
        CLOZE_NUMBER.replace_all(stem, "<p>Question $1</p>")
    } else {
        stem.into()
    };
    composer.body(Fragment::parse(&stem));

    let options = options(kind, item)?;
    let answers = answers(kind, item, options.len())?;
    composer.body(option_list(&options, &answers));

    composer.trailing_points(item);
    Ok(composer.finish())
}

fn options(kind: ItemKind, item: &RawItem) -> Result<Vec<String>, RenderError> {
    match item.field("options") {
        Some(Value::Array(values)) if !values.is_empty() => values
            .iter()
            .map(|value| match value {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(RenderError::InvalidField {
                    field: "options",
                    reason: "options must be strings".to_string(),
                }),
            })
            .collect(),
        Some(Value::Array(_)) | None if kind == ItemKind::TrueOrFalse => {
            Ok(TRUE_OR_FALSE.iter().map(ToString::to_string).collect())
        }
        Some(Value::Array(_)) | None => Err(RenderError::MissingField("options")),
        Some(_) => Err(RenderError::InvalidField {
            field: "options",
            reason: "expected an array".to_string(),
        }),
    }
}

/// Zero-based indices of the correct options.
///
/// Accepts letters (`"A"`, `"A,C"`, `"AC"`), indices (`1`, `[0, 2]`,
/// `"0,2"`), and booleans for true-or-false items.
fn answers(kind: ItemKind, item: &RawItem, option_count: usize) -> Result<BTreeSet<usize>, RenderError> {
    let value = item
        .field("answer")
        .ok_or(RenderError::MissingField("answer"))?;

    let mut indices = BTreeSet::new();
    match value {
        Value::Bool(b) if kind == ItemKind::TrueOrFalse => {
            indices.insert(usize::from(!*b));
        }
        Value::Array(values) => {
            for value in values {
                indices.insert(answer_token(value, kind)?);
            }
        }
        other => {
            for token in split_answer(other, kind)? {
                indices.insert(token);
            }
        }
    }

    if indices.is_empty() {
        return Err(RenderError::MissingField("answer"));
    }
    if let Some(&out_of_range) = indices.iter().find(|&&i| i >= option_count) {
        return Err(RenderError::InvalidField {
            field: "answer",
            reason: format!("option {} does not exist", letter(out_of_range)),
        });
    }
    Ok(indices)
}

fn answer_token(value: &Value, kind: ItemKind) -> Result<usize, RenderError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| invalid_answer(&n.to_string())),
        Value::String(s) => parse_token(s.trim(), kind),
        other => Err(invalid_answer(&other.to_string())),
    }
}

fn split_answer(value: &Value, kind: ItemKind) -> Result<Vec<usize>, RenderError> {
    let text = match value {
        Value::String(s) => s.trim(),
        Value::Number(_) => return Ok(vec![answer_token(value, kind)?]),
        other => return Err(invalid_answer(&other.to_string())),
    };

    if text.is_empty() {
        return Ok(Vec::new());
    }
    if let Ok(index) = parse_token(text, kind) {
        return Ok(vec![index]);
    }
    if text.contains(',') || text.contains(' ') {
        return text
            .split([',', ' '])
            .filter(|t| !t.is_empty())
            .map(|t| parse_token(t.trim(), kind))
            .collect();
    }
    if text.len() > 1 && text.chars().all(|c| c.is_ascii_uppercase()) {
        return text.chars().map(|c| parse_token(&c.to_string(), kind)).collect();
    }
    Err(invalid_answer(text))
}

fn parse_token(token: &str, kind: ItemKind) -> Result<usize, RenderError> {
    if kind == ItemKind::TrueOrFalse {
        if token.eq_ignore_ascii_case("true") {
            return Ok(0);
        }
        if token.eq_ignore_ascii_case("false") {
            return Ok(1);
        }
    }
    if let Ok(index) = token.parse::<usize>() {
        return Ok(index);
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Ok(usize::from(c.to_ascii_uppercase() as u8 - b'A'))
        }
        _ => Err(invalid_answer(token)),
    }
}

fn invalid_answer(token: &str) -> RenderError {
    RenderError::InvalidField {
        field: "answer",
        reason: format!("cannot read `{token}` as an option"),
    }
}

fn letter(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or_else(|| (index + 1).to_string(), |i| char::from(b'A' + i).to_string())
}

fn option_list(options: &[String], answers: &BTreeSet<usize>) -> Fragment {
    let mut list = Fragment::default();
    let mut lines = Vec::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        let option = Fragment::parse(option);
        let mark = if answers.contains(&index) { 'x' } else { ' ' };
        lines.push(format!("- [{mark}] {}. {}", letter(index), option.text));
        list.absorb(option);
    }
    list.text = lines.join("\n");
    list
}
