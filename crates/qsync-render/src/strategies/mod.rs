//! Render registry.
//!
//! Every [`ItemKind`] maps to exactly one strategy through an exhaustive
//! match, so adding a kind without a strategy does not compile.

mod blank;
mod choice;
mod written;

use indexmap::IndexMap;
use qsync_core::{Artifact, ItemKind, RawItem, RenderError};
use serde_json::Value;

use crate::fragment::Fragment;

/// Separates the body of an artifact from its trailing points.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

type Strategy = fn(ItemKind, &RawItem) -> Result<Artifact, RenderError>;

fn strategy_for(kind: ItemKind) -> Strategy {
    match kind {
        ItemKind::SingleChoice
        | ItemKind::MultipleChoice
        | ItemKind::Cloze
        | ItemKind::ReadingComprehension
        | ItemKind::TrueOrFalse => choice::render,
        ItemKind::BlankFilling => blank::render,
        ItemKind::Translation | ItemKind::Essay | ItemKind::ShortEssay => written::render,
    }
}

/// Render one raw item with the strategy registered for `kind`.
pub fn render(kind: ItemKind, item: &RawItem) -> Result<Artifact, RenderError> {
    strategy_for(kind)(kind, item)
}

/// Assembles an artifact from independently rendered parts.
struct Composer {
    heading: String,
    body: Vec<String>,
    points: Vec<String>,
    assets: IndexMap<String, String>,
}

impl Composer {
    fn new(kind: ItemKind) -> Self {
        Self {
            heading: format!("**{}**", kind.label()),
            body: Vec::new(),
            points: Vec::new(),
            assets: IndexMap::new(),
        }
    }

    fn body(&mut self, fragment: Fragment) {
        if fragment.is_empty() {
            return;
        }
        self.body.push(fragment.text.trim().to_string());
        self.take_assets(fragment.assets);
    }

    fn point(&mut self, title: &str, fragment: Fragment) {
        if fragment.is_empty() {
            return;
        }
        self.points
            .push(format!("**{title}**\n\n{}", fragment.text.trim()));
        self.take_assets(fragment.assets);
    }

    /// Materials shared by several items, rendered ahead of the stem.
    fn materials(&mut self, item: &RawItem) -> Result<(), RenderError> {
        let Some(value) = item.field("materials") else {
            return Ok(());
        };
        let Value::Array(materials) = value else {
            return Err(RenderError::InvalidField {
                field: "materials",
                reason: "expected an array".to_string(),
            });
        };
        for material in materials {
            let html = match material {
                Value::String(s) => s.as_str(),
                Value::Object(map) => map.get("content").and_then(Value::as_str).unwrap_or(""),
                _ => "",
            };
            self.body(Fragment::parse(html));
        }
        Ok(())
    }

    /// Source and explanation, in that order.
    fn trailing_points(&mut self, item: &RawItem) {
        if let Some(source) = item.field_str("source") {
            self.point("Source", Fragment::plain(source));
        }
        if let Some(explain) = item.field_str("explain") {
            self.point("Explanation", Fragment::parse(explain));
        }
    }

    fn take_assets(&mut self, assets: IndexMap<String, String>) {
        for (key, value) in assets {
            self.assets.entry(key).or_insert(value);
        }
    }

    fn finish(self) -> Artifact {
        let mut text = std::iter::once(self.heading)
            .chain(self.body)
            .collect::<Vec<_>>()
            .join("\n\n");
        if !self.points.is_empty() {
            text.push_str(SECTION_SEPARATOR);
            text.push_str(&self.points.join("\n\n"));
        }
        text.push('\n');
        Artifact {
            text,
            assets: self.assets,
        }
    }
}

/// The stem, which every kind requires.
fn stem(item: &RawItem) -> Result<&str, RenderError> {
    item.field_str("content")
        .ok_or(RenderError::MissingField("content"))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use qsync_core::RawItem;
    use serde_json::{Value, json};

    pub fn item(type_tag: i64, body: Value) -> RawItem {
        let Value::Object(body) = body else {
            panic!("fixture body must be an object");
        };
        RawItem::new("42", type_tag, body)
    }

    /// A well-formed item of the given kind.
    pub fn complete(kind: qsync_core::ItemKind) -> RawItem {
        use qsync_core::ItemKind;
        let body = match kind {
            ItemKind::TrueOrFalse => json!({"content": "The sky is blue.", "answer": true}),
            ItemKind::BlankFilling => {
                json!({"content": "<p>2 + 2 = <input></p>", "answer": ["4"]})
            }
            ItemKind::Translation | ItemKind::Essay | ItemKind::ShortEssay => {
                json!({"content": "Write about rain.", "reference": "It rains."})
            }
            _ => json!({"content": "Pick one", "options": ["a", "b", "c"], "answer": "B"}),
        };
        item(kind.tag(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_kind_has_a_strategy() {
        for kind in ItemKind::ALL {
            let artifact = render(kind, &fixtures::complete(kind)).unwrap();
            assert!(
                artifact.text.starts_with(&format!("**{}**", kind.label())),
                "{kind}: {}",
                artifact.text
            );
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let item = fixtures::item(
            1,
            json!({
                "content": "<p>Which? <img src=\"q.png\"></p>",
                "options": ["x", "y"],
                "answer": "A"
            }),
        );
        assert_eq!(
            render(ItemKind::SingleChoice, &item).unwrap(),
            render(ItemKind::SingleChoice, &item).unwrap()
        );
    }

    #[test]
    fn test_points_follow_separator() {
        let item = fixtures::item(
            1,
            json!({
                "content": "Stem",
                "options": ["x", "y"],
                "answer": "A",
                "source": "2023 exam",
                "explain": "<p>Because x.</p>"
            }),
        );
        let artifact = render(ItemKind::SingleChoice, &item).unwrap();
        let (body, points) = artifact.text.split_once(SECTION_SEPARATOR).unwrap();

        assert!(body.contains("Stem"));
        assert_eq!(
            points,
            "**Source**\n\n2023 exam\n\n**Explanation**\n\nBecause x.\n"
        );
    }

    #[test]
    fn test_materials_precede_stem() {
        let item = fixtures::item(
            6,
            json!({
                "materials": [{"content": "<p>Passage</p>"}, "Second passage"],
                "content": "Stem",
                "options": ["x", "y"],
                "answer": [1]
            }),
        );
        let text = render(ItemKind::ReadingComprehension, &item).unwrap().text;
        let passage = text.find("Passage").unwrap();
        let second = text.find("Second passage").unwrap();
        let stem = text.find("Stem").unwrap();
        assert!(passage < second && second < stem);
    }

    #[test]
    fn test_malformed_materials() {
        let item = fixtures::item(
            1,
            json!({"materials": "oops", "content": "Stem", "options": ["x"], "answer": "A"}),
        );
        assert!(matches!(
            render(ItemKind::SingleChoice, &item),
            Err(RenderError::InvalidField { field: "materials", .. })
        ));
    }
}
