//! HTML fragments reduced to plain text plus asset placeholders.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["'][^>]*>"#).expect("valid image pattern")
});
static INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<input\b[^>]*>").expect("valid input pattern"));
static UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("valid underline pattern"));
static EMPTY_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)|（\s*）").expect("valid bracket pattern"));
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6])>").expect("valid break pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid blank line pattern"));

/// Rendered blank shown in place of an unanswered input.
const EMPTY_BLANK: &str = " [____] ";

/// Text with placeholders, and the value behind each placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub assets: IndexMap<String, String>,
}

impl Fragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            assets: IndexMap::new(),
        }
    }

    /// Convert an HTML snippet, replacing images with placeholders.
    pub fn parse(html: &str) -> Self {
        let mut assets = IndexMap::new();
        let text = extract_images(html, &mut assets);
        Self {
            text: html_to_text(&text),
            assets,
        }
    }

    /// Like [`Fragment::parse`], additionally replacing every blank
    /// (`<input>`, runs of underscores, empty brackets) with a placeholder.
    ///
    /// Returns the placeholders of the blanks in the order they were found.
    pub fn parse_with_blanks(html: &str) -> (Self, Vec<String>) {
        let mut assets = IndexMap::new();
        let mut blanks = Vec::new();

        let text = extract_images(html, &mut assets);
        let text = extract_blanks(&text, &INPUT, &mut assets, &mut blanks);
        let text = html_to_text(&text);
        let text = extract_blanks(&text, &UNDERLINE, &mut assets, &mut blanks);
        let text = extract_blanks(&text, &EMPTY_BRACKETS, &mut assets, &mut blanks);

        (Self { text, assets }, blanks)
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Take over another fragment's assets; keys already present keep their value.
    pub fn absorb(&mut self, other: Self) {
        for (key, value) in other.assets {
            self.assets.entry(key).or_insert(value);
        }
    }
}

/// `[<kind>#<8 hex>]`, hashed from the kind, position and source text.
pub fn placeholder(kind: &str, index: usize, source: &str) -> String {
    let seed = serde_json::json!({ "index": index, "text": source, "type": kind }).to_string();
    let digest = format!("{:x}", Sha256::digest(seed.as_bytes()));
    format!("[{kind}#{}]", &digest[..8])
}

fn extract_images(html: &str, assets: &mut IndexMap<String, String>) -> String {
    let mut index = 0;
    IMAGE
        .replace_all(html, |caps: &Captures<'_>| {
            let token = placeholder("img", index, html);
            index += 1;
            assets.insert(token.clone(), caps[1].to_string());
            token
        })
        .into_owned()
}

fn extract_blanks(
    text: &str,
    pattern: &Regex,
    assets: &mut IndexMap<String, String>,
    blanks: &mut Vec<String>,
) -> String {
    pattern
        .replace_all(text, |_: &Captures<'_>| {
            let token = placeholder("input", blanks.len(), text);
            assets.insert(token.clone(), EMPTY_BLANK.to_string());
            blanks.push(token.clone());
            token
        })
        .into_owned()
}

/// Strip tags, turning block ends and `<br>` into line breaks.
pub fn html_to_text(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text).replace('\u{a0}', " ");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<p>First&nbsp;line</p><p>Second<br/>third</p>"),
            "First line\nSecond\nthird"
        );
        assert_eq!(html_to_text("a &lt;b&gt; &amp;amp;"), "a <b> &amp;");
        assert_eq!(html_to_text("<p>a</p>\n\n\n<p>b</p>"), "a\n\nb");
    }

    #[test]
    fn test_named_and_numeric_entities_are_decoded() {
        assert_eq!(
            html_to_text("<p>&ldquo;Hi&rdquo; it&#8217;s 5&#x2103; &copy;</p>"),
            "\u{201c}Hi\u{201d} it\u{2019}s 5\u{2103} \u{a9}"
        );
        assert_eq!(html_to_text("&quot;x&quot; &#39;y&#39;"), "\"x\" 'y'");
    }

    #[test]
    fn test_images_become_placeholders() {
        let html = r#"<p>See <img class="x" src="https://img/a.png"> and <IMG SRC='b.png'/></p>"#;
        let fragment = Fragment::parse(html);

        let tokens: Vec<&String> = fragment.assets.keys().collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(fragment.text, format!("See {} and {}", tokens[0], tokens[1]));
        assert_eq!(fragment.assets[tokens[0]], "https://img/a.png");
        assert_eq!(fragment.assets[tokens[1]], "b.png");
        assert!(tokens[0].starts_with("[img#") && tokens[0].len() == "[img#12345678]".len());
    }

    #[test]
    fn test_placeholders_are_deterministic_and_positional() {
        assert_eq!(placeholder("img", 0, "x"), placeholder("img", 0, "x"));
        assert_ne!(placeholder("img", 0, "x"), placeholder("img", 1, "x"));
        assert_ne!(placeholder("img", 0, "x"), placeholder("img", 0, "y"));
        assert_ne!(placeholder("img", 0, "x"), placeholder("input", 0, "x"));
    }

    #[test]
    fn test_blanks_in_document_order_per_kind() {
        let (fragment, blanks) =
            Fragment::parse_with_blanks("<p>Capital: <input size=\"4\"> is ___ of ( )</p>");

        assert_eq!(blanks.len(), 3);
        for token in &blanks {
            assert!(fragment.text.contains(token.as_str()));
            assert_eq!(fragment.assets[token], EMPTY_BLANK);
        }
        let first = fragment.text.find(blanks[0].as_str()).unwrap();
        let second = fragment.text.find(blanks[1].as_str()).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_absorb_keeps_existing_values() {
        let mut a = Fragment::plain("a");
        a.assets.insert("[img#1]".into(), "one".into());
        let mut b = Fragment::plain("b");
        b.assets.insert("[img#1]".into(), "other".into());
        b.assets.insert("[img#2]".into(), "two".into());

        a.absorb(b);
        assert_eq!(a.assets["[img#1]"], "one");
        assert_eq!(a.assets["[img#2]"], "two");
        assert!(!a.is_empty());
        assert!(Fragment::plain("  ").is_empty());
    }
}
