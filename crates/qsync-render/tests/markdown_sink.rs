//! `MarkdownSink` used through the sink port.

use std::sync::Arc;

use qsync_core::{ItemKind, RawItem, SinkPort};
use qsync_render::{DirectorySink, MarkdownSink};
use serde_json::{Value, json};

fn item(id: &str, type_tag: i64, body: Value) -> RawItem {
    let Value::Object(body) = body else {
        unreachable!()
    };
    RawItem::new(id, type_tag, body)
}

#[tokio::test]
async fn test_render_and_deliver_through_port() {
    let tmp = tempfile::tempdir().unwrap();
    let target = DirectorySink::new(tmp.path().join("demo").join("sheet"));
    let sink: Arc<dyn SinkPort> = Arc::new(MarkdownSink::new(target.clone()));

    let items = [
        item(
            "1",
            1,
            json!({
                "content": "<p>Pick the image <img src=\"https://cdn/x.png\"></p>",
                "options": ["left", "right"],
                "answer": "B",
                "explain": "Right is right."
            }),
        ),
        item("2", 61, json!({"content": "1 + 1 = __", "answer": ["2"]})),
    ];

    assert_eq!(sink.delivered_count().await.unwrap(), 0);
    for (position, raw) in items.iter().enumerate() {
        let artifact = sink.render(raw.kind().unwrap(), raw).unwrap();
        sink.deliver(position as u64, &artifact).await.unwrap();
    }
    assert_eq!(sink.delivered_count().await.unwrap(), 2);

    let first = std::fs::read_to_string(target.artifact_path(0)).unwrap();
    assert!(first.starts_with("**Single choice**\n\nPick the image [img#"));
    assert!(first.contains("- [ ] A. left\n- [x] B. right"));
    assert!(first.ends_with("---\n\n**Explanation**\n\nRight is right.\n"));

    let assets: Value =
        serde_json::from_str(&std::fs::read_to_string(target.assets_path(0)).unwrap()).unwrap();
    assert_eq!(assets.as_object().unwrap().len(), 1);

    let second = std::fs::read_to_string(target.artifact_path(1)).unwrap();
    assert_eq!(second, "**Blank filling**\n\n1 + 1 =  [1: 2]\n");
    assert_eq!(ItemKind::from_tag(61), Some(ItemKind::BlankFilling));
}
