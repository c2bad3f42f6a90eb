//! Translation and essay kinds: stem plus a reference answer.

use qsync_core::{Artifact, ItemKind, RawItem, RenderError};

use super::{Composer, stem};
use crate::fragment::Fragment;

pub(super) fn render(kind: ItemKind, item: &RawItem) -> Result<Artifact, RenderError> {
    let mut composer = Composer::new(kind);
    composer.materials(item)?;
    composer.body(Fragment::parse(stem(item)?));

    // Vendors disagree on where the model answer lives.
    if let Some(reference) = item.field_str("reference").or_else(|| item.field_str("answer")) {
        composer.point("Reference answer", Fragment::parse(reference));
    }
    composer.trailing_points(item);
    Ok(composer.finish())
}
