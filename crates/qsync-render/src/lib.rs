#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]

mod directory;
mod fragment;
mod markdown;
mod skip;
pub mod strategies;

pub use directory::DirectorySink;
pub use fragment::{Fragment, html_to_text, placeholder};
pub use markdown::MarkdownSink;
pub use skip::SkipSink;
pub use strategies::{SECTION_SEPARATOR, render};
