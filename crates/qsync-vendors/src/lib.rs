#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]

pub mod json_file;
pub mod registry;

pub use json_file::{JsonFileConfig, JsonFileError, JsonFileSource};
pub use registry::{OutputKind, RegistryError, Vendor, VendorKind, VendorOptions, open_vendor};
