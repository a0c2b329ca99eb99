//! Template synthesizers.

mod cloudformation;

pub use cloudformation::{CloudFormationSynthesizer, MANIFEST_VERSION, TEMPLATE_FORMAT_VERSION};
