//! I/O layer: attribute extraction from granule files (GDAL), the template
//! registry, and `writers` for XML encoding and document storage.
pub mod attributes;
pub use attributes::{AttributeSource, AttributeValue, RawAttributeSet, StaticAttributes};

pub mod hdf;
pub use hdf::GdalAttributeSource;

pub mod templates;
pub use templates::{AttributeMapping, ProductConfig, Template, TemplateRegistry};

pub mod writers;
