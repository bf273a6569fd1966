//! Writers for finished documents: the XML encoder and the output sinks.
pub mod sink;
pub mod xml;

pub use sink::{ObjectSink, TemporaryCredentials, object_key, save_to_file};
pub use xml::encode;
