//! Core building blocks of a metadata build: file-name parsing, the
//! structured-metadata parser, reprojection, online descriptors and the
//! assembler that drives them. Consumed by the high-level `api` module.
pub mod assembler;
pub mod granule_name;
pub mod online;
pub mod reproject;
pub mod struct_metadata;
