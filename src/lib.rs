#![doc = r#"
cmr-granule — CMR granule metadata for HLS HDF products.

This crate turns a per-granule HDF file of the Harmonized Landsat Sentinel-2
(HLS) products into a CMR (Common Metadata Repository) `Granule` XML document.
It extracts the file's global attributes, merges them with a per-product
template, derives granule sizing, production/temporal fields and the
bounding box (reprojected to geographic degrees), and encodes the result.

Requirements
------------
- GDAL with its HDF4 driver available on your system (attribute extraction).
- Rust 2024 edition toolchain.

Template directory
------------------
Each product code (the second `.`-segment of the file name, e.g. `L30`)
needs two JSON files in the template directory:

- `L30.json`: dataset id, platform blocks keyed by spacecraft name,
  the `AdditionalAttributes` schema, `Orderable`, `Visible`.
- `L30_attribute_mapping.json`: canonical attribute name → attribute name
  inside the HDF file.

Quick start: file to XML string
-------------------------------
```rust,no_run
use std::path::Path;
use cmr_granule::{create_metadata, CreatorConfig};

fn main() -> cmr_granule::Result<()> {
    let config = CreatorConfig::default();
    let xml = create_metadata(Path::new("HLS.L30.T17SLU.2020117T160901.v1.5.hdf"), &config)?;
    println!("{xml}");
    Ok(())
}
```

Write next to the input or upload
---------------------------------
```rust,no_run
use std::path::Path;
use cmr_granule::{Creator, CreatorConfig, ObjectSink, TemplateRegistry, TemporaryCredentials};

fn main() -> cmr_granule::Result<()> {
    let config = CreatorConfig::default();
    let registry = TemplateRegistry::from_dir(&config.template_dir);
    let creator = Creator::new(&config, &registry);
    let input = Path::new("/data/HLS.L30.T17SLU.2020117T160901.v1.5.hdf");

    // /data/HLS.L30.T17SLU.2020117T160901.v1.5.cmr.xml
    creator.save_to_path(input, None)?;

    if let Some(credentials) = TemporaryCredentials::from_env() {
        let sink = ObjectSink::s3(&config.bucket, &config.s3_region, &credentials, None)?;
        let key = creator.save_to_object_store(input, &sink)?;
        println!("uploaded {key}");
    }
    Ok(())
}
```

Error handling
--------------
All public functions return `cmr_granule::Result<T>`. Any failing phase aborts
the build; no partial document is returned.

```rust,no_run
use std::path::Path;
use cmr_granule::{create_metadata, CreatorConfig, Error};

match create_metadata(Path::new("/bad/HLS.X30.T1.2020117T160901.v1.5.hdf"), &CreatorConfig::default()) {
    Ok(xml) => println!("{xml}"),
    Err(Error::ConfigNotFound { product }) => eprintln!("no template for {product}"),
    Err(Error::Extraction { path, reason }) => eprintln!("cannot read {path}: {reason}"),
    Err(other) => eprintln!("metadata build failed: {other}"),
}
```

Useful modules
--------------
- [`api`] — high-level entry points (`Creator`, batch helpers).
- [`core`] — assembler, reprojection, structured-metadata parser.
- [`io`] — attribute extraction, template registry, XML encoder and sinks.
- [`types`] — the typed `MetadataDocument`.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use config::CreatorConfig;
pub use error::{Error, Result};
pub use types::{BoundingRectangle, MetadataDocument, Temporal};

pub use crate::core::assembler::MetadataAssembler;
pub use crate::core::granule_name::GranuleName;
pub use crate::core::reproject::{Crs, Point, reproject};

pub use io::writers::{ObjectSink, TemporaryCredentials, encode};
pub use io::{AttributeSource, GdalAttributeSource, RawAttributeSet, TemplateRegistry};

pub use api::{BatchReport, Creator, create_metadata, iterate_granules};
