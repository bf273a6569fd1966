//! Template registry: per-product fixed metadata plus the mapping from
//! canonical additional-attribute names to the names used inside the file.
//!
//! On disk every product `P` has two JSON documents in the template
//! directory:
//!
//! - `P.json`: `{"P": {"DataSetId": .., "<platform>": {"Platform": ..},
//!   "AdditionalAttributes": {"AdditionalAttribute": [{"Name": ..}, ..]},
//!   "Orderable": .., "Visible": ..}}`
//! - `P_attribute_mapping.json`: `{"<canonical name>": "<file attribute>", ..}`
//!
//! Loaded configurations are cached and shared read-only across documents.
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Platform;
use crate::types::de::{self, OneOrMany};

/// Fixed metadata shared by every granule of one product.
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    #[serde(rename = "DataSetId")]
    pub data_set_id: String,
    #[serde(rename = "AdditionalAttributes", deserialize_with = "attribute_schema")]
    pub additional_attributes: Vec<String>,
    #[serde(rename = "Orderable", deserialize_with = "de::flag")]
    pub orderable: bool,
    #[serde(rename = "Visible", deserialize_with = "de::flag")]
    pub visible: bool,
    /// Platform blocks keyed by spacecraft name (e.g. `LANDSAT-8`, `Sentinel-2A`).
    #[serde(flatten)]
    pub platforms: BTreeMap<String, PlatformBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformBlock {
    #[serde(rename = "Platform")]
    platform: OneOrMany<Platform>,
}

impl PlatformBlock {
    pub fn new(platforms: Vec<Platform>) -> Self {
        PlatformBlock {
            platform: OneOrMany::Many(platforms),
        }
    }

    pub fn platforms(&self) -> Vec<Platform> {
        match &self.platform {
            OneOrMany::One(p) => vec![p.clone()],
            OneOrMany::Many(ps) => ps.clone(),
        }
    }
}

fn attribute_schema<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Declared {
        #[serde(rename = "Name")]
        name: String,
    }
    #[derive(Deserialize)]
    struct Schema {
        #[serde(rename = "AdditionalAttribute", default)]
        entries: Option<OneOrMany<Declared>>,
    }
    let schema = Schema::deserialize(deserializer)?;
    Ok(schema
        .entries
        .map(Vec::from)
        .unwrap_or_default()
        .into_iter()
        .map(|d| d.name)
        .collect())
}

/// Canonical attribute name -> attribute name inside the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AttributeMapping(BTreeMap<String, String>);

impl AttributeMapping {
    pub fn raw_name(&self, canonical: &str) -> Option<&str> {
        self.0.get(canonical).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AttributeMapping(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A validated template + mapping pair for one product.
#[derive(Debug, Clone)]
pub struct ProductConfig {
    pub product: String,
    pub template: Template,
    pub mapping: AttributeMapping,
}

impl ProductConfig {
    /// Pair a template with its mapping, checking that every declared
    /// additional attribute can be resolved.
    pub fn new(product: &str, template: Template, mapping: AttributeMapping) -> Result<Self> {
        if let Some(missing) = template
            .additional_attributes
            .iter()
            .find(|name| mapping.raw_name(name).is_none())
        {
            return Err(Error::MappingNotFound {
                product: product.to_string(),
                attribute: missing.clone(),
            });
        }
        Ok(ProductConfig {
            product: product.to_string(),
            template,
            mapping,
        })
    }

    /// Platform descriptors of the template block for `platform`.
    pub fn platforms(&self, platform: &str) -> Result<Vec<Platform>> {
        self.template
            .platforms
            .get(platform)
            .map(PlatformBlock::platforms)
            .ok_or_else(|| Error::PlatformNotFound {
                product: self.product.clone(),
                platform: platform.to_string(),
            })
    }
}

/// Loads and caches product configurations by product code.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    dir: Option<PathBuf>,
    cache: Mutex<HashMap<String, Arc<ProductConfig>>>,
}

impl TemplateRegistry {
    /// Registry backed by `<dir>/<product>.json` and `<dir>/<product>_attribute_mapping.json`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        TemplateRegistry {
            dir: Some(dir.as_ref().to_path_buf()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Registry without a backing directory; populate it with [`TemplateRegistry::insert`].
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: &str, template: Template, mapping: AttributeMapping) -> Result<()> {
        let config = ProductConfig::new(product, template, mapping)?;
        self.lock().insert(product.to_string(), Arc::new(config));
        Ok(())
    }

    /// Resolve the configuration for `product`, loading it on first use.
    pub fn lookup(&self, product: &str) -> Result<Arc<ProductConfig>> {
        if let Some(config) = self.lock().get(product) {
            return Ok(Arc::clone(config));
        }

        let dir = self.dir.as_ref().ok_or_else(|| Error::ConfigNotFound {
            product: product.to_string(),
        })?;
        let config = Arc::new(load_product(dir, product)?);
        info!("Loaded template configuration for product {}", product);

        let mut cache = self.lock();
        Ok(Arc::clone(
            cache.entry(product.to_string()).or_insert(config),
        ))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<ProductConfig>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_product(dir: &Path, product: &str) -> Result<ProductConfig> {
    let not_found = || Error::ConfigNotFound {
        product: product.to_string(),
    };

    let template_path = dir.join(format!("{}.json", product));
    debug!("Reading template {:?}", template_path);
    let text = fs::read_to_string(&template_path).map_err(|_| not_found())?;
    let mut templates: HashMap<String, Template> = serde_json::from_str(&text)?;
    let template = templates.remove(product).ok_or_else(not_found)?;

    let mapping_path = dir.join(format!("{}_attribute_mapping.json", product));
    debug!("Reading attribute mapping {:?}", mapping_path);
    let text = fs::read_to_string(&mapping_path).map_err(|_| not_found())?;
    let mapping: AttributeMapping = serde_json::from_str(&text)?;

    ProductConfig::new(product, template, mapping)
}
