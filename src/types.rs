//! Shared types used across the crate: the typed `MetadataDocument` and its
//! field groups, plus the fixed constants of the CMR granule dialect.
use serde::Deserialize;

/// Sentinel written for a declared additional attribute missing from the source file.
pub const NOT_AVAILABLE: &str = "Not Available";

/// chrono format of every timestamp written into a document,
/// e.g. `2021-06-01T12:00:00.000000Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// HLS products are daytime acquisitions only.
pub const DAY_NIGHT_FLAG: &str = "DAY";

/// A finished (or in-progress) CMR granule document.
///
/// Fields are declared in the order they are serialized under `<Granule>`.
/// Optional groups stay `None`/empty until the assembler populates them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataDocument {
    pub granule_ur: String,
    pub insert_time: String,
    pub last_update: String,
    pub collection: Collection,
    pub data_granule: Option<DataGranule>,
    pub temporal: Option<Temporal>,
    pub spatial: Option<BoundingRectangle>,
    pub platforms: Vec<Platform>,
    pub online_access_urls: Vec<OnlineAccessUrl>,
    pub online_resources: Vec<OnlineResource>,
    pub browse_urls: Vec<ProviderBrowseUrl>,
    pub additional_attributes: Vec<AdditionalAttribute>,
    pub orderable: bool,
    pub data_format: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    pub data_set_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataGranule {
    /// File size in kilobytes (serialized as `SizeMBDataGranule`).
    pub size_kb: f64,
    pub producer_granule_id: String,
    pub day_night_flag: String,
    pub production_date_time: String,
    pub local_version_id: String,
}

/// Acquisition time of a granule: a single instant or a begin/end range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Temporal {
    Single(String),
    Range { beginning: String, ending: String },
}

/// Geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRectangle {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Platform {
    #[serde(rename = "ShortName")]
    pub short_name: String,
    #[serde(rename = "Instruments", default, deserialize_with = "de::instruments")]
    pub instruments: Vec<Instrument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Instrument {
    #[serde(rename = "ShortName")]
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineAccessUrl {
    pub url: String,
    pub description: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineResource {
    pub url: String,
    pub resource_type: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderBrowseUrl {
    pub url: String,
    pub description: String,
}

/// Deserialization helpers for the `{"Wrapper": item | [items]}` shape used
/// by the template files.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    use super::Instrument;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(untagged)]
    pub(crate) enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    impl<T> From<OneOrMany<T>> for Vec<T> {
        fn from(value: OneOrMany<T>) -> Self {
            match value {
                OneOrMany::One(item) => vec![item],
                OneOrMany::Many(items) => items,
            }
        }
    }

    pub(crate) fn instruments<'de, D>(deserializer: D) -> Result<Vec<Instrument>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(rename = "Instrument")]
            instrument: OneOrMany<Instrument>,
        }
        Ok(Wrapper::deserialize(deserializer)?.instrument.into())
    }

    /// Accept `true`, `"true"`, `"TRUE"` and friends.
    pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Text(String),
        }
        match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => Ok(b),
            Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(serde::de::Error::custom(format!(
                    "expected a boolean flag, got `{other}`"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_accepts_single_or_listed_instruments() {
        let single: Platform = serde_json::from_str(
            r#"{"ShortName": "LANDSAT-8", "Instruments": {"Instrument": {"ShortName": "OLI"}}}"#,
        )
        .expect("single instrument");
        assert_eq!(single.instruments.len(), 1);
        assert_eq!(single.instruments[0].short_name, "OLI");

        let many: Platform = serde_json::from_str(
            r#"{"ShortName": "LANDSAT-8",
                "Instruments": {"Instrument": [{"ShortName": "OLI"}, {"ShortName": "TIRS"}]}}"#,
        )
        .expect("instrument list");
        assert_eq!(many.instruments.len(), 2);
        assert_eq!(many.instruments[1].short_name, "TIRS");
    }

    #[test]
    fn platform_without_instruments() {
        let p: Platform = serde_json::from_str(r#"{"ShortName": "Sentinel-2A"}"#).unwrap();
        assert!(p.instruments.is_empty());
    }

    #[test]
    fn timestamp_format_has_microseconds() {
        let t = chrono::NaiveDate::from_ymd_opt(2021, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            t.format(TIMESTAMP_FORMAT).to_string(),
            "2021-06-01T12:00:00.000000Z"
        );
    }
}
