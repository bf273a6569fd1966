//! CMR granule XML encoder.
//!
//! Elements are written directly in document order with no attribute
//! annotations. Sequences are emitted as repeated sibling elements inside
//! their container (`<AdditionalAttributes><AdditionalAttribute>..`), never
//! behind a generic per-item wrapper. Empty optional groups are omitted.
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Error, Result};
use crate::types::{
    AdditionalAttribute, BoundingRectangle, DataGranule, MetadataDocument, OnlineAccessUrl,
    OnlineResource, Platform, ProviderBrowseUrl, Temporal,
};

pub const ROOT_ELEMENT: &str = "Granule";

/// Serialize `doc` under a `<Granule>` root element.
pub fn encode(doc: &MetadataDocument) -> Result<String> {
    let mut w = ElementWriter::new();

    w.open(ROOT_ELEMENT)?;
    w.text("GranuleUR", &doc.granule_ur)?;
    w.text("InsertTime", &doc.insert_time)?;
    w.text("LastUpdate", &doc.last_update)?;

    w.open("Collection")?;
    w.text("DataSetId", &doc.collection.data_set_id)?;
    w.close("Collection")?;

    if let Some(granule) = &doc.data_granule {
        write_data_granule(&mut w, granule)?;
    }
    if let Some(temporal) = &doc.temporal {
        write_temporal(&mut w, temporal)?;
    }
    if let Some(rect) = &doc.spatial {
        write_spatial(&mut w, rect)?;
    }

    w.list("Platforms", &doc.platforms, write_platform)?;
    w.list("OnlineAccessURLs", &doc.online_access_urls, write_access_url)?;
    w.list("OnlineResources", &doc.online_resources, write_online_resource)?;
    w.list("AssociatedBrowseImageURLs", &doc.browse_urls, write_browse_url)?;
    w.list(
        "AdditionalAttributes",
        &doc.additional_attributes,
        write_additional_attribute,
    )?;

    w.text("Orderable", &doc.orderable.to_string())?;
    w.text("DataFormat", &doc.data_format)?;
    w.text("Visible", &doc.visible.to_string())?;
    w.close(ROOT_ELEMENT)?;

    w.finish()
}

fn write_data_granule(w: &mut ElementWriter, granule: &DataGranule) -> Result<()> {
    w.open("DataGranule")?;
    w.text("SizeMBDataGranule", &granule.size_kb.to_string())?;
    w.text("ProducerGranuleId", &granule.producer_granule_id)?;
    w.text("DayNightFlag", &granule.day_night_flag)?;
    w.text("ProductionDateTime", &granule.production_date_time)?;
    w.text("LocalVersionId", &granule.local_version_id)?;
    w.close("DataGranule")
}

fn write_temporal(w: &mut ElementWriter, temporal: &Temporal) -> Result<()> {
    w.open("Temporal")?;
    match temporal {
        Temporal::Single(instant) => w.text("SingleDateTime", instant)?,
        Temporal::Range { beginning, ending } => {
            w.open("RangeDateTime")?;
            w.text("BeginningDateTime", beginning)?;
            w.text("EndingDateTime", ending)?;
            w.close("RangeDateTime")?;
        }
    }
    w.close("Temporal")
}

fn write_spatial(w: &mut ElementWriter, rect: &BoundingRectangle) -> Result<()> {
    w.open("Spatial")?;
    w.open("HorizontalSpatialDomain")?;
    w.open("Geometry")?;
    w.open("BoundingRectangle")?;
    w.text("WestBoundingCoordinate", &rect.west.to_string())?;
    w.text("NorthBoundingCoordinate", &rect.north.to_string())?;
    w.text("EastBoundingCoordinate", &rect.east.to_string())?;
    w.text("SouthBoundingCoordinate", &rect.south.to_string())?;
    w.close("BoundingRectangle")?;
    w.close("Geometry")?;
    w.close("HorizontalSpatialDomain")?;
    w.close("Spatial")
}

fn write_platform(w: &mut ElementWriter, platform: &Platform) -> Result<()> {
    w.open("Platform")?;
    w.text("ShortName", &platform.short_name)?;
    w.list("Instruments", &platform.instruments, |w, instrument| {
        w.open("Instrument")?;
        w.text("ShortName", &instrument.short_name)?;
        w.close("Instrument")
    })?;
    w.close("Platform")
}

fn write_access_url(w: &mut ElementWriter, url: &OnlineAccessUrl) -> Result<()> {
    w.open("OnlineAccessURL")?;
    w.text("URL", &url.url)?;
    w.text("URLDescription", &url.description)?;
    w.text("MimeType", &url.mime_type)?;
    w.close("OnlineAccessURL")
}

fn write_online_resource(w: &mut ElementWriter, resource: &OnlineResource) -> Result<()> {
    w.open("OnlineResource")?;
    w.text("URL", &resource.url)?;
    w.text("Type", &resource.resource_type)?;
    w.text("MimeType", &resource.mime_type)?;
    w.close("OnlineResource")
}

fn write_browse_url(w: &mut ElementWriter, browse: &ProviderBrowseUrl) -> Result<()> {
    w.open("ProviderBrowseURL")?;
    w.text("URL", &browse.url)?;
    w.text("Description", &browse.description)?;
    w.close("ProviderBrowseURL")
}

fn write_additional_attribute(w: &mut ElementWriter, attr: &AdditionalAttribute) -> Result<()> {
    w.open("AdditionalAttribute")?;
    w.text("Name", &attr.name)?;
    w.text("Value", &attr.value)?;
    w.close("AdditionalAttribute")
}

struct ElementWriter {
    writer: Writer<Vec<u8>>,
}

impl ElementWriter {
    fn new() -> Self {
        ElementWriter {
            writer: Writer::new(Vec::new()),
        }
    }

    fn open(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// `<name>value</name>` with `value` escaped.
    fn text(&mut self, name: &str, value: &str) -> Result<()> {
        self.open(name)?;
        if !value.is_empty() {
            self.writer.write_event(Event::Text(BytesText::new(value)))?;
        }
        self.close(name)
    }

    /// Container element holding one child per item; skipped when empty.
    fn list<T, F>(&mut self, container: &str, items: &[T], mut write_item: F) -> Result<()>
    where
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        if items.is_empty() {
            return Ok(());
        }
        self.open(container)?;
        for item in items {
            write_item(self, item)?;
        }
        self.close(container)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::Xml(quick_xml::Error::from(e.utf8_error())))
    }
}
