use std::fs;
use std::path::{Path, PathBuf};

use cmr_granule::core::assembler::{PROCESSING_TIME, SENSING_TIME, SPACECRAFT_NAME, STRUCT_METADATA};
use cmr_granule::io::StaticAttributes;
use cmr_granule::{
    Creator, CreatorConfig, Error, RawAttributeSet, TemplateRegistry, Temporal, encode,
};

const FILE_NAME: &str = "HLS.L30.T17SLU.2020117T160901.v1.5.hdf";

const STRUCT_BLOCK: &str = "GROUP=SwathStructure\nEND_GROUP=SwathStructure\nGROUP=GridStructure\n\tGROUP=GRID_1\n\t\tGridName=\"Grid\"\n\t\tXDim=3660\n\t\tYDim=3660\n\t\tUpperLeftPointMtrs=(-9128198.245048,4163881.144064)\n\t\tLowerRightMtrs=(-9017002.732584,4028802.026134)\n\t\tProjection=GCTP_SNSOID\n\tEND_GROUP=GRID_1\nEND_GROUP=GridStructure\nEND\n";

fn bundled_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn minimal_attributes() -> RawAttributeSet {
    [
        (SPACECRAFT_NAME, "LANDSAT-8"),
        (PROCESSING_TIME, "2021-06-01T12:00:00Z"),
        (SENSING_TIME, "2021-06-01T11:59:00Z"),
        (STRUCT_METADATA, STRUCT_BLOCK),
    ]
    .into_iter()
    .collect()
}

fn one_attribute_templates(dir: &Path) -> PathBuf {
    let templates = dir.join("templates");
    fs::create_dir(&templates).unwrap();
    fs::write(
        templates.join("L30.json"),
        r#"{"L30": {
            "DataSetId": "HLS L30",
            "LANDSAT-8": {"Platform": {"ShortName": "LANDSAT-8",
                                       "Instruments": {"Instrument": {"ShortName": "OLI"}}}},
            "AdditionalAttributes": {"AdditionalAttribute": [{"Name": "CLOUD_COVERAGE"}]},
            "Orderable": "true",
            "Visible": "true"
        }}"#,
    )
    .unwrap();
    fs::write(
        templates.join("L30_attribute_mapping.json"),
        r#"{"CLOUD_COVERAGE": "cloud_coverage"}"#,
    )
    .unwrap();
    templates
}

#[test]
fn minimal_granule_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join(FILE_NAME);
    fs::write(&input, vec![0u8; 4096]).unwrap();

    let registry = TemplateRegistry::from_dir(one_attribute_templates(dir.path()));
    let creator = Creator::with_source(
        StaticAttributes(minimal_attributes()),
        &CreatorConfig::default(),
        &registry,
    );

    let doc = creator.document(&input).unwrap();
    assert_eq!(doc.granule_ur, "HLS.L30.T17SLU.2020117T160901.v1.5");
    let granule = doc.data_granule.as_ref().unwrap();
    assert_eq!(granule.production_date_time, "2021-06-01T12:00:00.000000Z");
    assert_eq!(granule.local_version_id, "1.5");
    assert_eq!(granule.size_kb, 4.0);
    assert_eq!(
        doc.temporal,
        Some(Temporal::Single("2021-06-01T11:59:00Z".to_string()))
    );
    let rect = doc.spatial.unwrap();
    assert!(rect.north >= rect.south);
    assert!((rect.west - -82.0).abs() < 1e-6, "{rect:?}");
    assert!((rect.north - 35.0).abs() < 1e-6, "{rect:?}");
    assert!((rect.south - 34.0).abs() < 1e-6, "{rect:?}");

    let xml = encode(&doc).unwrap();
    assert_eq!(xml.matches("<AdditionalAttribute>").count(), 1);
    assert!(xml.contains(
        "<AdditionalAttributes><AdditionalAttribute><Name>CLOUD_COVERAGE</Name>\
         <Value>Not Available</Value></AdditionalAttribute></AdditionalAttributes>"
    ));
    assert!(!xml.contains("<item>"));
    assert!(xml.contains("<SingleDateTime>2021-06-01T11:59:00Z</SingleDateTime>"));
    assert!(xml.contains("<ProductionDateTime>2021-06-01T12:00:00.000000Z</ProductionDateTime>"));
    assert_eq!(xml, encode(&doc).unwrap());
}

#[test]
fn bundled_templates_cover_every_declared_attribute() {
    let registry = TemplateRegistry::from_dir(bundled_templates());
    for (product, file, spacecraft) in [
        ("L30", FILE_NAME, "LANDSAT-8"),
        ("S30", "HLS.S30.T10SEG.2021152T183919.v1.5.hdf", "Sentinel-2B"),
    ] {
        let config = registry.lookup(product).unwrap();
        let declared = config.template.additional_attributes.clone();
        assert!(!declared.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join(file);
        fs::write(&input, b"hdf").unwrap();

        let attrs: RawAttributeSet = [
            (SPACECRAFT_NAME, spacecraft),
            (PROCESSING_TIME, "2021-06-01T12:00:00Z"),
            (SENSING_TIME, "2021-06-01T11:59:00Z;2021-06-01T12:01:00Z"),
            (STRUCT_METADATA, STRUCT_BLOCK),
            ("cloud_coverage", "7"),
        ]
        .into_iter()
        .collect();

        let doc = Creator::with_source(StaticAttributes(attrs), &CreatorConfig::default(), &registry)
            .document(&input)
            .unwrap();

        let names: Vec<&str> = doc
            .additional_attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, declared.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(doc.additional_attributes[0].value, "7");
        assert!(doc.additional_attributes.iter().all(|a| !a.value.is_empty()));
        assert_eq!(doc.platforms[0].short_name, spacecraft);
        assert!(matches!(doc.temporal, Some(Temporal::Range { .. })));
    }
}

#[test]
fn fatal_errors_leave_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join(FILE_NAME);
    fs::write(&input, b"hdf").unwrap();

    let attrs: RawAttributeSet = [
        (PROCESSING_TIME, "2021-06-01T12:00:00Z"),
        (SENSING_TIME, "a;b;c"),
        (STRUCT_METADATA, STRUCT_BLOCK),
        ("cloud_coverage", "7"),
    ]
    .into_iter()
    .collect();
    let registry = TemplateRegistry::from_dir(one_attribute_templates(dir.path()));
    let creator = Creator::with_source(
        StaticAttributes(attrs),
        &CreatorConfig::default(),
        &registry,
    );

    let err = creator.save_to_path(&input, None).unwrap_err();
    assert!(matches!(err, Error::InvalidTemporalData { .. }));
    assert!(!dir.path().join("HLS.L30.T17SLU.2020117T160901.v1.5.cmr.xml").exists());
}
