use std::{fs, io::Write, path::{Path, PathBuf}};

use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    Point, Polygon, PolygonRing, Writer,
};
use votemap::{
    describe_shapefile, load_layer, load_shapes, render, Config, LoadCache, MapLevel, MapSettings, ViewState,
    Warning,
};

const WGS84: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

const UTM44N: &str = r#"PROJCS["WGS_1984_UTM_Zone_44N",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",81.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

/// Clockwise square ring with its lower-left corner at `(x, y)`.
fn square(x: f64, y: f64, size: f64) -> Polygon {
    Polygon::new(PolygonRing::Outer(vec![
        Point::new(x, y),
        Point::new(x, y + size),
        Point::new(x + size, y + size),
        Point::new(x + size, y),
        Point::new(x, y),
    ]))
}

/// Write `squares` keyed by `ids` to `<dir>/villages.shp`, with an optional `.prj`.
fn write_villages(dir: &Path, ids: &[&str], squares: Vec<Polygon>, prj: Option<&str>) -> PathBuf {
    let path = dir.join("villages.shp");
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("id").unwrap(), 16)
        .add_character_field(FieldName::try_from("name").unwrap(), 32);
    {
        let mut writer = Writer::from_path(&path, table).unwrap();
        for (id, shape) in ids.iter().zip(squares) {
            let mut record = Record::default();
            record.insert("id".to_string(), FieldValue::Character(Some(id.to_string())));
            record.insert("name".to_string(), FieldValue::Character(Some(format!("village {id}"))));
            writer.write_shape_and_record(&shape, &record).unwrap();
        }
    }
    if let Some(wkt) = prj {
        fs::write(path.with_extension("prj"), wkt).unwrap();
    }
    path
}

fn write_sheet(dir: &Path) -> PathBuf {
    let path = dir.join("sheet.csv");
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(b"\
region_code,village_name,AC_name,total_votes,TDP_votes,YSRCP_votes,BJP_votes,Others_votes,TDP_vote_share
a1,Alpha,Tenali,100,60,30,5,5,60
A2,Beta,Tenali,100,40,50,5,5,40
").unwrap();
    path
}

#[test]
fn geographic_shapefile_loads_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_villages(dir.path(), &["A1", " a2 "], vec![square(80.0, 16.0, 0.1), square(80.1, 16.0, 0.1)], Some(WGS84));

    let shapes = load_shapes(&path, "id").unwrap();
    assert!(shapes.is_clean());
    assert_eq!(shapes.value.keys(), &[Some("A1".to_string()), Some("A2".to_string())]);
    assert_eq!(shapes.value.geoms().epsg(), Some(4326));
}

#[test]
fn projected_shapefile_is_reprojected_to_lon_lat() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_villages(dir.path(), &["A1"], vec![square(446_000.0, 1_802_000.0, 1_000.0)], Some(UTM44N));

    let shapes = load_shapes(&path, "id").unwrap();
    assert!(shapes.is_clean());
    let bounds = shapes.value.geoms().bounds().unwrap();
    assert!(bounds.min().x > 80.0 && bounds.max().x < 81.0, "{bounds:?}");
    assert!(bounds.min().y > 16.0 && bounds.max().y < 17.0, "{bounds:?}");
}

#[test]
fn missing_prj_warns_and_missing_key_field_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_villages(dir.path(), &["A1"], vec![square(80.0, 16.0, 0.1)], None);

    let shapes = load_shapes(&path, "id").unwrap();
    assert!(matches!(shapes.warnings.as_slice(), [Warning::UnknownCrs { .. }]));
    assert!(load_shapes(&path, "village_id").is_err());
}

#[test]
fn cached_inputs_render_both_levels() {
    let dir = tempfile::tempdir().unwrap();
    let shapefile = write_villages(dir.path(), &["A1", "A2", "A3"], vec![
        square(80.0, 16.0, 0.1), square(80.1, 16.0, 0.1), square(80.2, 16.0, 0.1),
    ], Some(WGS84));
    let sheet = write_sheet(dir.path());

    let config = Config {
        shapefile,
        sheet: sheet.display().to_string(),
        ..Config::default()
    };
    let cache = LoadCache::new();
    let layer = cache.layer(&config).unwrap();
    assert_eq!(layer.warnings, vec![Warning::UnmatchedKeys { count: 1, total: 3 }]);
    assert_eq!(cache.len().unwrap(), 2);

    // A second request reuses both cached inputs.
    let again = cache.layer(&config).unwrap();
    assert_eq!(again.value.len(), 3);
    assert_eq!(cache.len().unwrap(), 2);

    let settings = MapSettings::default();
    let villages = render(&ViewState::default(), &layer.value, &settings).unwrap().value;
    assert_eq!(villages.features["features"].as_array().unwrap().len(), 3);

    let acs = ViewState { level: MapLevel::AssemblyConstituency, use_dummy: true };
    let document = render(&acs, &layer.value, &settings).unwrap().value;
    let features = document.features["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["properties"]["dummy_ac"], "Tenali");
    assert_eq!(features[0]["properties"]["TDP_share"], 50.0);
    assert_eq!(features[0]["geometry"]["type"], "MultiPolygon");
}

#[test]
fn direct_load_matches_cached_load() {
    let dir = tempfile::tempdir().unwrap();
    let shapefile = write_villages(dir.path(), &["A1", "A2", "A3"], vec![
        square(80.0, 16.0, 0.1), square(80.1, 16.0, 0.1), square(80.2, 16.0, 0.1),
    ], Some(WGS84));
    let sheet = write_sheet(dir.path());
    let config = Config { shapefile, sheet: sheet.display().to_string(), ..Config::default() };

    let direct = load_layer(&config).unwrap();
    let cached = LoadCache::new().layer(&config).unwrap();
    assert_eq!(direct.warnings, cached.warnings);
    assert_eq!(direct.value.keys().unwrap(), cached.value.keys().unwrap());
    assert!(direct.value.data().equals_missing(cached.value.data()));
}

#[test]
fn describes_records_and_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_villages(dir.path(), &["A1", "A2"], vec![square(80.0, 16.0, 0.1), square(80.1, 16.0, 0.1)], None);

    let description = describe_shapefile(&path).unwrap();
    assert!(description.starts_with("Number of records: 2\n"));
    assert!(description.contains("  - Polygon: 2\n"));
    assert!(description.contains("  - id ("));
    assert!(description.contains("  - name ("));
}
