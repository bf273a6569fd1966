//! Spherical Web Mercator (EPSG:3857) to WGS84 geographic (EPSG:4326).
//!
//! The source and target systems are fixed: the upstream producer writes
//! grid corners in EPSG:3857 metres and the catalog wants decimal degrees.
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::error::{Error, Result};
use crate::types::BoundingRectangle;

/// WGS84 semi-major axis used as the sphere radius by EPSG:3857.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the projected world width (x and y range of EPSG:3857).
pub const MAX_EXTENT: f64 = PI * EARTH_RADIUS;

/// Latitude at which EPSG:3857 reaches `MAX_EXTENT`.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Coordinate reference systems known to the reprojector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:3857, metres.
    WebMercator,
    /// EPSG:4326, (longitude, latitude) degrees.
    Geographic,
}

/// Crs of the grid corners written by the producer.
pub const SOURCE_CRS: Crs = Crs::WebMercator;
/// Crs of the document's bounding rectangle.
pub const TARGET_CRS: Crs = Crs::Geographic;

/// A 2D point `(x, y)`; `(lon, lat)` for geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Transform `point` from `source` to `target`.
pub fn reproject(source: Crs, target: Crs, point: Point) -> Result<Point> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(Error::Reprojection(format!(
            "non-finite coordinate ({}, {})",
            point.x, point.y
        )));
    }
    match (source, target) {
        (Crs::WebMercator, Crs::WebMercator) | (Crs::Geographic, Crs::Geographic) => Ok(point),
        (Crs::WebMercator, Crs::Geographic) => mercator_to_geographic(point),
        (Crs::Geographic, Crs::WebMercator) => geographic_to_mercator(point),
    }
}

/// Reproject two opposite corners `[x_low, y_low, x_high, y_high]` given in
/// the source crs into a geographic bounding rectangle.
pub fn reproject_bounds(bounds: [f64; 4]) -> Result<BoundingRectangle> {
    let [x_low, y_low, x_high, y_high] = bounds;
    let low = reproject(SOURCE_CRS, TARGET_CRS, Point::new(x_low, y_low))?;
    let high = reproject(SOURCE_CRS, TARGET_CRS, Point::new(x_high, y_high))?;
    Ok(BoundingRectangle {
        west: low.x,
        north: high.y,
        east: high.x,
        south: low.y,
    })
}

fn mercator_to_geographic(p: Point) -> Result<Point> {
    // Allow rounding slop at the antimeridian/poles of the projected square.
    let limit = MAX_EXTENT * (1.0 + 1e-9);
    if p.x.abs() > limit || p.y.abs() > limit {
        return Err(Error::Reprojection(format!(
            "({}, {}) lies outside the EPSG:3857 domain",
            p.x, p.y
        )));
    }
    let lon = (p.x / EARTH_RADIUS).to_degrees().clamp(-180.0, 180.0);
    let lat = (2.0 * (p.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
    Ok(Point::new(lon, lat))
}

fn geographic_to_mercator(p: Point) -> Result<Point> {
    if p.x.abs() > 180.0 || p.y.abs() > MAX_LATITUDE {
        return Err(Error::Reprojection(format!(
            "({}, {}) lies outside the EPSG:3857 latitude/longitude range",
            p.x, p.y
        )));
    }
    let x = EARTH_RADIUS * p.x.to_radians();
    let y = EARTH_RADIUS * (FRAC_PI_4 + p.y.to_radians() / 2.0).tan().ln();
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn origin_and_extent() {
        assert_close(
            reproject(Crs::WebMercator, Crs::Geographic, Point::new(0.0, 0.0)).unwrap(),
            Point::new(0.0, 0.0),
        );
        let corner =
            reproject(Crs::WebMercator, Crs::Geographic, Point::new(MAX_EXTENT, MAX_EXTENT))
                .unwrap();
        assert_close(corner, Point::new(180.0, MAX_LATITUDE));
    }

    #[test]
    fn known_city() {
        // Paris, as published for EPSG:3857.
        let p = reproject(
            Crs::WebMercator,
            Crs::Geographic,
            Point::new(261_845.7, 6_250_564.35),
        )
        .unwrap();
        assert!((p.x - 2.3522).abs() < 1e-4, "lon {}", p.x);
        assert!((p.y - 48.8566).abs() < 1e-4, "lat {}", p.y);
    }

    #[test]
    fn round_trip_through_inverse() {
        for &(lon, lat) in &[
            (0.0, 0.0),
            (-77.0365, 38.8977),
            (151.2093, -33.8688),
            (-179.999, 85.0),
            (179.5, -84.9),
            (12.5, 0.0001),
        ] {
            let geo = Point::new(lon, lat);
            let projected = reproject(Crs::Geographic, Crs::WebMercator, geo).unwrap();
            let back = reproject(Crs::WebMercator, Crs::Geographic, projected).unwrap();
            assert_close(back, geo);
        }
    }

    #[test]
    fn identity_for_same_crs() {
        let p = Point::new(12.0, -3.0);
        assert_eq!(reproject(Crs::Geographic, Crs::Geographic, p).unwrap(), p);
    }

    #[test]
    fn bounds_keep_north_above_south() {
        let steps: [f64; 7] = [-2.0e7, -1.0e7, -1.0, 0.0, 3.5e5, 1.2e7, 2.0e7];
        for &y1 in &steps {
            for &y2 in &steps {
                let bounds = [y1.min(y2) / 2.0, y1.min(y2), y1.max(y2) / 2.0, y1.max(y2)];
                let rect = reproject_bounds(bounds).unwrap();
                assert!(rect.north >= rect.south, "{rect:?}");
                assert!(rect.east >= rect.west, "{rect:?}");
                assert!((-90.0..=90.0).contains(&rect.north));
                assert!((-90.0..=90.0).contains(&rect.south));
                assert!((-180.0..=180.0).contains(&rect.west));
                assert!((-180.0..=180.0).contains(&rect.east));
            }
        }
    }

    #[test]
    fn rejects_out_of_domain() {
        assert!(matches!(
            reproject(Crs::WebMercator, Crs::Geographic, Point::new(3.0e7, 0.0)),
            Err(Error::Reprojection(_))
        ));
        assert!(matches!(
            reproject(Crs::WebMercator, Crs::Geographic, Point::new(f64::NAN, 0.0)),
            Err(Error::Reprojection(_))
        ));
        assert!(reproject(Crs::Geographic, Crs::WebMercator, Point::new(0.0, 89.0)).is_err());
    }
}
