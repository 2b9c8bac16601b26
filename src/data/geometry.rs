/// A position in WGS84 degrees. `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Coord { x, y }
    }

    pub fn lon(&self) -> f64 {
        self.x
    }

    pub fn lat(&self) -> f64 {
        self.y
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Coord { x, y }
    }
}

/// Closed coordinate sequence, first coordinate equal to the last.
pub type Ring = Vec<Coord>;

/// Ring 0 is the outer boundary, every following ring is a hole.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        let mut rings = Vec::with_capacity(holes.len() + 1);
        rings.push(exterior);
        rings.extend(holes);
        Polygon { rings }
    }

    pub fn exterior(&self) -> Option<&Ring> {
        self.rings.first()
    }

    pub fn holes(&self) -> &[Ring] {
        self.rings.get(1..).unwrap_or(&[])
    }
}

impl From<Coord> for geo_types::Coord<f64> {
    fn from(coord: Coord) -> Self {
        geo_types::Coord { x: coord.x, y: coord.y }
    }
}

impl From<geo_types::Point<f64>> for Coord {
    fn from(point: geo_types::Point<f64>) -> Self {
        Coord::new(point.x(), point.y())
    }
}

fn to_line_string(coords: &[Coord]) -> geo_types::LineString<f64> {
    coords.iter().copied().map(geo_types::Coord::from).collect()
}

impl From<&Polygon> for geo_types::Polygon<f64> {
    fn from(polygon: &Polygon) -> Self {
        let exterior = polygon
            .exterior()
            .map(|ring| to_line_string(ring))
            .unwrap_or_else(|| geo_types::LineString::new(Vec::new()));
        let interiors = polygon.holes().iter().map(|ring| to_line_string(ring)).collect();
        geo_types::Polygon::new(exterior, interiors)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Polygon),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Polygon>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => coords.is_empty(),
            Geometry::Polygon(polygon) => polygon.rings.is_empty(),
            Geometry::MultiLineString(lines) => lines.iter().all(Vec::is_empty),
            Geometry::MultiPolygon(polygons) => polygons.iter().all(|p| p.rings.is_empty()),
            Geometry::GeometryCollection(members) => members.iter().all(Geometry::is_empty),
        }
    }
}

/// Used by the processors, which hand the geometric work to the `geo` crate.
impl From<&Geometry> for geo_types::Geometry<f64> {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(coord) => geo_types::Point::from(geo_types::Coord::from(*coord)).into(),
            Geometry::LineString(coords) => to_line_string(coords).into(),
            Geometry::Polygon(polygon) => geo_types::Polygon::from(polygon).into(),
            Geometry::MultiPoint(coords) => coords
                .iter()
                .map(|&coord| geo_types::Point::from(geo_types::Coord::from(coord)))
                .collect::<geo_types::MultiPoint<f64>>()
                .into(),
            Geometry::MultiLineString(lines) => {
                geo_types::MultiLineString::new(lines.iter().map(|line| to_line_string(line)).collect()).into()
            },
            Geometry::MultiPolygon(polygons) => {
                geo_types::MultiPolygon::new(polygons.iter().map(geo_types::Polygon::from).collect()).into()
            },
            Geometry::GeometryCollection(members) => {
                geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection(members.iter().map(geo_types::Geometry::from).collect()))
            },
        }
    }
}
