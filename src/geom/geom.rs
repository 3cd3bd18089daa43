use geo::{BooleanOps, BoundingRect, Coord, Intersects, MultiPolygon, Point, Rect};
use rstar::{primitives::{GeomWithData, Rectangle}, RTree, AABB};

/// Bounding rectangle of a shape, tagged with the shape's index.
type ShapeBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// An indexed list of MultiPolygons with the EPSG code they are expressed in.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<ShapeBox>,
    epsg: Option<u32>, // EPSG code, if known
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty shapes are kept but never indexed.
    pub fn new(shapes: Vec<MultiPolygon<f64>>, epsg: Option<u32>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| {
                        ShapeBox::new(Rectangle::from_corners(rect.min().into(), rect.max().into()), i)
                    }))
                    .collect()
            ),
            shapes,
            epsg,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Get the EPSG code, if known.
    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }

    /// Union of the MultiPolygons at `indices`.
    /// This method may be slow for large numbers of complex polygons.
    pub fn union_of(&self, indices: &[usize]) -> MultiPolygon<f64> {
        match indices {
            [] => MultiPolygon(Vec::new()),
            [only] => self.shapes[*only].clone(),
            _ => indices.iter()
                .map(|&i| self.shapes[i].clone())
                .reduce(|a, b| a.union(&b))
                .unwrap_or_else(|| MultiPolygon(Vec::new())),
        }
    }

    /// Index of the first shape touching `point`, using the R-tree to pick candidates.
    pub fn locate(&self, point: Point<f64>) -> Option<usize> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .filter(|&i| self.shapes[i].intersects(&point))
            .min()
    }
}
