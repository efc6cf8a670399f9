use tk_core::{BoundingBox, Error, Image, Offset2d, Pixel, Point2d};

use crate::gaps::{distinct_pixels, fill_gaps, polygon_area};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BoundaryStage {
    Raw,
    AreaComputed,
    GapFilled,
    BoxComputed,
    BoxScaled,
}

impl BoundaryStage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "Raw",
            Self::AreaComputed => "AreaComputed",
            Self::GapFilled => "GapFilled",
            Self::BoxComputed => "BoxComputed",
            Self::BoxScaled => "BoxScaled",
        }
    }
}

/// One polygon outline of one area list within one layer.
#[derive(Debug, Clone)]
pub struct Boundary {
    name: String,
    index: usize,
    vertices: Vec<Point2d>,
    transform: Offset2d,
    stage: BoundaryStage,
    area: f64,
    path: Vec<Pixel>,
    distinct: Vec<Pixel>,
    bbox: Option<BoundingBox>,
}

impl Boundary {
    /// `transform` is the layer offset subtracted when reporting centroids.
    pub fn new(
        name: impl Into<String>,
        index: usize,
        vertices: Vec<Point2d>,
        transform: Offset2d,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            vertices,
            transform,
            stage: BoundaryStage::Raw,
            area: 0.0,
            path: Vec::new(),
            distinct: Vec::new(),
            bbox: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stage(&self) -> BoundaryStage {
        self.stage
    }

    pub fn vertices(&self) -> &[Point2d] {
        &self.vertices
    }

    pub fn transform(&self) -> Offset2d {
        self.transform
    }

    /// Gap-filled pixel path; empty before [`Boundary::fill_gaps`].
    pub fn path(&self) -> &[Pixel] {
        &self.path
    }

    /// Gap-filled path with repeated pixels removed.
    pub fn distinct_pixels(&self) -> &[Pixel] {
        &self.distinct
    }

    pub fn area(&self) -> Option<f64> {
        (self.stage >= BoundaryStage::AreaComputed).then_some(self.area)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn compute_area(&mut self) -> Result<f64, Error> {
        self.expect_stage("compute_area", BoundaryStage::Raw)?;
        self.area = polygon_area(&self.vertices);
        self.stage = BoundaryStage::AreaComputed;
        Ok(self.area)
    }

    pub fn fill_gaps(&mut self) -> Result<(), Error> {
        self.expect_stage("fill_gaps", BoundaryStage::AreaComputed)?;
        let corners: Vec<Pixel> = self.vertices.iter().map(|&p| Pixel::from_point(p)).collect();
        self.path = fill_gaps(&corners);
        self.distinct = distinct_pixels(&self.path);
        self.stage = BoundaryStage::GapFilled;
        Ok(())
    }

    pub fn compute_bounding_box(&mut self) -> Result<BoundingBox, Error> {
        self.expect_stage("compute_bounding_box", BoundaryStage::GapFilled)?;
        let bb = BoundingBox::from_pixels(&self.path).ok_or(Error::EmptyPath)?;
        self.bbox = Some(bb);
        self.stage = BoundaryStage::BoxComputed;
        Ok(bb)
    }

    /// Grows the box by `ceil(scale * extent / 2)` on every side.
    ///
    /// The minimum corner is clamped at `0`; the maximum corner is left
    /// unclamped. A scale of exactly `1.0` leaves the box unchanged.
    pub fn scale_bounding_box(&mut self, scale: f64) -> Result<BoundingBox, Error> {
        self.expect_stage("scale_bounding_box", BoundaryStage::BoxComputed)?;
        let bb = self.bbox.ok_or(Error::EmptyPath)?;
        self.stage = BoundaryStage::BoxScaled;
        if scale == 1.0 {
            return Ok(bb);
        }

        let x_radius = (scale * bb.width() as f64 / 2.0).ceil() as i64;
        let y_radius = (scale * bb.height() as f64 / 2.0).ceil() as i64;
        let scaled = BoundingBox::new(
            Pixel::new((bb.min.x - x_radius).max(0), (bb.min.y - y_radius).max(0)),
            Pixel::new(bb.max.x + x_radius, bb.max.y + y_radius),
        );
        self.bbox = Some(scaled);
        Ok(scaled)
    }

    /// Mean of the current path (gap-filled once available, raw vertices
    /// before), shifted back by the layer transform.
    pub fn centroid(&self) -> Option<Point2d> {
        let (sx, sy, n) = if self.stage >= BoundaryStage::GapFilled {
            self.path.iter().fold((0.0, 0.0, 0usize), |(sx, sy, n), p| {
                (sx + p.x as f64, sy + p.y as f64, n + 1)
            })
        } else {
            self.vertices
                .iter()
                .fold((0.0, 0.0, 0usize), |(sx, sy, n), p| (sx + p.x, sy + p.y, n + 1))
        };
        if n == 0 {
            return None;
        }

        let mean = Point2d {
            x: sx / n as f64,
            y: sy / n as f64,
        };
        Some(mean - self.transform)
    }

    /// Number of pixels in the gap-filled path.
    pub fn boundary_length(&self) -> Result<usize, Error> {
        if self.stage < BoundaryStage::GapFilled {
            return Err(self.stage_error("boundary_length"));
        }
        Ok(self.path.len())
    }

    /// Binary raster of the path over the current bounding box.
    ///
    /// Row `i`, column `j` is `1` when pixel `(min.x + j, min.y + i)` lies on
    /// the path. Path pixels outside a shrunken box are skipped.
    pub fn display_matrix(&self) -> Result<Image<u8>, Error> {
        if self.stage < BoundaryStage::BoxComputed {
            return Err(self.stage_error("display_matrix"));
        }
        let bb = self.bbox.ok_or(Error::EmptyPath)?;

        let width = usize::try_from(bb.width()).unwrap_or(0);
        let height = usize::try_from(bb.height()).unwrap_or(0);
        let mut img = Image::new_fill(width, height, 0u8)?;
        for &p in &self.path {
            if !bb.contains(p) {
                continue;
            }
            let j = (p.x - bb.min.x) as usize;
            let i = (p.y - bb.min.y) as usize;
            if let Some(v) = img.get_mut(j, i) {
                *v = 1;
            }
        }
        Ok(img)
    }

    fn expect_stage(&self, operation: &'static str, stage: BoundaryStage) -> Result<(), Error> {
        if self.stage != stage {
            return Err(self.stage_error(operation));
        }
        Ok(())
    }

    fn stage_error(&self, operation: &'static str) -> Error {
        Error::InvalidStage {
            operation,
            stage: self.stage.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tk_core::{BoundingBox, Error, Offset2d, Pixel, Point2d};

    use super::{Boundary, BoundaryStage};

    fn boundary(pts: &[(f64, f64)]) -> Boundary {
        let vertices = pts.iter().map(|&(x, y)| Point2d { x, y }).collect();
        Boundary::new("ADAL", 0, vertices, Offset2d::default())
    }

    fn boxed(pts: &[(f64, f64)]) -> Boundary {
        let mut b = boundary(pts);
        b.compute_area().expect("raw");
        b.fill_gaps().expect("area computed");
        b.compute_bounding_box().expect("gap filled");
        b
    }

    #[test]
    fn stages_advance_in_order() {
        let mut b = boundary(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)]);
        assert_eq!(b.stage(), BoundaryStage::Raw);
        assert_eq!(b.area(), None);

        assert_eq!(b.compute_area(), Ok(16.0));
        assert_eq!(b.area(), Some(16.0));
        b.fill_gaps().expect("area computed");
        let bb = b.compute_bounding_box().expect("gap filled");
        assert_eq!(bb, BoundingBox::new(Pixel::new(0, 0), Pixel::new(4, 4)));
        b.scale_bounding_box(1.5).expect("box computed");
        assert_eq!(b.stage(), BoundaryStage::BoxScaled);
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut b = boundary(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0)]);

        assert_eq!(
            b.fill_gaps(),
            Err(Error::InvalidStage {
                operation: "fill_gaps",
                stage: "Raw"
            })
        );
        assert!(b.compute_bounding_box().is_err());
        assert!(b.scale_bounding_box(1.1).is_err());
        assert!(b.boundary_length().is_err());
        assert!(b.display_matrix().is_err());

        b.compute_area().expect("raw");
        assert!(b.compute_area().is_err());
        assert!(b.scale_bounding_box(1.1).is_err());
    }

    #[test]
    fn box_extent_is_inclusive_pixel_count() {
        let b = boxed(&[(3.0, 5.0), (3.0, 9.0), (10.0, 9.0), (10.0, 5.0)]);
        let bb = b.bounding_box().expect("box computed");
        assert_eq!(bb.width(), 8);
        assert_eq!(bb.height(), 5);
    }

    #[test]
    fn unit_scale_is_noop() {
        let mut b = boxed(&[(20.0, 20.0), (20.0, 30.0), (30.0, 30.0), (30.0, 20.0)]);
        let before = b.bounding_box();
        let after = b.scale_bounding_box(1.0).expect("box computed");
        assert_eq!(Some(after), before);
    }

    #[test]
    fn scale_grows_by_ceiled_half_extent_and_clamps_min() {
        // 11 x 11 box at (20..=30); half extent 5.5 * 1.1 = 6.05 -> 7.
        let mut b = boxed(&[(20.0, 20.0), (20.0, 30.0), (30.0, 30.0), (30.0, 20.0)]);
        let bb = b.scale_bounding_box(1.1).expect("box computed");
        assert_eq!(bb, BoundingBox::new(Pixel::new(13, 13), Pixel::new(37, 37)));

        let mut near_origin = boxed(&[(2.0, 1.0), (2.0, 9.0), (9.0, 9.0), (9.0, 1.0)]);
        let bb = near_origin.scale_bounding_box(2.0).expect("box computed");
        assert_eq!(bb.min, Pixel::new(0, 0));
        assert_eq!(bb.max, Pixel::new(17, 18));
    }

    #[test]
    fn centroid_is_shifted_by_transform() {
        let vertices = vec![
            Point2d { x: 10.0, y: 10.0 },
            Point2d { x: 14.0, y: 10.0 },
            Point2d { x: 14.0, y: 14.0 },
            Point2d { x: 10.0, y: 14.0 },
        ];
        let b = Boundary::new("AVAL", 2, vertices, Offset2d::new(4.0, -2.0));
        assert_eq!(b.centroid(), Some(Point2d { x: 8.0, y: 14.0 }));

        let empty = Boundary::new("AVAL", 0, Vec::new(), Offset2d::default());
        assert_eq!(empty.centroid(), None);
    }

    #[test]
    fn boundary_length_counts_filled_path() {
        let b = boxed(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]);
        assert_eq!(b.boundary_length(), Ok(13));
        assert_eq!(b.distinct_pixels().len(), 7);
    }

    #[test]
    fn display_matrix_marks_path_pixels() {
        let b = boxed(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]);
        let m = b.display_matrix().expect("box computed");

        assert_eq!((m.width(), m.height()), (3, 3));
        assert_eq!(m.row(0), Some(&[1, 1, 1][..]));
        assert_eq!(m.row(1), Some(&[1, 0, 1][..]));
        // The y = 3 edge heads right, so only its corners are present.
        assert_eq!(m.row(2), Some(&[1, 0, 1][..]));
    }

    #[test]
    fn two_point_path_is_handled() {
        let mut b = boundary(&[(0.0, 0.0), (5.0, 0.0)]);
        assert_eq!(b.compute_area(), Ok(0.0));
        b.fill_gaps().expect("area computed");
        assert_eq!(b.distinct_pixels().len(), 6);
    }
}
