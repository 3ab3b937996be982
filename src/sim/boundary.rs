//! Containment model
//!
//! The drop region is resolved from up to three sources, highest priority first:
//! 1. an analytic region supplied by the host layout (rect zones or a polygon)
//! 2. a raster coverage mask
//! 3. a centered fallback rectangle covering the middle of the canvas
//!
//! A `Boundary` is immutable. Swapping sources builds a new one, so a search that
//! cloned the previous `Arc` never observes a half-applied change.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::consts::FALLBACK_REGION_FRACTION;
use crate::diagnostics::DiagnosticSink;
use crate::error::{DropError, Result};

/// Mask pixels count as inside above these thresholds
pub const MASK_COVERAGE_THRESHOLD: f32 = 0.5;
pub const MASK_ALPHA_THRESHOLD: f32 = 0.5;

/// Rejection-sampling budget for polygon random points
const POLYGON_SAMPLE_TRIES: u32 = 64;

/// Grid resolution (cells per axis) for `Boundary::nearest_inside`
const ANCHOR_GRID: u32 = 32;

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Point containment (edges inclusive)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.min()) && self.contains(other.max())
    }

    /// Strict overlap (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.w + amount * 2.0,
            self.h + amount * 2.0,
        )
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    /// Smallest rect containing both
    pub fn union(&self, other: &Rect) -> Self {
        Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Distance between top-left corners
    pub fn corner_distance(&self, other: &Rect) -> f32 {
        self.min().distance(other.min())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }

    /// Corners in clockwise order starting top-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.w, self.y),
            Vec2::new(self.x + self.w, self.y + self.h),
            Vec2::new(self.x, self.y + self.h),
        ]
    }

    /// Uniform point inside the rect
    pub fn random_point(&self, rng: &mut dyn RngCore) -> Vec2 {
        Vec2::new(
            self.x + rng.random::<f32>() * self.w,
            self.y + rng.random::<f32>() * self.h,
        )
    }
}

/// An analytic drop region supplied by the host layout
pub trait Region: fmt::Debug + Send + Sync {
    fn contains(&self, p: Vec2) -> bool;

    /// Bounding box of the region in canvas coordinates
    fn bounds(&self) -> Rect;

    /// Direct generator of points inside the region, if the region has one
    fn random_point(&self, _rng: &mut dyn RngCore) -> Option<Vec2> {
        None
    }

    /// Outlines for the zone debug overlay
    fn outlines(&self) -> Vec<Vec<Vec2>> {
        vec![self.bounds().corners().to_vec()]
    }

    /// Reject empty or malformed regions
    fn validate(&self) -> Result<()> {
        let bounds = self.bounds();
        if !bounds.is_finite() || bounds.is_empty() {
            return Err(DropError::InvalidBoundary(format!(
                "region bounds {:?} are empty",
                bounds
            )));
        }
        Ok(())
    }
}

/// Union of rectangular zones (typical output of a layout system)
#[derive(Debug, Clone)]
pub struct ZoneRegion {
    zones: Vec<Rect>,
    bounds: Rect,
    total_area: f32,
}

impl ZoneRegion {
    /// Empty or non-finite zones are dropped
    pub fn new(zones: Vec<Rect>) -> Self {
        let zones: Vec<Rect> = zones
            .into_iter()
            .filter(|z| z.is_finite() && !z.is_empty())
            .collect();
        let bounds = zones
            .iter()
            .copied()
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        let total_area = zones.iter().map(Rect::area).sum();
        Self {
            zones,
            bounds,
            total_area,
        }
    }

    pub fn single(rect: Rect) -> Self {
        Self::new(vec![rect])
    }

    pub fn zones(&self) -> &[Rect] {
        &self.zones
    }
}

impl Region for ZoneRegion {
    fn contains(&self, p: Vec2) -> bool {
        self.zones.iter().any(|z| z.contains(p))
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Area-weighted zone choice, then uniform inside it
    fn random_point(&self, rng: &mut dyn RngCore) -> Option<Vec2> {
        if self.zones.is_empty() || self.total_area <= 0.0 {
            return None;
        }
        let mut pick = rng.random::<f32>() * self.total_area;
        for zone in &self.zones {
            if pick < zone.area() {
                return Some(zone.random_point(rng));
            }
            pick -= zone.area();
        }
        self.zones.last().map(|z| z.random_point(rng))
    }

    fn outlines(&self) -> Vec<Vec<Vec2>> {
        self.zones.iter().map(|z| z.corners().to_vec()).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.zones.is_empty() {
            return Err(DropError::InvalidBoundary("no non-empty zones".into()));
        }
        Ok(())
    }
}

/// Simple polygon region (even-odd rule)
#[derive(Debug, Clone)]
pub struct PolygonRegion {
    points: Vec<Vec2>,
    bounds: Rect,
}

impl PolygonRegion {
    pub fn new(points: Vec<Vec2>) -> Self {
        let bounds = match points.first() {
            Some(&first) => {
                let (min, max) = points
                    .iter()
                    .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
                Rect::from_min_max(min, max)
            }
            None => Rect::default(),
        };
        Self { points, bounds }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

impl Region for PolygonRegion {
    fn contains(&self, p: Vec2) -> bool {
        if self.points.len() < 3 || !self.bounds.contains(p) {
            return false;
        }
        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let (a, b) = (self.points[i], self.points[j]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn random_point(&self, rng: &mut dyn RngCore) -> Option<Vec2> {
        (0..POLYGON_SAMPLE_TRIES)
            .map(|_| self.bounds.random_point(rng))
            .find(|&p| self.contains(p))
    }

    fn outlines(&self) -> Vec<Vec<Vec2>> {
        vec![self.points.clone()]
    }

    fn validate(&self) -> Result<()> {
        if self.points.len() < 3 {
            return Err(DropError::InvalidBoundary(format!(
                "polygon needs 3 points, got {}",
                self.points.len()
            )));
        }
        if self.points.iter().any(|p| !p.is_finite()) || self.bounds.is_empty() {
            return Err(DropError::InvalidBoundary("degenerate polygon".into()));
        }
        Ok(())
    }
}

/// One mask sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    /// Brightness / coverage in [0, 1]
    pub coverage: f32,
    /// Opacity in [0, 1]
    pub alpha: f32,
}

impl Coverage {
    pub fn is_inside(&self) -> bool {
        self.coverage > MASK_COVERAGE_THRESHOLD && self.alpha > MASK_ALPHA_THRESHOLD
    }
}

/// Raster mask access, independent of any drawing backend
pub trait CoverageSampler: fmt::Debug + Send + Sync {
    /// Mask dimensions in pixels
    fn size(&self) -> (u32, u32);
    /// Sample at integer pixel coordinates (always in range)
    fn sample_at(&self, x: u32, y: u32) -> Coverage;
}

/// In-memory RGBA8 mask
#[derive(Debug, Clone)]
pub struct MaskBuffer {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl MaskBuffer {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(DropError::InvalidBoundary(format!(
                "mask {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Build a mask from a per-pixel predicate (opaque white inside, transparent outside)
    pub fn from_fn(width: u32, height: u32, inside: impl Fn(u32, u32) -> bool) -> Result<Self> {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let v = if inside(x, y) { 255 } else { 0 };
                rgba.extend_from_slice(&[v, v, v, v]);
            }
        }
        Self::new(width, height, rgba)
    }
}

impl CoverageSampler for MaskBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn sample_at(&self, x: u32, y: u32) -> Coverage {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.rgba[i..i + 4];
        let luminance = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
        Coverage {
            coverage: luminance / 255.0,
            alpha: px[3] as f32 / 255.0,
        }
    }
}

/// Region backed by a coverage mask stretched over the canvas
#[derive(Debug, Clone)]
pub struct MaskRegion {
    sampler: Arc<dyn CoverageSampler>,
    canvas: Vec2,
    bounds: Rect,
}

impl MaskRegion {
    /// Scans the mask once for the bounding box of inside pixels
    pub fn new(sampler: Arc<dyn CoverageSampler>, canvas: Vec2) -> Result<Self> {
        let (mw, mh) = sampler.size();
        if mw == 0 || mh == 0 || canvas.x <= 0.0 || canvas.y <= 0.0 {
            return Err(DropError::InvalidBoundary(format!(
                "mask {}x{} on canvas {}x{}",
                mw, mh, canvas.x, canvas.y
            )));
        }

        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0u32, 0u32);
        let mut any = false;
        for y in 0..mh {
            for x in 0..mw {
                if sampler.sample_at(x, y).is_inside() {
                    any = true;
                    min = (min.0.min(x), min.1.min(y));
                    max = (max.0.max(x), max.1.max(y));
                }
            }
        }
        if !any {
            return Err(DropError::InvalidBoundary("mask has no inside pixels".into()));
        }

        let scale = Vec2::new(canvas.x / mw as f32, canvas.y / mh as f32);
        let bounds = Rect::from_min_max(
            Vec2::new(min.0 as f32, min.1 as f32) * scale,
            Vec2::new((max.0 + 1) as f32, (max.1 + 1) as f32) * scale,
        );

        Ok(Self {
            sampler,
            canvas,
            bounds,
        })
    }
}

impl Region for MaskRegion {
    /// Nearest-pixel lookup with coordinates clamped to the canvas
    fn contains(&self, p: Vec2) -> bool {
        let (mw, mh) = self.sampler.size();
        let x = (p.x.clamp(0.0, self.canvas.x) / self.canvas.x * mw as f32) as u32;
        let y = (p.y.clamp(0.0, self.canvas.y) / self.canvas.y * mh as f32) as u32;
        self.sampler
            .sample_at(x.min(mw - 1), y.min(mh - 1))
            .is_inside()
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Which source the active boundary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySource {
    Region,
    Mask,
    Fallback,
}

/// The authoritative containment predicate for one canvas size
#[derive(Debug, Clone)]
pub struct Boundary {
    canvas: Vec2,
    source: BoundarySource,
    region: Arc<dyn Region>,
}

impl Boundary {
    /// Central rectangle covering `FALLBACK_REGION_FRACTION` of each axis
    pub fn fallback(canvas: Vec2) -> Self {
        let size = canvas * FALLBACK_REGION_FRACTION;
        let rect = Rect::from_center(canvas / 2.0, size);
        Self {
            canvas,
            source: BoundarySource::Fallback,
            region: Arc::new(ZoneRegion::single(rect)),
        }
    }

    /// Pick the highest-priority usable source
    ///
    /// Rejected sources are reported to `diagnostics` and skipped.
    pub fn resolve(
        canvas: Vec2,
        region: Option<Arc<dyn Region>>,
        mask: Option<Arc<dyn CoverageSampler>>,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Self {
        if let Some(region) = region {
            match check_region(region.as_ref(), canvas) {
                Ok(()) => {
                    return Self {
                        canvas,
                        source: BoundarySource::Region,
                        region,
                    };
                }
                Err(e) => diagnostics.report("boundary.region", &format!("{}, trying mask", e)),
            }
        }

        if let Some(mask) = mask {
            match MaskRegion::new(mask, canvas) {
                Ok(region) => {
                    return Self {
                        canvas,
                        source: BoundarySource::Mask,
                        region: Arc::new(region),
                    };
                }
                Err(e) => diagnostics.report("boundary.mask", &format!("{}, using fallback", e)),
            }
        }

        Self::fallback(canvas)
    }

    /// Containment test; non-finite input is never inside
    pub fn is_inside(&self, x: f32, y: f32) -> bool {
        x.is_finite() && y.is_finite() && self.region.contains(Vec2::new(x, y))
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.is_inside(p.x, p.y)
    }

    pub fn random_point(&self, rng: &mut dyn RngCore) -> Option<Vec2> {
        self.region.random_point(rng)
    }

    pub fn bounds(&self) -> Rect {
        self.region.bounds()
    }

    /// Inside point closest to `p`, taken from a grid over the region bounds
    ///
    /// Prefers grid points whose eight neighbors are inside too, so the result
    /// sits at least one cell away from the edge when the region allows it.
    /// Works for regions with gaps and holes, where the bounds center may be outside.
    pub fn nearest_inside(&self, p: Vec2) -> Option<Vec2> {
        let bounds = self.bounds();
        let cell = bounds.size() / ANCHOR_GRID as f32;
        let inside_around = |c: Vec2| {
            (-1..=1).all(|dy| {
                (-1..=1).all(|dx| self.contains(c + cell * Vec2::new(dx as f32, dy as f32)))
            })
        };

        let mut deep: Option<(f32, Vec2)> = None;
        let mut shallow: Option<(f32, Vec2)> = None;
        for j in 0..ANCHOR_GRID {
            for i in 0..ANCHOR_GRID {
                let c = bounds.min() + cell * Vec2::new(i as f32 + 0.5, j as f32 + 0.5);
                if !self.contains(c) {
                    continue;
                }
                let d = c.distance_squared(p);
                let slot = if inside_around(c) { &mut deep } else { &mut shallow };
                if slot.is_none_or(|(best, _)| d < best) {
                    *slot = Some((d, c));
                }
            }
        }

        deep.or(shallow)
            .map(|(_, c)| c)
            .or_else(|| Some(bounds.center()).filter(|c| self.contains(*c)))
    }

    pub fn outlines(&self) -> Vec<Vec<Vec2>> {
        self.region.outlines()
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn canvas_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.canvas.x, self.canvas.y)
    }

    pub fn on_canvas(&self, p: Vec2) -> bool {
        self.canvas_rect().contains(p)
    }

    pub fn source(&self) -> BoundarySource {
        self.source
    }
}

/// Region must be valid and lie within the canvas
fn check_region(region: &dyn Region, canvas: Vec2) -> Result<()> {
    region.validate()?;
    let canvas_rect = Rect::new(0.0, 0.0, canvas.x, canvas.y).expand(0.5);
    if !canvas_rect.contains_rect(&region.bounds()) {
        return Err(DropError::InvalidBoundary(format!(
            "region bounds {:?} exceed canvas {}x{}",
            region.bounds(),
            canvas.x,
            canvas.y
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::VecSink;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CANVAS: Vec2 = Vec2::new(200.0, 100.0);

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(a.contains(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_fallback_is_central_eighty_percent() {
        let b = Boundary::fallback(CANVAS);
        assert_eq!(b.source(), BoundarySource::Fallback);
        assert_eq!(b.bounds(), Rect::new(20.0, 10.0, 160.0, 80.0));
        assert!(b.is_inside(100.0, 50.0));
        assert!(!b.is_inside(5.0, 50.0));
        assert!(!b.is_inside(f32::NAN, 50.0));
    }

    #[test]
    fn test_region_takes_priority() {
        let mut sink = VecSink::default();
        let zone: Arc<dyn Region> = Arc::new(ZoneRegion::single(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let mask: Arc<dyn CoverageSampler> =
            Arc::new(MaskBuffer::from_fn(4, 4, |_, _| true).expect("mask"));
        let b = Boundary::resolve(CANVAS, Some(zone), Some(mask), &mut sink);
        assert_eq!(b.source(), BoundarySource::Region);
        assert!(b.is_inside(10.0, 10.0));
        assert!(!b.is_inside(150.0, 50.0));
        assert!(sink.reports.is_empty());
    }

    #[test]
    fn test_out_of_canvas_region_falls_back_to_mask() {
        let mut sink = VecSink::default();
        let zone: Arc<dyn Region> =
            Arc::new(ZoneRegion::single(Rect::new(150.0, 0.0, 100.0, 50.0)));
        // Right half of the mask is inside
        let mask: Arc<dyn CoverageSampler> =
            Arc::new(MaskBuffer::from_fn(10, 10, |x, _| x >= 5).expect("mask"));
        let b = Boundary::resolve(CANVAS, Some(zone), Some(mask), &mut sink);
        assert_eq!(b.source(), BoundarySource::Mask);
        assert!(b.is_inside(150.0, 50.0));
        assert!(!b.is_inside(50.0, 50.0));
        assert_eq!(b.bounds(), Rect::new(100.0, 0.0, 100.0, 100.0));
        assert_eq!(sink.reports.len(), 1);
        assert_eq!(sink.reports[0].0, "boundary.region");
    }

    #[test]
    fn test_empty_mask_falls_back() {
        let mut sink = VecSink::default();
        let mask: Arc<dyn CoverageSampler> =
            Arc::new(MaskBuffer::from_fn(8, 8, |_, _| false).expect("mask"));
        let b = Boundary::resolve(CANVAS, None, Some(mask), &mut sink);
        assert_eq!(b.source(), BoundarySource::Fallback);
        assert_eq!(sink.reports[0].0, "boundary.mask");
    }

    #[test]
    fn test_mask_buffer_rejects_bad_length() {
        assert!(matches!(
            MaskBuffer::new(2, 2, vec![0; 3]),
            Err(DropError::InvalidBoundary(_))
        ));
    }

    #[test]
    fn test_mask_clamps_coordinates() {
        let mask: Arc<dyn CoverageSampler> =
            Arc::new(MaskBuffer::from_fn(10, 10, |x, _| x == 9).expect("mask"));
        let region = MaskRegion::new(mask, CANVAS).expect("non-empty mask");
        // Past the right edge clamps onto the last (inside) column
        assert!(region.contains(Vec2::new(500.0, 50.0)));
        assert!(!region.contains(Vec2::new(-5.0, 50.0)));
    }

    #[test]
    fn test_polygon_contains() {
        let tri = PolygonRegion::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(0.0, 100.0),
        ]);
        assert!(tri.validate().is_ok());
        assert!(tri.contains(Vec2::new(10.0, 10.0)));
        assert!(!tri.contains(Vec2::new(90.0, 90.0)));

        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            if let Some(p) = tri.random_point(&mut rng) {
                assert!(tri.contains(p));
            }
        }
        assert!(PolygonRegion::new(vec![Vec2::ZERO, Vec2::ONE]).validate().is_err());
    }

    #[test]
    fn test_zone_random_points_inside() {
        let zones = ZoneRegion::new(vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(50.0, 50.0, 40.0, 20.0),
            Rect::new(0.0, 0.0, 0.0, 5.0),
        ]);
        assert_eq!(zones.zones().len(), 2);
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let p = zones.random_point(&mut rng).expect("zones have area");
            assert!(zones.contains(p));
        }
    }

    #[test]
    fn test_nearest_inside_skips_gaps() {
        let zones: Arc<dyn Region> = Arc::new(ZoneRegion::new(vec![
            Rect::new(0.0, 0.0, 80.0, 100.0),
            Rect::new(120.0, 0.0, 80.0, 100.0),
        ]));
        let b = Boundary::resolve(CANVAS, Some(zones), None, &mut VecSink::default());
        assert!(!b.contains(b.bounds().center()));

        let left = b.nearest_inside(Vec2::new(95.0, 50.0)).expect("anchor");
        assert!(b.contains(left));
        assert!(left.x < 80.0);
        let right = b.nearest_inside(Vec2::new(110.0, 50.0)).expect("anchor");
        assert!(right.x > 120.0);
        // One cell of margin on each side
        assert!(b.contains(right + Vec2::new(b.bounds().w / 32.0, 0.0)));
        assert!(b.contains(right - Vec2::new(b.bounds().w / 32.0, 0.0)));
    }

    #[test]
    fn test_is_inside_is_stable() {
        let b = Boundary::fallback(CANVAS);
        for &(x, y) in &[(20.0, 10.0), (19.99, 50.0), (100.0, 90.0), (180.0, 90.01)] {
            assert_eq!(b.is_inside(x, y), b.is_inside(x, y));
        }
    }
}
