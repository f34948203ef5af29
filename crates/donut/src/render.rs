use crate::error::InvalidInput;
use crate::geometry::{Point, Size};
use crate::segment::SegmentLayout;
use palette::Srgba;

pub const DEFAULT_STROKE_WIDTH: f64 = 80.0;
pub const DEFAULT_SPACING_DEGREES: f64 = 2.0;

/// Ring thickness and the angular gap between segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    stroke_width: f64,
    spacing_degrees: f64,
}

impl ChartDimensions {
    pub fn new(stroke_width: f64, spacing_degrees: f64) -> Result<Self, InvalidInput> {
        if !(stroke_width.is_finite() && stroke_width > 0.0) {
            return Err(InvalidInput::NonPositiveDimension {
                name: "stroke width",
                value: stroke_width,
            });
        }
        if !spacing_degrees.is_finite() || spacing_degrees < 0.0 {
            return Err(InvalidInput::InvalidSpacing(spacing_degrees));
        }
        Ok(Self {
            stroke_width,
            spacing_degrees,
        })
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn spacing_degrees(&self) -> f64 {
        self.spacing_degrees
    }
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            spacing_degrees: DEFAULT_SPACING_DEGREES,
        }
    }
}

/// A stroked arc ready for the renderer. Angles are degrees, clockwise from +x.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcPrimitive {
    pub index: usize,
    pub color: Srgba<f64>,
    pub alpha: f64,
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub stroke_width: f64,
}

impl ArcPrimitive {
    pub fn start_radians(&self) -> f64 {
        self.start_angle.to_radians()
    }

    pub fn end_radians(&self) -> f64 {
        (self.start_angle + self.sweep_angle).to_radians()
    }
}

/// Turns a segment layout plus the current animation values into arcs.
///
/// The ring is centred on the canvas, inset by half a stroke, and shrinks
/// further if needed so the most enlarged segment still fits inside the
/// shorter side. `progress` grows every sweep from its start angle; `scales`
/// enlarge the radius per segment and default to 1.0 when missing.
pub fn layout_arcs<T>(
    layout: &SegmentLayout<T>,
    scales: &[f64],
    progress: f64,
    alpha: f64,
    canvas: Size,
    dimensions: &ChartDimensions,
) -> Result<Vec<ArcPrimitive>, InvalidInput> {
    if !(canvas.width.is_finite() && canvas.width > 0.0) {
        return Err(InvalidInput::NonPositiveDimension {
            name: "canvas width",
            value: canvas.width,
        });
    }
    if !(canvas.height.is_finite() && canvas.height > 0.0) {
        return Err(InvalidInput::NonPositiveDimension {
            name: "canvas height",
            value: canvas.height,
        });
    }

    let stroke_width = dimensions.stroke_width();
    let half_side = canvas.min_side() / 2.0;
    let max_scale = scales.iter().copied().fold(1.0, f64::max);
    let radius = (half_side - stroke_width).min((half_side - stroke_width / 2.0) / max_scale);
    if radius <= 0.0 {
        return Err(InvalidInput::NonPositiveDimension {
            name: "ring radius",
            value: radius,
        });
    }

    if progress <= 0.0 || alpha <= 0.0 {
        return Ok(Vec::new());
    }

    let center = canvas.center();
    let progress = progress.min(1.0);
    let alpha = alpha.min(1.0);

    Ok(layout
        .segments
        .iter()
        .filter_map(|segment| {
            let scale = scales.get(segment.index).copied().unwrap_or(1.0);
            (scale > 0.0).then(|| ArcPrimitive {
                index: segment.index,
                color: segment.item.color,
                alpha,
                center,
                radius: radius * scale,
                start_angle: segment.start_angle,
                sweep_angle: segment.sweep * progress,
                stroke_width,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{CategoryItem, calculate_segments};

    fn layout() -> SegmentLayout<u8> {
        let items: Vec<_> = [1.0, 2.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, &w)| CategoryItem::new(i as u8, Srgba::new(1.0, 0.0, 0.0, 1.0), w, "x"))
            .collect();
        calculate_segments(&items, 0.0).unwrap()
    }

    #[test]
    fn test_dimensions_validation() {
        assert!(ChartDimensions::new(20.0, 2.0).is_ok());
        assert!(matches!(
            ChartDimensions::new(0.0, 2.0),
            Err(InvalidInput::NonPositiveDimension { .. })
        ));
        assert!(matches!(
            ChartDimensions::new(-5.0, 2.0),
            Err(InvalidInput::NonPositiveDimension { .. })
        ));
        assert!(matches!(
            ChartDimensions::new(10.0, -1.0),
            Err(InvalidInput::InvalidSpacing(_))
        ));
    }

    #[test]
    fn test_arcs_follow_progress_and_scale() {
        let dims = ChartDimensions::new(20.0, 0.0).unwrap();
        let arcs = layout_arcs(
            &layout(),
            &[1.0, 1.1, 1.0],
            0.5,
            0.8,
            Size::new(300.0, 220.0),
            &dims,
        )
        .unwrap();

        assert_eq!(arcs.len(), 3);
        assert_eq!(arcs[0].center, Point::new(150.0, 110.0));
        assert!((arcs[0].radius - 90.0).abs() < 1e-9);
        assert!((arcs[1].radius - 99.0).abs() < 1e-9);
        assert!((arcs[1].start_angle - 90.0).abs() < 1e-9);
        assert!((arcs[1].sweep_angle - 90.0).abs() < 1e-9);
        assert_eq!(arcs[2].alpha, 0.8);
        assert!((arcs[2].end_radians() - (270.0 + 45.0f64).to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_nothing_drawn_before_entrance_starts() {
        let dims = ChartDimensions::default();
        let canvas = Size::new(400.0, 400.0);
        assert!(layout_arcs(&layout(), &[], 0.0, 1.0, canvas, &dims).unwrap().is_empty());
        assert!(layout_arcs(&layout(), &[], 1.0, 0.0, canvas, &dims).unwrap().is_empty());
    }

    #[test]
    fn test_missing_and_zero_scales() {
        let dims = ChartDimensions::default();
        let canvas = Size::new(400.0, 400.0);
        let arcs = layout_arcs(&layout(), &[0.0], 1.0, 1.0, canvas, &dims).unwrap();
        assert_eq!(arcs.iter().map(|a| a.index).collect::<Vec<_>>(), vec![1, 2]);
        assert!((arcs[0].radius - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_enlarged_segment_stays_on_canvas() {
        let dims = ChartDimensions::default();
        for (canvas, factor) in [
            (Size::new(400.0, 400.0), crate::segment::DEFAULT_SCALE_FACTOR),
            (Size::new(640.0, 360.0), 1.05),
            (Size::new(400.0, 300.0), 1.8),
        ] {
            let scales = [1.0, factor, 1.0];
            let arcs = layout_arcs(&layout(), &scales, 1.0, 1.0, canvas, &dims).unwrap();
            for arc in &arcs {
                assert!(
                    arc.radius + arc.stroke_width / 2.0 <= canvas.min_side() / 2.0 + 1e-9,
                    "segment {} reaches {} on a {:?} canvas",
                    arc.index,
                    arc.radius + arc.stroke_width / 2.0,
                    canvas
                );
            }
            assert!(arcs[1].radius > arcs[0].radius);
        }
    }

    #[test]
    fn test_canvas_too_small() {
        let dims = ChartDimensions::default();
        assert!(layout_arcs(&layout(), &[], 1.0, 1.0, Size::new(60.0, 400.0), &dims).is_err());
        assert!(layout_arcs(&layout(), &[], 1.0, 1.0, Size::new(0.0, 400.0), &dims).is_err());
    }
}
