use crate::error::InvalidInput;
use crate::geometry::FULL_CIRCLE;
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgba;

/// Enlargement applied to the selected segment's radius.
pub const DEFAULT_SCALE_FACTOR: f64 = 1.05;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct Label(String);

crate::impl_string_newtype!(Label);

/// One weighted category. `data` is carried through untouched for the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryItem<T> {
    pub data: T,
    pub color: Srgba<f64>,
    pub weight: f64,
    pub label: Label,
}

impl<T> CategoryItem<T> {
    pub fn new(data: T, color: Srgba<f64>, weight: f64, label: impl Into<Label>) -> Self {
        Self {
            data,
            color,
            weight,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment<T> {
    pub item: CategoryItem<T>,
    pub start_angle: f64,
    pub end_angle: f64,
    pub sweep: f64,
    pub index: usize,
}

impl<T> Segment<T> {
    pub fn contains(&self, angle: f64) -> bool {
        (self.start_angle..=self.end_angle).contains(&angle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLayout<T> {
    pub segments: Vec<Segment<T>>,
    pub total_weight: f64,
    pub available_degrees: f64,
}

impl<T> SegmentLayout<T> {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_at(&self, angle: f64) -> Option<&Segment<T>> {
        search(angle, &self.segments)
    }

    pub fn scales(
        &self,
        clicked_index: Option<usize>,
        is_scaled: bool,
        scale_factor: f64,
    ) -> Vec<f64> {
        create_scales(&self.segments, clicked_index, is_scaled, scale_factor)
    }
}

/// Splits the circle into one arc per item, proportional to its weight, with
/// `spacing_degrees` of empty space after every arc.
///
/// Arcs start at 0° and follow item order. The next arc always starts at
/// `end + spacing`, so identical inputs give bit-identical boundaries.
pub fn calculate_segments<T: Clone>(
    items: &[CategoryItem<T>],
    spacing_degrees: f64,
) -> Result<SegmentLayout<T>, InvalidInput> {
    if items.is_empty() {
        return Err(InvalidInput::Empty);
    }
    if !spacing_degrees.is_finite() || spacing_degrees < 0.0 {
        return Err(InvalidInput::InvalidSpacing(spacing_degrees));
    }

    let total_spacing = spacing_degrees * items.len() as f64;
    if total_spacing >= FULL_CIRCLE {
        return Err(InvalidInput::SpacingOverflow {
            spacing: spacing_degrees,
            count: items.len(),
            total: total_spacing,
        });
    }

    if let Some((index, item)) = items
        .iter()
        .enumerate()
        .find(|(_, item)| !(item.weight.is_finite() && item.weight > 0.0))
    {
        return Err(InvalidInput::InvalidWeight {
            index,
            weight: item.weight,
        });
    }

    let total_weight: f64 = items.iter().map(|item| item.weight).sum();
    if !(total_weight.is_finite() && total_weight > 0.0) {
        return Err(InvalidInput::NonPositiveTotal(total_weight));
    }

    let available_degrees = FULL_CIRCLE - total_spacing;
    let mut current_angle = 0.0;

    let segments = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let sweep = item.weight / total_weight * available_degrees;
            let start_angle = current_angle;
            let end_angle = start_angle + sweep;
            current_angle = end_angle + spacing_degrees;
            Segment {
                item: item.clone(),
                start_angle,
                end_angle,
                sweep,
                index,
            }
        })
        .collect();

    log::trace!(
        "laid out {} segments over {available_degrees}° (total weight {total_weight})",
        items.len()
    );

    Ok(SegmentLayout {
        segments,
        total_weight,
        available_degrees,
    })
}

/// Index of the segment whose `[start, end]` contains `angle`.
///
/// Segments are sorted and disjoint, so this is a boundary search rather than
/// a scan. Angles outside `[0, 360)` and angles inside gaps match nothing.
/// When two segments touch (no spacing) the lower index wins.
pub fn find_clicked_segment<T>(angle: f64, segments: &[Segment<T>]) -> Option<usize> {
    search(angle, segments).map(|s| s.index)
}

fn search<T>(angle: f64, segments: &[Segment<T>]) -> Option<&Segment<T>> {
    if !(0.0..FULL_CIRCLE).contains(&angle) {
        return None;
    }

    let candidate = segments.partition_point(|s| s.end_angle < angle);
    segments.get(candidate).filter(|s| s.start_angle <= angle)
}

/// Target radius multiplier for every segment, in segment order.
pub fn create_scales<T>(
    segments: &[Segment<T>],
    clicked_index: Option<usize>,
    is_scaled: bool,
    scale_factor: f64,
) -> Vec<f64> {
    segments
        .iter()
        .map(|segment| {
            if is_scaled && clicked_index == Some(segment.index) {
                scale_factor
            } else {
                1.0
            }
        })
        .collect()
}
