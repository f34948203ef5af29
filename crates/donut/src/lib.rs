//! Geometry and interaction model for a donut chart.
//!
//! A renderer feeds in weighted categories, tap positions and frame times; it
//! gets back arc segments, the selected segment and animation values to draw
//! with. Nothing here depends on a UI toolkit.

pub mod anim;
pub mod error;
pub mod geometry;
pub mod macros;
pub mod render;
pub mod segment;
pub mod state;

pub use anim::{Ease, EntranceAnimation, EntranceFrame, ScaleAnimator, Tween};
pub use error::InvalidInput;
pub use geometry::{Point, Size, click_angle};
pub use render::{ArcPrimitive, ChartDimensions, layout_arcs};
pub use segment::{
    CategoryItem, DEFAULT_SCALE_FACTOR, Label, Segment, SegmentLayout, calculate_segments,
    create_scales, find_clicked_segment,
};
pub use state::{AnimationPhase, ChartEvent, ChartState, ChartStore};
