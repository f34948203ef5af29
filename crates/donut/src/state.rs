use crate::geometry::{Point, click_angle};
use crate::segment::{CategoryItem, SegmentLayout};
use std::fmt;
use strum::Display as StrumDisplay;

/// Lifecycle of the chart's entrance animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay)]
pub enum AnimationPhase {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartState {
    pub clicked_index: Option<usize>,
    pub is_scaled: bool,
    pub animation_phase: AnimationPhase,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent<T> {
    SegmentClicked { index: usize, item: CategoryItem<T> },
    AnimationCompleted,
}

impl ChartState {
    /// State of a freshly mounted chart: entrance animation running, nothing selected.
    pub fn initial() -> Self {
        Self {
            animation_phase: AnimationPhase::InProgress,
            ..Self::default()
        }
    }

    pub fn should_animate(&self) -> bool {
        self.animation_phase != AnimationPhase::Completed
    }

    /// The segment currently drawn enlarged, if any.
    pub fn selected(&self) -> Option<usize> {
        self.clicked_index.filter(|_| self.is_scaled)
    }

    /// Clicking the selected segment again clears the selection; clicking any
    /// other segment moves it there. Completion only touches the phase.
    pub fn reduce<T>(&self, event: &ChartEvent<T>) -> Self {
        match event {
            ChartEvent::SegmentClicked { index, .. } if self.clicked_index == Some(*index) => {
                Self {
                    clicked_index: None,
                    is_scaled: false,
                    ..*self
                }
            }
            ChartEvent::SegmentClicked { index, .. } => Self {
                clicked_index: Some(*index),
                is_scaled: true,
                ..*self
            },
            ChartEvent::AnimationCompleted => Self {
                animation_phase: AnimationPhase::Completed,
                ..*self
            },
        }
    }
}

type Subscriber<T> = Box<dyn FnMut(&ChartEvent<T>, &ChartState)>;

/// Holds the chart state for one chart instance and notifies subscribers after
/// every dispatched event.
///
/// Lives on the UI thread; subscribers are not `Send`, so neither is the store.
pub struct ChartStore<T> {
    state: ChartState,
    subscribers: Vec<Subscriber<T>>,
}

impl<T> ChartStore<T> {
    pub fn new() -> Self {
        Self {
            state: ChartState::initial(),
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ChartEvent<T>, &ChartState) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn dispatch(&mut self, event: ChartEvent<T>) -> ChartState {
        let next = self.state.reduce(&event);
        if next != self.state {
            log::debug!(
                "chart state: selected {:?} -> {:?}, phase {} -> {}",
                self.state.selected(),
                next.selected(),
                self.state.animation_phase,
                next.animation_phase
            );
        }
        self.state = next;

        for subscriber in &mut self.subscribers {
            subscriber(&event, &self.state);
        }
        next
    }

    /// Resolves a tap into at most one `SegmentClicked`. Taps in gaps do nothing.
    pub fn tap(&mut self, tap: Point, center: Point, layout: &SegmentLayout<T>) -> Option<usize>
    where
        T: Clone,
    {
        let segment = layout.segment_at(click_angle(tap, center))?;
        let index = segment.index;
        let item = segment.item.clone();
        self.dispatch(ChartEvent::SegmentClicked { index, item });
        Some(index)
    }

    /// Starts the entrance animation again after a teardown.
    pub fn mount(&mut self) {
        if self.state.animation_phase == AnimationPhase::NotStarted {
            self.state.animation_phase = AnimationPhase::InProgress;
        }
    }

    pub fn teardown(&mut self) {
        self.state = ChartState::default();
    }
}

impl<T> Default for ChartStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChartStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::calculate_segments;
    use palette::Srgba;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn item(data: &'static str) -> CategoryItem<&'static str> {
        CategoryItem::new(data, Srgba::new(0.1, 0.2, 0.3, 1.0), 1.0, data)
    }

    fn click(index: usize) -> ChartEvent<&'static str> {
        ChartEvent::SegmentClicked {
            index,
            item: item("any"),
        }
    }

    #[test]
    fn test_initial_state_starts_entrance() {
        let state = ChartState::initial();
        assert_eq!(state.animation_phase, AnimationPhase::InProgress);
        assert_eq!(state.clicked_index, None);
        assert!(!state.is_scaled);
        assert!(state.should_animate());
    }

    #[test]
    fn test_click_toggles_selection() {
        let start = ChartState::initial();
        let selected = start.reduce(&click(2));
        assert_eq!(selected.clicked_index, Some(2));
        assert!(selected.is_scaled);

        let cleared = selected.reduce(&click(2));
        assert_eq!(cleared, start);

        let other = cleared.reduce(&click(1));
        assert_eq!(other.clicked_index, Some(1));
        assert!(other.is_scaled);
        assert_eq!(other.selected(), Some(1));
    }

    #[test]
    fn test_click_moves_selection_between_segments() {
        let state = ChartState::initial().reduce(&click(0)).reduce(&click(3));
        assert_eq!(state.clicked_index, Some(3));
        assert!(state.is_scaled);
        assert_eq!(state.animation_phase, AnimationPhase::InProgress);
    }

    #[test]
    fn test_animation_completed_is_idempotent() {
        let once = ChartState::initial()
            .reduce(&click(1))
            .reduce(&ChartEvent::<&'static str>::AnimationCompleted);
        let twice = once.reduce(&ChartEvent::<&'static str>::AnimationCompleted);

        assert_eq!(once.animation_phase, AnimationPhase::Completed);
        assert_eq!(once, twice);
        assert_eq!(twice.clicked_index, Some(1));
        assert!(!twice.should_animate());
    }

    #[test]
    fn test_store_notifies_subscribers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = ChartStore::new();
        {
            let seen = seen.clone();
            store.subscribe(move |event, state| {
                let label = match event {
                    ChartEvent::SegmentClicked { item, .. } => item.label.to_string(),
                    ChartEvent::AnimationCompleted => "completed".to_string(),
                };
                seen.borrow_mut().push((label, state.clicked_index));
            });
        }

        store.dispatch(ChartEvent::SegmentClicked {
            index: 4,
            item: item("rent"),
        });
        store.dispatch(ChartEvent::AnimationCompleted);

        assert_eq!(
            *seen.borrow(),
            vec![
                ("rent".to_string(), Some(4)),
                ("completed".to_string(), Some(4))
            ]
        );
    }

    #[test]
    fn test_store_tap_dispatches_once_and_skips_gaps() {
        let items = vec![item("a"), item("b"), item("c"), item("d")];
        let layout = calculate_segments(&items, 10.0).unwrap();
        let center = Point::new(100.0, 100.0);
        let count = Rc::new(RefCell::new(0));

        let mut store = ChartStore::new();
        {
            let count = count.clone();
            store.subscribe(move |_, _| *count.borrow_mut() += 1);
        }

        // straight down is 90°, inside segment 1 ([90°, 170°])
        let hit = store.tap(Point::new(100.0, 180.0), center, &layout);
        assert_eq!(hit, Some(1));
        assert_eq!(store.state().selected(), Some(1));

        // 85° lies in the gap after segment 0
        let angle = 85f64.to_radians();
        let gap_tap = Point::new(100.0 + 50.0 * angle.cos(), 100.0 + 50.0 * angle.sin());
        assert_eq!(store.tap(gap_tap, center, &layout), None);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(store.state().selected(), Some(1));
    }

    #[test]
    fn test_tap_reports_segment_index_not_position() {
        let items = vec![item("a"), item("b"), item("c")];
        let mut layout = calculate_segments(&items, 0.0).unwrap();
        for segment in &mut layout.segments {
            segment.index += 10;
        }

        let center = Point::new(0.0, 0.0);
        let mut store = ChartStore::new();
        // 180° is inside the second segment ([120°, 240°])
        assert_eq!(store.tap(Point::new(-10.0, 0.0), center, &layout), Some(11));
        assert_eq!(store.state().selected(), Some(11));
        assert_eq!(layout.segment_at(180.0).map(|s| s.item.data), Some("b"));
    }

    #[test]
    fn test_teardown_and_remount() {
        let mut store: ChartStore<&'static str> = ChartStore::default();
        store.dispatch(click(2));
        store.dispatch(ChartEvent::AnimationCompleted);

        store.teardown();
        assert_eq!(store.state(), ChartState::default());
        assert_eq!(store.state().animation_phase, AnimationPhase::NotStarted);

        store.mount();
        assert_eq!(store.state(), ChartState::initial());
    }
}
