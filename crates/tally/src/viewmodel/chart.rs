use crate::config::{AnimationConfig, ChartConfig};
use crate::model::{CategoryId, SpendingCategory};
use donut::{
    ArcPrimitive, CategoryItem, ChartDimensions, ChartEvent, ChartState, ChartStore,
    EntranceAnimation, InvalidInput, Point, ScaleAnimator, SegmentLayout, Size,
    calculate_segments, layout_arcs,
};
use std::fmt;
use std::time::Duration;

/// Everything the donut widget needs between frames: the categories, their
/// segment layout, the selection and both animations.
pub struct DonutChartViewModel {
    store: ChartStore<CategoryId>,
    categories: Vec<SpendingCategory>,
    layout: Option<SegmentLayout<CategoryId>>,
    dimensions: ChartDimensions,
    selected_scale: f64,
    animation: AnimationConfig,
    entrance: EntranceAnimation,
    scales: ScaleAnimator,
}

fn entrance_for(animation: &AnimationConfig) -> EntranceAnimation {
    EntranceAnimation::new(
        animation.progress_duration(),
        animation.alpha_duration(),
        animation.ease,
    )
}

impl DonutChartViewModel {
    pub fn new(chart: &ChartConfig, animation: &AnimationConfig) -> Result<Self, InvalidInput> {
        let mut entrance = entrance_for(animation);
        entrance.start();

        Ok(Self {
            store: ChartStore::new(),
            categories: Vec::new(),
            layout: None,
            dimensions: chart.dimensions()?,
            selected_scale: chart.selected_scale,
            animation: animation.clone(),
            entrance,
            scales: ScaleAnimator::new(animation.scale_duration(), animation.ease),
        })
    }

    pub fn set_categories(&mut self, categories: Vec<SpendingCategory>) {
        log::info!("Showing {} spending categories", categories.len());
        self.categories = categories;
        self.relayout();
    }

    pub fn categories(&self) -> &[SpendingCategory] {
        &self.categories
    }

    /// One item per category with a positive amount, weighted by its share of
    /// the total.
    pub fn donut_items(&self) -> Vec<CategoryItem<CategoryId>> {
        let spent = || self.categories.iter().filter(|c| c.total_amount > 0.0);
        let total: f64 = spent().map(|c| c.total_amount).sum();
        if !total.is_finite() {
            return Vec::new();
        }

        spent()
            .map(|c| {
                CategoryItem::new(
                    c.id.clone(),
                    c.color,
                    c.total_amount / total,
                    c.name.as_str(),
                )
            })
            .collect()
    }

    /// Chart settings apply immediately. Animation timings apply to scale
    /// changes from now on and to the entrance on the next mount.
    pub fn apply_settings(
        &mut self,
        chart: &ChartConfig,
        animation: &AnimationConfig,
    ) -> Result<(), InvalidInput> {
        self.dimensions = chart.dimensions()?;
        self.selected_scale = chart.selected_scale;
        self.animation = animation.clone();
        self.scales = ScaleAnimator::new(animation.scale_duration(), animation.ease);
        self.relayout();
        Ok(())
    }

    fn relayout(&mut self) {
        let items = self.donut_items();
        self.layout = if items.is_empty() {
            None
        } else {
            match calculate_segments(&items, self.dimensions.spacing_degrees()) {
                Ok(layout) => Some(layout),
                Err(e) => {
                    log::warn!("Cannot lay out spending categories: {}", e);
                    None
                }
            }
        };
        self.retarget_scales();
    }

    fn retarget_scales(&mut self) {
        let state = self.store.state();
        let targets = self
            .layout
            .as_ref()
            .map(|l| l.scales(state.clicked_index, state.is_scaled, self.selected_scale))
            .unwrap_or_default();
        self.scales.retarget(&targets);
    }

    pub fn layout(&self) -> Option<&SegmentLayout<CategoryId>> {
        self.layout.as_ref()
    }

    pub fn has_data(&self) -> bool {
        self.layout.is_some()
    }

    pub fn state(&self) -> ChartState {
        self.store.state()
    }

    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&ChartEvent<CategoryId>, &ChartState) + 'static,
    ) {
        self.store.subscribe(subscriber);
    }

    pub fn on_event(&mut self, event: ChartEvent<CategoryId>) -> ChartState {
        let state = self.store.dispatch(event);
        self.retarget_scales();
        state
    }

    /// Handles a click at `position` on a canvas of `canvas` size.
    pub fn tap(&mut self, position: Point, canvas: Size) -> Option<usize> {
        let layout = self.layout.as_ref()?;
        let index = self.store.tap(position, canvas.center(), layout)?;
        self.retarget_scales();
        Some(index)
    }

    /// Advances both animations by one frame.
    pub fn tick(&mut self, dt: Duration) {
        if self.store.state().should_animate() && self.entrance.tick(dt).completed {
            self.store.dispatch(ChartEvent::AnimationCompleted);
        }
        self.scales.tick(dt);
    }

    pub fn is_animating(&self) -> bool {
        (self.state().should_animate() && self.entrance.is_running()) || !self.scales.is_settled()
    }

    /// Arcs for the current frame. Once the entrance has completed the chart
    /// stays fully drawn.
    pub fn arcs(&self, canvas: Size) -> Result<Vec<ArcPrimitive>, InvalidInput> {
        let Some(layout) = &self.layout else {
            return Ok(Vec::new());
        };

        let (progress, alpha) = if self.state().should_animate() {
            (self.entrance.progress(), self.entrance.alpha())
        } else {
            (1.0, 1.0)
        };

        layout_arcs(
            layout,
            self.scales.values(),
            progress,
            alpha,
            canvas,
            &self.dimensions,
        )
    }

    pub fn selected_category(&self) -> Option<&SpendingCategory> {
        let index = self.state().selected()?;
        let layout = self.layout.as_ref()?;
        let id = &layout.segments.iter().find(|s| s.index == index)?.item.data;
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Drops selection and animation progress, e.g. when the chart leaves the
    /// screen. Nothing is drawn until the next `mount`.
    pub fn clear(&mut self) {
        self.store.teardown();
        self.entrance = entrance_for(&self.animation);
        self.retarget_scales();
    }

    pub fn mount(&mut self) {
        self.store.mount();
        if !self.entrance.is_running() {
            self.entrance.start();
        }
    }
}

impl fmt::Debug for DonutChartViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DonutChartViewModel")
            .field("store", &self.store)
            .field("categories", &self.categories.len())
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donut::AnimationPhase;
    use palette::Srgba;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);
    const CANVAS: Size = Size {
        width: 400.0,
        height: 400.0,
    };

    fn category(id: &str, amount: f64) -> SpendingCategory {
        SpendingCategory {
            id: CategoryId::from(id),
            name: id.to_uppercase(),
            total_amount: amount,
            color: Srgba::new(0.2, 0.4, 0.6, 1.0),
        }
    }

    fn view_model() -> DonutChartViewModel {
        let chart = ChartConfig {
            spacing_degrees: 0.0,
            ..ChartConfig::default()
        };
        let animation = AnimationConfig {
            progress_ms: 160,
            alpha_ms: 320,
            scale_ms: 32,
            ease: donut::Ease::Linear,
        };
        let mut vm = DonutChartViewModel::new(&chart, &animation).unwrap();
        vm.set_categories(vec![category("rent", 100.0), category("food", 300.0)]);
        vm
    }

    fn run_entrance(vm: &mut DonutChartViewModel) {
        for _ in 0..100 {
            vm.tick(FRAME);
        }
    }

    #[test]
    fn test_items_are_shares_of_total() {
        let vm = view_model();
        let items = vm.donut_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].weight, 0.25);
        assert_eq!(items[1].weight, 0.75);
        assert_eq!(items[1].label.as_str(), "FOOD");
        assert_eq!(items[1].data, CategoryId::from("food"));
    }

    #[test]
    fn test_empty_categories_are_left_out() {
        let mut vm = view_model();
        vm.set_categories(vec![
            category("rent", 100.0),
            category("gifts", 0.0),
            category("food", 300.0),
        ]);
        let layout = vm.layout().unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.segments[1].item.data, CategoryId::from("food"));

        assert_eq!(vm.tap(Point::new(50.0, 200.0), CANVAS), Some(1));
        assert_eq!(vm.selected_category().map(|c| c.name.as_str()), Some("FOOD"));
    }

    #[test]
    fn test_no_layout_without_amounts() {
        let mut vm = view_model();
        vm.set_categories(vec![category("zero", 0.0)]);
        assert!(!vm.has_data());
        assert!(vm.arcs(CANVAS).unwrap().is_empty());
        assert_eq!(vm.tap(Point::new(0.0, 200.0), CANVAS), None);

        vm.set_categories(Vec::new());
        assert!(vm.donut_items().is_empty());
    }

    #[test]
    fn test_tap_selects_and_scales() {
        let mut vm = view_model();

        // left of centre is 180°, inside "food" ([90°, 360°])
        assert_eq!(vm.tap(Point::new(50.0, 200.0), CANVAS), Some(1));
        assert_eq!(vm.selected_category().map(|c| c.name.as_str()), Some("FOOD"));
        assert!(vm.is_animating());

        run_entrance(&mut vm);
        let radii: Vec<f64> = vm.arcs(CANVAS).unwrap().iter().map(|a| a.radius).collect();
        assert_eq!(radii, vec![120.0, 120.0 * 1.05]);

        // straight down is the shared 90° boundary; the lower index wins
        assert_eq!(vm.tap(Point::new(200.0, 350.0), CANVAS), Some(0));
        assert_eq!(vm.selected_category().map(|c| c.name.as_str()), Some("RENT"));

        assert_eq!(vm.tap(Point::new(200.0, 350.0), CANVAS), Some(0));
        assert_eq!(vm.selected_category(), None);
    }

    #[test]
    fn test_entrance_completes_once() {
        let mut vm = view_model();
        let completions = Rc::new(Cell::new(0));
        {
            let completions = completions.clone();
            vm.subscribe(move |event, _| {
                if matches!(event, ChartEvent::AnimationCompleted) {
                    completions.set(completions.get() + 1);
                }
            });
        }

        vm.tick(FRAME);
        let early = vm.arcs(CANVAS).unwrap();
        assert!(early[0].sweep_angle < 90.0);
        assert!(early[0].alpha < 1.0);

        run_entrance(&mut vm);
        assert_eq!(completions.get(), 1);
        assert_eq!(vm.state().animation_phase, AnimationPhase::Completed);
        assert!(!vm.is_animating());

        let settled = vm.arcs(CANVAS).unwrap();
        assert_eq!(settled[0].sweep_angle, 90.0);
        assert_eq!(settled[1].alpha, 1.0);
    }

    #[test]
    fn test_clear_hides_chart_until_mounted() {
        let mut vm = view_model();
        vm.tap(Point::new(50.0, 200.0), CANVAS);
        run_entrance(&mut vm);

        vm.clear();
        assert_eq!(vm.state(), ChartState::default());
        vm.tick(FRAME);
        assert!(vm.arcs(CANVAS).unwrap().is_empty());

        vm.mount();
        assert_eq!(vm.state(), ChartState::initial());
        vm.tick(FRAME);
        assert_eq!(vm.arcs(CANVAS).unwrap().len(), 2);
    }

    #[test]
    fn test_settings_change_spacing() {
        let mut vm = view_model();
        let chart = ChartConfig {
            spacing_degrees: 10.0,
            ..ChartConfig::default()
        };
        vm.apply_settings(&chart, &AnimationConfig::default()).unwrap();

        let layout = vm.layout().unwrap();
        assert_eq!(layout.available_degrees, 340.0);
        assert_eq!(layout.segments[1].start_angle, 95.0);

        let bad = ChartConfig {
            stroke_width: -1.0,
            ..ChartConfig::default()
        };
        assert!(vm.apply_settings(&bad, &AnimationConfig::default()).is_err());
    }
}
