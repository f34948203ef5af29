use crate::config;
use crate::events::AppEvent;
use crate::gui::chart;
use crate::gui::theme::{self, ThemeColors};
use crate::model::{SpendingCategory, Transaction};
use crate::viewmodel::{DonutChartViewModel, TransactionsEvent, TransactionsState};
use donut::{ChartEvent, Point, Size};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub struct AppModel {
    pub chart: Rc<RefCell<DonutChartViewModel>>,
    pub transactions: TransactionsState,
    pub commands: async_channel::Sender<TransactionsEvent>,
    pub drawing_area: gtk::DrawingArea,
    pub transaction_list: gtk::ListBox,
}

#[derive(Debug)]
pub enum AppMsg {
    Tap(Point),
    TransactionActivated(i32),
    LoadMore,
    Retry,
    ConfigReload,
    CategoriesLoaded(Vec<SpendingCategory>),
    TransactionsChanged(TransactionsState),
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
            AppEvent::CategoriesLoaded(c) => AppMsg::CategoriesLoaded(c),
            AppEvent::TransactionsChanged(s) => AppMsg::TransactionsChanged(s),
        }
    }
}

fn transaction_row(transaction: &Transaction) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    row.set_margin_top(6);
    row.set_margin_bottom(6);
    row.set_margin_start(8);
    row.set_margin_end(8);

    let description = gtk::Label::new(Some(&transaction.description));
    description.set_hexpand(true);
    description.set_xalign(0.0);

    let amount = gtk::Label::new(Some(&format!("{:+.2}", transaction.amount)));
    amount.add_css_class("tally-amount");
    amount.add_css_class(if transaction.amount < 0.0 {
        "spending"
    } else {
        "income"
    });

    row.append(&description);
    row.append(&amount);
    row
}

impl AppModel {
    fn send_command(&self, event: TransactionsEvent) {
        if let Err(e) = self.commands.try_send(event) {
            log::warn!("Transactions worker unavailable: {}", e);
        }
    }

    fn canvas(&self) -> Size {
        Size::new(
            self.drawing_area.width() as f64,
            self.drawing_area.height() as f64,
        )
    }

    fn rebuild_list(&self) {
        while let Some(child) = self.transaction_list.first_child() {
            self.transaction_list.remove(&child);
        }
        for transaction in &self.transactions.transactions {
            self.transaction_list.append(&transaction_row(transaction));
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (
        DonutChartViewModel,
        async_channel::Receiver<AppEvent>,
        async_channel::Sender<TransactionsEvent>,
    );
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Tally"),
            set_default_width: 420,
            set_default_height: 760,

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 12,
                set_margin_all: 16,

                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_content_height: 360,
                    set_hexpand: true,
                    add_css_class: "tally-chart",

                    add_controller = gtk::GestureClick {
                        connect_pressed[sender] => move |_, _, x, y| {
                            sender.input(AppMsg::Tap(Point::new(x, y)));
                        }
                    }
                },

                gtk::Label {
                    set_label: "Recent transactions",
                    set_xalign: 0.0,
                    add_css_class: "heading",
                },

                gtk::Box {
                    set_spacing: 8,
                    #[watch]
                    set_visible: model.transactions.error.is_some(),

                    gtk::Label {
                        set_hexpand: true,
                        set_wrap: true,
                        set_xalign: 0.0,
                        add_css_class: "tally-error",
                        #[watch]
                        set_label: model.transactions.error.as_deref().unwrap_or_default(),
                    },

                    gtk::Button {
                        set_label: "Retry",
                        connect_clicked => AppMsg::Retry,
                    },
                },

                gtk::Label {
                    set_label: "Loading…",
                    #[watch]
                    set_visible: model.transactions.is_loading
                        || model.transactions.is_loading_more,
                },

                gtk::ScrolledWindow {
                    set_vexpand: true,
                    set_hscrollbar_policy: gtk::PolicyType::Never,

                    #[name = "transaction_list"]
                    gtk::ListBox {
                        set_selection_mode: gtk::SelectionMode::None,
                        set_activate_on_single_click: true,
                        connect_row_activated[sender] => move |_, row| {
                            sender.input(AppMsg::TransactionActivated(row.index()));
                        },
                    },
                },

                gtk::Button {
                    set_label: "Load more",
                    #[watch]
                    set_sensitive: model.transactions.has_more
                        && !model.transactions.is_loading_more,
                    connect_clicked => AppMsg::LoadMore,
                },
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (mut chart_vm, rx, commands) = init;

        theme::load_css();

        chart_vm.subscribe(|event, state| {
            if let ChartEvent::SegmentClicked { item, .. } = event {
                log::info!(
                    "Segment '{}' clicked, selected: {:?}",
                    item.label,
                    state.selected()
                );
            }
        });

        let model = AppModel {
            chart: Rc::new(RefCell::new(chart_vm)),
            transactions: TransactionsState::default(),
            commands,
            drawing_area: gtk::DrawingArea::default(),
            transaction_list: gtk::ListBox::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();
        model.transaction_list = widgets.transaction_list.clone();

        let chart_draw = model.chart.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                let canvas = Size::new(width as f64, height as f64);
                if let Err(e) = chart::draw(cr, &chart_draw.borrow(), canvas, &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let chart_tick = model.chart.clone();
        let last_frame = Cell::new(None::<i64>);
        widgets.drawing_area.add_tick_callback(
            move |drawing_area: &gtk::DrawingArea, clock: &gdk4::FrameClock| {
                let now = clock.frame_time();
                let dt = last_frame
                    .replace(Some(now))
                    .map(|prev| Duration::from_micros((now - prev).max(0) as u64))
                    .unwrap_or_default();

                let mut chart = chart_tick.borrow_mut();
                if chart.is_animating() {
                    chart.tick(dt);
                    drawing_area.queue_draw();
                }
                glib::ControlFlow::Continue
            },
        );

        let chart_map = model.chart.clone();
        widgets
            .drawing_area
            .connect_map(move |_| chart_map.borrow_mut().mount());
        let chart_unmap = model.chart.clone();
        widgets
            .drawing_area
            .connect_unmap(move |_| chart_unmap.borrow_mut().clear());

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Tap(point) => {
                let canvas = self.canvas();
                if self.chart.borrow_mut().tap(point, canvas).is_some() {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::TransactionActivated(row) => {
                let transaction = usize::try_from(row)
                    .ok()
                    .and_then(|i| self.transactions.transactions.get(i))
                    .cloned();
                if let Some(transaction) = transaction {
                    self.send_command(TransactionsEvent::Clicked(transaction));
                }
            }
            AppMsg::LoadMore => self.send_command(TransactionsEvent::LoadMore),
            AppMsg::Retry => self.send_command(TransactionsEvent::Load),
            AppMsg::CategoriesLoaded(categories) => {
                self.chart.borrow_mut().set_categories(categories);
                self.drawing_area.queue_draw();
            }
            AppMsg::TransactionsChanged(state) => {
                let list_changed = state.transactions != self.transactions.transactions;
                self.transactions = state;
                if list_changed {
                    self.rebuild_list();
                }
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    let mut chart = self.chart.borrow_mut();
                    if let Err(e) =
                        chart.apply_settings(&new_config.chart, &new_config.animation)
                    {
                        log::error!("Failed to apply chart settings: {}", e);
                    }
                    let categories = new_config.spending_categories();
                    if !categories.is_empty() {
                        chart.set_categories(categories);
                    }
                    drop(chart);

                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}
