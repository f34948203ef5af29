use gdk4::Display;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub label: Srgba<f64>,
    pub caption: Srgba<f64>,
    pub empty_ring: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            label: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.9, 0.9, 0.9, 1.0),
                None,
            ),
            caption: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.7, 0.7, 0.7, 0.7),
                Some(0.6),
            ),
            empty_ring: Self::lookup_color(
                context,
                "borders",
                Srgba::new(0.5, 0.5, 0.5, 0.25),
                Some(0.25),
            ),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.tally-chart {
    background: none;
    background-color: transparent;
}
.tally-amount.spending {
    color: @error_color;
}
.tally-amount.income {
    color: @success_color;
}
.tally-error {
    color: @error_color;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
