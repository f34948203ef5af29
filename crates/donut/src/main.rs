use clap::{Parser, Subcommand};
use donut::{
    CategoryItem, DEFAULT_SCALE_FACTOR, Point, SegmentLayout, calculate_segments, click_angle,
};
use palette::Srgba;

#[derive(Parser, Debug)]
#[command(name = "donut", version, about, long_about = None)]
struct Cli {
    /// Angular gap between segments, in degrees
    #[arg(short, long, default_value_t = 0.0, global = true)]
    spacing: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the arc of every category
    Segments {
        /// Categories as `label=weight` or a bare weight
        #[arg(required = true, value_parser = parse_entry)]
        entries: Vec<(String, f64)>,
    },
    /// Resolve a tap position to the category under it
    Hit {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        /// Chart center as `x,y`
        #[arg(long, value_parser = parse_point)]
        center: Point,
        #[arg(required = true, value_parser = parse_entry)]
        entries: Vec<(String, f64)>,
    },
    /// Print the radius multiplier of every segment for a selection
    Scales {
        #[arg(long)]
        selected: Option<usize>,
        #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
        factor: f64,
        #[arg(required = true, value_parser = parse_entry)]
        entries: Vec<(String, f64)>,
    },
}

fn parse_entry(raw: &str) -> Result<(String, f64), String> {
    let (label, weight) = raw.split_once('=').unwrap_or(("", raw));
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight in '{raw}': {e}"))?;
    Ok((label.trim().to_string(), weight))
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{raw}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate in '{raw}': {e}"))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}

fn build_layout(entries: Vec<(String, f64)>, spacing: f64) -> anyhow::Result<SegmentLayout<()>> {
    let items: Vec<_> = entries
        .into_iter()
        .enumerate()
        .map(|(i, (label, weight))| {
            let label = if label.is_empty() { format!("#{i}") } else { label };
            CategoryItem::new((), Srgba::new(0.0, 0.0, 0.0, 1.0), weight, label)
        })
        .collect();
    Ok(calculate_segments(&items, spacing)?)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Segments { entries } => {
            let layout = build_layout(entries, cli.spacing)?;
            println!(
                "total weight {} over {:.3}°",
                layout.total_weight, layout.available_degrees
            );
            for s in &layout.segments {
                println!(
                    "{:>3} {:<16} {:>9.3}° {:>9.3}° {:>9.3}°",
                    s.index, s.item.label, s.start_angle, s.end_angle, s.sweep
                );
            }
        }
        Commands::Hit {
            x,
            y,
            center,
            entries,
        } => {
            let layout = build_layout(entries, cli.spacing)?;
            let angle = click_angle(Point::new(x, y), center);
            match layout.segment_at(angle) {
                Some(s) => println!("{:.3}° -> {} ({})", angle, s.index, s.item.label),
                None => anyhow::bail!("{:.3}° falls between segments", angle),
            }
        }
        Commands::Scales {
            selected,
            factor,
            entries,
        } => {
            let layout = build_layout(entries, cli.spacing)?;
            if let Some(i) = selected
                && i >= layout.len()
            {
                anyhow::bail!("segment {} does not exist, chart has {}", i, layout.len());
            }
            for (segment, scale) in layout
                .segments
                .iter()
                .zip(layout.scales(selected, selected.is_some(), factor))
            {
                println!("{:>3} {:<16} {:.3}", segment.index, segment.item.label, scale);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        assert_eq!(parse_entry("food=12.5"), Ok(("food".to_string(), 12.5)));
        assert_eq!(parse_entry("3"), Ok((String::new(), 3.0)));
        assert!(parse_entry("rent=lots").is_err());
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10, -4"), Ok(Point::new(10.0, -4.0)));
        assert!(parse_point("10").is_err());
    }
}
