use clap::Parser;
use explorer::InteractionController;
use explorer::config::{self, Args, Command};
use explorer::render::{ExtentRow, LogRenderer, PanelView, render_panel};
use explorer::replay;
use scene::framing::FramingPolicy;
use scene::style::PolygonStyle;
use streaming::orchestrator::{CountryDataset, DataOrchestrator};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let features = config::load_features(&args.countries).await?;
    let framing = FramingPolicy::new(config::load_overrides(args.overrides.as_deref()).await?);

    match &args.command {
        Command::Extents => {
            let rows: Vec<ExtentRow<'_>> = features
                .iter()
                .map(|feature| ExtentRow::new(feature, &framing))
                .collect();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!("{row}");
                }
            }
        }
        Command::Inspect { id } => {
            let feature = config::find_country(&features, id)
                .cloned()
                .ok_or_else(|| format!("no country with id {id} in {}", args.countries.display()))?;
            let mut controller = controller(&args, framing).await?;
            if let Some(load) = controller.click(feature.clone()) {
                let outcome = load.await;
                info!(?outcome, "fetch finished");
            }
            print_panel(&args, feature.name(), &controller.dataset())?;
        }
        Command::Replay { script } => {
            let text = tokio::fs::read_to_string(script).await?;
            let steps = replay::parse_script(&text)?;
            let mut controller = controller(&args, framing).await?;
            let report = replay::run(&mut controller, &features, steps).await?;

            for (at, hovered) in &report.hover_changes {
                println!("{at:>6}ms hover {}", hovered.as_deref().unwrap_or("-"));
            }
            for outcome in &report.outcomes {
                println!("fetch {outcome:?}");
            }
            if let Some(pose) = controller.renderer().pose() {
                println!(
                    "camera ({:.2}, {:.2}, alt {:.2}), auto-rotate {}",
                    pose.lat,
                    pose.lng,
                    pose.altitude,
                    controller.renderer().auto_rotate()
                );
            }
            if let Some(selected) = controller.selection().selected.clone() {
                print_panel(&args, selected.name(), &controller.dataset())?;
            }
        }
    }
    Ok(())
}

fn print_panel(args: &Args, name: &str, dataset: &CountryDataset) -> serde_json::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&PanelView::new(name, dataset))?);
    } else {
        print!("{}", render_panel(name, dataset));
    }
    Ok(())
}

async fn controller(
    args: &Args,
    framing: FramingPolicy,
) -> Result<InteractionController<LogRenderer>, config::ConfigError> {
    let source = config::build_source(args).await?;
    Ok(InteractionController::new(
        framing,
        DataOrchestrator::new(source),
        PolygonStyle::new(args.color_mode.into()),
        LogRenderer::new(),
    ))
}
