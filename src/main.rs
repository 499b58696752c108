use aircast::{
    Config, Dashboard, DashboardState, DataSource, FilterScope, Granularity, Pollutant,
    SourceLoader, WeatherVariable,
};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "aircast", version, about = "Air-quality prediction service and dashboard data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the prediction ingestion API
    Serve,
    /// Print one dashboard view as a table
    Dashboard {
        #[command(subcommand)]
        view: View,
        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(Debug, Subcommand)]
enum View {
    /// City-wide pollutant trend
    Pollution,
    /// Latest reading of every station
    Map,
    /// Weather variable trend
    Weather,
    /// Predicted NO2 and O3 for one station
    Forecast {
        /// Print one row per (timestamp, pollutant) instead of one column per pollutant
        #[arg(long)]
        long: bool,
    },
    /// Stations with forecasts
    Stations,
}

#[derive(Debug, Args)]
struct Selection {
    /// past-day, past-week, past-month, past-year or all-time
    #[arg(long, global = true, default_value_t = FilterScope::PastWeek)]
    scope: FilterScope,
    /// hourly, daily, weekly or monthly
    #[arg(long, global = true, default_value_t = Granularity::Hourly)]
    granularity: Granularity,
    /// NO2 or O3
    #[arg(long, global = true, default_value_t = Pollutant::No2)]
    pollutant: Pollutant,
    /// t2m, d2m, u10, v10 or sp
    #[arg(long, global = true, default_value_t = WeatherVariable::Temperature)]
    variable: WeatherVariable,
    /// Forecast station, defaults to the first one in the file
    #[arg(long, global = true)]
    station: Option<String>,
}

impl Selection {
    fn into_state(self) -> DashboardState {
        DashboardState::builder()
            .scope(self.scope)
            .granularity(self.granularity)
            .pollutant(self.pollutant)
            .weather_variable(self.variable)
            .maybe_station(self.station)
            .build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Serve => Ok(aircast::serve(&config).await?),
        Command::Dashboard { view, selection } => {
            dashboard(config, view, selection.into_state()).await
        }
    }
}

async fn dashboard(config: Config, view: View, state: DashboardState) -> anyhow::Result<()> {
    let source = match view {
        View::Pollution => DataSource::Trends,
        View::Map => DataSource::Stations,
        View::Weather => DataSource::Weather,
        View::Forecast { .. } | View::Stations => DataSource::Forecast,
    };
    let loader = SourceLoader::load(config.sources.only(&[source])).await?;
    let dashboard = Dashboard::new(loader);

    match view {
        View::Pollution => {
            println!("{} trend ({}, {})", state.pollutant, state.scope, state.granularity);
            println!("{}", dashboard.pollution_trend(&state)?);
        }
        View::Map => {
            for point in dashboard.station_map(&state)? {
                let [r, g, b] = point.color_class.rgb();
                println!(
                    "{}\t{}\t{}\t#{r:02x}{g:02x}{b:02x}\t{}",
                    point.timestamp,
                    point.color_class,
                    point
                        .lat
                        .zip(point.lon)
                        .map(|(lat, lon)| format!("{lat:.4},{lon:.4}"))
                        .unwrap_or_else(|| "-".to_string()),
                    point.tooltip(state.pollutant.label()).replace('\n', " | ")
                );
            }
        }
        View::Weather => {
            let variable = state.weather_variable;
            println!("{} ({})", variable.label(), variable.unit());
            println!("{}", dashboard.weather_trend(&state)?);
        }
        View::Forecast { long: false } => {
            println!("{}", dashboard.forecast_trend(&state)?);
        }
        View::Forecast { long: true } => {
            for point in dashboard.forecast_long(&state)? {
                let value = point
                    .value
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "null".to_string());
                println!("{}\t{}\t{}", point.timestamp, point.series, value);
            }
        }
        View::Stations => {
            for station in dashboard.forecast_stations()? {
                println!("{station}");
            }
        }
    }
    Ok(())
}
