use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Text};
use mapcast_core::{
    Config, Coordinate, MapSurface, MarkerStyle, Outcome, Session, SessionError, Snapshot,
};
use std::sync::Arc;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "mapcast",
    version,
    about = "Pick a point, set it as your location, get its forecast"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive session: pick points, confirm them, fetch forecasts.
    Session,

    /// Pick, confirm and fetch in one go.
    Forecast {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Edit and save the configuration file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Session) {
            Command::Session => {
                let session = session_from_disk_config()?;
                interactive(&session).await
            }
            Command::Forecast {
                latitude,
                longitude,
            } => {
                let session = session_from_disk_config()?;
                one_shot(&session, latitude, longitude).await
            }
            Command::Configure => configure(),
        }
    }
}

/// Map stand-in: there is no map on a terminal, so marker commands are logged.
#[derive(Debug, Default)]
struct TerminalMap;

impl MapSurface for TerminalMap {
    fn place_marker(&self, at: Coordinate, style: MarkerStyle) {
        tracing::info!(%at, ?style, "marker placed");
    }

    fn remove_marker(&self) {
        tracing::debug!("marker removed");
    }
}

fn session_from_disk_config() -> anyhow::Result<Session> {
    let config = Config::load()?;
    Ok(Session::from_config(&config)?.with_map(Arc::new(TerminalMap)))
}

async fn one_shot(session: &Session, latitude: f64, longitude: f64) -> anyhow::Result<()> {
    session.select_point(latitude, longitude)?;
    session.confirm_location().await?;
    session.fetch_forecast().await?;
    println!("{}", render(&session.snapshot()));
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Input {
    Pick(f64, f64),
    Confirm,
    Fetch,
    Show,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  pick <lat> <lon>   tap the map at a point (also: <lat>,<lon>)
  set                set the picked point as your location
  fetch              get the forecast for the set location
  show               print the current state
  help               this text
  quit               leave";

fn parse_input(line: &str) -> anyhow::Result<Input> {
    let line = line.trim();
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(h, r)| (h, r.trim()));

    match head.to_lowercase().as_str() {
        "set" | "confirm" => Ok(Input::Confirm),
        "fetch" | "forecast" => Ok(Input::Fetch),
        "show" | "status" | "" => Ok(Input::Show),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" | "q" => Ok(Input::Quit),
        "pick" => parse_point(rest),
        _ => parse_point(line).map_err(|_| anyhow!("Unknown command '{head}'. Type 'help'.")),
    }
}

fn parse_point(s: &str) -> anyhow::Result<Input> {
    let mut parts = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());

    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(anyhow!("Expected a point as '<lat> <lon>', got '{s}'"));
    };

    let lat: f64 = lat.parse().with_context(|| format!("Invalid latitude '{lat}'"))?;
    let lon: f64 = lon.parse().with_context(|| format!("Invalid longitude '{lon}'"))?;
    Ok(Input::Pick(lat, lon))
}

async fn interactive(session: &Session) -> anyhow::Result<()> {
    println!("{}\n", session.snapshot().status.message());

    loop {
        let prompt = Text::new("mapcast>").with_help_message("type 'help' for commands");
        let line = match prompt.prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(e) => {
                println!("{e:#}");
                continue;
            }
        };

        let result = match input {
            Input::Pick(lat, lon) => session.select_point(lat, lon).map(|_| Outcome::Applied),
            Input::Confirm => session.confirm_location().await,
            Input::Fetch => session.fetch_forecast().await,
            Input::Show => Ok(Outcome::Applied),
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Quit => break,
        };

        if let Some(line) = notice(&result) {
            println!("{line}");
        }
        println!("{}\n", render(&session.snapshot()));
    }

    Ok(())
}

/// One-line note printed above the state, if the action deserves one.
fn notice(result: &Result<Outcome, SessionError>) -> Option<String> {
    match result {
        Ok(Outcome::Applied | Outcome::Superseded) => None,
        Ok(Outcome::Throttled) => {
            Some("(ignored: please wait a moment before retrying)".to_string())
        }
        Err(e) => Some(e.to_string()),
    }
}

fn render(snapshot: &Snapshot) -> String {
    let mut out = Vec::new();

    out.push(format!(
        "Coordinates: {}",
        snapshot
            .selection
            .coordinate()
            .map_or_else(|| "-".to_string(), |c| c.to_string())
    ));
    out.push(format!(
        "Address: {}",
        snapshot.selection.address().unwrap_or("-")
    ));
    let label = if snapshot.status.is_failure() { "Error" } else { "Status" };
    out.push(format!("{label}: {}", snapshot.status.message()));

    if !snapshot.forecast.is_empty() {
        out.push(String::new());
        out.extend(snapshot.forecast.iter().cloned());
    }
    if let Some(at) = &snapshot.fetched_at {
        out.push(format!("Fetched at: {at}"));
    }

    out.join("\n")
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let timezone = Text::new("Timezone for forecast days:")
        .with_default(cfg.timezone.name())
        .prompt()?;
    cfg.timezone = timezone
        .parse::<chrono_tz::Tz>()
        .map_err(|e| anyhow!("Unknown timezone '{timezone}': {e}"))?;

    cfg.forecast_days = CustomType::<u8>::new("Forecast days (1-16):")
        .with_default(cfg.forecast_days)
        .prompt()?;

    cfg.geocoder_url = Text::new("Reverse geocoder URL:")
        .with_default(&cfg.geocoder_url)
        .prompt()?;
    cfg.forecast_url = Text::new("Forecast API URL:")
        .with_default(&cfg.forecast_url)
        .prompt()?;

    cfg.validate()?;
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
