use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use feels_core::{
    ApiClient, Config, Coordinates, Dashboard, FileCredentialStore, Screen, Session,
    SessionController,
    geolocation::{fixed::FixedLocator, locator_from_config, report_position},
};

use crate::prompt::{self, Action};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "feels", version, about = "Weather feels dashboard")]
pub struct Cli {
    /// Backend base URL. Overrides the config file and FEELS_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the backend URL and where your position comes from.
    Configure,

    /// Create an account and sign in.
    Register {
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Sign in to an existing account.
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Forget the stored credential.
    Logout,

    /// Say how the weather feels, then show weather and nearby feelings.
    Survey,

    /// Show weather for a city, or for your last reported position.
    Weather {
        /// City name; if absent, uses your position (or the initial weather when signed out).
        city: Option<String>,
    },

    /// Show how the weather feels to people near you.
    Nearby,

    /// Capture your position and report it.
    Locate {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Walk through login, survey and dashboard interactively.
    Run,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        if let Command::Configure = self.command {
            prompt::configure(&mut config)?;
            config.save()?;
            println!("Saved configuration to {}", Config::config_file_path()?.display());
            return Ok(());
        }

        let api_url = self.api_url.clone().unwrap_or_else(|| config.api_url());
        let mut dash = open_dashboard(&config, api_url)?;

        match self.command {
            // Saved and returned above.
            Command::Configure => {}
            Command::Register { username } => {
                let creds = prompt::credentials(username, true)?;
                dash.register(&creds.username, &creds.password).await?;
                println!("Registered and signed in as {}.", creds.username);
                print_signed_in(&dash);
            }
            Command::Login { username } => {
                let creds = prompt::credentials(username, false)?;
                dash.login(&creds.username, &creds.password).await?;
                println!("Signed in as {}.", creds.username);
                print_signed_in(&dash);
            }
            Command::Logout => {
                dash.logout()?;
                println!("Logged out.");
            }
            Command::Survey => {
                require_session(&dash)?;
                if take_survey(&mut dash).await? {
                    print!("{}", dash.render());
                }
            }
            Command::Weather { city } => {
                let view = dash.weather();
                let _ = match city {
                    Some(city) => dash.search_city(&city).await,
                    None if dash.controller().is_authenticated() => {
                        view.fetch_by_coordinates(dash.api()).await
                    }
                    None => view.fetch_initial(dash.api()).await,
                };
                print!("{}", view.render());
            }
            Command::Nearby => {
                require_session(&dash)?;
                let _ = dash.nearby().fetch(dash.api()).await;
                print!("{}", dash.nearby().render());
            }
            Command::Locate { lat, lon } => {
                require_session(&dash)?;
                let coords = match (lat, lon) {
                    (Some(latitude), Some(longitude)) => {
                        let locator = FixedLocator::new(Coordinates { latitude, longitude });
                        report_position(&locator, dash.api()).await?
                    }
                    _ => dash.update_location().await?,
                };
                println!("Location updated: {coords}");
            }
            Command::Run => interactive(&mut dash).await?,
        }

        Ok(())
    }
}

fn open_dashboard(config: &Config, api_url: String) -> anyhow::Result<Dashboard> {
    let store = FileCredentialStore::default_location()?;
    let api = ApiClient::new(api_url, Session::default());
    let controller = SessionController::new(api, Arc::new(store))
        .context("Failed to restore session")?;
    let locator = locator_from_config(config)?;

    Ok(Dashboard::new(controller, locator))
}

fn require_session(dash: &Dashboard) -> anyhow::Result<()> {
    if !dash.controller().is_authenticated() {
        bail!("Not signed in.\nHint: run `feels login` or `feels register` first.");
    }
    Ok(())
}

fn print_signed_in(dash: &Dashboard) {
    if let Some(message) = dash.location_error() {
        println!("{message}");
    }
    print!("{}", dash.weather().render());
}

/// Ask until a feeling is accepted. Returns false if the user backs out.
async fn take_survey(dash: &mut Dashboard) -> anyhow::Result<bool> {
    loop {
        let Some(score) = prompt::feeling()? else {
            return Ok(false);
        };
        dash.select_feeling(score)?;

        match dash.submit_survey().await {
            Ok(_) => return Ok(true),
            Err(err) => {
                tracing::debug!(error = ?err, "survey submission failed");
                println!("{err}");
            }
        }
    }
}

async fn interactive(dash: &mut Dashboard) -> anyhow::Result<()> {
    dash.resume().await;

    loop {
        match dash.screen() {
            Screen::SignedOut => {
                print!("{}", dash.render());
                let action = prompt::action(&[Action::Login, Action::Register, Action::Quit])?;
                let outcome = match action {
                    Action::Login => {
                        let creds = prompt::credentials(None, false)?;
                        dash.login(&creds.username, &creds.password).await
                    }
                    Action::Register => {
                        let creds = prompt::credentials(None, true)?;
                        dash.register(&creds.username, &creds.password).await
                    }
                    _ => return Ok(()),
                };
                if let Err(err) = outcome {
                    println!("{err}");
                }
            }
            Screen::Survey => {
                print_signed_in(dash);
                println!();
                if !take_survey(dash).await? {
                    return Ok(());
                }
            }
            Screen::Dashboard => {
                print!("{}", dash.render());
                let action = prompt::action(&[
                    Action::SearchCity,
                    Action::UpdateLocation,
                    Action::RefreshNearby,
                    Action::Logout,
                    Action::Quit,
                ])?;

                match action {
                    Action::SearchCity => {
                        if let Some(city) = prompt::city()? {
                            let _ = dash.search_city(&city).await;
                        }
                    }
                    Action::UpdateLocation => {
                        if dash.update_location().await.is_ok() {
                            let _ = dash.weather().fetch_by_coordinates(dash.api()).await;
                        }
                    }
                    Action::RefreshNearby => {
                        let _ = dash.nearby().fetch(dash.api()).await;
                    }
                    Action::Logout => dash.logout()?,
                    _ => return Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn locate_accepts_negative_coordinates() {
        let cli = Cli::parse_from(["feels", "locate", "--lat", "-33.86", "--lon", "151.2"]);
        match cli.command {
            Command::Locate { lat, lon } => {
                assert_eq!(lat, Some(-33.86));
                assert_eq!(lon, Some(151.2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn locate_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["feels", "locate", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn api_url_is_global() {
        let cli = Cli::parse_from(["feels", "weather", "Paris", "--api-url", "http://x:1"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
    }
}
