use std::fmt;

use anyhow::{Context, Result};
use feels_core::{Config, Coordinates, FeelingScore, LocationSource, survey::SURVEY_PROMPT};
use inquire::{CustomType, Password, Select, Text};

pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Ask for whatever part of the credentials was not given on the command line.
pub fn credentials(username: Option<String>, confirm_password: bool) -> Result<Credentials> {
    let username = match username {
        Some(name) => name,
        None => Text::new("Username:").prompt().context("Failed to read username")?,
    };

    let mut password = Password::new("Password:");
    if !confirm_password {
        password = password.without_confirmation();
    }
    let password = password.prompt().context("Failed to read password")?;

    Ok(Credentials { username, password })
}

/// `None` when the user backs out with Esc.
pub fn feeling() -> Result<Option<FeelingScore>> {
    Select::new(SURVEY_PROMPT, FeelingScore::all().to_vec())
        .prompt_skippable()
        .context("Failed to read feeling")
}

pub fn city() -> Result<Option<String>> {
    let city = Text::new("City:")
        .with_placeholder("Enter city name")
        .prompt_skippable()
        .context("Failed to read city")?;

    Ok(city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    SearchCity,
    UpdateLocation,
    RefreshNearby,
    Logout,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Login => "Log in",
            Action::Register => "Register",
            Action::SearchCity => "Search a city",
            Action::UpdateLocation => "Update location",
            Action::RefreshNearby => "Refresh nearby feelings",
            Action::Logout => "Log out",
            Action::Quit => "Quit",
        })
    }
}

/// Pick one of `actions`; Esc counts as quitting.
pub fn action(actions: &[Action]) -> Result<Action> {
    let picked = Select::new("What next?", actions.to_vec())
        .prompt_skippable()
        .context("Failed to read action")?;

    Ok(picked.unwrap_or(Action::Quit))
}

/// Interactive edit of the config file values.
pub fn configure(config: &mut Config) -> Result<()> {
    let url = Text::new("Backend URL:")
        .with_default(config.stored_api_url())
        .prompt()
        .context("Failed to read backend URL")?;
    config.set_api_url(url.trim().to_string());

    let source = Select::new("Location source:", LocationSource::ALL.to_vec())
        .prompt()
        .context("Failed to read location source")?;

    match source {
        LocationSource::Fixed => {
            let latitude = CustomType::<f64>::new("Latitude:")
                .with_error_message("Please type a number")
                .prompt()
                .context("Failed to read latitude")?;
            let longitude = CustomType::<f64>::new("Longitude:")
                .with_error_message("Please type a number")
                .prompt()
                .context("Failed to read longitude")?;
            config.set_fixed_location(Coordinates { latitude, longitude });
        }
        LocationSource::Ip => {
            let lookup = Text::new("Lookup URL:")
                .with_default(config.lookup_url())
                .prompt()
                .context("Failed to read lookup URL")?;
            config.location.lookup_url = Some(lookup.trim().to_string());
            config.set_location_source(LocationSource::Ip);
        }
        LocationSource::Denied => config.set_location_source(LocationSource::Denied),
    }

    Ok(())
}
