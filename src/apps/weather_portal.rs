// Weather portal: jumps to a trusted forecast site instead of asking the AI

use super::action::{ActionInput, ActionOutcome, AppAction};
use super::fragment::{region, Fragment, RESULT_REGION};
use super::AppDescriptor;
use crate::error::{LauncherError, Result};
use crate::markdown::escape_html;
use crate::notice::Notice;
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;

pub const APP_ID: &str = "weather_portal";
pub const ACTION: &str = "search_weather";
pub const CITY_FIELD: &str = "city";

pub const OKINAWA_FORECAST_URL: &str = "https://tenki.jp/forecast/10/";
const SEARCH_URL: &str = "https://www.google.com/search";
const DEFAULT_CITY: &str = "Kadena";

/// Search URL for a city's tenki.jp page
pub fn search_url(city: &str) -> Result<Url> {
    Url::parse_with_params(SEARCH_URL, &[("q", format!("{} tenki.jp", city))])
        .map_err(|e| LauncherError::ValidationError(format!("Could not build search URL: {}", e)))
}

struct SearchWeather;

#[async_trait]
impl AppAction for SearchWeather {
    fn validate(&self, input: &ActionInput) -> Result<()> {
        input.require(CITY_FIELD, "Please enter a place name!").map(|_| ())
    }

    async fn run(&self, input: ActionInput) -> Result<ActionOutcome> {
        let city = input.require(CITY_FIELD, "Please enter a place name!")?;
        let url = search_url(city)?;

        let link = format!(
            "<p class=\"weather-link\"><a href=\"{url}\" target=\"_blank\" rel=\"noopener\">\
             Open the tenki.jp results for {city}</a></p>",
            url = escape_html(url.as_str()),
            city = escape_html(city),
        );

        Ok(ActionOutcome::new(link)
            .with_notice(Notice::info(format!("Searched tenki.jp for {}!", city)))
            .with_open_url(url.to_string()))
    }
}

fn render() -> Fragment {
    Fragment::new(format!(
        "<section class=\"app bg-blue-100\" data-app=\"{id}\">\
         <h1>✅ Weather Portal</h1>\
         <h2>Instant access to reliable forecasts!</h2>\
         <form method=\"post\" action=\"/apps/{id}/actions\">\
         <input type=\"text\" name=\"{field}\" placeholder=\"e.g. Naha, Tokyo, Sapporo\" value=\"{city}\">\
         <button type=\"submit\" name=\"action\" value=\"{action}\">Check the local forecast!</button>\
         <p class=\"hint\">Combines the place name with tenki.jp and opens the search results.</p>\
         </form>\
         {result}\
         <hr>\
         <h3>Heading straight to Okinawa?</h3>\
         <a class=\"button\" href=\"{okinawa}\" target=\"_blank\" rel=\"noopener\">Okinawa forecast on tenki.jp</a>\
         </section>",
        id = APP_ID,
        field = CITY_FIELD,
        city = DEFAULT_CITY,
        action = ACTION,
        result = region(RESULT_REGION, ""),
        okinawa = OKINAWA_FORECAST_URL,
    ))
}

pub fn build() -> AppDescriptor {
    AppDescriptor::new(APP_ID, "Weather Portal ✅", render)
        .with_icon("🗾")
        .with_description("One tap to a trusted weather site. Okinawa gets the VIP treatment!")
        .with_color("bg-blue-100")
        .with_on_launch(|| tracing::debug!("Weather portal launched"))
        .with_action(ACTION, Arc::new(SearchWeather))
}
