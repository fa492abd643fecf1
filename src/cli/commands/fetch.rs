use crate::api::WeatherQueryDto;
use crate::config::Config;
use crate::services::WeatherError;
use crate::state::SharedState;

pub async fn cmd_fetch(config: Config, city: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    match state.resolver.resolve(city).await {
        Ok(query) => {
            let dto = WeatherQueryDto::from(query);
            println!("{}", serde_json::to_string_pretty(&dto)?);
            Ok(())
        }
        Err(WeatherError::CityNotFound(_)) => {
            println!("No weather data found for '{}'", city.trim());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
