pub use super::weather_queries::Entity as WeatherQueries;
