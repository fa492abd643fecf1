pub mod weather_query;

pub use weather_query::{QueryStatus, WeatherQuery, normalize_city, title_case};
