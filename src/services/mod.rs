pub mod cache;
pub use cache::{WeatherCache, cache_key};

pub mod resolver;
pub use resolver::WeatherResolver;

pub mod weather_service;
pub use weather_service::{WeatherError, WeatherService};

pub mod weather_service_impl;
pub use weather_service_impl::SeaOrmWeatherService;

pub mod worker;
pub use worker::{ChannelSubmitter, QuerySubmitter, ScheduledQueryWorker};
