pub mod granularity;
pub mod pollutant;
pub mod prediction;
pub mod scope;
pub mod weather_variable;
