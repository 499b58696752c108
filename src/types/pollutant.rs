//! Pollutants shown on the dashboard and the column each data source uses for them.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pollutant {
    /// Nitrogen dioxide.
    #[default]
    No2,
    /// Ozone.
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 2] = [Pollutant::No2, Pollutant::O3];

    /// Display label, e.g. `NO2`.
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::No2 => "NO2",
            Pollutant::O3 => "O3",
        }
    }

    /// Column holding the latest reading in the station table.
    pub fn map_column(&self) -> &'static str {
        match self {
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
        }
    }

    /// Column holding the historic reading in the trend table.
    pub fn trend_column(&self) -> &'static str {
        match self {
            Pollutant::No2 => "no2",
            Pollutant::O3 => "ozone",
        }
    }

    /// Column holding the predicted value in the forecast table.
    pub fn forecast_column(&self) -> &'static str {
        match self {
            Pollutant::No2 => "pred_no2",
            Pollutant::O3 => "pred_o3",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Pollutant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no2" => Ok(Pollutant::No2),
            "o3" | "ozone" => Ok(Pollutant::O3),
            other => Err(format!("unknown pollutant '{other}', expected NO2 or O3")),
        }
    }
}
