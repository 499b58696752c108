//! Maps the weather variables offered by the dashboard to their reanalysis column
//! codes and display units.

use std::fmt;
use std::str::FromStr;

const KELVIN_OFFSET: f64 = 273.15;

/// A weather variable from the weather feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeatherVariable {
    /// Air temperature 2m above the surface (`t2m`), stored in Kelvin, shown in °C.
    #[default]
    Temperature,
    /// Dew point 2m above the surface (`d2m`), Kelvin.
    DewPoint,
    /// East-west wind component at 10m (`u10`).
    ZonalWind,
    /// North-south wind component at 10m (`v10`).
    MeridionalWind,
    /// Surface pressure (`sp`).
    SurfacePressure,
}

impl WeatherVariable {
    pub const ALL: [WeatherVariable; 5] = [
        WeatherVariable::Temperature,
        WeatherVariable::DewPoint,
        WeatherVariable::ZonalWind,
        WeatherVariable::MeridionalWind,
        WeatherVariable::SurfacePressure,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            WeatherVariable::Temperature => "t2m",
            WeatherVariable::DewPoint => "d2m",
            WeatherVariable::ZonalWind => "u10",
            WeatherVariable::MeridionalWind => "v10",
            WeatherVariable::SurfacePressure => "sp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherVariable::Temperature => "Temperature (2m above surface)",
            WeatherVariable::DewPoint => "Dew Point (2m above surface)",
            WeatherVariable::ZonalWind => "Zonal Wind (u10, east-west, 10m)",
            WeatherVariable::MeridionalWind => "Meridional Wind (v10, north-south, 10m)",
            WeatherVariable::SurfacePressure => "Surface Pressure (bar)",
        }
    }

    /// Unit of the value after [`WeatherVariable::convert`] has been applied.
    pub fn unit(&self) -> &'static str {
        match self {
            WeatherVariable::Temperature => "°C",
            WeatherVariable::DewPoint => "K",
            WeatherVariable::ZonalWind | WeatherVariable::MeridionalWind => "m/s",
            WeatherVariable::SurfacePressure => "bar",
        }
    }

    /// Converts a raw feed value into the display unit.
    pub fn convert(&self, raw: f64) -> f64 {
        match self {
            WeatherVariable::Temperature => raw - KELVIN_OFFSET,
            _ => raw,
        }
    }
}

impl fmt::Display for WeatherVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

impl FromStr for WeatherVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t2m" | "temperature" | "temp" => Ok(WeatherVariable::Temperature),
            "d2m" | "dewpoint" | "dew-point" | "dew_point" => Ok(WeatherVariable::DewPoint),
            "u10" | "zonal-wind" | "zonal_wind" => Ok(WeatherVariable::ZonalWind),
            "v10" | "meridional-wind" | "meridional_wind" => Ok(WeatherVariable::MeridionalWind),
            "sp" | "pressure" | "surface-pressure" | "surface_pressure" => {
                Ok(WeatherVariable::SurfacePressure)
            }
            other => Err(format!("unknown weather variable '{other}'")),
        }
    }
}
