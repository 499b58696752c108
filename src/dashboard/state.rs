use crate::types::granularity::Granularity;
use crate::types::pollutant::Pollutant;
use crate::types::scope::FilterScope;
use crate::types::weather_variable::WeatherVariable;
use bon::Builder;

/// The selections that drive every dashboard view.
///
/// ```
/// use aircast::{DashboardState, FilterScope, Granularity};
///
/// let state = DashboardState::builder()
///     .scope(FilterScope::PastMonth)
///     .granularity(Granularity::Daily)
///     .station("Anand Vihar")
///     .build();
/// assert_eq!(state.station.as_deref(), Some("Anand Vihar"));
/// assert_eq!(DashboardState::default().scope, FilterScope::PastWeek);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct DashboardState {
    #[builder(default)]
    pub scope: FilterScope,
    #[builder(default)]
    pub granularity: Granularity,
    #[builder(default)]
    pub pollutant: Pollutant,
    #[builder(default)]
    pub weather_variable: WeatherVariable,
    /// Station for the forecast views. The first forecast station is used when unset.
    #[builder(into)]
    pub station: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::builder().build()
    }
}
