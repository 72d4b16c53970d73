use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    // Server-held credential for the distance-matrix API, never sent to clients
    pub maps_api_key: String,

    #[serde(default = "default_distance_api_url")]
    pub distance_api_url: String,

    #[serde(default = "default_distance_units")]
    pub distance_units: String,

    // Only browser requests from this origin may call the service
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    // When set, the aggregator goes through a relay instead of calling upstream directly
    #[serde(default)]
    pub relay_url: Option<String>,

    #[serde(default = "default_round_trip_factor")]
    pub round_trip_factor: f64,

    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every commute total silently zero
    pub fn validate(&self) -> Result<(), envy::Error> {
        if !self.round_trip_factor.is_finite() || self.round_trip_factor < 0.0 {
            return Err(envy::Error::Custom(format!(
                "ROUND_TRIP_FACTOR must be a finite, non-negative number, got {}",
                self.round_trip_factor
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            maps_api_key: String::new(), // Must be provided via environment
            distance_api_url: default_distance_api_url(),
            distance_units: default_distance_units(),
            allowed_origin: default_allowed_origin(),
            relay_url: None,
            round_trip_factor: default_round_trip_factor(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_distance_api_url() -> String {
    "https://maps.googleapis.com/maps/api/distancematrix/json".to_string()
}

fn default_distance_units() -> String {
    "imperial".to_string()
}

fn default_allowed_origin() -> String {
    "https://ihatedriving.web.app".to_string()
}

fn default_round_trip_factor() -> f64 {
    2.0
}

fn default_max_concurrent_requests() -> usize {
    16
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_request_timeout_secs() -> u64 {
    15
}
