//! Client credentials and the data center they belong to.

use std::str::FromStr;

use crate::error::Error;

/// The vendor region a client talks to. Each region has its own API host and
/// its own OAuth application host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DataCenter {
    #[default]
    Us,
    De,
    Au,
    Ca,
    Sg,
    Uk,
    /// Explicit base URLs, e.g. a local mock server.
    Custom { api_url: String, app_url: String },
}

impl DataCenter {
    pub fn custom(api_url: &str, app_url: &str) -> Self {
        DataCenter::Custom {
            api_url: api_url.trim_end_matches('/').to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
        }
    }

    /// Host suffix of a hosted region.
    fn suffix(&self) -> &'static str {
        match self {
            DataCenter::Us | DataCenter::Custom { .. } => "",
            DataCenter::De => "-de",
            DataCenter::Au => "-au",
            DataCenter::Ca => "-ca",
            DataCenter::Sg => "-sg",
            DataCenter::Uk => "-uk",
        }
    }

    /// Base URL of the REST API, without a trailing slash.
    pub fn api_url(&self) -> String {
        match self {
            DataCenter::Custom { api_url, .. } => api_url.clone(),
            hosted => format!("https://api{}.cronofy.com", hosted.suffix()),
        }
    }

    /// Base URL of the OAuth application host, without a trailing slash.
    pub fn app_url(&self) -> String {
        match self {
            DataCenter::Custom { app_url, .. } => app_url.clone(),
            hosted => format!("https://app{}.cronofy.com", hosted.suffix()),
        }
    }
}

impl FromStr for DataCenter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "us" => Ok(DataCenter::Us),
            "de" => Ok(DataCenter::De),
            "au" => Ok(DataCenter::Au),
            "ca" => Ok(DataCenter::Ca),
            "sg" => Ok(DataCenter::Sg),
            "uk" => Ok(DataCenter::Uk),
            other => Err(Error::Validation(format!("unknown data center `{other}`"))),
        }
    }
}

/// Everything a client needs besides a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub data_center: DataCenter,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            data_center: DataCenter::default(),
        }
    }

    pub fn with_data_center(mut self, data_center: DataCenter) -> Self {
        self.data_center = data_center;
        self
    }
}
