use parley_settings::ServerSettings;

/// Bind address and response policy for the HTTP boundary.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    /// `0` picks a free port.
    pub port: u16,
    /// Include the underlying error text in 500 bodies.
    pub expose_internal_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            expose_internal_errors: true,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            expose_internal_errors: settings.expose_internal_errors,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
