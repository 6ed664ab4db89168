use fraudshield_common::parse_or;

pub const DEFAULT_PORT: u16 = 3000;

/// Settings resolved once at startup and handed to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertConfig {
    pub port: u16,
}

impl AlertConfig {
    pub fn from_env() -> Self {
        Self::from_port_var(std::env::var("PORT").ok().as_deref())
    }

    /// An unset or unparsable `PORT` falls back to the default.
    fn from_port_var(raw: Option<&str>) -> Self {
        Self {
            port: parse_or(raw, DEFAULT_PORT),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}
