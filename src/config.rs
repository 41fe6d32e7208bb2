use anyhow::Context;
use serde::Deserialize;

/// A backend instance seeded into the registry at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct InstanceConfig {
    pub ip: String,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// The proxy's own port. A host-header port only overrides the routed
    /// port when it differs from this one.
    #[serde(default)]
    pub port_number: String,

    /// Path templates the router matches against, in order.
    #[serde(default = "default_routes")]
    pub routes: Vec<String>,

    /// Instances registered before the listener starts accepting.
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_routes() -> Vec<String> {
    vec![
        "/sessions/{session}/nodes/{node}/ports/{port}".to_string(),
        "/sessions/{session}/aliases/{alias}/nodes/{node}/ports/{port}".to_string(),
        "/nodes/{node}/ports/{port}".to_string(),
        "/nodes/{node}".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port_number: String::new(),
            routes: default_routes(),
            instances: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                serde_yaml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path))?
            }
            Err(_) => Config::default(),
        };

        if let Ok(listen) = std::env::var("LISTEN") {
            cfg.listen_addr = listen;
        }

        // Own port falls out of the listen address unless set explicitly.
        if cfg.port_number.is_empty() {
            cfg.port_number = cfg
                .listen_addr
                .rsplit_once(':')
                .map(|(_, port)| port.to_string())
                .unwrap_or_default();
        }

        Ok(cfg)
    }
}
