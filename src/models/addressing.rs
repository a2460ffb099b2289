use crate::models::manifest::Manifest;

/// How backend hosts are named in outbound URLs
///
/// In a container network every service is reachable under its own name.
/// Local development runs everything on one host, so `FixedHost` replaces the
/// name while keeping each service's port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Addressing {
    #[default]
    ServiceName,
    FixedHost(String),
}

impl Addressing {
    pub fn host<'a>(&'a self, manifest: &'a Manifest) -> &'a str {
        match self {
            Addressing::ServiceName => &manifest.name,
            Addressing::FixedHost(host) => host,
        }
    }

    pub fn base_url(&self, manifest: &Manifest) -> String {
        manifest.base_url_on(self.host(manifest))
    }

    pub fn health_check_url(&self, manifest: &Manifest) -> String {
        manifest.health_check_url_on(self.host(manifest))
    }
}
