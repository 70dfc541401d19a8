//! URLs of the adoption platform's REST API, built from a resolved endpoint.

use std::fmt::Display;

use pawprobe_common::network::endpoint::{Endpoint, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Shelters,
    Animals,
    AdoptionRequests,
    Login,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Users,
        Resource::Shelters,
        Resource::Animals,
        Resource::AdoptionRequests,
        Resource::Login,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Shelters => "shelters",
            Resource::Animals => "animals",
            Resource::AdoptionRequests => "adoption-requests",
            Resource::Login => "auth/login",
        }
    }
}

/// Base URL every API call of a process is issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    base_url: String,
}

impl ApiBase {
    pub fn new(endpoint: &Endpoint) -> Self {
        Self {
            base_url: endpoint.base_url(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection(&self, resource: Resource) -> String {
        format!("{}{}", self.base_url, resource.path())
    }

    pub fn item(&self, resource: Resource, id: impl Display) -> String {
        format!("{}{}/{id}", self.base_url, resource.path())
    }
}

impl From<&Resolution> for ApiBase {
    fn from(resolution: &Resolution) -> Self {
        Self::new(&resolution.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawprobe_common::network::endpoint::EndpointSource;

    fn api() -> ApiBase {
        ApiBase::new(&Endpoint::new("192.168.1.41", 8080))
    }

    #[test]
    fn collection_urls() {
        assert_eq!(api().base_url(), "http://192.168.1.41:8080/");
        assert_eq!(api().collection(Resource::Animals), "http://192.168.1.41:8080/animals");
        assert_eq!(
            api().collection(Resource::AdoptionRequests),
            "http://192.168.1.41:8080/adoption-requests"
        );
        assert_eq!(api().collection(Resource::Login), "http://192.168.1.41:8080/auth/login");
    }

    #[test]
    fn item_urls() {
        assert_eq!(api().item(Resource::Shelters, 12), "http://192.168.1.41:8080/shelters/12");
        assert_eq!(api().item(Resource::Users, "abc"), "http://192.168.1.41:8080/users/abc");
    }

    #[test]
    fn built_from_resolution() {
        let resolution = Resolution::new(Endpoint::new("10.0.2.2", 8080), EndpointSource::Emulator);
        assert_eq!(ApiBase::from(&resolution).base_url(), "http://10.0.2.2:8080/");
    }

    #[test]
    fn every_resource_has_a_distinct_path() {
        let mut paths: Vec<&str> = Resource::ALL.iter().map(Resource::path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Resource::ALL.len());
    }
}
