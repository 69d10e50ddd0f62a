//! Endpoints
//!
//! Logical Artsy API operations and their resolution into concrete request
//! shapes. Resolution is pure: no network or token access happens here.

pub mod params;

pub use params::{
    merge, near_location_defaults, show_artworks_defaults, show_images_defaults, ParamValue,
    ParameterSet, ShowStatus, NEAR_LOCATION_PAGE_SIZE, SHOW_CONTENT_PAGE_SIZE,
};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::core::{Environment, EnvironmentSwitch, HttpMethod, HttpRequest};
use crate::error::{ArtsyError, ArtsyResult, ConfigurationError, NetworkError};
use crate::types::{ApiHosts, ArtsyConfig};

/// Header carrying the application token.
pub const XAPP_TOKEN_HEADER: &str = "X-Xapp-Token";

/// Ordered set backing the featured shows listing.
pub const FEATURED_SET_ID: &str = "530ebe92139b21efd6000071";

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b';')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn segment(id: &str) -> String {
    utf8_percent_encode(id, PATH_SEGMENT).to_string()
}

/// Identifiers that URL normalization would drop or collapse, whatever
/// their encoding.
fn check_identifier(field: &str, id: &str) -> Result<(), NetworkError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(NetworkError::InvalidRequest {
            message: format!("{field} is not a usable path segment: {id:?}"),
        });
    }
    Ok(())
}

/// A latitude/longitude pair as the API expects it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub long: String,
}

impl Coordinates {
    pub fn new(lat: impl Into<String>, long: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            long: long.into(),
        }
    }

    /// `"lat,long"` as sent in the `near` parameter.
    pub fn to_param(&self) -> String {
        format!("{},{}", self.lat, self.long)
    }
}

/// Logical API operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Credential exchange for an application token.
    XApp,
    ShowInfo {
        show_id: String,
    },
    RunningShowsNearLocation {
        page: u32,
        amount: u32,
        near: Option<Coordinates>,
    },
    UpcomingShowsNearLocation {
        page: u32,
        amount: u32,
        near: Option<Coordinates>,
    },
    PastShowsNearLocation {
        page: u32,
        amount: u32,
        near: Option<Coordinates>,
    },
    ArtworksForShow {
        partner_id: String,
        show_id: String,
        page: u32,
    },
    ImagesForShow {
        show_id: String,
        page: u32,
    },
    FeaturedShows,
}

impl Endpoint {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::XApp => "xapp",
            Self::ShowInfo { .. } => "show_info",
            Self::RunningShowsNearLocation { .. } => "running_shows_near_location",
            Self::UpcomingShowsNearLocation { .. } => "upcoming_shows_near_location",
            Self::PastShowsNearLocation { .. } => "past_shows_near_location",
            Self::ArtworksForShow { .. } => "artworks_for_show",
            Self::ImagesForShow { .. } => "images_for_show",
            Self::FeaturedShows => "featured_shows",
        }
    }

    /// Whether requests must carry an application token.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::XApp)
    }

    pub fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    pub fn path(&self) -> String {
        match self {
            Self::XApp => "/api/v1/xapp_token".to_string(),
            Self::ShowInfo { show_id } => format!("/api/v1/show/{}", segment(show_id)),
            Self::RunningShowsNearLocation { .. }
            | Self::UpcomingShowsNearLocation { .. }
            | Self::PastShowsNearLocation { .. } => "/api/v1/shows".to_string(),
            Self::ArtworksForShow {
                partner_id,
                show_id,
                ..
            } => format!(
                "/api/v1/partner/{}/show/{}/artworks/",
                segment(partner_id),
                segment(show_id)
            ),
            Self::ImagesForShow { show_id, .. } => {
                format!("/api/v1/partner_show/{}/images", segment(show_id))
            }
            Self::FeaturedShows => format!("/api/v1/set/{}/items", FEATURED_SET_ID),
        }
    }

    /// Reject identifiers that cannot stand as a single path segment.
    pub fn validate(&self) -> Result<(), NetworkError> {
        match self {
            Self::ShowInfo { show_id } | Self::ImagesForShow { show_id, .. } => {
                check_identifier("show_id", show_id)
            }
            Self::ArtworksForShow {
                partner_id,
                show_id,
                ..
            } => {
                check_identifier("partner_id", partner_id)?;
                check_identifier("show_id", show_id)
            }
            _ => Ok(()),
        }
    }

    pub fn parameters(&self) -> ParameterSet {
        match self {
            Self::XApp => ParameterSet::new().with("grant_type", "credentials"),
            Self::RunningShowsNearLocation { page, amount, near } => {
                shows_near(ShowStatus::Running, *page, *amount, near.as_ref())
            }
            Self::UpcomingShowsNearLocation { page, amount, near } => {
                shows_near(ShowStatus::Upcoming, *page, *amount, near.as_ref())
            }
            Self::PastShowsNearLocation { page, amount, near } => {
                shows_near(ShowStatus::Closed, *page, *amount, near.as_ref())
            }
            Self::ArtworksForShow { page, .. } => merge(
                &show_artworks_defaults(),
                &ParameterSet::new().with("page", *page),
            ),
            Self::ImagesForShow { page, .. } => merge(
                &show_images_defaults(),
                &ParameterSet::new().with("page", *page),
            ),
            Self::ShowInfo { .. } | Self::FeaturedShows => ParameterSet::new(),
        }
    }
}

/// An unknown location still sends `near`, as an empty string.
fn shows_near(
    status: ShowStatus,
    page: u32,
    amount: u32,
    near: Option<&Coordinates>,
) -> ParameterSet {
    let near = near.map(Coordinates::to_param).unwrap_or_default();
    let overrides = ParameterSet::new()
        .with("near", near)
        .with("size", amount.to_string())
        .with("page", page.to_string());

    merge(&near_location_defaults(status), &overrides)
}

/// Concrete request shape for one endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub base_url: String,
    pub path: String,
    pub method: HttpMethod,
    pub parameters: ParameterSet,
    pub requires_auth: bool,
}

impl ResolvedRequest {
    /// Layer call-site parameters over the endpoint's own.
    pub fn with_overrides(mut self, overrides: &ParameterSet) -> Self {
        self.parameters = merge(&self.parameters, overrides);
        self
    }

    /// Absolute URL with the URL-encoded query string.
    pub fn url(&self) -> Result<Url, ArtsyError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, self.path)).map_err(|e| {
            ConfigurationError::InvalidBaseUrl {
                url: format!("{} ({})", self.base_url, e),
            }
        })?;

        if !self.parameters.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.parameters.to_query_pairs());
        }

        Ok(url)
    }

    /// Build the transport request, attaching `token` when given.
    pub fn to_http_request(
        &self,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<HttpRequest, ArtsyError> {
        let mut headers = HashMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        if let Some(token) = token {
            headers.insert(XAPP_TOKEN_HEADER.to_string(), token.to_string());
        }

        Ok(HttpRequest {
            method: self.method,
            url: self.url()?.to_string(),
            headers,
            timeout: Some(timeout),
        })
    }
}

/// Resolves endpoints against the configured hosts.
#[derive(Clone, Debug)]
pub struct EndpointRegistry {
    hosts: ApiHosts,
    environment: EnvironmentSwitch,
}

impl EndpointRegistry {
    pub fn new(hosts: ApiHosts, environment: EnvironmentSwitch) -> Self {
        Self { hosts, environment }
    }

    pub fn from_config(config: &ArtsyConfig) -> Self {
        Self::new(config.hosts.clone(), config.environment.clone())
    }

    /// Environment flag shared with the rest of the client.
    pub fn environment(&self) -> &EnvironmentSwitch {
        &self.environment
    }

    /// Resolve against the environment selected right now.
    pub fn resolve(&self, endpoint: &Endpoint) -> ArtsyResult<ResolvedRequest> {
        self.resolve_in(self.environment.current(), endpoint)
    }

    /// Resolve against an explicit environment snapshot.
    pub fn resolve_in(
        &self,
        environment: Environment,
        endpoint: &Endpoint,
    ) -> ArtsyResult<ResolvedRequest> {
        endpoint.validate()?;
        Ok(ResolvedRequest {
            base_url: self.hosts.base_for(environment).to_string(),
            path: endpoint.path(),
            method: endpoint.method(),
            parameters: endpoint.parameters(),
            requires_auth: endpoint.requires_auth(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn registry() -> EndpointRegistry {
        EndpointRegistry::new(ApiHosts::default(), EnvironmentSwitch::default())
    }

    #[test_case(Endpoint::XApp, "/api/v1/xapp_token"; "xapp")]
    #[test_case(Endpoint::ShowInfo { show_id: "s1".into() }, "/api/v1/show/s1"; "show info")]
    #[test_case(Endpoint::UpcomingShowsNearLocation { page: 1, amount: 5, near: None }, "/api/v1/shows"; "upcoming")]
    #[test_case(Endpoint::PastShowsNearLocation { page: 1, amount: 5, near: None }, "/api/v1/shows"; "past")]
    #[test_case(Endpoint::ImagesForShow { show_id: "s1".into(), page: 1 }, "/api/v1/partner_show/s1/images"; "images")]
    #[test_case(Endpoint::FeaturedShows, "/api/v1/set/530ebe92139b21efd6000071/items"; "featured")]
    fn test_endpoint_paths(endpoint: Endpoint, expected: &str) {
        assert_eq!(endpoint.path(), expected);
        assert_eq!(endpoint.method(), HttpMethod::Get);
    }

    #[test]
    fn test_running_shows_near_location() {
        let endpoint = Endpoint::RunningShowsNearLocation {
            page: 2,
            amount: 5,
            near: Some(Coordinates::new("40.7", "-74.0")),
        };

        let resolved = registry().resolve(&endpoint).unwrap();

        let expected = ParameterSet::new()
            .with("near", "40.7,-74.0")
            .with("size", "5")
            .with("status", "running")
            .with("sort", "end_at")
            .with("page", "2")
            .with("displayable", true)
            .with("at_a_fair", false);
        assert_eq!(resolved.path, "/api/v1/shows");
        assert_eq!(resolved.parameters, expected);
        assert!(resolved.requires_auth);
    }

    #[test]
    fn test_unknown_location_sends_empty_near() {
        let endpoint = Endpoint::UpcomingShowsNearLocation {
            page: 1,
            amount: 5,
            near: None,
        };

        let params = endpoint.parameters();
        assert_eq!(params.get("near"), Some(&ParamValue::from("")));

        let url = registry().resolve(&endpoint).unwrap().url().unwrap();
        assert!(url.query().unwrap().contains("near=&"));
    }

    #[test]
    fn test_artworks_for_show() {
        let endpoint = Endpoint::ArtworksForShow {
            partner_id: "p1".to_string(),
            show_id: "s1".to_string(),
            page: 0,
        };

        let resolved = registry().resolve(&endpoint).unwrap();

        assert_eq!(resolved.path, "/api/v1/partner/p1/show/s1/artworks/");
        assert_eq!(
            resolved.parameters,
            ParameterSet::new()
                .with("page", 0u32)
                .with("published", true)
                .with("size", 10i64)
        );
    }

    #[test_case("a/b c?x#y", "a%2Fb%20c%3Fx%23y"; "slash space query fragment")]
    #[test_case("a\\b", "a%5Cb"; "backslash")]
    #[test_case("a[0]", "a%5B0%5D"; "brackets")]
    #[test_case("a;b", "a%3Bb"; "semicolon")]
    #[test_case("a^b", "a%5Eb"; "caret")]
    #[test_case("a|b", "a%7Cb"; "pipe")]
    #[test_case("...", "..."; "three dots stay one segment")]
    fn test_identifiers_are_escaped(show_id: &str, encoded: &str) {
        let endpoint = Endpoint::ShowInfo {
            show_id: show_id.to_string(),
        };
        let expected = format!("/api/v1/show/{encoded}");
        assert_eq!(endpoint.path(), expected);

        let url = registry().resolve(&endpoint).unwrap().url().unwrap();
        assert_eq!(url.path(), expected);
        assert!(url.query().is_none());
    }

    #[test_case(Endpoint::ShowInfo { show_id: "..".into() }; "show dot dot")]
    #[test_case(Endpoint::ShowInfo { show_id: ".".into() }; "show dot")]
    #[test_case(Endpoint::ShowInfo { show_id: "".into() }; "show empty")]
    #[test_case(Endpoint::ImagesForShow { show_id: "..".into(), page: 1 }; "images dot dot")]
    #[test_case(Endpoint::ArtworksForShow { partner_id: "..".into(), show_id: "s1".into(), page: 0 }; "artworks partner dot dot")]
    #[test_case(Endpoint::ArtworksForShow { partner_id: "p1".into(), show_id: ".".into(), page: 0 }; "artworks show dot")]
    fn test_dot_segment_identifiers_are_rejected(endpoint: Endpoint) {
        let err = registry().resolve(&endpoint).unwrap_err();
        assert!(matches!(
            err,
            ArtsyError::Network(NetworkError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_resolution_is_pure() {
        let registry = registry();
        let endpoint = Endpoint::RunningShowsNearLocation {
            page: 3,
            amount: 8,
            near: Some(Coordinates::new("51.5", "-0.12")),
        };

        let first = registry.resolve(&endpoint).unwrap();
        let second = registry.resolve(&endpoint).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.url().unwrap().as_str(),
            second.url().unwrap().as_str()
        );
    }

    #[test]
    fn test_environment_switch_applies_to_next_resolution() {
        let registry = registry();
        let endpoint = Endpoint::FeaturedShows;

        assert_eq!(
            registry.resolve(&endpoint).unwrap().base_url,
            "https://api.artsy.net"
        );

        registry.environment().set(Environment::Staging);
        assert_eq!(
            registry.resolve(&endpoint).unwrap().base_url,
            "https://stagingapi.artsy.net"
        );
    }

    #[test]
    fn test_xapp_needs_no_token() {
        let resolved = registry().resolve(&Endpoint::XApp).unwrap();
        assert!(!resolved.requires_auth);
        assert_eq!(
            resolved.parameters.get("grant_type"),
            Some(&ParamValue::from("credentials"))
        );
    }

    #[test]
    fn test_http_request_headers() {
        let resolved = registry()
            .resolve(&Endpoint::ShowInfo {
                show_id: "s1".to_string(),
            })
            .unwrap();

        let anonymous = resolved
            .to_http_request(None, Duration::from_secs(5))
            .unwrap();
        assert!(anonymous.header(XAPP_TOKEN_HEADER).is_none());
        assert_eq!(anonymous.url, "https://api.artsy.net/api/v1/show/s1");

        let authed = resolved
            .to_http_request(Some("tok"), Duration::from_secs(5))
            .unwrap();
        assert_eq!(authed.header(XAPP_TOKEN_HEADER), Some("tok"));
        assert_eq!(authed.timeout, Some(Duration::from_secs(5)));
    }
}
