use std::time::Duration;

use url::Url;

/// Portal endpoints and transport identity.
///
/// The portal renders different markup to non-browser clients, so the
/// User-Agent must identify as a common desktop browser. All fields are
/// public so tests and alternative deployments can point the fetcher at a
/// different host.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Host the embedded frame's relative `src` is resolved against.
    pub host: Url,
    /// Landing page fetched once to prime the server-side session.
    pub landing_url: Url,
    /// Statement listing page; target of every navigation GET/POST.
    pub listing_url: Url,
    /// Browser-identifying User-Agent attached to every request.
    pub user_agent: String,
    /// Minimum elapsed time between consecutive requests.
    pub min_interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            host: Url::parse("https://ipay.adp.com").expect("host url is valid"),
            landing_url: Url::parse("https://ipay.adp.com/iPay/private/index.jsf")
                .expect("landing url is valid"),
            listing_url: Url::parse("https://ipay.adp.com/iPay/private/listDoc.jsf")
                .expect("listing url is valid"),
            user_agent: concat!(
                "Mozilla/5.0 (Macintosh; U; Intel Mac OS X 10_6_4; en-US) ",
                "AppleWebKit/534.13 (KHTML, like Gecko) Chrome/9.0.597.19 Safari/534.13"
            )
            .to_string(),
            min_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_portal() {
        let config = PortalConfig::default();
        assert_eq!(config.host.as_str(), "https://ipay.adp.com/");
        assert!(config.listing_url.path().ends_with("listDoc.jsf"));
        assert_eq!(config.min_interval, Duration::from_secs(1));
    }

    #[test]
    fn frame_src_resolves_against_host() {
        let config = PortalConfig::default();
        let resolved = config.host.join("/iPay/private/doc.pdf").unwrap();
        assert_eq!(resolved.as_str(), "https://ipay.adp.com/iPay/private/doc.pdf");
    }
}
