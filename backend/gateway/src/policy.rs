//! Route policy: which rate-limit groups a path is charged against and which
//! credential it requires.

use crate::rate_limit::EndpointGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Public,
    ApiKey,
    SessionToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Charged in order; the first rejection stops the rest.
    pub groups: &'static [EndpointGroup],
    pub guard: Guard,
}

#[derive(Debug, Clone, Copy)]
pub struct RoutingOptions {
    pub trust_proxy: bool,
    pub exempt_health: bool,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            trust_proxy: false,
            exempt_health: true,
        }
    }
}

const NONE: &[EndpointGroup] = &[];
const GENERAL: &[EndpointGroup] = &[EndpointGroup::General];
const LOGIN: &[EndpointGroup] = &[EndpointGroup::General, EndpointGroup::Authentication];

const fn policy(groups: &'static [EndpointGroup], guard: Guard) -> RoutePolicy {
    RoutePolicy { groups, guard }
}

pub fn resolve(path: &str, options: &RoutingOptions) -> RoutePolicy {
    if path == "/health" {
        let groups = if options.exempt_health { NONE } else { GENERAL };
        return policy(groups, Guard::Public);
    }

    match path {
        "/api" | "/api/" | "/api/status" => policy(GENERAL, Guard::ApiKey),
        p if p.starts_with("/api/auth/") => policy(LOGIN, Guard::Public),
        p if p.starts_with("/api/admin/") => policy(GENERAL, Guard::SessionToken),
        p if p.starts_with("/api/") => policy(GENERAL, Guard::Public),
        _ => policy(NONE, Guard::Public),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_table() {
        let opts = RoutingOptions::default();
        let cases = [
            ("/health", NONE, Guard::Public),
            ("/api/auth/login", LOGIN, Guard::Public),
            ("/api/status", GENERAL, Guard::ApiKey),
            ("/api", GENERAL, Guard::ApiKey),
            ("/api/", GENERAL, Guard::ApiKey),
            ("/api/admin/metrics", GENERAL, Guard::SessionToken),
            ("/api/other", GENERAL, Guard::Public),
            ("/", NONE, Guard::Public),
            ("/apix", NONE, Guard::Public),
        ];
        for (path, groups, guard) in cases {
            assert_eq!(resolve(path, &opts), RoutePolicy { groups, guard }, "{path}");
        }
    }

    #[test]
    fn health_is_charged_when_not_exempt() {
        let opts = RoutingOptions {
            exempt_health: false,
            ..RoutingOptions::default()
        };
        assert_eq!(resolve("/health", &opts).groups, GENERAL);
    }

    #[test]
    fn status_prefix_lookalikes_are_not_gated() {
        let opts = RoutingOptions::default();
        assert_eq!(resolve("/api/statusx", &opts).guard, Guard::Public);
    }
}
