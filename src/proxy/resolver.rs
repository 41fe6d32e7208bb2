//! Target resolution
//!
//! Turns per-request routing metadata into the concrete backend address the
//! relay dials. Resolution never fails: an alias that matches nothing and a
//! node that is not IP-shaped both fall back permissively, and it is the
//! relay's job to verify liveness before any socket is opened.

use std::fmt;
use std::net::Ipv4Addr;

use crate::http::request::Request;
use crate::registry::InstanceRegistry;
use crate::routing::RouteVars;

/// The backend address a request resolves to, kept as strings because both
/// parts go straight back onto the wire (dial address and Host header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub host: String,
    pub port: String,
}

impl ResolvedTarget {
    /// `host:port`, the form used for dialing and for the rewritten Host.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Resolves routing variables and the incoming request into a backend target.
///
/// Priority order:
/// 1. A host-header port wins when it differs from the proxy's own port;
///    otherwise the `port` variable, defaulting to `"80"`.
/// 2. A non-empty alias that matches a registered (session, alias) pair
///    resolves to that instance's IP. A miss is not an error.
/// 3. The `node` variable, with `-` decoded back to `.` when the result is a
///    valid IPv4 address, verbatim as a hostname otherwise.
pub async fn resolve_target(
    vars: &RouteVars,
    request: &Request,
    own_port: &str,
    registry: &InstanceRegistry,
) -> ResolvedTarget {
    let mut port = vars.port.clone();

    // Give priority to the host header port
    let host_port = request
        .header("Host")
        .and_then(|h| h.split_once(':'))
        .map(|(_, p)| p.to_string());

    match host_port {
        Some(p) if p != own_port => port = p,
        _ => {
            if port.is_empty() {
                port = "80".to_string();
            }
        }
    }

    if !vars.alias.is_empty() {
        if let Some(instance) = registry.find_by_alias(&vars.session, &vars.alias).await {
            return ResolvedTarget {
                host: instance.ip,
                port,
            };
        }
    }

    // Node identifiers encode IP octets with '-' in place of '.' to stay
    // URL-path-safe. Anything that doesn't decode to an IPv4 address is
    // treated verbatim as a hostname.
    let dotted = vars.node.replace('-', ".");
    let host = if dotted.parse::<Ipv4Addr>().is_ok() {
        dotted
    } else {
        vars.node.clone()
    };

    ResolvedTarget { host, port }
}

/// The director step: resolves the target and applies the only request
/// mutation the proxy performs, the scheme upgrade for port 443 and the
/// Host rewrite to the resolved address.
pub async fn direct(
    outreq: &mut Request,
    vars: &RouteVars,
    own_port: &str,
    registry: &InstanceRegistry,
) -> ResolvedTarget {
    let target = resolve_target(vars, outreq, own_port, registry).await;

    if target.port == "443" {
        outreq.scheme = if outreq.scheme.contains("http") {
            "https".to_string()
        } else {
            "wss".to_string()
        };
    }
    outreq.set_header("Host", target.addr());

    target
}
