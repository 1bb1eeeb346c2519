//! Proxy parser for `host:port` and `host:port:user:pass` lines

use crate::error::ProxyParseError;
use crate::proxy::models::{ProxyDescriptor, ProxyType};
use once_cell::sync::Lazy;
use regex::Regex;

/// Leading `scheme://` prefix
static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*)://").expect("Invalid scheme regex")
});

/// Parser for raw proxy lines
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single proxy line
    ///
    /// Supports formats:
    /// - IP:PORT
    /// - IP:PORT:USER:PASS
    /// - either of the above behind a `http://`, `https://` or `socks5://`
    ///   prefix
    ///
    /// Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse_line(
        line: &str,
        default_type: ProxyType,
    ) -> Result<Option<ProxyDescriptor>, ProxyParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (proxy_type, rest) = Self::strip_scheme(line, default_type)?;
        let rest = rest.trim_end_matches('/');
        Self::parse_colon_format(rest, proxy_type).map(Some)
    }

    fn strip_scheme(
        line: &str,
        default_type: ProxyType,
    ) -> Result<(ProxyType, &str), ProxyParseError> {
        match SCHEME_REGEX.captures(line) {
            Some(caps) => {
                let scheme = &caps[1];
                let proxy_type = ProxyType::from_scheme(scheme)
                    .ok_or_else(|| ProxyParseError::UnsupportedScheme(scheme.to_string()))?;
                Ok((proxy_type, &line[caps[0].len()..]))
            }
            None => Ok((default_type, line)),
        }
    }

    /// Parse ip:port or ip:port:user:pass format
    fn parse_colon_format(
        line: &str,
        proxy_type: ProxyType,
    ) -> Result<ProxyDescriptor, ProxyParseError> {
        let parts: Vec<&str> = line.split(':').collect();

        match parts.as_slice() {
            [host, port] => Ok(ProxyDescriptor::new(
                host.to_string(),
                Self::parse_port(port)?,
                proxy_type,
            )),
            [host, port, username, password] => Ok(ProxyDescriptor::with_auth(
                host.to_string(),
                Self::parse_port(port)?,
                proxy_type,
                username.to_string(),
                password.to_string(),
            )),
            _ => Err(ProxyParseError::FieldCount {
                fields: parts.len(),
            }),
        }
    }

    fn parse_port(port: &str) -> Result<u16, ProxyParseError> {
        match port.parse::<u16>() {
            Ok(0) | Err(_) => Err(ProxyParseError::InvalidPort(port.to_string())),
            Ok(port) => Ok(port),
        }
    }
}
