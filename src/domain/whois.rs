//! Network collaborators: the system resolver and a TCP/43 WHOIS client

use async_trait::async_trait;
use std::net::IpAddr;

use super::NameResolver;
use crate::error::{EmojiDomainError, Result};

/// Resolver backed by the operating system (`getaddrinfo` via tokio)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl NameResolver for SystemResolver {
    async fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((domain, 0))
            .await
            .map_err(|e| EmojiDomainError::network(format!("DNS lookup failed: {}", e), None))?;

        let mut ips: Vec<IpAddr> = addrs.map(|a| a.ip()).collect();
        ips.sort();
        ips.dedup();
        Ok(ips)
    }
}

#[cfg(feature = "whois")]
pub use client::WhoisClient;

#[cfg(feature = "whois")]
mod client {
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;

    use crate::domain::RegistryTextSource;
    use crate::error::{EmojiDomainError, Result};

    const IANA_SERVER: &str = "whois.iana.org";

    /// Pure Rust WHOIS over TCP/43 (no external `whois` binary required)
    #[derive(Debug, Clone)]
    pub struct WhoisClient {
        server_override: Option<String>,
        io_timeout: Duration,
    }

    impl WhoisClient {
        pub fn new(server_override: Option<String>, io_timeout: Duration) -> Self {
            Self {
                server_override,
                io_timeout,
            }
        }

        /// Well-known registry servers; other TLDs are discovered through IANA
        pub fn whois_server_for_tld(tld: &str) -> Option<&'static str> {
            match tld {
                "com" | "net" => Some("whois.verisign-grs.com"),
                "org" => Some("whois.pir.org"),
                "io" => Some("whois.nic.io"),
                "ai" => Some("whois.nic.ai"),
                "co" => Some("whois.nic.co"),
                "me" => Some("whois.nic.me"),
                "xyz" => Some("whois.nic.xyz"),
                "ws" => Some("whois.website.ws"),
                "la" => Some("whois.nic.la"),
                "app" => Some("whois.nic.google"),
                _ => None,
            }
        }

        async fn server_for(&self, domain: &str) -> Result<String> {
            if let Some(server) = &self.server_override {
                return Ok(server.clone());
            }

            let tld = domain
                .trim_end_matches('.')
                .rsplit('.')
                .next()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| EmojiDomainError::invalid_input("domain has no TLD", None))?
                .to_lowercase();

            if let Some(server) = Self::whois_server_for_tld(&tld) {
                return Ok(server.to_string());
            }

            let iana = self.query(IANA_SERVER, &tld).await?;
            parse_iana_server(&iana, "whois:")
                .or_else(|| parse_iana_server(&iana, "refer:"))
                .ok_or_else(|| {
                    EmojiDomainError::network(format!("No WHOIS server found for TLD: {}", tld), Some(IANA_SERVER.to_string()))
                })
        }

        async fn query(&self, server: &str, query: &str) -> Result<String> {
            let addr = if server.contains(':') {
                server.to_string()
            } else {
                format!("{}:43", server)
            };

            let mut stream = timeout(self.io_timeout, TcpStream::connect(&addr))
                .await
                .map_err(|_| EmojiDomainError::timeout("WHOIS connect", self.io_timeout))?
                .map_err(|e| EmojiDomainError::network(format!("WHOIS connect failed: {}", e), Some(addr.clone())))?;

            timeout(self.io_timeout, stream.write_all(format!("{}\r\n", query).as_bytes()))
                .await
                .map_err(|_| EmojiDomainError::timeout("WHOIS write", self.io_timeout))?
                .map_err(|e| EmojiDomainError::network(format!("WHOIS write failed: {}", e), Some(addr.clone())))?;

            let mut buf = Vec::new();
            timeout(self.io_timeout, stream.read_to_end(&mut buf))
                .await
                .map_err(|_| EmojiDomainError::timeout("WHOIS read", self.io_timeout))?
                .map_err(|e| EmojiDomainError::network(format!("WHOIS read failed: {}", e), Some(addr)))?;

            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
    }

    #[async_trait]
    impl RegistryTextSource for WhoisClient {
        async fn fetch(&self, domain: &str) -> Result<String> {
            let server = self.server_for(domain).await?;
            tracing::debug!(domain = %domain, server = %server, "Querying WHOIS");
            self.query(&server, domain).await
        }
    }

    /// Value of the first `key` line in an IANA response
    pub(super) fn parse_iana_server(iana: &str, key: &str) -> Option<String> {
        iana.lines()
            .map(str::trim)
            .find_map(|line| {
                let head = line.get(..key.len())?;
                head.eq_ignore_ascii_case(key)
                    .then(|| line[key.len()..].trim().to_string())
            })
            .filter(|s| !s.is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use tokio::net::TcpListener;

        #[test]
        fn test_iana_whois_parsing() {
            let sample = r#"
domain:       COM
organisation: Verisign Global Registry Services
whois:        whois.verisign-grs.com
status:       ACTIVE
"#;
            assert_eq!(
                parse_iana_server(sample, "whois:").as_deref(),
                Some("whois.verisign-grs.com")
            );
            assert_eq!(parse_iana_server("refer: whois.nic.io\n", "refer:").as_deref(), Some("whois.nic.io"));
            assert_eq!(parse_iana_server("whois:\n", "whois:"), None);
        }

        #[test]
        fn test_known_servers() {
            assert_eq!(WhoisClient::whois_server_for_tld("com"), Some("whois.verisign-grs.com"));
            assert_eq!(WhoisClient::whois_server_for_tld("ws"), Some("whois.website.ws"));
            assert_eq!(WhoisClient::whois_server_for_tld("unknown"), None);
        }

        #[tokio::test]
        async fn test_fetch_from_override_server() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap().to_string();

            let server = tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 64];
                let n = socket.read(&mut buf).await.unwrap();
                socket.write_all(b"No match for \"XN--LS8H.LA\"\n").await.unwrap();
                buf[..n].to_vec()
            });

            let client = WhoisClient::new(Some(addr), Duration::from_secs(2));
            let text = client.fetch("xn--ls8h.la").await.unwrap();
            assert!(text.starts_with("No match"));
            assert_eq!(server.await.unwrap(), b"xn--ls8h.la\r\n");
        }

        #[tokio::test]
        async fn test_connect_failure_is_network_error() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap().to_string();
            drop(listener);

            let client = WhoisClient::new(Some(addr), Duration::from_secs(2));
            let err = client.fetch("example.com").await.unwrap_err();
            assert!(matches!(err, EmojiDomainError::Network { .. }));
        }
    }
}
