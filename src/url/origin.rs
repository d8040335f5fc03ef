use url::Url;

/// Decides whether a discovered link stays on-site
///
/// Matching is EXACT host equality against the seed's host plus any
/// explicitly configured extra hosts. A substring check (as in naive cloners)
/// would accept `notexample.com` for a seed on `example.com`; exact equality
/// avoids that whole class of false positives. Subdomains are off-site unless
/// listed in `allowed-hosts`. Ports are ignored: two servers on the same host
/// are the same site for mirroring purposes.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed_hosts: Vec<String>,
}

impl OriginPolicy {
    /// Creates a policy allowing the seed's host plus the given extra hosts
    ///
    /// # Arguments
    ///
    /// * `seed` - The session's seed URL
    /// * `extra_hosts` - Additional exact hostnames to treat as on-site
    pub fn for_seed(seed: &Url, extra_hosts: &[String]) -> Self {
        let mut allowed_hosts: Vec<String> = Vec::with_capacity(1 + extra_hosts.len());
        if let Some(host) = seed.host_str() {
            allowed_hosts.push(host.to_ascii_lowercase());
        }
        for host in extra_hosts {
            let host = host.to_ascii_lowercase();
            if !allowed_hosts.contains(&host) {
                allowed_hosts.push(host);
            }
        }
        Self { allowed_hosts }
    }

    /// Returns true when the URL's host exactly matches an allowed host
    pub fn allows(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => {
                let host = host.to_ascii_lowercase();
                self.allowed_hosts.iter().any(|allowed| *allowed == host)
            }
            None => false,
        }
    }
}
