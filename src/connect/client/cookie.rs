//! In-memory cookie store and the Netscape `cookies.txt` format it persists to.

use crate::error::ConnectError;
use reqwest::Url;
use std::fmt::Write as _;

const JAR_HEADER: &str = "# Netscape HTTP Cookie File\n\
# This file is generated by connect-downloader. Edit at your own risk.\n\n";
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    /// Host name, with a leading dot when the cookie is valid for subdomains.
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds; `None` for session cookies.
    pub expires: Option<i64>,
    pub name: String,
    pub value: String,
    pub http_only: bool,
}

impl StoredCookie {
    fn is_expired(&self, now: i64) -> bool {
        self.expires.is_some_and(|t| t <= now)
    }

    fn same_identity(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    fn matches(&self, url: &Url, now: i64) -> bool {
        if self.is_expired(now) {
            return false;
        }
        if self.secure && url.scheme() != "https" {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        domain_matches(&self.domain, self.include_subdomains, host)
            && path_matches(&self.path, url.path())
    }
}

/// The session's cookies. Identity of a cookie is `(domain, path, name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieStore {
    cookies: Vec<StoredCookie>,
}

impl CookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredCookie> {
        self.cookies.iter()
    }

    pub fn get(&self, name: &str) -> Option<&StoredCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Inserts a cookie, replacing any cookie with the same identity.
    pub fn insert(&mut self, cookie: StoredCookie) {
        match self.cookies.iter_mut().find(|c| c.same_identity(&cookie)) {
            Some(slot) => *slot = cookie,
            None => self.cookies.push(cookie),
        }
    }

    fn remove_matching(&mut self, cookie: &StoredCookie) {
        self.cookies.retain(|c| !c.same_identity(cookie));
    }

    /// Merges the `Set-Cookie` headers of a response to `url`.
    pub fn update_from_response(&mut self, url: &Url, set_cookie_headers: &[String]) {
        let now = now_secs();
        for sc in set_cookie_headers {
            let Ok(parsed) = cookie::Cookie::parse(sc.as_str()) else {
                tracing::debug!(header = %sc, "ignoring unparsable Set-Cookie");
                continue;
            };
            let Some(stored) = from_set_cookie(&parsed, url, now) else {
                continue;
            };
            if stored.is_expired(now) {
                self.remove_matching(&stored);
            } else {
                self.insert(stored);
            }
        }
    }

    /// Value of the `Cookie` request header for `url`, if any cookie applies.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let now = now_secs();
        let pairs = self
            .cookies
            .iter()
            .filter(|c| c.matches(url, now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Parses the text of a Netscape cookie jar.
    pub fn parse_netscape(text: &str) -> Result<Self, ConnectError> {
        let mut store = CookieStore::new();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end_matches('\r');
            let (http_only, line) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
                Some(rest) => (true, rest),
                None => (false, line),
            };
            if !http_only && (line.trim().is_empty() || line.trim_start().starts_with('#')) {
                continue;
            }

            let fields = line.split('\t').collect::<Vec<_>>();
            let [domain, subdomains, path, secure, expires, name, value] = fields[..] else {
                return Err(ConnectError::CookieJar {
                    line: line_no,
                    reason: format!("expected 7 tab-separated fields, found {}", fields.len()),
                });
            };

            let expires = match expires.trim() {
                "" => None,
                s => {
                    let t = s.parse::<i64>().map_err(|_| ConnectError::CookieJar {
                        line: line_no,
                        reason: format!("invalid expiry {s:?}"),
                    })?;
                    (t != 0).then_some(t)
                }
            };

            store.insert(StoredCookie {
                domain: domain.to_owned(),
                include_subdomains: parse_flag(subdomains, line_no)?,
                path: path.to_owned(),
                secure: parse_flag(secure, line_no)?,
                expires,
                name: name.to_owned(),
                value: value.to_owned(),
                http_only,
            });
        }
        Ok(store)
    }

    /// Renders the store as a Netscape cookie jar. Session cookies are kept
    /// with an expiry of `0`.
    pub fn to_netscape(&self) -> String {
        let mut out = String::from(JAR_HEADER);
        for c in &self.cookies {
            let _ = writeln!(
                out,
                "{}{}\t{}\t{}\t{}\t{}\t{}\t{}",
                if c.http_only { HTTP_ONLY_PREFIX } else { "" },
                c.domain,
                flag(c.include_subdomains),
                c.path,
                flag(c.secure),
                c.expires.unwrap_or(0),
                c.name,
                c.value,
            );
        }
        out
    }
}

fn from_set_cookie(parsed: &cookie::Cookie<'_>, url: &Url, now: i64) -> Option<StoredCookie> {
    let host = url.host_str()?;
    let (domain, include_subdomains) = match parsed.domain() {
        Some(d) if !d.is_empty() => (format!(".{}", d.trim_start_matches('.')), true),
        _ => (host.to_owned(), false),
    };
    if include_subdomains && !domain_matches(&domain, true, host) {
        tracing::debug!(%domain, host, name = parsed.name(), "Set-Cookie domain does not match host");
        return None;
    }
    let path = match parsed.path() {
        Some(p) if p.starts_with('/') => p.to_owned(),
        _ => default_path(url.path()),
    };
    let expires = match (parsed.max_age(), parsed.expires_datetime()) {
        (Some(age), _) => Some(now.saturating_add(age.whole_seconds())),
        (None, Some(at)) => Some(at.unix_timestamp()),
        (None, None) => None,
    };

    Some(StoredCookie {
        domain,
        include_subdomains,
        path,
        secure: parsed.secure().unwrap_or(false),
        expires,
        name: parsed.name().to_owned(),
        value: parsed.value().to_owned(),
        http_only: parsed.http_only().unwrap_or(false),
    })
}

fn default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(0) | None => "/".to_owned(),
        Some(i) => request_path[..i].to_owned(),
    }
}

fn domain_matches(domain: &str, include_subdomains: bool, host: &str) -> bool {
    let bare = domain.trim_start_matches('.');
    if host.eq_ignore_ascii_case(bare) {
        return true;
    }
    include_subdomains
        && host.len() > bare.len()
        && host.to_ascii_lowercase().ends_with(&format!(".{}", bare.to_ascii_lowercase()))
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == request_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path[cookie_path.len()..].starts_with('/'))
}

fn parse_flag(s: &str, line: usize) -> Result<bool, ConnectError> {
    match s.trim() {
        v if v.eq_ignore_ascii_case("TRUE") => Ok(true),
        v if v.eq_ignore_ascii_case("FALSE") => Ok(false),
        other => Err(ConnectError::CookieJar {
            line,
            reason: format!("expected TRUE or FALSE, found {other:?}"),
        }),
    }
}

fn flag(b: bool) -> &'static str {
    if b { "TRUE" } else { "FALSE" }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
