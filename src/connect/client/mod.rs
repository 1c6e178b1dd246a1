mod config;
mod cookie;
mod types;

pub use config::{ConnectConfig, DEFAULT_BASE_URL, default_data_dir, load_cookies, save_cookies};
pub use cookie::{CookieStore, StoredCookie};
pub use types::DownloadFormat;

use crate::connect::models::{convert, dto::Track};
use crate::error::ConnectError;
use reqwest::header::{COOKIE, HeaderValue, LOCATION, SET_COOKIE};
use reqwest::{Method, StatusCode, Url};
use std::fs;
use std::time::Duration;
use types::{ALBUM_PATH, MAX_REDIRECTS, SESSION_PATH, SIGNIN_PATH, TRACKS_PATH, USER_AGENT};

/// An HTTP client plus the cookie store that authenticates it.
///
/// Every request sends the cookies that apply to its URL and merges the
/// `Set-Cookie` headers of each response, redirects included, back into the
/// store.
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
    pub cfg: ConnectConfig,
    cookies: CookieStore,
}

impl Session {
    pub fn new(cfg: ConnectConfig, cookies: CookieStore) -> Result<Self, ConnectError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(secs) = cfg.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ConnectError::Transport)?;
        Ok(Self { http, cfg, cookies })
    }

    /// Builds a session from the persisted cookie jar. The flag tells whether
    /// a jar was found.
    pub fn open(cfg: ConnectConfig) -> Result<(Self, bool), ConnectError> {
        let (cookies, found) = load_cookies(&cfg.cookie_path())?;
        Ok((Self::new(cfg, cookies)?, found))
    }

    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    // ========== Persistence ==========

    pub fn persist(&self) -> Result<(), ConnectError> {
        save_cookies(&self.cookies, &self.cfg.cookie_path())
    }

    /// Drops all cookies, in memory and on disk.
    pub fn forget(&mut self) -> Result<(), ConnectError> {
        self.cookies.clear();
        let path = self.cfg.cookie_path();
        if path.exists() {
            fs::remove_file(&path).map_err(ConnectError::Io)?;
            tracing::info!(path = %path.display(), "cookie jar removed");
        }
        Ok(())
    }

    // ========== Auth ==========

    /// Probes the session endpoint. An empty JSON object means the cookies do
    /// not carry a session.
    pub async fn is_authenticated(&mut self) -> Result<bool, ConnectError> {
        let url = self.cfg.endpoint(SESSION_PATH);
        let body = self.execute(Method::GET, &url, None).await?.text().await?;
        let signed_in = !convert::is_empty_object(&body);
        tracing::debug!(signed_in, "session probe");
        Ok(signed_in)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ConnectError> {
        tracing::info!("signing in");
        let url = self.cfg.endpoint(SIGNIN_PATH);
        let form = [("email", email), ("password", password)];
        let body = self
            .execute(Method::POST, &url, Some(&form))
            .await?
            .text()
            .await?;

        match convert::signin_error(&body)? {
            Some(message) => {
                tracing::warn!(%message, "sign-in rejected");
                Err(ConnectError::Auth(message))
            }
            None => {
                tracing::info!(cookies = self.cookies.len(), "signed in");
                Ok(())
            }
        }
    }

    // ========== API ==========

    pub async fn list_tracks(&mut self) -> Result<Vec<Track>, ConnectError> {
        tracing::info!("loading track list");
        let url = self.cfg.endpoint(TRACKS_PATH);
        let bytes = self.execute(Method::GET, &url, None).await?.bytes().await?;
        let tracks = convert::parse_tracks(&bytes)?;
        tracing::info!(count = tracks.len(), "track list loaded");
        Ok(tracks)
    }

    /// `{base}/album/{id}/download{format query}`
    pub fn album_download_url(&self, album_id: &str, format: DownloadFormat) -> String {
        format!(
            "{}/{}/download{}",
            self.cfg.endpoint(ALBUM_PATH),
            urlencoding::encode(album_id),
            format.query()
        )
    }

    /// Starts a GET whose body the caller streams.
    pub async fn get(&mut self, url: &str) -> Result<reqwest::Response, ConnectError> {
        self.execute(Method::GET, url, None).await
    }

    // ========== Request ==========

    /// Sends a request and follows redirects by hand, so the `Set-Cookie`
    /// headers of every hop reach the store. 301, 302 and 303 turn the
    /// request into a body-less GET; 307 and 308 repeat it as is.
    async fn execute(
        &mut self,
        method: Method,
        url: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<reqwest::Response, ConnectError> {
        let mut url =
            Url::parse(url).map_err(|e| ConnectError::InvalidUrl(format!("{url}: {e}")))?;
        let mut method = method;
        let mut form = form;

        for _ in 0..=MAX_REDIRECTS {
            let resp = self.send_once(method.clone(), &url, form).await?;
            if !resp.status().is_redirection() {
                return Ok(resp);
            }
            let Some(next) = redirect_target(&resp) else {
                return Ok(resp);
            };

            if matches!(
                resp.status(),
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
            ) && method != Method::HEAD
            {
                method = Method::GET;
                form = None;
            }
            tracing::debug!(status = %resp.status(), to = %next, "following redirect");
            url = next;
        }

        Err(ConnectError::TooManyRedirects(url.to_string()))
    }

    async fn send_once(
        &mut self,
        method: Method,
        url: &Url,
        form: Option<&[(&str, &str)]>,
    ) -> Result<reqwest::Response, ConnectError> {
        let mut req = self.http.request(method.clone(), url.clone());
        if let Some(cookie) = self.cookies.header_for(url) {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| ConnectError::BadHeader(format!("Cookie: {e}")))?;
            req = req.header(COOKIE, value);
        }
        if let Some(form) = form {
            req = req.form(form);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, url = %url, err = %e, "request failed");
            ConnectError::Transport(e)
        })?;
        tracing::debug!(%method, url = %url, status = %resp.status(), "response");

        let set_cookies = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(ToOwned::to_owned))
            .collect::<Vec<String>>();
        if !set_cookies.is_empty() {
            self.cookies.update_from_response(url, &set_cookies);
        }

        Ok(resp)
    }
}

/// The `Location` of a redirect, resolved against the request URL.
fn redirect_target(resp: &reqwest::Response) -> Option<Url> {
    let location = resp.headers().get(LOCATION)?.to_str().ok()?;
    resp.url().join(location).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn session(base: &str) -> Session {
        let cfg = ConnectConfig {
            base_url: base.to_owned(),
            data_dir: PathBuf::from("/nonexistent"),
            connect_timeout_secs: Some(5),
        };
        Session::new(cfg, CookieStore::new()).unwrap()
    }

    #[test]
    fn album_download_url_appends_format_query() {
        let s = session("https://connect.example.com");
        assert_eq!(
            s.album_download_url("abc123", DownloadFormat::Flac),
            "https://connect.example.com/album/abc123/download?format=flac"
        );
        assert_eq!(
            s.album_download_url("a b", DownloadFormat::Mp3Cbr320),
            "https://connect.example.com/album/a%20b/download?format=mp3&bitRate=320"
        );
    }

    #[test]
    fn forget_without_jar_only_clears_memory() {
        let mut s = session("https://connect.example.com");
        s.cookies.insert(StoredCookie {
            domain: "connect.example.com".to_owned(),
            include_subdomains: false,
            path: "/".to_owned(),
            secure: false,
            expires: None,
            name: "sid".to_owned(),
            value: "1".to_owned(),
            http_only: true,
        });
        s.forget().unwrap();
        assert!(s.cookies().is_empty());
    }
}
