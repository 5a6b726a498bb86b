//! Directory API client for fetching team members
//!
//! This module fetches the member list from the team directory service and
//! parses it into our Member data structures.

use reqwest::Client;
use thiserror::Error;

use super::Member;

/// Base URL for the team directory service
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Errors that can occur when fetching directory data
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Client for fetching team members from the directory API
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the API (allows override via CLI or tests)
    base_url: String,
}

impl Default for DirectoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryClient {
    /// Creates a new DirectoryClient with the default base URL
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a new DirectoryClient with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Returns the base URL this client talks to
    #[allow(dead_code)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the full member list from the directory
    ///
    /// # Returns
    /// * `Ok(Vec<Member>)` - All members known to the directory
    /// * `Err(DirectoryError)` - If the request or parsing fails
    pub async fn fetch_members(&self) -> Result<Vec<Member>, DirectoryError> {
        let url = endpoint_url(&self.base_url, "users", &[]);

        let response = self.http_client.get(&url).send().await?;
        let text = response.text().await?;
        let members: Vec<Member> = serde_json::from_str(&text)?;

        Ok(members)
    }
}

/// Builds a request URL from the base, a path, and query parameters.
///
/// Parameters with empty values are dropped rather than sent, so optional
/// filters can be passed through unconditionally.
fn endpoint_url(base_url: &str, path: &str, params: &[(&str, &str)]) -> String {
    let mut url = format!("{}/{}", base_url.trim_end_matches('/'), path);

    let mut first = true;
    for (key, value) in params {
        if value.is_empty() {
            continue;
        }
        url.push(if first { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(value);
        first = false;
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sample directory response with two members, shaped like the live API
    const VALID_RESPONSE: &str = r#"[
        {
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": {
                    "lat": "-37.3159",
                    "lng": "81.1496"
                }
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {
                "name": "Romaguera-Crona",
                "catchPhrase": "Multi-layered client-server neural-net",
                "bs": "harness real-time e-markets"
            }
        },
        {
            "id": 2,
            "name": "Ervin Howell",
            "username": "Antonette",
            "email": "Shanna@melissa.tv",
            "address": {
                "street": "Victor Plains",
                "suite": "Suite 879",
                "city": "Wisokyburgh",
                "zipcode": "90566-7771",
                "geo": {
                    "lat": "-43.9509",
                    "lng": "-34.4618"
                }
            },
            "phone": "010-692-6593 x09125",
            "website": "anastasia.net",
            "company": {
                "name": "Deckow-Crist",
                "catchPhrase": "Proactive didactic contingency",
                "bs": "synergize scalable supply-chains"
            }
        }
    ]"#;

    #[test]
    fn test_parse_valid_response() {
        let members: Vec<Member> =
            serde_json::from_str(VALID_RESPONSE).expect("Failed to parse valid response");

        assert_eq!(members.len(), 2);

        assert_eq!(members[0].id, 1);
        assert_eq!(members[0].username, "Bret");
        assert_eq!(members[0].address.city, "Gwenborough");
        assert_eq!(members[0].company.catch_phrase, "Multi-layered client-server neural-net");

        assert_eq!(members[1].id, 2);
        assert_eq!(members[1].username, "Antonette");
        assert_eq!(members[1].address.geo.lng, "-34.4618");
    }

    #[test]
    fn test_parse_malformed_json() {
        let malformed = "{ invalid json }";
        let result: Result<Vec<Member>, _> = serde_json::from_str(malformed);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_fields() {
        let missing_address = r#"[{
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz"
        }]"#;

        let result: Result<Vec<Member>, _> = serde_json::from_str(missing_address);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_empty_list() {
        let members: Vec<Member> = serde_json::from_str("[]").expect("Failed to parse empty list");
        assert!(members.is_empty());
    }

    #[test]
    fn test_endpoint_url_without_params() {
        let url = endpoint_url("https://example.com", "users", &[]);
        assert_eq!(url, "https://example.com/users");
    }

    #[test]
    fn test_endpoint_url_trims_trailing_slash() {
        let url = endpoint_url("https://example.com/", "users", &[]);
        assert_eq!(url, "https://example.com/users");
    }

    #[test]
    fn test_endpoint_url_drops_empty_params() {
        let url = endpoint_url(
            "https://example.com",
            "users",
            &[("team", "platform"), ("office", ""), ("active", "true")],
        );
        assert_eq!(url, "https://example.com/users?team=platform&active=true");
    }

    #[test]
    fn test_endpoint_url_all_params_empty() {
        let url = endpoint_url("https://example.com", "users", &[("office", "")]);
        assert_eq!(url, "https://example.com/users");
    }

    #[test]
    fn test_directory_client_default_base_url() {
        let client = DirectoryClient::default();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_directory_client_with_base_url() {
        let client = DirectoryClient::with_base_url("https://directory.internal");
        assert_eq!(client.base_url(), "https://directory.internal");
    }
}
