//! Request construction for the historical endpoint.

use std::collections::BTreeMap;

use ::url::form_urlencoded;
use chrono::NaiveDate;
use oxtap_types::{PageToken, TapConfig, TemplateError};

/// Path template of the historical endpoint, relative to the API root.
pub const HISTORICAL_PATH: &str = "/historical/{date}.json";

/// Placeholder names a URL template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateKey {
    /// The day being requested.
    Date,
    /// Base currency.
    Base,
    /// Comma-separated currency allow-list.
    Symbols,
    /// API key.
    AppId,
}

impl TemplateKey {
    /// Returns all known keys.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Date, Self::Base, Self::Symbols, Self::AppId]
    }

    /// Returns the placeholder name, as written between braces.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Base => "base",
            Self::Symbols => "symbols",
            Self::AppId => "app_id",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|key| key.name() == name)
    }
}

/// Per-request state that takes precedence over static configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Last fully processed date, restored from state.
    pub bookmark: Option<NaiveDate>,
    overrides: BTreeMap<TemplateKey, String>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resume bookmark.
    #[must_use]
    pub fn with_bookmark(mut self, bookmark: Option<NaiveDate>) -> Self {
        self.bookmark = bookmark;
        self
    }

    /// Overrides a template value for requests made with this context.
    ///
    /// A `date` override is ignored; the requested day always comes from the
    /// page token, the bookmark, or the configured start date.
    #[must_use]
    pub fn with_value(mut self, key: TemplateKey, value: impl Into<String>) -> Self {
        self.overrides.insert(key, value.into());
        self
    }

    /// Returns the override for `key`, if any.
    #[must_use]
    pub fn value(&self, key: TemplateKey) -> Option<&str> {
        self.overrides.get(&key).map(String::as_str)
    }
}

/// A fully resolved GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// URL including the query string.
    pub url: String,
    /// Headers to send.
    pub headers: Vec<(&'static str, String)>,
}

impl PreparedRequest {
    /// Returns the URL without its query string, safe to log.
    #[must_use]
    pub fn redacted_url(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path)
    }
}

/// Builds requests for the historical endpoint from the tap configuration.
///
/// Template values are looked up in the [`RequestContext`] first, then in the
/// configuration.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: TapConfig,
    path: String,
}

impl RequestBuilder {
    /// Creates a builder over the given configuration.
    #[must_use]
    pub fn new(config: TapConfig) -> Self {
        Self {
            config,
            path: HISTORICAL_PATH.to_string(),
        }
    }

    /// Replaces the path template, relative to the API root.
    ///
    /// Any [`TemplateKey`] may appear in it, e.g. `/historical/{date}.json`.
    #[must_use]
    pub fn with_path(mut self, template: impl Into<String>) -> Self {
        self.path = template.into();
        self
    }

    /// Returns the first day to request: the bookmark if present, else the start date.
    #[must_use]
    pub fn start_token(&self, context: &RequestContext) -> PageToken {
        PageToken::new(context.bookmark.unwrap_or(self.config.start_date))
    }

    /// Resolves the value of `key` for one request.
    fn resolve(&self, context: &RequestContext, token: PageToken, key: TemplateKey) -> Option<String> {
        if key == TemplateKey::Date {
            return Some(token.to_string());
        }
        if let Some(value) = context.value(key) {
            return Some(value.to_string());
        }
        match key {
            TemplateKey::Date => None,
            TemplateKey::Base => self.config.base.clone(),
            TemplateKey::Symbols => self.config.symbols.as_ref().map(|s| s.join(",")),
            TemplateKey::AppId => Some(self.config.app_id.clone()),
        }
    }

    fn token(&self, context: &RequestContext, page_token: Option<&PageToken>) -> PageToken {
        page_token
            .copied()
            .unwrap_or_else(|| self.start_token(context))
    }

    /// Builds the endpoint URL (without query string) for a page.
    ///
    /// The day is taken from `page_token`, then the context bookmark, then the
    /// configured start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the path template references an unknown
    /// placeholder or one with no value.
    pub fn build_url(
        &self,
        context: &RequestContext,
        page_token: Option<&PageToken>,
    ) -> Result<String, TemplateError> {
        let token = self.token(context, page_token);
        let path = render_template(&self.path, |key| self.resolve(context, token, key))?;

        Ok(format!("{}{}", self.config.api_url.trim_end_matches('/'), path))
    }

    /// Returns the query parameters for a request, already encoded.
    ///
    /// `app_id` always comes first; `base` and `symbols` only when the context
    /// or the configuration has them. Symbols are joined with a literal comma,
    /// which the API expects.
    #[must_use]
    pub fn query_params(&self, context: &RequestContext) -> Vec<(&'static str, String)> {
        let token = self.start_token(context);
        let lookup = |key| self.resolve(context, token, key);

        let mut params = Vec::with_capacity(3);
        if let Some(app_id) = lookup(TemplateKey::AppId) {
            params.push((TemplateKey::AppId.name(), encode(&app_id)));
        }

        if let Some(base) = lookup(TemplateKey::Base) {
            params.push((TemplateKey::Base.name(), encode(&base)));
        }

        if let Some(symbols) = lookup(TemplateKey::Symbols) {
            let joined = symbols.split(',').map(encode).collect::<Vec<_>>().join(",");
            params.push((TemplateKey::Symbols.name(), joined));
        }

        params
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(user_agent) = &self.config.user_agent {
            headers.push(("User-Agent", user_agent.clone()));
        }
        headers.push(("Accept", "application/json".to_string()));
        headers
    }

    /// Builds the complete request for a page.
    ///
    /// # Errors
    ///
    /// See [`RequestBuilder::build_url`].
    pub fn build_request(
        &self,
        context: &RequestContext,
        page_token: Option<&PageToken>,
    ) -> Result<PreparedRequest, TemplateError> {
        let url = self.build_url(context, page_token)?;
        let query = self
            .query_params(context)
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        Ok(PreparedRequest {
            url: format!("{url}?{query}"),
            headers: self.headers(),
        })
    }
}

/// Replaces every `{key}` in `template` with the URL-encoded value from `lookup`.
///
/// # Errors
///
/// Returns an error for unknown keys, keys `lookup` has no value for, and
/// unterminated placeholders.
pub fn render_template<F>(template: &str, lookup: F) -> Result<String, TemplateError>
where
    F: Fn(TemplateKey) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| TemplateError::Unterminated(template.to_string()))?;

        let name = &after[..close];
        let key = TemplateKey::from_name(name)
            .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
        let value = lookup(key).ok_or(TemplateError::MissingValue(key.name()))?;
        out.push_str(&encode(&value));

        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Percent-encodes a single URL component.
fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TapConfig {
        TapConfig::new("1234567890", NaiveDate::from_ymd_opt(2023, 4, 23).unwrap())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_url_from_start_date() {
        let builder = RequestBuilder::new(config());
        let url = builder.build_url(&RequestContext::new(), None).unwrap();
        assert_eq!(
            url,
            "https://openexchangerates.org/api/historical/2023-04-23.json"
        );
        assert!(url.ends_with("/historical/2023-04-23.json"));
    }

    #[test]
    fn test_url_precedence() {
        let builder = RequestBuilder::new(config());
        let context = RequestContext::new().with_bookmark(Some(date("2021-01-01")));

        let url = builder.build_url(&context, None).unwrap();
        assert!(url.ends_with("/historical/2021-01-01.json"));

        let token: PageToken = "2022-01-01".parse().unwrap();
        let url = builder.build_url(&context, Some(&token)).unwrap();
        assert!(url.ends_with("/historical/2022-01-01.json"));
        assert!(!url.contains("2021-01-01"));
    }

    #[test]
    fn test_url_never_has_placeholders() {
        let mut config = config();
        config.base = Some("USD".into());
        let builder = RequestBuilder::new(config).with_path("/historical/{date}/{base}.json");
        let context = RequestContext::new().with_value(TemplateKey::Base, "EUR");
        let url = builder.build_url(&context, None).unwrap();
        assert!(url.ends_with("/historical/2023-04-23/EUR.json"));
        assert!(!url.contains('{'));
        assert!(!url.contains('}'));
    }

    #[test]
    fn test_context_value_beats_config() {
        let mut config = config();
        config.base = Some("USD".into());
        config.symbols = Some(vec!["GBP".into()]);
        let builder = RequestBuilder::new(config);
        let context = RequestContext::new()
            .with_value(TemplateKey::Base, "EUR")
            .with_value(TemplateKey::Symbols, "ZWL,JPY")
            .with_value(TemplateKey::AppId, "other-key");

        let request = builder.build_request(&context, None).unwrap();
        assert!(
            request
                .url
                .ends_with("/historical/2023-04-23.json?app_id=other-key&base=EUR&symbols=ZWL,JPY")
        );
        assert!(!request.url.contains("USD"));
        assert!(!request.url.contains("GBP"));

        let request = builder.build_request(&RequestContext::new(), None).unwrap();
        assert!(request.url.ends_with("?app_id=1234567890&base=USD&symbols=GBP"));
    }

    #[test]
    fn test_missing_template_value_is_an_error() {
        let builder = RequestBuilder::new(config()).with_path("/historical/{date}/{symbols}.json");
        assert_eq!(
            builder.build_url(&RequestContext::new(), None),
            Err(TemplateError::MissingValue("symbols"))
        );

        let context = RequestContext::new().with_value(TemplateKey::Symbols, "ZWL");
        let url = builder.build_url(&context, None).unwrap();
        assert!(url.ends_with("/historical/2023-04-23/ZWL.json"));
    }

    #[test]
    fn test_api_url_trailing_slash() {
        let mut config = config();
        config.api_url = "http://127.0.0.1:8080/api/".into();
        let url = RequestBuilder::new(config)
            .build_url(&RequestContext::new(), None)
            .unwrap();
        assert_eq!(url, "http://127.0.0.1:8080/api/historical/2023-04-23.json");
    }

    #[test]
    fn test_query_params_base_and_symbols() {
        let mut config = config();
        config.base = Some("EUR".into());
        config.symbols = Some(vec!["ZWL".into(), "GBP".into()]);
        let request = RequestBuilder::new(config)
            .build_request(&RequestContext::new(), None)
            .unwrap();

        assert!(request.url.contains("base=EUR&symbols=ZWL,GBP"));
        assert!(request.url.contains("?app_id=1234567890&"));
    }

    #[test]
    fn test_query_params_only_app_id() {
        let builder = RequestBuilder::new(config());
        assert_eq!(
            builder.query_params(&RequestContext::new()),
            vec![("app_id", "1234567890".to_string())]
        );

        let request = builder.build_request(&RequestContext::new(), None).unwrap();
        assert!(!request.url.contains("base="));
        assert!(!request.url.contains("symbols="));
    }

    #[test]
    fn test_app_id_is_encoded() {
        let config = TapConfig::new("a b&c", date("2023-04-23"));
        let params = RequestBuilder::new(config).query_params(&RequestContext::new());
        assert_eq!(params[0].1, "a%20b%26c");
    }

    #[test]
    fn test_headers() {
        let builder = RequestBuilder::new(config());
        assert_eq!(
            builder.headers(),
            vec![("Accept", "application/json".to_string())]
        );

        let mut config = config();
        config.user_agent = Some("tap-openexchangerates/0.0.1".into());
        let headers = RequestBuilder::new(config).headers();
        assert!(headers.contains(&("User-Agent", "tap-openexchangerates/0.0.1".to_string())));
        assert!(headers.contains(&("Accept", "application/json".to_string())));
    }

    #[test]
    fn test_redacted_url_drops_query() {
        let request = RequestBuilder::new(config())
            .build_request(&RequestContext::new(), None)
            .unwrap();
        assert!(request.url.contains("app_id="));
        assert!(!request.redacted_url().contains("app_id"));
        assert!(request.redacted_url().ends_with(".json"));
    }

    #[test]
    fn test_render_template_lookup_order() {
        let lookup = |key: TemplateKey| match key {
            TemplateKey::Base => Some("EUR".to_string()),
            TemplateKey::Symbols => Some("ZWL,GBP".to_string()),
            _ => None,
        };
        assert_eq!(
            render_template("/latest/{base}/{symbols}", lookup).unwrap(),
            "/latest/EUR/ZWL%2CGBP"
        );
    }

    #[test]
    fn test_render_template_errors() {
        let lookup = |_: TemplateKey| None;
        assert_eq!(
            render_template("/x/{foo}.json", lookup),
            Err(TemplateError::UnknownPlaceholder("foo".into()))
        );
        assert_eq!(
            render_template("/x/{base}.json", lookup),
            Err(TemplateError::MissingValue("base"))
        );
        assert!(matches!(
            render_template("/x/{date.json", lookup),
            Err(TemplateError::Unterminated(_))
        ));
        assert_eq!(render_template("/plain.json", lookup).unwrap(), "/plain.json");
    }
}
