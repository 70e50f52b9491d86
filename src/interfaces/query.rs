use crate::domain::session::SessionId;
use crate::error::{CheckoutError, Result};
use url::Url;

pub const SESSION_ID_PARAM: &str = "session_id";

/// Session id carried by the provider's return URL, if any.
pub fn session_id_from_url(url: &Url) -> Option<SessionId> {
    url.query_pairs()
        .find(|(key, _)| key == SESSION_ID_PARAM)
        .and_then(|(_, value)| SessionId::new(value))
}

/// Accepts an absolute URL or a path (with query) relative to `origin`.
pub fn parse_return_url(raw: &str, origin: &Url) -> Result<Url> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => origin
            .join(raw)
            .map_err(|e| CheckoutError::Config(format!("invalid return URL {raw:?}: {e}"))),
        Err(e) => Err(CheckoutError::Config(format!(
            "invalid return URL {raw:?}: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://shop.example.com/").unwrap()
    }

    #[test]
    fn test_session_id_present() {
        let url = Url::parse("https://shop.example.com/checkout/success?session_id=cs_123").unwrap();
        assert_eq!(session_id_from_url(&url).unwrap().as_str(), "cs_123");
    }

    #[test]
    fn test_session_id_missing_or_blank() {
        for raw in [
            "https://shop.example.com/checkout/success",
            "https://shop.example.com/checkout/success?session_id=",
            "https://shop.example.com/checkout/success?other=1",
        ] {
            let url = Url::parse(raw).unwrap();
            assert!(session_id_from_url(&url).is_none(), "{raw}");
        }
    }

    #[test]
    fn test_session_id_percent_decoded() {
        let url = Url::parse("https://shop.example.com/s?session_id=cs%5F1").unwrap();
        assert_eq!(session_id_from_url(&url).unwrap().as_str(), "cs_1");
    }

    #[test]
    fn test_relative_return_url() {
        let url = parse_return_url("/checkout/success?session_id=cs_9", &origin()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://shop.example.com/checkout/success?session_id=cs_9"
        );
    }
}
