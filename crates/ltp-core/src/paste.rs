//! Paste upload request/response for the pastebin-style form API.

use std::borrow::Cow;

use crate::{domain::OutboundMessage, errors::OffloadError};

/// Largest response body accepted from the paste service. A paste URL is a
/// few dozen bytes; anything near this is not a URL.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Prefix pastebin uses for API errors, which arrive with HTTP 200.
const REJECTION_PREFIX: &str = "Bad API request";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteVisibility {
    Unlisted,
}

impl PasteVisibility {
    pub fn as_form_value(self) -> &'static str {
        match self {
            Self::Unlisted => "1",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteExpiry {
    Never,
}

impl PasteExpiry {
    pub fn as_form_value(self) -> &'static str {
        match self {
            Self::Never => "N",
        }
    }
}

/// One paste upload, built per qualifying message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasteRequest {
    pub api_dev_key: String,
    pub paste_name: String,
    pub paste_body: String,
    pub visibility: PasteVisibility,
    pub expiry: PasteExpiry,
}

impl PasteRequest {
    pub fn for_message(msg: &OutboundMessage, api_dev_key: &str) -> Self {
        Self {
            api_dev_key: api_dev_key.to_string(),
            paste_name: format!("{} wrote", msg.originator),
            paste_body: msg.body.clone(),
            visibility: PasteVisibility::Unlisted,
            expiry: PasteExpiry::Never,
        }
    }

    /// Form fields in wire order, values not yet encoded.
    pub fn form_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("api_option", "paste"),
            ("api_dev_key", self.api_dev_key.as_str()),
            ("api_paste_code", self.paste_body.as_str()),
            ("api_paste_name", self.paste_name.as_str()),
            ("api_paste_private", self.visibility.as_form_value()),
            ("api_paste_expire_date", self.expiry.as_form_value()),
        ]
    }

    /// `application/x-www-form-urlencoded` body with every value
    /// percent-encoded.
    pub fn to_form_body(&self) -> String {
        self.form_fields()
            .iter()
            .map(|(k, v)| format!("{k}={}", encode_form_value(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Percent-encode everything except unreserved characters (RFC 3986), UTF-8
/// first. Spaces become `%20`.
pub fn encode_form_value(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Validated paste service answer: the reference to embed in the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasteResponse {
    text: String,
}

impl PasteResponse {
    /// Validate the accumulated response body.
    ///
    /// Surrounding whitespace (pastebin sometimes ends with a newline) is
    /// dropped; an empty, non-UTF-8, oversized or rejection body is an error.
    pub fn from_body(body: Vec<u8>) -> Result<Self, OffloadError> {
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(OffloadError::InvalidResponse {
                reason: format!("response exceeds {MAX_RESPONSE_BYTES} bytes"),
            });
        }
        let text = String::from_utf8(body).map_err(|e| OffloadError::InvalidResponse {
            reason: format!("response is not UTF-8: {e}"),
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(OffloadError::EmptyResponse);
        }
        if text.starts_with(REJECTION_PREFIX) {
            return Err(OffloadError::Rejected {
                reason: text.to_string(),
            });
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Origin, TargetKind};

    fn decode_form_value(value: &str) -> Cow<'_, str> {
        urlencoding::decode(value).unwrap()
    }

    fn request(body: &str) -> PasteRequest {
        let msg = OutboundMessage::new("alice", body, TargetKind::Channel, Origin::Local);
        PasteRequest::for_message(&msg, "dev123")
    }

    #[test]
    fn form_body_has_fixed_fields_in_order() {
        let body = request("hello").to_form_body();
        assert_eq!(
            body,
            "api_option=paste&api_dev_key=dev123&api_paste_code=hello\
             &api_paste_name=alice%20wrote&api_paste_private=1&api_paste_expire_date=N"
        );
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let body = request("a=1&b=2 100% done").to_form_body();
        assert!(body.contains("api_paste_code=a%3D1%26b%3D2%20100%25%20done&"));
        // exactly the six separators between fields
        assert_eq!(body.matches('&').count(), 5);
    }

    #[test]
    fn encoding_round_trips() {
        for s in [
            "a & b = c",
            "100% legit",
            "tabs\tand\nnewlines  ",
            "żółć 日本語 🚀",
            "plus+sign/slash?query#frag",
            "",
        ] {
            let encoded = encode_form_value(s);
            assert!(!encoded.contains(&['&', '=', ' ', '\n'][..]));
            assert_eq!(decode_form_value(&encoded), s);
        }
    }

    #[test]
    fn paste_name_is_originator_wrote() {
        let req = request("x");
        assert_eq!(req.paste_name, "alice wrote");
        assert_eq!(req.visibility, PasteVisibility::Unlisted);
        assert_eq!(req.expiry, PasteExpiry::Never);
    }

    #[test]
    fn response_is_trimmed_url() {
        let resp = PasteResponse::from_body(b"https://pastebin.com/abc\r\n".to_vec()).unwrap();
        assert_eq!(resp.text(), "https://pastebin.com/abc");
    }

    #[test]
    fn bad_responses_are_errors() {
        assert_eq!(
            PasteResponse::from_body(Vec::new()),
            Err(OffloadError::EmptyResponse)
        );
        assert_eq!(
            PasteResponse::from_body(b" \n".to_vec()),
            Err(OffloadError::EmptyResponse)
        );
        assert!(matches!(
            PasteResponse::from_body(vec![0xff, 0xfe, 0x00]),
            Err(OffloadError::InvalidResponse { .. })
        ));
        assert!(matches!(
            PasteResponse::from_body(vec![b'a'; MAX_RESPONSE_BYTES + 1]),
            Err(OffloadError::InvalidResponse { .. })
        ));
        assert!(matches!(
            PasteResponse::from_body(b"Bad API request, invalid api_dev_key".to_vec()),
            Err(OffloadError::Rejected { .. })
        ));
    }
}
