use encoding_rs::Encoding;
use url::Url;

/// A live page read, decoded to UTF-8.
#[derive(Debug)]
pub struct PageResponse {
    /// Where the request ended up after redirects. Relative links resolve
    /// against this.
    pub url_final: Url,
    pub body_utf8: String,
    /// The encoding the body was decoded from.
    pub encoding: &'static Encoding,
}
