//! Content negotiation for the change request collection.

use http::HeaderMap;
use http::header::ACCEPT;

pub const RDF_XML: &str = "application/rdf+xml";
pub const TURTLE: &str = "text/turtle";
pub const HTML: &str = "text/html";

/// RDF serializations accepted as request payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RdfSyntax {
    RdfXml,
    Turtle,
}

impl RdfSyntax {
    /// Picks the syntax from a `Content-Type` value. Parameters such as
    /// `charset` are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim_start().to_ascii_lowercase();
        if content_type.starts_with(RDF_XML) {
            Some(RdfSyntax::RdfXml)
        } else if content_type.starts_with(TURTLE) {
            Some(RdfSyntax::Turtle)
        } else {
            None
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            RdfSyntax::RdfXml => RDF_XML,
            RdfSyntax::Turtle => TURTLE,
        }
    }
}

/// Representations the collection can be rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionFormat {
    Html,
    RdfXml,
}

impl CollectionFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            CollectionFormat::Html => "text/html; charset=utf-8",
            CollectionFormat::RdfXml => "application/rdf+xml; charset=utf-8",
        }
    }
}

/// HTML wins when the client takes it and HTML is enabled, then RDF/XML.
pub fn select_collection_format(headers: &HeaderMap, provide_html: bool) -> Option<CollectionFormat> {
    if provide_html && will_accept(HTML, headers) {
        Some(CollectionFormat::Html)
    } else if will_accept(RDF_XML, headers) {
        Some(CollectionFormat::RdfXml)
    } else {
        None
    }
}

/// Whether the `Accept` headers admit `media_type` with a non-zero quality.
///
/// The most specific matching range decides: `text/html` over `text/*` over
/// `*/*`. Among equally specific ranges the highest quality wins. Without any
/// `Accept` header every media type is acceptable.
pub fn will_accept(media_type: &str, headers: &HeaderMap) -> bool {
    let mut values = headers.get_all(ACCEPT).iter().peekable();
    if values.peek().is_none() {
        return true;
    }

    let media_type = media_type.to_ascii_lowercase();
    let best = values
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(MediaRange::parse)
        .filter_map(|range| {
            range
                .specificity(&media_type)
                .map(|specificity| (specificity, range.quality))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    matches!(best, Some((_, quality)) if quality > 0.0)
}

#[derive(Debug, PartialEq)]
struct MediaRange {
    range: String,
    quality: f32,
}

impl MediaRange {
    fn parse(entry: &str) -> Option<Self> {
        let mut parts = entry.split(';');
        let range = parts.next()?.trim().to_ascii_lowercase();
        if range.is_empty() {
            return None;
        }

        let mut quality = 1.0;
        for param in parts {
            if let Some((name, value)) = param.split_once('=')
                && name.trim().eq_ignore_ascii_case("q")
            {
                // A malformed q-value disqualifies the range rather than the whole header
                quality = value.trim().parse().unwrap_or(0.0);
            }
        }

        Some(MediaRange { range, quality })
    }

    /// How closely the range names `media_type`: 2 exact, 1 `type/*`, 0 `*/*`.
    /// `None` when it doesn't match at all.
    fn specificity(&self, media_type: &str) -> Option<u8> {
        if self.range == media_type {
            return Some(2);
        }
        if self.range == "*/*" {
            return Some(0);
        }
        match (self.range.strip_suffix("/*"), media_type.split_once('/')) {
            (Some(range_type), Some((main_type, _))) if range_type == main_type => Some(1),
            _ => None,
        }
    }
}
