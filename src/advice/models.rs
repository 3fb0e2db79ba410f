use serde::{Deserialize, Serialize};

/// A title + URI pair attributing part of an answer to an external reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Grounding citation as the external service reports it. Web results and
/// location results arrive in different shapes downstream; both carry the
/// same title + URI payload and normalize to [`Source`] for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Citation {
    Web(Source),
    Place(Source),
}

impl Citation {
    pub fn into_source(self) -> Source {
        match self {
            Citation::Web(s) | Citation::Place(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One role-tagged message on the wire to the advice service.
/// Roles are restricted to the two-value vocabulary the service accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTurn {
    pub role: String,
    pub text: String,
}

/// Fully composed outbound request: system instruction, ordered turns, and
/// an optional location bias. When `location` is `None` the provider must
/// not send any location parameter at all.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRequest {
    pub system_instruction: String,
    pub turns: Vec<WireTurn>,
    pub location: Option<GeoPoint>,
}

/// Raw provider output before normalization. `text` may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Normalized result handed back to callers. Always well-formed: failures
/// upstream are absorbed into fixed fallback text and an empty source list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub text: String,
    pub sources: Vec<Source>,
}
