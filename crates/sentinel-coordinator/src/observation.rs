//! Observation boundary inputs.
//!
//! The host environment (page DOM, form listeners, request hooks)
//! produces these records; the pipeline only consumes them. Body text
//! extraction and password stripping happen here so nothing sensitive
//! travels further than it must.

use async_trait::async_trait;

/// Kind of a form field, as reported by the host boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain text input
    Text,
    /// Email input
    Email,
    /// Password input — never scanned, under any configuration
    Password,
    /// Textarea or other free-text control
    Other,
}

/// One input event on a form field.
#[derive(Debug, Clone)]
pub struct FieldInput {
    /// Stable identifier of the field within the page
    pub field_id: String,
    /// Field kind
    pub kind: FieldKind,
    /// Current full value of the field
    pub value: String,
}

/// A form about to be submitted, with its serializable field map.
#[derive(Debug, Clone)]
pub struct FormSubmission {
    /// Field name, kind, and value triples
    pub fields: Vec<(String, FieldKind, String)>,
}

/// Text content of one DOM node touched by a mutation.
#[derive(Debug, Clone)]
pub struct TextNode {
    /// Stable node identifier assigned by the observation boundary
    pub node_id: u64,
    /// The node's text content
    pub text: String,
}

/// A batch of subtree-mutation records.
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// Added or changed nodes with text content
    pub nodes: Vec<TextNode>,
}

/// Best-effort reconstruction of an outbound request body.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Form-encoded key/value pairs
    FormPairs(Vec<(String, String)>),
    /// Raw byte segments
    Raw(Vec<Vec<u8>>),
}

/// Descriptor for one outbound network request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Reconstructed body, if any
    pub body: Option<RequestBody>,
}

impl OutboundRequest {
    /// Extract the scannable text from this request.
    ///
    /// Only POST requests with a non-empty body are considered. Form
    /// pairs whose key contains a case-insensitive "password"/"passwd"
    /// substring are stripped before aggregation; raw segments that are
    /// not valid UTF-8 are skipped individually, never failing the
    /// whole request.
    #[must_use]
    pub fn scannable_text(&self) -> Option<String> {
        if !self.method.eq_ignore_ascii_case("POST") {
            return None;
        }

        let body = self.body.as_ref()?;
        let text = match body {
            RequestBody::FormPairs(pairs) => pairs
                .iter()
                .filter(|(key, _)| !is_password_key(key))
                .map(|(_, value)| value.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            RequestBody::Raw(segments) => segments
                .iter()
                .filter_map(|segment| match std::str::from_utf8(segment) {
                    Ok(s) => Some(s),
                    Err(e) => {
                        tracing::debug!("Skipping undecodable body segment: {e}");
                        None
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        };

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Whether a form key names a password field.
#[must_use]
pub fn is_password_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    lower.contains("password") || lower.contains("passwd")
}

/// Extract the host portion of a URL, for whitelist checks.
///
/// Returns an empty string when the URL has no recognizable authority.
#[must_use]
pub fn host_of(url: &str) -> &str {
    let after_scheme = url.split_once("//").map_or(url, |(_, rest)| rest);
    let authority = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_scheme);
    // Drop userinfo and port
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    host.split_once(':').map_or(host, |(host, _)| host)
}

/// One event from an observation channel.
#[derive(Debug, Clone)]
pub enum Observation {
    /// A form field changed
    FieldInput(FieldInput),
    /// A form field lost focus
    FieldBlur {
        /// Identifier of the blurred field
        field_id: String,
    },
    /// A form is about to be submitted
    FormSubmit(FormSubmission),
    /// Initial full-page content is available
    PageLoad {
        /// Full page text
        text: String,
    },
    /// A DOM subtree mutated
    Mutations(MutationBatch),
    /// An outbound request was observed
    Request(OutboundRequest),
}

/// A cancellable, lazily produced sequence of observations.
///
/// The supervisor drives a source into the coordinator's entry points;
/// returning `None` ends the stream. Implementations wrap the host
/// environment's listeners (field events, MutationObserver records,
/// request hooks).
#[async_trait]
pub trait ObservationSource: Send {
    /// Wait for the next observation, or `None` when the source is
    /// exhausted or cancelled.
    async fn next(&mut self) -> Option<Observation>;

    /// Detach from the host environment; subsequent `next` calls
    /// return `None`.
    fn cancel(&mut self);
}
