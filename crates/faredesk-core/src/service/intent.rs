//! Keyword intent router.
//!
//! Maps a user message to one of the closed set of support intents by
//! keyword matching over the lowercased text, and pulls out the entities
//! the extractor knows about (ticket number, phone number, email). This
//! is deliberately not NLP; a real language model sits outside this
//! repository.

use faredesk_types::chat::{ExtractedEntities, Intent, IntentKind};

/// Confidence assigned to a keyword match.
const KEYWORD_MATCH_SCORE: f64 = 0.9;

/// Confidence assigned to the general-inquiry fallback.
const FALLBACK_SCORE: f64 = 0.4;

/// Rules are checked in order; the first match wins. Cancellation before
/// lookup, since "cancel my ticket" mentions both.
const RULES: &[(IntentKind, &[&str])] = &[
    (
        IntentKind::TicketCancellation,
        &["cancel", "cancellation", "don't want to fly"],
    ),
    (
        IntentKind::RefundInquiry,
        &["refund", "money back", "reimburse"],
    ),
    (
        IntentKind::BaggagePolicy,
        &["baggage", "luggage", "suitcase"],
    ),
    (
        IntentKind::TicketLookup,
        &["ticket", "booking", "reservation", "itinerary"],
    ),
];

/// Detects user intent with keyword matching.
#[derive(Debug, Clone, Default)]
pub struct IntentDetector;

impl IntentDetector {
    pub fn new() -> Self {
        Self
    }

    /// Analyze user input to detect intent and extract entities.
    pub fn detect(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();
        let entities = extract_entities(text);

        for (kind, keywords) in RULES {
            if keywords.iter().any(|kw| lowered.contains(kw)) {
                return Intent {
                    kind: *kind,
                    score: KEYWORD_MATCH_SCORE,
                    entities,
                };
            }
        }

        Intent {
            kind: IntentKind::GeneralInquiry,
            score: FALLBACK_SCORE,
            entities,
        }
    }
}

/// Pull known entities out of the text.
fn extract_entities(text: &str) -> ExtractedEntities {
    ExtractedEntities {
        ticket_number: extract_ticket_number(text),
        phone_number: extract_phone_number(text),
        email: extract_email(text),
    }
}

/// Find a ticket number of the form `TKT-xxxxxxxx` (eight hex chars),
/// case-insensitive.
fn extract_ticket_number(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let start = lowered.find("tkt-")?;
    let suffix: String = lowered[start + 4..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();

    if suffix.len() >= 8 {
        Some(format!("TKT-{}", &suffix[..8]))
    } else {
        None
    }
}

/// Find the first run of at least seven digits, tolerating separators.
fn extract_phone_number(text: &str) -> Option<String> {
    for word in text.split_whitespace() {
        let digits: String = word.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= 7 {
            let normalized = if word.starts_with('+') {
                format!("+{digits}")
            } else {
                digits
            };
            return Some(normalized);
        }
    }
    None
}

/// Find the first token that looks like an email address.
fn extract_email(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '@'))
        .find(|word| {
            let Some((local, domain)) = word.split_once('@') else {
                return false;
            };
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        })
        .map(str::to_string)
}
