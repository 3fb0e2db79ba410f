use tracing::error;

use crate::advice::models::{Advice, AdviceRequest, GeoPoint, WireTurn};
use crate::advice::AdviceProvider;
use crate::db::models::Turn;
use crate::profile::Profile;

/// Fixed persona preamble sent ahead of every conversation.
const PERSONA: &str = "You are PawPal, a knowledgeable and friendly dog-care assistant. \
You give practical, breed-aware advice on nutrition, training, grooming and everyday health. \
For any question that could indicate a serious medical issue, urge the owner to contact a \
licensed veterinarian rather than relying on this chat. \
Keep answers concise, use short paragraphs, and use bullet points for step-by-step guidance.";

/// Shown when the service answers but produces no text.
pub const FALLBACK_EMPTY: &str =
    "Sorry, I was unable to process that question. Could you try rephrasing it?";

/// Shown when the call to the service fails outright.
pub const FALLBACK_ERROR: &str =
    "Sorry, something went wrong while fetching advice. Please try again in a moment.";

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}

fn profile_block(profile: &Profile) -> String {
    format!(
        "\n\nThe owner has shared a profile for their dog. Personalize your advice to it:\n\
        - Name: {}\n\
        - Breed: {}\n\
        - Age: {}\n\
        - Weight: {}\n\
        - Allergies: {}\n\
        - Medical conditions: {}\n\
        - Home location: {}\n\
        When the owner asks about services \"near home\", prefer the home location above \
        over any live GPS position attached to the request.",
        profile.name.trim(),
        or_placeholder(&profile.breed, "Unknown"),
        or_placeholder(&profile.age, "Unknown"),
        or_placeholder(&profile.weight, "Unknown"),
        or_placeholder(&profile.allergies, "None listed"),
        or_placeholder(&profile.conditions, "None listed"),
        or_placeholder(&profile.home_location, "Not specified"),
    )
}

/// Normalizes a stored role into the two-value vocabulary the service
/// accepts. Anything that is not a user turn is sent as the assistant.
fn wire_role(role: &str) -> &'static str {
    if role == "user" {
        "user"
    } else {
        "assistant"
    }
}

/// Builds the outbound request: persona (plus profile block when a named
/// profile exists), full history with the new prompt appended as the final
/// user turn, and the location passed through only when present. The caller's
/// history is not mutated.
pub fn compose(
    prompt: &str,
    history: &[Turn],
    location: Option<GeoPoint>,
    profile: Option<&Profile>,
) -> AdviceRequest {
    let mut system_instruction = PERSONA.to_string();
    if let Some(p) = profile {
        if !p.name.trim().is_empty() {
            system_instruction.push_str(&profile_block(p));
        }
    }

    let mut turns: Vec<WireTurn> = history
        .iter()
        .map(|t| WireTurn {
            role: wire_role(&t.role).to_string(),
            text: t.content.clone(),
        })
        .collect();
    turns.push(WireTurn {
        role: "user".to_string(),
        text: prompt.to_string(),
    });

    AdviceRequest {
        system_instruction,
        turns,
        location,
    }
}

/// Composes the request, calls the provider, and normalizes the outcome.
/// This boundary never fails: an empty answer becomes a fixed fallback text
/// and any provider error becomes a fixed apology with no sources. Retry
/// policy, if any, belongs to the provider.
pub async fn ask(
    provider: &dyn AdviceProvider,
    prompt: &str,
    history: &[Turn],
    location: Option<GeoPoint>,
    profile: Option<&Profile>,
) -> Advice {
    let request = compose(prompt, history, location, profile);

    match provider.generate(&request).await {
        Ok(reply) => {
            let text = if reply.text.trim().is_empty() {
                FALLBACK_EMPTY.to_string()
            } else {
                reply.text
            };
            let sources = reply
                .citations
                .into_iter()
                .map(|c| c.into_source())
                .collect();
            Advice { text, sources }
        }
        Err(e) => {
            error!("Advice provider '{}' failed: {}", provider.name(), e);
            Advice {
                text: FALLBACK_ERROR.to_string(),
                sources: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn turn(role: &str, content: &str) -> Turn {
        Turn {
            id: 0,
            session_id: uuid::Uuid::nil(),
            role: role.to_string(),
            content: content.to_string(),
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn location_is_omitted_when_absent() {
        let req = compose("hi", &[], None, None);
        assert!(req.location.is_none());

        let point = GeoPoint { lat: 44.98, lng: -93.27 };
        let req = compose("hi", &[], Some(point), None);
        assert_eq!(req.location, Some(point));
    }

    #[test]
    fn prompt_is_appended_as_final_user_turn() {
        let history = vec![turn("user", "hello"), turn("assistant", "hi there")];
        let req = compose("next question", &history, None, None);

        assert_eq!(req.turns.len(), 3);
        assert_eq!(req.turns[2].role, "user");
        assert_eq!(req.turns[2].text, "next question");
        // History order preserved, roles already in the wire vocabulary.
        assert_eq!(req.turns[0].role, "user");
        assert_eq!(req.turns[1].role, "assistant");
    }

    #[test]
    fn unknown_roles_map_to_assistant() {
        let history = vec![turn("model", "generated text")];
        let req = compose("q", &history, None, None);
        assert_eq!(req.turns[0].role, "assistant");
    }

    #[test]
    fn profile_block_requires_a_name() {
        let anonymous = Profile {
            breed: "Poodle".to_string(),
            ..Default::default()
        };
        let req = compose("q", &[], None, Some(&anonymous));
        assert!(!req.system_instruction.contains("Poodle"));

        let named = Profile {
            name: "Rex".to_string(),
            breed: "Poodle".to_string(),
            ..Default::default()
        };
        let req = compose("q", &[], None, Some(&named));
        assert!(req.system_instruction.contains("Name: Rex"));
        assert!(req.system_instruction.contains("Breed: Poodle"));
        assert!(req.system_instruction.contains("Age: Unknown"));
        assert!(req.system_instruction.contains("Medical conditions: None listed"));
        assert!(req.system_instruction.contains("Home location: Not specified"));
        assert!(req.system_instruction.contains("near home"));
    }
}
