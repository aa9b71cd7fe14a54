//! Built-in debater persona templates

use serde::{Deserialize, Serialize};

/// Debate approach of a persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaStyle {
    Aggressive,
    Diplomatic,
    Analytical,
    Socratic,
}

/// Reusable persona with a prompt template
///
/// `system_prompt_template` carries a `{stance}` placeholder filled in when
/// the persona is bound to a concrete debate position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaTemplate {
    pub persona_id: String,
    pub name: String,
    pub expertise: String,
    pub debate_style: PersonaStyle,
    pub description: String,
    pub system_prompt_template: String,
    pub suggested_temperature: f32,
    pub suggested_max_tokens: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PersonaTemplate {
    /// Substitute the `{stance}` placeholder with a concrete position
    pub fn render_system_prompt(&self, stance: &str) -> String {
        self.system_prompt_template.replace("{stance}", stance)
    }
}

fn persona(
    persona_id: &str,
    name: &str,
    expertise: &str,
    debate_style: PersonaStyle,
    description: &str,
    system_prompt_template: &str,
    suggested_temperature: f32,
    tags: &[&str],
) -> PersonaTemplate {
    PersonaTemplate {
        persona_id: persona_id.to_string(),
        name: name.to_string(),
        expertise: expertise.to_string(),
        debate_style,
        description: description.to_string(),
        system_prompt_template: system_prompt_template.to_string(),
        suggested_temperature,
        suggested_max_tokens: 1024,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// The built-in persona catalog
pub fn persona_catalog() -> Vec<PersonaTemplate> {
    vec![
        persona(
            "prosecutor",
            "The Prosecutor",
            "Law and argumentation",
            PersonaStyle::Aggressive,
            "Relentless cross-examiner who attacks weak points head-on",
            "You are a seasoned prosecutor arguing {stance}. Dismantle opposing \
             arguments point by point, demand evidence for every claim, and press \
             contradictions without mercy. Stay sharp and factual.",
            0.9,
            &["confrontational", "legal"],
        ),
        persona(
            "diplomat",
            "The Diplomat",
            "International negotiation",
            PersonaStyle::Diplomatic,
            "Measured consensus-builder who wins by framing common ground",
            "You are a career diplomat arguing {stance}. Acknowledge the merits of \
             opposing views before showing why your position serves everyone \
             better. Stay courteous, constructive and quietly persuasive.",
            0.8,
            &["measured", "persuasive"],
        ),
        persona(
            "scientist",
            "The Scientist",
            "Empirical research",
            PersonaStyle::Analytical,
            "Evidence-first analyst who reasons from data and studies",
            "You are a research scientist arguing {stance}. Ground every claim in \
             evidence, cite the strongest available findings, quantify uncertainty \
             honestly and dismantle arguments that lack data.",
            0.6,
            &["evidence", "rigorous"],
        ),
        persona(
            "philosopher",
            "The Philosopher",
            "Ethics and logic",
            PersonaStyle::Socratic,
            "Question-driven thinker who exposes hidden assumptions",
            "You are a philosopher arguing {stance}. Probe the assumptions behind \
             opposing arguments with pointed questions, reason from first \
             principles and build your case through careful logical steps.",
            1.0,
            &["abstract", "probing"],
        ),
        persona(
            "populist",
            "The Populist",
            "Public rhetoric",
            PersonaStyle::Aggressive,
            "Crowd-pleasing orator who argues from lived experience",
            "You are a fiery public speaker arguing {stance}. Speak plainly, use \
             vivid everyday examples, appeal to common sense and make the opposing \
             side sound out of touch.",
            1.2,
            &["rhetorical", "accessible"],
        ),
    ]
}

/// Look up one persona template by id
pub fn persona_by_id(persona_id: &str) -> Option<PersonaTemplate> {
    persona_catalog()
        .into_iter()
        .find(|p| p.persona_id == persona_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn persona_ids_are_unique() {
        let catalog = persona_catalog();
        let ids: HashSet<_> = catalog.iter().map(|p| p.persona_id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.len() >= 4);
    }

    #[test]
    fn templates_render_the_stance() {
        let prosecutor = persona_by_id("prosecutor").unwrap();
        let prompt = prosecutor.render_system_prompt("in favor of night trains");
        assert!(prompt.contains("in favor of night trains"));
        assert!(!prompt.contains("{stance}"));
    }

    #[test]
    fn unknown_persona_is_none() {
        assert!(persona_by_id("nonexistent").is_none());
    }
}
