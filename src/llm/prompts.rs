use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{BriefAnalyzerError, Result};
use crate::llm::types::ChatMessage;
use crate::schema::AnalysisResult;

pub const SYSTEM_PROMPT: &str = "Tu es un expert en gestion de projets digitaux. Ton rôle est d'analyser des briefs clients et de produire un JSON structuré contenant une analyse, des questions de clarification, des alternatives créatives, et une structure projet. Sois rigoureux, pertinent, et professionnel.";

/// Level fields are parsed strictly, so the allowed values are spelled out.
const LEVEL_RULE: &str = "Les champs \"importance\" et \"priority\" prennent uniquement l'une des valeurs \"low\", \"medium\" ou \"high\", en anglais et en minuscules.";

/// Sample brief offered to first-time users.
pub const EXAMPLE_BRIEF: &str = r#"Nom du projet: App de réservation de vélos électriques "EcoCycle"

Client: GreenMobility SA

Contexte:
GreenMobility est une entreprise de mobilité durable qui souhaite lancer un service de location de vélos électriques dans 5 grandes villes françaises. Pour répondre à la demande croissante de mobilité verte, l'entreprise souhaite développer une application mobile permettant aux utilisateurs de localiser, réserver et déverrouiller des vélos électriques.

Objectifs:
- Permettre aux utilisateurs de trouver facilement des vélos disponibles près de chez eux
- Simplifier le processus de réservation et de paiement
- Encourager l'utilisation régulière via un programme de fidélité
- Recueillir des données sur l'utilisation pour optimiser la distribution des vélos
- Réduire l'empreinte carbone des déplacements urbains

Public cible:
- Urbains actifs (25-45 ans)
- Étudiants (18-25 ans)
- Professionnels en déplacement
- Touristes

Fonctionnalités requises:
1. Carte interactive montrant les stations et vélos disponibles
2. Système de réservation avec paiement intégré
3. QR code pour déverrouiller le vélo
4. Suivi des trajets (distance, calories, CO2 économisé)
5. Programme de fidélité avec points convertibles
6. Reporting de problèmes techniques
7. Système de notation des vélos et stations

Contraintes techniques:
- Compatibilité iOS et Android
- Développement en React Native
- API REST pour la communication avec le back-end
- Intégration avec des systèmes de paiement (Stripe)

Budget: 75 000 € - 90 000 €
Délai: 4 mois"#;

/// A non-empty, trimmed client brief.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brief(String);

impl Brief {
    pub fn new(text: impl AsRef<str>) -> Result<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BriefAnalyzerError::EmptyInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptOptions {
    /// Append the JSON Schema of the expected answer after the skeleton.
    #[serde(default)]
    pub include_json_schema: bool,
}

/// Empty answer skeleton showing the model the expected shape.
pub fn response_template() -> serde_json::Value {
    json!({
        "analysis": {
            "strengths": ["..."],
            "weaknesses": ["..."],
            "missing_information": ["..."],
            "coherence_score": 0.0,
            "completeness_score": 0.0
        },
        "clarification_questions": [
            {
                "question": "...",
                "category": "...",
                "importance": "low|medium|high",
                "reason": "..."
            }
        ],
        "alternative_views": {
            "functional_approaches": [
                {
                    "title": "...",
                    "description": "...",
                    "benefits": ["..."],
                    "considerations": ["..."]
                }
            ],
            "technical_approaches": [
                {
                    "title": "...",
                    "description": "...",
                    "benefits": ["..."],
                    "considerations": ["..."]
                }
            ]
        },
        "project_structure": {
            "phases": [
                {
                    "name": "...",
                    "objectives": ["..."],
                    "deliverables": ["..."],
                    "tasks": [
                        {
                            "name": "...",
                            "estimated_hours": 0,
                            "priority": "low|medium|high",
                            "dependencies": ["..."]
                        }
                    ]
                }
            ],
            "estimated_total_hours": 0,
            "recommended_team_size": 0
        }
    })
}

pub struct PromptBuilder {
    system_prompt: String,
    options: PromptOptions,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            options: PromptOptions::default(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_options(mut self, options: PromptOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the system + user message pair for one brief.
    pub fn build(&self, brief: &Brief) -> Vec<ChatMessage> {
        let skeleton = serde_json::to_string_pretty(&response_template())
            .unwrap_or_else(|_| response_template().to_string());

        let mut user = format!(
            "Voici le brief client à analyser :\n\n{}\n\n{}\n\nVoici la structure de réponse attendue en français :\n\n{}",
            brief.as_str(),
            LEVEL_RULE,
            skeleton
        );

        if self.options.include_json_schema {
            let schema = serde_json::to_string_pretty(&AnalysisResult::json_schema())
                .unwrap_or_default();
            user.push_str("\n\nLa réponse doit respecter ce JSON Schema :\n\n");
            user.push_str(&schema);
        }

        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(user),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Role;

    fn extract_skeleton(user: &str) -> &str {
        let start = user.find("attendue en français :\n\n").unwrap() + "attendue en français :\n\n".len();
        &user[start..]
    }

    #[test]
    fn test_blank_brief_rejected() {
        assert!(matches!(Brief::new("   \n\t"), Err(BriefAnalyzerError::EmptyInput)));
    }

    #[test]
    fn test_brief_is_trimmed() {
        assert_eq!(Brief::new("  Build a todo app \n").unwrap().as_str(), "Build a todo app");
    }

    #[test]
    fn test_messages_contain_brief_and_valid_skeleton() {
        let brief = Brief::new("Build a todo app").unwrap();
        let messages = PromptBuilder::new().build(&brief);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("Build a todo app"));

        let skeleton: serde_json::Value =
            serde_json::from_str(extract_skeleton(&messages[1].content)).unwrap();
        assert_eq!(skeleton, response_template());
    }

    #[test]
    fn test_level_values_are_named() {
        let brief = Brief::new("Build a todo app").unwrap();
        let user = &PromptBuilder::new().build(&brief)[1].content;
        assert!(user.contains(LEVEL_RULE));
        let skeleton: serde_json::Value = serde_json::from_str(extract_skeleton(user)).unwrap();
        assert_eq!(
            skeleton["clarification_questions"][0]["importance"],
            "low|medium|high"
        );
        assert_eq!(
            skeleton["project_structure"]["phases"][0]["tasks"][0]["priority"],
            "low|medium|high"
        );
    }

    #[test]
    fn test_schema_appended_on_request() {
        let brief = Brief::new("x").unwrap();
        let messages = PromptBuilder::new()
            .with_options(PromptOptions {
                include_json_schema: true,
            })
            .build(&brief);
        assert!(messages[1].content.contains("JSON Schema"));
        assert!(messages[1].content.contains("recommended_team_size"));
    }

    #[test]
    fn test_example_brief_is_usable() {
        assert!(Brief::new(EXAMPLE_BRIEF).is_ok());
    }
}
