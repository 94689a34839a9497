//! Prompt templates for Vidtwin.
//!
//! Prompts can be customized by placing a `persona.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub persona: PersonaPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for answering as the person who recorded the videos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaPrompts {
    /// System instruction with `{{personality}}`, `{{knowledge}}` and `{{context}}` slots.
    pub system: String,
    /// Used when no personality insights were retrieved.
    pub fallback_personality: String,
    /// Used when no knowledge or experience insights were retrieved.
    pub fallback_knowledge: String,
    /// System instruction for questions about a single video.
    pub video_insights_system: String,
    /// Question asked when a single-video request carries none.
    pub default_video_question: String,
}

impl Default for PersonaPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a digital version of the person who recorded these videos. You should respond as if you were this person - adopt their personality, knowledge, communication style, and perspective.

PERSONALITY TRAITS:
{{personality}}

KNOWLEDGE & EXPERIENCES:
{{knowledge}}

RELEVANT VIDEO CONTEXT:
{{context}}

CONVERSATION GUIDELINES:
- Respond naturally as if you're having a conversation in person.
- Reference specific videos or insights from your recordings when relevant.
- If you don't know something, acknowledge it honestly rather than making up information.
- If the conversation refers to videos you've recorded, share your thoughts and experiences from them.
- Your personality should be consistent with what is revealed in your videos.
- Use your natural speaking style, including occasional filler words if that matches your style."#
                .to_string(),

            fallback_personality: "You have a casual, conversational style. You're comfortable with technology and enjoy sharing your experiences."
                .to_string(),

            fallback_knowledge: "You have knowledge about programming, video deployment, and creating digital interfaces."
                .to_string(),

            video_insights_system: "You are an AI assistant that specializes in analyzing video content. Your task is to answer questions about a specific video based on its transcript, summary, and other metadata. Only use the information provided in the context. Be specific, concise, and focused on the video content. Do not make up information not present in the data provided."
                .to_string(),

            default_video_question: "Provide insights about what's happening in this video."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let persona_path = custom_path.join("persona.toml");
            if persona_path.exists() {
                let content = std::fs::read_to_string(&persona_path)?;
                prompts.persona = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single left-to-right pass over the template, so
    /// placeholders inside substituted values are left as written. Unknown
    /// placeholders are kept verbatim.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after
                .find("}}")
                .and_then(|end| vars.get(&after[..end]).map(|value| (end, value)))
            {
                Some((end, value)) => {
                    result.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str("{{");
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.persona.system.contains("{{personality}}"));
        assert!(prompts.persona.system.contains("{{knowledge}}"));
        assert!(prompts.persona.system.contains("{{context}}"));
        assert!(!prompts.persona.fallback_personality.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "I typed {{knowledge}} and {{name".to_string());
        vars.insert("knowledge".to_string(), "Knows Rust".to_string());

        for _ in 0..50 {
            let out = Prompts::render("{{knowledge}} | {{context}} | {{missing}}", &vars);
            assert_eq!(out, "Knows Rust | I typed {{knowledge}} and {{name | {{missing}}");
        }
    }

    #[test]
    fn test_render_placeholder_after_stray_braces() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());

        assert_eq!(Prompts::render("{{ {{name}}", &vars), "{{ Alice");
        assert_eq!(Prompts::render("open {{name", &vars), "open {{name");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("name".to_string(), "config".to_string());
        custom.insert("place".to_string(), "Oslo".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "request".to_string());

        let out = prompts.render_with_custom("{{name}} in {{place}}", &vars);
        assert_eq!(out, "request in Oslo");
    }

    #[test]
    fn test_load_persona_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("persona.toml"),
            "fallback_knowledge = \"You know about sailing.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.persona.fallback_knowledge, "You know about sailing.");
        // Unspecified fields keep their defaults.
        assert!(prompts.persona.system.contains("{{context}}"));
    }
}
