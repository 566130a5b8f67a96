//! System instruction composer.
//!
//! The system instruction is the caller's free-text instructions followed by
//! four static blocks describing the markup the chat frontend renders:
//!
//! ```text
//! {instructions} \n{tags} \n{plot} \n{tooltip} \n{preview}
//! ```
//!
//! The blocks are stored as text assets and embedded at compile time. Their
//! bytes must not change: the frontend parses exactly the syntax they teach.

use emissary_types::config::VacConfig;

/// Inline rich-text tags: `<highlight>` and `<alert>`.
pub const TAG_PROMPT: &str = include_str!("assets/tags.md");

/// Chart embedding with `<plot />`.
pub const PLOT_PROMPT: &str = include_str!("assets/plot.md");

/// Tooltip syntax.
pub const TOOLTIP_PROMPT: &str = include_str!("assets/tooltip.md");

/// File previews with `<preview />`.
pub const PREVIEW_PROMPT: &str = include_str!("assets/preview.md");

/// Build the system instruction sent with every model call.
///
/// Missing instructions render as an empty string, so the result then starts
/// with the separator.
pub fn compose_system_instruction(instructions: Option<&str>) -> String {
    let instructions = instructions.unwrap_or_default();
    format!(
        "{instructions} \n{TAG_PROMPT} \n{PLOT_PROMPT} \n{TOOLTIP_PROMPT} \n{PREVIEW_PROMPT}"
    )
}

/// The model identifier for a VAC: its configured `model`, else the default.
pub fn select_model(config: &VacConfig) -> &str {
    config.model()
}

#[cfg(test)]
mod tests {
    use super::*;
    use emissary_types::llm::DEFAULT_MODEL;

    #[test]
    fn test_instructions_come_first() {
        let prompt = compose_system_instruction(Some("Answer as the admin."));
        assert!(prompt.starts_with("Answer as the admin. \nYou are an assistant"));
    }

    #[test]
    fn test_missing_instructions_render_empty() {
        let prompt = compose_system_instruction(None);
        assert!(prompt.starts_with(" \nYou are an assistant"));
        assert!(!prompt.contains("None"));
    }

    #[test]
    fn test_blocks_in_order() {
        let prompt = compose_system_instruction(Some(""));
        let tags = prompt.find("<highlight color=").unwrap();
        let plot = prompt.find("Use <plot /> to display").unwrap();
        let tooltip = prompt.find("use the tooltip component").unwrap();
        let preview = prompt.find("Preview Component Instructions").unwrap();
        assert!(tags < plot && plot < tooltip && tooltip < preview);
    }

    #[test]
    fn test_blocks_joined_with_space_separated_newlines() {
        let prompt = compose_system_instruction(Some("x"));
        assert!(prompt.contains("else they will not render properly.\n \nUse <plot />"));
        assert!(prompt.contains("pie charts\n \nTo add tooltips"));
        assert!(prompt.contains("NASA</tooltip>`\n \nPreview Component Instructions"));
        assert!(prompt.ends_with("name=\"CSS Styles\" />\n    "));
    }

    #[test]
    fn test_static_blocks_keep_frontend_syntax() {
        assert!(TAG_PROMPT.contains("•\tSyntax: <alert type=\"warning\">"));
        assert!(PLOT_PROMPT.contains("\"chartType\":\"scatter\""));
        assert!(PREVIEW_PROMPT.contains("<preview items='["));
        assert!(TOOLTIP_PROMPT.contains("- top (default)"));
    }

    #[test]
    fn test_select_model() {
        assert_eq!(select_model(&VacConfig::default()), DEFAULT_MODEL);
        let config = VacConfig {
            model: Some("gemini-1.5-pro".to_string()),
            ..VacConfig::default()
        };
        assert_eq!(select_model(&config), "gemini-1.5-pro");
    }
}
