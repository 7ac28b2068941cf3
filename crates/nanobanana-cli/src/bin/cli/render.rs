// Plain-text rendering of the session state

use chrono::{Local, TimeZone};
use nanobanana_lib::{
    AspectRatio, HistoryItem, HistoryLog, Lighting, LightingGroup, PromptConfig, Step,
    VisualStyle, WorkflowState,
};

/// Characters of a prompt shown in the history listing
const PREVIEW_CHARS: usize = 72;

pub fn render_config(config: &PromptConfig) -> String {
    let concept = if config.has_concept() {
        config.concept.as_str()
    } else {
        "(empty)"
    };
    format!(
        "  concept:  {}\n  style:    {}\n  lighting: {} ({})\n  ratio:    {} ({})\n  media:    {}",
        concept,
        config.style,
        config.lighting,
        config.lighting.group().display_name(),
        config.aspect_ratio,
        config.aspect_ratio.hint(),
        config.media_type.display_name(),
    )
}

pub fn render_state(step: Step, state: &WorkflowState) -> String {
    let mut out = format!("Step {}\n{}", step, render_config(&state.config));

    if !state.optimized_prompt.is_empty() {
        out.push_str(&format!("\n\nOptimized prompt:\n{}", state.optimized_prompt));
    }
    if let Some(asset) = &state.generated {
        out.push_str(&format!("\n\nGenerated: {}", asset.describe()));
    }
    if !state.status.is_empty() {
        out.push_str(&format!("\n\n{}", state.status));
    }
    out
}

pub fn render_history_item(item: &HistoryItem) -> String {
    let when = Local
        .timestamp_millis_opt(item.timestamp)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  [{}]  {}  {}",
        item.id,
        item.media_type,
        when,
        preview(&item.prompt)
    )
}

pub fn render_history(log: &HistoryLog) -> String {
    if log.is_empty() {
        return "No history yet.".to_string();
    }
    log.iter()
        .map(render_history_item)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_options() -> String {
    let styles = VisualStyle::ALL
        .iter()
        .map(|s| format!("  {}", s))
        .collect::<Vec<_>>()
        .join("\n");

    let lighting = [LightingGroup::Natural, LightingGroup::Stylized]
        .iter()
        .map(|group| {
            let names = Lighting::ALL
                .iter()
                .filter(|l| l.group() == *group)
                .map(|l| l.label())
                .collect::<Vec<_>>()
                .join(", ");
            format!("  {}: {}", group.display_name(), names)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let ratios = AspectRatio::ALL
        .iter()
        .map(|r| format!("{} ({})", r, r.hint()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Styles:\n{}\nLighting:\n{}\nRatios:\n  {}\nMedia:\n  image, video",
        styles, lighting, ratios
    )
}

/// Single-line preview of a prompt
fn preview(prompt: &str) -> String {
    let flat = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanobanana_lib::MediaType;

    #[test]
    fn test_preview_truncates_and_flattens() {
        assert_eq!(preview("a\n red   fox"), "a red fox");
        let long = "word ".repeat(40);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert!(shown.chars().count() <= PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(render_history(&HistoryLog::new()), "No history yet.");
    }

    #[test]
    fn test_history_line_has_id_and_type() {
        let item = HistoryItem {
            id: "abc".to_string(),
            prompt: "A red fox".to_string(),
            media_type: MediaType::Video,
            timestamp: 1_712_345_678_901,
        };
        let line = render_history_item(&item);
        assert!(line.starts_with("abc  [VIDEO]"));
        assert!(line.ends_with("A red fox"));
    }

    #[test]
    fn test_state_shows_status_and_prompt() {
        let mut state = WorkflowState::new(PromptConfig::default());
        state.optimized_prompt = "A red fox".to_string();
        state.status = "Generation failed. Try again.".to_string();
        let text = render_state(Step::Optimize, &state);
        assert!(text.contains("Step 2. Prompt Result"));
        assert!(text.contains("concept:  (empty)"));
        assert!(text.contains("A red fox"));
        assert!(text.ends_with("Generation failed. Try again."));
    }

    #[test]
    fn test_options_groups_lighting() {
        let text = render_options();
        assert!(text.contains("Natural: Natural Sunlight"));
        assert!(text.contains("Dark & Moody"));
        assert!(text.contains("9:16 (TikTok)"));
    }
}
