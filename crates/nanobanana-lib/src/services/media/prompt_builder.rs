// Optimization instruction builder
// Turns the user's style and lighting choices into the system instruction
// sent alongside the concept.

use crate::models::PromptConfig;

/// Sampling temperature used for prompt optimization
pub const OPTIMIZE_TEMPERATURE: f32 = 0.8;

/// Build the system instruction for the given configuration
pub fn build_system_instruction(config: &PromptConfig) -> String {
    let mut instruction = format!(
        "You are a world-class prompt engineer for generative media AI.\n\
         Your task is to turn a simple concept into a highly detailed, artistic and CONSISTENT prompt.\n\
         Use the structure: [Main Subject], [Action/Pose Detail], [Artistic Style: {style}], \
         [Lighting: {lighting}], [Camera/Lens], [Render Quality].\n",
        style = config.style.label(),
        lighting = config.lighting.label(),
    );

    if config.lighting.is_natural() {
        instruction.push_str(&format!(
            "\nSPECIAL LIGHTING ATTENTION: The lighting '{}' is a Natural theme, so use descriptions such as \
             \"soft organic shadows\", \"realistic light bounce\", \"natural light falloff\" and \
             \"accurate global illumination\".\n",
            config.lighting.label()
        ));
    }

    instruction.push_str(
        "\nWrite the prompt in English for the best generative media results.\n\
         ONLY return the final prompt text, without explanations or quotation marks.",
    );

    instruction
}

/// User turn carrying the concept
pub fn build_user_content(config: &PromptConfig) -> String {
    format!("Concept: {}", config.concept)
}
