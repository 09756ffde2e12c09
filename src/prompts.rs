//! Instruction strings for the generation model. User text is interpolated
//! as-is; required-field checks happen in the UI before composition.

/// Vibe choices offered by the storybook forms.
pub const VIBES: &[&str] = &[
    "Fairytale",
    "Modern Romance",
    "Comic Book",
    "Cinematic",
    "Poetic",
];

/// Fixed art-direction qualifiers appended to every panel's image prompt.
pub const IMAGE_STYLE_SUFFIX: &str =
    ", vibrant comic book illustration, clean ink lines, warm romantic color palette, consistent character design";

/// Vision prompt used when analyzing a partner's reference photo.
pub const DESCRIBE_PERSON_PROMPT: &str =
    "Describe this person's appearance in one short sentence (hair, build, style of dress) \
     so an illustrator can draw them consistently across comic panels. \
     Do not guess their name or personality.";

/// Stand-in used when photo analysis fails for one partner.
pub const GENERIC_PERSON_DESCRIPTION: &str = "a loving partner with a warm smile";

pub struct LetterRequest {
    pub partner_name: String,
    pub occasion: String,
    pub tone: String,
    pub memories: String,
}

pub struct FlirtyRequest {
    pub context: String,
    pub tone: String,
}

pub struct FutureRequest {
    pub names: String,
    pub stage: String,
    pub dreams: String,
}

pub struct StoryRequest {
    pub names: String,
    pub how_met: String,
    pub first_date: String,
    pub memorable_moments: String,
    pub vibe: String,
}

pub fn compose_love_letter(req: &LetterRequest) -> String {
    format!(
        "Write a {} love letter to {} for {}. Include these memories: {}. \
         Keep it heartfelt and personal.",
        req.tone, req.partner_name, req.occasion, req.memories
    )
}

pub fn compose_flirty_texts(req: &FlirtyRequest) -> String {
    format!(
        "Generate 5 distinct {} flirty text messages for a situation where: {}. \
         Format them as a numbered list.",
        req.tone, req.context
    )
}

pub fn compose_future_us(req: &FutureRequest) -> String {
    format!(
        "Write a creative and romantic \"Future Us\" scenario for a couple named {}. \
         They are currently in the \"{}\" stage of their relationship. \
         Their dreams include: {}. Describe a day in their life 5 years from now.",
        req.names, req.stage, req.dreams
    )
}

/// Storybook script request: four text pages, each with an illustration
/// prompt. The response must be JSON matching the documented page shape.
pub fn compose_story_script(req: &StoryRequest) -> String {
    format!(
        "Write a deeply romantic, passionate, and slightly spicy short story about a couple named {}.\n\
         Details:\n\
         - How they met: {}\n\
         - First date: {}\n\
         - Memorable moments: {}\n\
         - Vibe/Theme: {}\n\
         \n\
         Format the output as a JSON object with a \"pages\" array.\n\
         Each page object should have:\n\
         - \"text\": A paragraph of the story (keep it concise, 2-3 sentences).\n\
         - \"imagePrompt\": A detailed prompt to generate a Pixar-style 3D animated movie \
         illustration for this page. It should be colorful, expressive, and match the story \
         text exactly. The characters should look consistent.\n\
         \n\
         Create exactly 4 pages. The story should be wonderful, loving, and passionate.",
        req.names, req.how_met, req.first_date, req.memorable_moments, req.vibe
    )
}

/// Comic script request: pages of one or two panels, with captions and
/// speech bubbles. `character_descriptions` comes from reference-photo
/// analysis and keeps the couple recognizable across panels.
pub fn compose_comic_script(req: &StoryRequest, character_descriptions: Option<&str>) -> String {
    let characters = match character_descriptions {
        Some(desc) => format!("The couple: {}\n", desc),
        None => String::new(),
    };
    format!(
        "Write a romantic comic book script about a couple named {}.\n\
         {}Details:\n\
         - How they met: {}\n\
         - First date: {}\n\
         - Memorable moments: {}\n\
         - Vibe/Theme: {}\n\
         \n\
         Format the output as a JSON object with a \"pages\" array.\n\
         Each page object has a \"panels\" array of 1 to 2 panels. Each panel object should have:\n\
         - \"description\": What happens in the panel (1-2 sentences).\n\
         - \"imagePrompt\": A detailed prompt to illustrate the panel. Describe the scene, \
         the characters' appearance and expressions, and the mood. Keep the characters \
         consistent from panel to panel.\n\
         - \"caption\": Optional narration box text.\n\
         - \"speechBubbles\": Optional array of {{ \"character\": ..., \"text\": ... }} objects.\n\
         \n\
         Create 4 pages. The story should be warm, funny in places, and deeply romantic.",
        req.names, characters, req.how_met, req.first_date, req.memorable_moments, req.vibe
    )
}
