// Domain models for the incoming content plan.
// Every field except `topic` is optional: the frontend sends whatever the
// upstream plan generator produced, and absent fields must simply be
// omitted from the rendered document rather than failing the request.

use serde::Deserialize;

/// A structured short-form video plan as submitted by the frontend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPlan {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    /// Target length in seconds.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub key_message: Option<String>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub conclusion: Option<String>,
}

/// One scene of the plan. `scene_number` is descriptive only: scenes are
/// rendered in the order they arrive, never re-sorted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub scene_number: Option<u32>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default)]
    pub visual_description: Option<String>,
}

/// Treat whitespace-only strings the same as absent fields.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl ContentPlan {
    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn topic(&self) -> Option<&str> {
        non_empty(&self.topic)
    }

    pub fn key_message(&self) -> Option<&str> {
        non_empty(&self.key_message)
    }

    pub fn conclusion(&self) -> Option<&str> {
        non_empty(&self.conclusion)
    }

    /// Display title for the created document. Falls back to the topic when
    /// the plan has no title of its own.
    pub fn document_title(&self) -> String {
        let subject = self
            .title()
            .or_else(|| self.topic())
            .unwrap_or("Untitled");
        format!("Short-form Content Plan: {subject}")
    }
}

impl Scene {
    pub fn subtitle(&self) -> Option<&str> {
        non_empty(&self.subtitle)
    }

    pub fn narration(&self) -> Option<&str> {
        non_empty(&self.narration)
    }

    pub fn visual_description(&self) -> Option<&str> {
        non_empty(&self.visual_description)
    }
}
