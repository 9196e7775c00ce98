//! Selectable Gemini models.
//!
//! The registry only drives menus and listings. Requests are never refused
//! for an unknown model id.

/// A selectable model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model identifier sent to the service.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
}

/// Models offered for selection, in display order.
pub const AVAILABLE_MODELS: [ModelInfo; 3] = [
    ModelInfo {
        id: "gemini-2.5-flash",
        name: "Gemini 2.5 Flash",
    },
    ModelInfo {
        id: "gemini-3-pro-preview",
        name: "Gemini 3.0 Pro Preview",
    },
    ModelInfo {
        id: "gemini-2.5-flash-thinking",
        name: "Gemini 2.5 Flash (Thinking)",
    },
];

/// Look up a model by id.
#[must_use]
pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    AVAILABLE_MODELS.iter().find(|m| m.id == id)
}
