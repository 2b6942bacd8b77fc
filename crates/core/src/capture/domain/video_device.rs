/// Immutable snapshot of a platform video input. Identity is `id`;
/// the label is display-only and may be empty on some platforms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoDevice {
    id: String,
    label: String,
}

impl VideoDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }
}
