use serde::{Deserialize, Serialize};

/// An in-app notification document as delivered by its creation trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationRecord {
    /// Holds the recipient's email address, not a user id. Other writers of the
    /// collection depend on this, so the field keeps its name.
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
}

impl NotificationRecord {
    pub fn recipient_email(&self) -> Option<&str> {
        non_empty(&self.user_id)
    }

    pub fn type_tag(&self) -> Option<&str> {
        non_empty(&self.notification_type)
    }

    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn message(&self) -> Option<&str> {
        non_empty(&self.message)
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}
