use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Back-office account roles. `admin` is preferred by the contact-info
/// resolution; nothing else is gated on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
}

impl Default for Role {
    fn default() -> Self {
        Role::Manager
    }
}

impl Role {
    /// The stored representation, usable in filter documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
        }
    }
}

/// User document in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(email: String, password_hash: String, name: String, role: Role) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            email,
            password_hash,
            name,
            role,
            active: true,
            last_login: None,
            whatsapp_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stored WhatsApp number, if one is actually set. An empty string
    /// means the user cleared it in settings.
    pub fn contact_number(&self) -> Option<&str> {
        self.whatsapp_number.as_deref().filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_round_trips_with_stored_field_names() {
        let user = User::new(
            "agent@example.com".into(),
            "hash".into(),
            "Agent".into(),
            Role::Manager,
        );
        let doc = bson::to_document(&user).expect("to document");
        assert!(doc.get("password").is_some());
        assert!(doc.get("createdAt").is_some());
        assert_eq!(doc.get_str("role").unwrap(), "manager");

        let back: User = bson::from_document(doc).expect("from document");
        assert_eq!(back.email, "agent@example.com");
        assert!(back.active);
    }

    #[test]
    fn cleared_number_is_not_a_contact_number() {
        let mut user = User::new("a@b.c".into(), "h".into(), "A".into(), Role::Admin);
        assert_eq!(user.contact_number(), None);
        user.whatsapp_number = Some(String::new());
        assert_eq!(user.contact_number(), None);
        user.whatsapp_number = Some("212611111111".into());
        assert_eq!(user.contact_number(), Some("212611111111"));
    }
}
