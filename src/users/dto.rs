use serde::{Deserialize, Serialize};

/// Account view for the settings page. The WhatsApp number comes back
/// without the country prefix, the way the form edits it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub name: String,
    pub email: String,
    pub whatsapp_number: String,
}

/// Settings update; absent fields are left unchanged. An empty
/// `whatsappNumber` clears the stored number.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub whatsapp_number: Option<String>,
}
