use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;

/// Saved custom theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTheme {
    pub id: i64,
    pub preset_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_card_color")]
    pub card_color: String,
    #[serde(default = "default_button_color")]
    pub button_color: String,
    #[serde(default = "default_sidebar_color")]
    pub sidebar_color: String,
    #[serde(default = "default_sidebar_active_color")]
    pub sidebar_active_color: String,
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
}

fn default_text_color() -> String {
    "black".to_string()
}

fn default_card_color() -> String {
    "white".to_string()
}

fn default_button_color() -> String {
    "#667eea".to_string()
}

fn default_sidebar_color() -> String {
    "#2c3e50".to_string()
}

fn default_sidebar_active_color() -> String {
    "#34495e".to_string()
}

fn default_bg_color() -> String {
    "#f5f5f5".to_string()
}

/// Custom theme form; also serialized as the `POST /settings/theme` payload.
/// Fields the form does not expose keep the API defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ThemeForm {
    #[validate(length(min = 1, max = 50, message = "Theme name is required"))]
    pub preset_name: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_card_color")]
    pub card_color: String,
    #[serde(default = "default_button_color")]
    pub button_color: String,
    #[serde(default = "default_sidebar_color")]
    pub sidebar_color: String,
    #[serde(default = "default_sidebar_active_color")]
    pub sidebar_active_color: String,
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
}

/// Business branding shown in the sidebar and on invoices.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BusinessInfo {
    #[validate(custom(function = "not_blank", message = "Business name is required"))]
    pub business_name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub logo_type: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Business email is invalid"))]
    pub email: Option<String>,
}

impl BusinessInfo {
    /// Empty form inputs arrive as `Some("")`; the API expects nulls.
    pub fn normalized(self) -> Self {
        Self {
            business_name: self.business_name.trim().to_string(),
            logo: blank_to_none(self.logo),
            logo_type: blank_to_none(self.logo_type),
            address: blank_to_none(self.address),
            phone: blank_to_none(self.phone),
            email: blank_to_none(self.email),
        }
    }

    pub fn field(&self, name: &str) -> &str {
        let value = match name {
            "logo" => &self.logo,
            "logo_type" => &self.logo_type,
            "address" => &self.address,
            "phone" => &self.phone,
            "email" => &self.email,
            _ => return "",
        };
        value.as_deref().unwrap_or("")
    }
}

/// Contact details printed on invoices.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InvoiceCustomization {
    #[serde(default)]
    pub invoice_address: Option<String>,
    #[serde(default)]
    pub invoice_phone: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Invoice email is invalid"))]
    pub invoice_email: Option<String>,
}

impl InvoiceCustomization {
    pub fn normalized(self) -> Self {
        Self {
            invoice_address: blank_to_none(self.invoice_address),
            invoice_phone: blank_to_none(self.invoice_phone),
            invoice_email: blank_to_none(self.invoice_email),
        }
    }

    pub fn field(&self, name: &str) -> &str {
        let value = match name {
            "invoice_address" => &self.invoice_address,
            "invoice_phone" => &self.invoice_phone,
            "invoice_email" => &self.invoice_email,
            _ => return "",
        };
        value.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodPayload {
    pub name: String,
    pub icon: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentMethodForm {
    #[validate(custom(function = "not_blank", message = "Payment method name is required"))]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    /// `active` or `inactive`.
    #[serde(default)]
    pub status: String,
}

impl PaymentMethodForm {
    pub fn into_payload(self) -> PaymentMethodPayload {
        PaymentMethodPayload {
            name: self.name.trim().to_string(),
            icon: self.icon.trim().to_string(),
            is_active: self.status != "inactive",
        }
    }
}

/// Profile display fields kept in the session only.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(custom(function = "not_blank", message = "Display name is required"))]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub photo: String,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_theme_fills_api_defaults() {
        let theme: CustomTheme = serde_json::from_value(serde_json::json!({
            "id": 1, "preset_name": "Night shift", "bg_color": "#000000"
        }))
        .unwrap();
        assert_eq!(theme.bg_color, "#000000");
        assert_eq!(theme.button_color, "#667eea");
        assert!(!theme.is_active);
    }

    #[test]
    fn business_info_blank_fields_become_null() {
        let info = BusinessInfo {
            business_name: " Sparkle ".to_string(),
            logo: Some("🚗".to_string()),
            logo_type: Some("emoji".to_string()),
            address: Some("  ".to_string()),
            phone: None,
            email: Some(String::new()),
        }
        .normalized();

        assert_eq!(info.business_name, "Sparkle");
        assert_eq!(info.address, None);
        assert_eq!(info.email, None);
        assert!(info.validate().is_ok());
    }

    #[test]
    fn payment_method_status_maps_to_flag() {
        let form = PaymentMethodForm {
            name: "GCash".to_string(),
            icon: "📱".to_string(),
            status: "inactive".to_string(),
        };
        assert!(!form.into_payload().is_active);
    }
}
