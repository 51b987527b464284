//! Payload builders for structured QR contents.
//!
//! Every builder is a pure function of its fields. A required field that is empty after
//! trimming yields a [`ValidationError`]; everything else is copied as entered, except that
//! phone numbers lose their whitespace and URI parameters are percent-encoded.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::ValidationError;

const EMAIL_REQUIRED: ValidationError =
    ValidationError::new("address", "Please enter an email address");
const PHONE_REQUIRED: ValidationError =
    ValidationError::new("number", "Please enter a phone number");
const SSID_REQUIRED: ValidationError = ValidationError::new("ssid", "Please enter WiFi SSID");
const NAME_REQUIRED: ValidationError = ValidationError::new("name", "Please enter a name");

/// Characters left as-is in URI components, matching `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailFields {
    pub address: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmsFields {
    pub number: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WifiSecurity {
    #[default]
    Wpa,
    Wep,
    NoPass,
}

impl WifiSecurity {
    pub const ALL: [Self; 3] = [Self::Wpa, Self::Wep, Self::NoPass];

    pub fn label(self) -> &'static str {
        match self {
            Self::Wpa => "WPA/WPA2",
            Self::Wep => "WEP",
            Self::NoPass => "No Password",
        }
    }
}

impl fmt::Display for WifiSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::NoPass => "nopass",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiFields {
    pub ssid: String,
    pub password: String,
    pub security: WifiSecurity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VCardFields {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub org: String,
    pub url: String,
}

fn require(value: &str, error: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `mailto:` link; subject and body are only included when non-empty.
pub fn email(fields: &EmailFields) -> Result<String, ValidationError> {
    require(&fields.address, EMAIL_REQUIRED)?;

    let params: Vec<String> = [("subject", &fields.subject), ("body", &fields.body)]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{name}={}", encode_component(value)))
        .collect();

    let mut link = format!("mailto:{}", fields.address);
    if !params.is_empty() {
        link.push('?');
        link.push_str(&params.join("&"));
    }
    Ok(link)
}

pub fn phone(number: &str) -> Result<String, ValidationError> {
    require(number, PHONE_REQUIRED)?;
    Ok(format!("tel:{}", strip_whitespace(number)))
}

/// `sms:` link. The body parameter is always present, even for an empty message.
pub fn sms(fields: &SmsFields) -> Result<String, ValidationError> {
    require(&fields.number, PHONE_REQUIRED)?;
    Ok(format!(
        "sms:{}?body={}",
        strip_whitespace(&fields.number),
        encode_component(&fields.message)
    ))
}

pub fn wifi(fields: &WifiFields) -> Result<String, ValidationError> {
    require(&fields.ssid, SSID_REQUIRED)?;
    Ok(format!(
        "WIFI:T:{};S:{};P:{};;",
        fields.security, fields.ssid, fields.password
    ))
}

pub fn vcard(fields: &VCardFields) -> Result<String, ValidationError> {
    require(&fields.name, NAME_REQUIRED)?;

    let mut lines = vec![
        "BEGIN:VCARD".to_owned(),
        "VERSION:3.0".to_owned(),
        format!("FN:{}", fields.name),
    ];
    for (tag, value) in [
        ("TEL", &fields.phone),
        ("EMAIL", &fields.email),
        ("ORG", &fields.org),
        ("URL", &fields.url),
    ] {
        if !value.is_empty() {
            lines.push(format!("{tag}:{value}"));
        }
    }
    lines.push("END:VCARD".to_owned());
    Ok(lines.join("\n"))
}

/// `mailto:` link sharing `data` in the body of a new message.
pub fn share_via_email(data: &str) -> String {
    let body = format!("Check this out: {data}");
    format!("mailto:?body={}", encode_component(&body))
}

/// The structured formats offered by the formats tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FormatKind {
    #[default]
    Email,
    Phone,
    Sms,
    Wifi,
    VCard,
}

impl FormatKind {
    pub const ALL: [Self; 5] = [Self::Email, Self::Phone, Self::Sms, Self::Wifi, Self::VCard];

    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Sms => "SMS",
            Self::Wifi => "WiFi",
            Self::VCard => "vCard",
        }
    }

    /// Lowercase name used in exported file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Sms => "sms",
            Self::Wifi => "wifi",
            Self::VCard => "vcard",
        }
    }
}

/// Field values for every format, plus which one is selected.
///
/// Switching formats keeps what was typed into the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatsForm {
    pub kind: FormatKind,
    pub email: EmailFields,
    pub phone: String,
    pub sms: SmsFields,
    pub wifi: WifiFields,
    pub vcard: VCardFields,
}

impl FormatsForm {
    /// Builds the payload of the selected format.
    pub fn payload(&self) -> Result<String, ValidationError> {
        match self.kind {
            FormatKind::Email => email(&self.email),
            FormatKind::Phone => phone(&self.phone),
            FormatKind::Sms => sms(&self.sms),
            FormatKind::Wifi => wifi(&self.wifi),
            FormatKind::VCard => vcard(&self.vcard),
        }
    }
}
