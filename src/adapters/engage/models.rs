//! Engage personal-details payloads

use crate::domain::fields::{de_id, de_opt_id, de_opt_string, de_or_default, truthy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An entry of `getcurrentpupilinfo`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pupil {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub status: Option<String>,

    /// Kept as sent; schools use both `"7"` and `7`
    #[serde(default)]
    pub year_group: Value,

    /// Absent when the pupil has no linked contacts
    #[serde(default)]
    pub contacts: Option<Vec<PupilContact>>,
}

impl Pupil {
    pub fn is_current(&self) -> bool {
        self.status.as_deref() == Some("Current")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PupilContact {
    #[serde(deserialize_with = "de_id")]
    pub contact_id: String,
}

/// An entry of `getcontactinfo`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngageContact {
    #[serde(deserialize_with = "de_id")]
    pub contact_id: String,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub forename: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub surname: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub greeting: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "de_or_default")]
    pub email_addresses: Vec<EmailAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub contact_id: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub email_address: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub description: Option<String>,

    #[serde(default)]
    pub is_primary: Value,
}

/// One contact/email pair, ready for the sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactEntry {
    /// `<contactId>-<email>`
    pub external_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub is_current_parent: bool,
    pub data: ContactData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactData {
    pub salutation: Option<String>,
    pub description: Option<String>,
    pub is_primary: bool,
    pub title: Option<String>,
    pub engage_id: String,
    pub is_parent: bool,
    /// Year group of every linked current pupil, one entry per link
    pub student_years: Vec<Value>,
}

impl EngageContact {
    /// Expand into one entry per email address
    ///
    /// Addresses with no email text are dropped.
    pub fn entries(&self) -> Vec<ContactEntry> {
        self.email_addresses
            .iter()
            .filter_map(|address| {
                let email = address
                    .email_address
                    .as_deref()
                    .map(str::trim)
                    .filter(|e| !e.is_empty())?;
                let engage_id = address
                    .contact_id
                    .clone()
                    .unwrap_or_else(|| self.contact_id.clone());
                Some(ContactEntry {
                    external_id: format!("{engage_id}-{email}"),
                    first_name: self.forename.clone(),
                    last_name: self.surname.clone(),
                    email: email.to_string(),
                    is_current_parent: true,
                    data: ContactData {
                        salutation: self.greeting.clone(),
                        description: address.description.clone(),
                        is_primary: truthy(&address.is_primary),
                        title: self.title.clone(),
                        engage_id,
                        is_parent: true,
                        student_years: Vec::new(),
                    },
                })
            })
            .collect()
    }
}
