//! Typed views over Edumate contact payloads
//!
//! Only the fields the filters read are modelled. The full record is kept as
//! JSON and forwarded unchanged apart from derived fields.

use crate::domain::fields::{de_opt_id, de_opt_string, de_or_default, de_truthy};
use serde::Deserialize;

/// An entry of `contacts/contacts/*`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "de_or_default")]
    pub general_info: GeneralInfo,

    #[serde(default, deserialize_with = "de_or_default")]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralInfo {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub email_address: Option<String>,

    #[serde(default, deserialize_with = "de_truthy")]
    pub do_not_contact_flag: bool,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub firstname: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub surname: Option<String>,

    #[serde(default, deserialize_with = "de_or_default")]
    pub contact_reference: Vec<ContactReference>,
}

impl GeneralInfo {
    /// Trimmed email, `None` when blank
    pub fn email(&self) -> Option<&str> {
        self.email_address
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.firstname.as_deref().unwrap_or_default(),
            self.surname.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub relationship_type: Option<String>,

    #[serde(default, deserialize_with = "de_truthy")]
    pub mail_flag: bool,

    #[serde(default, deserialize_with = "de_or_default")]
    pub contact_reference: Vec<ContactReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactReference {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub contact_type: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub student_number: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub staff_number: Option<String>,
}

impl ContactReference {
    pub fn is_student(&self) -> bool {
        self.contact_type.as_deref() == Some("student")
    }
}

/// `data` of `contacts/contact-details/student/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentDetailEnvelope {
    #[serde(default)]
    pub student: Option<StudentDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentDetail {
    #[serde(default, deserialize_with = "de_or_default")]
    pub enrolment: Enrolment,

    #[serde(default, deserialize_with = "de_or_default")]
    pub general_info: StudentGeneralInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Enrolment {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub short_form_run: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub current_form_run: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub tutor_roll_class: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub tutor_roll_class_code: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub tutor_teacher: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentGeneralInfo {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub house: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub student_status: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub student_type: Option<String>,
}

/// `data` of `contacts/contact-details/staff/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffDetailEnvelope {
    #[serde(default)]
    pub staff: Option<StaffDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffDetail {
    #[serde(default, deserialize_with = "de_or_default")]
    pub employment: Employment,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Employment {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub staff_type: Option<String>,
}
