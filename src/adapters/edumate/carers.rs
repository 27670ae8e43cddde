//! Carer eligibility rules
//!
//! Schools decide which relationship types make someone a carer, so the
//! allow-list comes from configuration. Edumate returns relationship types in
//! mixed case depending on the endpoint; comparison is case-insensitive.

use super::models::Contact;

/// Relationship-type allow-list plus the import rules built on it
#[derive(Debug, Clone)]
pub struct CarerFilter {
    allowed: Vec<String>,
}

impl CarerFilter {
    pub fn new<S: AsRef<str>>(relationships: &[S]) -> Self {
        Self {
            allowed: relationships
                .iter()
                .map(|r| r.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    pub fn is_carer_relationship(&self, relationship_type: Option<&str>) -> bool {
        relationship_type
            .map(|t| self.allowed.contains(&t.trim().to_uppercase()))
            .unwrap_or(false)
    }

    /// At least one allow-listed relationship to a student has its mail flag set
    pub fn has_mailable_relationship(&self, contact: &Contact) -> bool {
        contact.relationships.iter().any(|r| {
            self.is_carer_relationship(r.relationship_type.as_deref())
                && r.mail_flag
                && r.contact_reference.iter().any(|cr| cr.is_student())
        })
    }

    /// Full carer import rule
    ///
    /// Requires an email address, no do-not-contact flag and a mailable
    /// carer relationship.
    pub fn is_eligible(&self, contact: &Contact) -> bool {
        contact.general_info.email().is_some()
            && !contact.general_info.do_not_contact_flag
            && self.has_mailable_relationship(contact)
    }

    /// Student numbers reachable through allow-listed relationships
    pub fn student_ids(&self, contact: &Contact) -> Vec<String> {
        contact
            .relationships
            .iter()
            .filter(|r| self.is_carer_relationship(r.relationship_type.as_deref()))
            .flat_map(|r| r.contact_reference.iter())
            .filter_map(|cr| cr.student_number.clone())
            .collect()
    }
}

/// A staff member whose relationship list shows them as a parent
///
/// Only the first reference of each relationship is inspected.
pub fn is_staff_also_parent(contact: &Contact) -> bool {
    contact.relationships.iter().any(|r| {
        let first_is_student = r
            .contact_reference
            .first()
            .map(|cr| cr.is_student())
            .unwrap_or(false);
        first_is_student
            && r.relationship_type
                .as_deref()
                .map(|t| t.to_uppercase() == "CHILD")
                .unwrap_or(false)
    })
}

/// Staff number from a contact's references; the last one wins
pub fn staff_number(contact: &Contact) -> Option<String> {
    contact
        .general_info
        .contact_reference
        .iter()
        .filter_map(|r| r.staff_number.clone())
        .last()
}
