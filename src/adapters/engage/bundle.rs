//! Contact/pupil join
//!
//! Engage returns pupils and contacts from separate endpoints. Contacts are
//! indexed by id, every current pupil adds its year group to each linked
//! contact, and the linked contacts are flattened in the order pupils
//! reference them.

use super::models::{ContactEntry, EngageContact, Pupil};
use crate::domain::VendorKind;
use crate::log_record_skipped;
use std::collections::{HashMap, HashSet};

/// Result of [`bundle_contacts`]
#[derive(Debug, Default)]
pub struct Bundle {
    pub entries: Vec<ContactEntry>,
    /// Pupils with no `contacts` key
    pub pupils_without_contacts: usize,
    /// Pupil links pointing at a contact id the contacts endpoint did not return
    pub unknown_contact_ids: usize,
}

/// Index contacts by id; a later duplicate id replaces the earlier one
pub fn index_contacts(contacts: &[EngageContact]) -> HashMap<String, Vec<ContactEntry>> {
    contacts
        .iter()
        .map(|c| (c.contact_id.clone(), c.entries()))
        .collect()
}

/// Join current pupils to their contacts
///
/// Entries are de-duplicated by external id, keeping first-seen order.
pub fn bundle_contacts(
    mut index: HashMap<String, Vec<ContactEntry>>,
    pupils: &[Pupil],
) -> Bundle {
    let mut bundle = Bundle::default();
    let mut order: Vec<String> = Vec::new();
    let mut linked: HashSet<String> = HashSet::new();

    for pupil in pupils.iter().filter(|p| p.is_current()) {
        let Some(contacts) = &pupil.contacts else {
            bundle.pupils_without_contacts += 1;
            continue;
        };
        for link in contacts {
            match index.get_mut(&link.contact_id) {
                Some(entries) => {
                    for entry in entries.iter_mut() {
                        entry.data.student_years.push(pupil.year_group.clone());
                    }
                    if linked.insert(link.contact_id.clone()) {
                        order.push(link.contact_id.clone());
                    }
                }
                None => {
                    log_record_skipped!(
                        VendorKind::Engage,
                        "contacts",
                        link.contact_id,
                        "pupil links to unknown contact id"
                    );
                    bundle.unknown_contact_ids += 1;
                }
            }
        }
    }

    let mut seen_external: HashSet<String> = HashSet::new();
    for id in order {
        if let Some(entries) = index.remove(&id) {
            for entry in entries {
                if seen_external.insert(entry.external_id.clone()) {
                    bundle.entries.push(entry);
                }
            }
        }
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn contacts() -> Vec<EngageContact> {
        serde_json::from_value(json!([
            {"contactId": "C1", "forename": "Ann", "surname": "A",
             "emailAddresses": [{"contactId": "C1", "emailAddress": "ann@example.com"}]},
            {"contactId": "C2", "forename": "Bob", "surname": "B",
             "emailAddresses": [
                {"contactId": "C2", "emailAddress": "bob@example.com"},
                {"contactId": "C2", "emailAddress": "bob@work.com"}
             ]},
            {"contactId": "C3", "forename": "Unlinked", "emailAddresses": []}
        ]))
        .unwrap()
    }

    fn pupils(value: Value) -> Vec<Pupil> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_siblings_accumulate_years_and_dedupe() {
        let pupils = pupils(json!([
            {"status": "Current", "yearGroup": "7", "contacts": [{"contactId": "C1"}, {"contactId": "C2"}]},
            {"status": "Current", "yearGroup": "9", "contacts": [{"contactId": "C2"}]},
            {"status": "Left", "yearGroup": "12", "contacts": [{"contactId": "C1"}]}
        ]));

        let bundle = bundle_contacts(index_contacts(&contacts()), &pupils);
        let ids: Vec<&str> = bundle.entries.iter().map(|e| e.external_id.as_str()).collect();
        assert_eq!(ids, vec!["C1-ann@example.com", "C2-bob@example.com", "C2-bob@work.com"]);

        assert_eq!(bundle.entries[0].data.student_years, vec![json!("7")]);
        assert_eq!(bundle.entries[1].data.student_years, vec![json!("7"), json!("9")]);
        assert_eq!(bundle.entries[2].data.student_years, vec![json!("7"), json!("9")]);
    }

    #[test]
    fn test_pupils_without_contacts_and_unknown_ids_are_skipped() {
        let pupils = pupils(json!([
            {"status": "Current", "yearGroup": 5},
            {"status": "Current", "yearGroup": 6, "contacts": [{"contactId": "C404"}, {"contactId": "C1"}]}
        ]));

        let bundle = bundle_contacts(index_contacts(&contacts()), &pupils);
        assert_eq!(bundle.pupils_without_contacts, 1);
        assert_eq!(bundle.unknown_contact_ids, 1);
        assert_eq!(bundle.entries.len(), 1);
        assert_eq!(bundle.entries[0].data.student_years, vec![json!(6)]);
    }

    #[test]
    fn test_unlinked_contacts_are_not_output() {
        let bundle = bundle_contacts(index_contacts(&contacts()), &[]);
        assert!(bundle.entries.is_empty());
    }
}
