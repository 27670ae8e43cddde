//! JSON:API resources
//!
//! Sentral does not fold `include`d resources into the primary records. They
//! arrive in a separate `included` array and are matched back by
//! `(type, id)`.

use crate::domain::fields::{de_id, de_or_default};
use crate::domain::{Result, SatchelError, VendorKind};
use crate::log_record_skipped;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Resource types we know how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IncludedKind {
    Person,
    Student,
    Household,
    Enrolment,
    StudentPersonRelation,
}

impl IncludedKind {
    pub fn from_type(resource_type: &str) -> Option<Self> {
        match resource_type {
            "person" => Some(IncludedKind::Person),
            "student" => Some(IncludedKind::Student),
            "household" => Some(IncludedKind::Household),
            "enrolment" => Some(IncludedKind::Enrolment),
            "studentPersonRelation" => Some(IncludedKind::StudentPersonRelation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncludedKind::Person => "person",
            IncludedKind::Student => "student",
            IncludedKind::Household => "household",
            IncludedKind::Enrolment => "enrolment",
            IncludedKind::StudentPersonRelation => "studentPersonRelation",
        }
    }
}

impl fmt::Display for IncludedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identifying part of a resource
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(deserialize_with = "de_id")]
    pub id: String,
}

/// A primary or included resource
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(default, deserialize_with = "de_or_default")]
    pub attributes: Map<String, Value>,

    #[serde(default, deserialize_with = "de_or_default")]
    pub relationships: Map<String, Value>,
}

impl Resource {
    /// Identifiers referenced by relationship `name`
    ///
    /// `data` may be a single identifier, an array or null.
    pub fn related_ids(&self, name: &str) -> Vec<ResourceIdentifier> {
        match self.relationships.get(name).and_then(|r| r.get("data")) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            Some(item @ Value::Object(_)) => serde_json::from_value(item.clone())
                .map(|id| vec![id])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// Included resources indexed by `(type, id)`
#[derive(Debug, Default)]
pub struct IncludedIndex {
    resources: HashMap<(IncludedKind, String), Value>,
    counts: BTreeMap<IncludedKind, usize>,
    /// Resources whose type is not an [`IncludedKind`]
    pub unknown: usize,
}

impl IncludedIndex {
    /// Dispatch every included resource by its `type`
    pub fn build(included: &[Value]) -> Self {
        let mut index = IncludedIndex::default();
        for raw in included {
            let identifier: Option<ResourceIdentifier> = serde_json::from_value(raw.clone()).ok();
            let Some(identifier) = identifier else {
                index.unknown += 1;
                continue;
            };
            match IncludedKind::from_type(&identifier.resource_type) {
                Some(kind) => {
                    *index.counts.entry(kind).or_insert(0) += 1;
                    index
                        .resources
                        .insert((kind, identifier.id), annotate_campus(raw.clone()));
                }
                None => {
                    tracing::debug!(
                        resource_type = %identifier.resource_type,
                        id = %identifier.id,
                        "Ignoring included resource of unknown type"
                    );
                    index.unknown += 1;
                }
            }
        }
        index
    }

    pub fn get(&self, kind: IncludedKind, id: &str) -> Option<&Value> {
        self.resources.get(&(kind, id.to_string()))
    }

    /// Number of resources dispatched into `kind`
    pub fn count(&self, kind: IncludedKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Resolve every relationship of `resource` against the index
    ///
    /// To-one relationships map to an object (or null when not included),
    /// to-many relationships to an array of the included members.
    pub fn resolve(&self, resource: &Resource) -> Value {
        let mut related = Map::new();
        for (name, relationship) in &resource.relationships {
            let lookup = |id: &ResourceIdentifier| {
                IncludedKind::from_type(&id.resource_type)
                    .and_then(|kind| self.get(kind, &id.id))
                    .cloned()
            };
            let value = match relationship.get("data") {
                Some(Value::Array(_)) => Value::Array(
                    resource
                        .related_ids(name)
                        .iter()
                        .filter_map(lookup)
                        .collect(),
                ),
                Some(Value::Object(_)) => resource
                    .related_ids(name)
                    .first()
                    .and_then(lookup)
                    .unwrap_or(Value::Null),
                _ => continue,
            };
            related.insert(name.clone(), value);
        }
        Value::Object(related)
    }
}

/// Parse a Sentral timestamp into its calendar date
///
/// `2002-08-19T00:00:00+10:00` becomes 2002-08-19. The date part is taken
/// verbatim, so the offset never shifts the day.
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(text) = value.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let date_part = text.split('T').next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| SatchelError::Validation(format!("invalid date '{text}': {e}")))
}

/// Campus name for a campus id
pub fn campus_name(campus_id: &str) -> &'static str {
    match campus_id {
        "1" => "Senior School",
        "2" => "Senior School Boarding",
        "3" => "Junior School",
        _ => "",
    }
}

/// Add `campusName` next to a `campusId` attribute
pub fn annotate_campus(mut record: Value) -> Value {
    let Some(attributes) = record.get_mut("attributes").and_then(Value::as_object_mut) else {
        return record;
    };
    let campus_id = match attributes.get("campusId") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return record,
    };
    attributes.insert(
        "campusName".to_string(),
        Value::from(campus_name(&campus_id)),
    );
    record
}

/// Decode a primary resource, logging and returning `None` when malformed
pub fn decode_resource(collection: &str, raw: &Value) -> Option<Resource> {
    match serde_json::from_value::<Resource>(raw.clone()) {
        Ok(resource) => Some(resource),
        Err(e) => {
            let id = raw.get("id").map(Value::to_string).unwrap_or_default();
            log_record_skipped!(VendorKind::Sentral, collection, id, format!("malformed resource: {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn included() -> Vec<Value> {
        vec![
            json!({"type": "household", "id": "H1", "attributes": {"name": "Ng household"}}),
            json!({"type": "student", "id": 10, "attributes": {"code": "S10"}}),
            json!({"type": "enrolment", "id": "E1", "attributes": {"campusId": "3"}}),
            json!({"type": "studentPersonRelation", "id": "R1"}),
            json!({"type": "studentPersonRelation", "id": "R2"}),
            json!({"type": "person", "id": "P9"}),
            json!({"type": "timetable", "id": "T1"}),
            json!({"id": "no-type"}),
        ]
    }

    #[test]
    fn test_dispatch_by_type() {
        let index = IncludedIndex::build(&included());
        assert_eq!(index.count(IncludedKind::Household), 1);
        assert_eq!(index.count(IncludedKind::Student), 1);
        assert_eq!(index.count(IncludedKind::Enrolment), 1);
        assert_eq!(index.count(IncludedKind::StudentPersonRelation), 2);
        assert_eq!(index.count(IncludedKind::Person), 1);
        assert_eq!(index.unknown, 2);
        assert!(index.get(IncludedKind::Student, "10").is_some());
        assert_eq!(
            index.get(IncludedKind::Enrolment, "E1").unwrap()["attributes"]["campusName"],
            "Junior School"
        );
    }

    #[test]
    fn test_resolve_relationships() {
        let index = IncludedIndex::build(&included());
        let person: Resource = serde_json::from_value(json!({
            "type": "person",
            "id": "P1",
            "relationships": {
                "primaryHousehold": {"data": {"type": "household", "id": "H1"}},
                "student": {"data": {"type": "student", "id": "10"}},
                "studentContacts": {"data": [
                    {"type": "studentPersonRelation", "id": "R1"},
                    {"type": "studentPersonRelation", "id": "R404"},
                    {"type": "studentPersonRelation", "id": "R2"}
                ]},
                "studentPrimaryEnrolment": {"data": null},
                "links": {"self": "https://example.test/person/P1"}
            }
        }))
        .unwrap();

        let related = index.resolve(&person);
        assert_eq!(related["primaryHousehold"]["attributes"]["name"], "Ng household");
        assert_eq!(related["student"]["attributes"]["code"], "S10");
        assert_eq!(related["studentContacts"].as_array().unwrap().len(), 2);
        assert!(related.get("studentPrimaryEnrolment").is_none());
        assert!(related.get("links").is_none());
    }

    #[test_case(Some("2002-08-19T00:00:00+10:00"), Some((2002, 8, 19)) ; "with offset")]
    #[test_case(Some("2015-01-31"), Some((2015, 1, 31)) ; "date only")]
    #[test_case(Some(""), None ; "empty")]
    #[test_case(None, None ; "absent")]
    fn test_parse_date(input: Option<&str>, expected: Option<(i32, u32, u32)>) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_date(input).unwrap(), expected);
    }

    #[test]
    fn test_malformed_date_is_validation_error() {
        let err = parse_date(Some("19/08/2002")).unwrap_err();
        assert!(matches!(err, SatchelError::Validation(_)));
    }

    #[test_case("1", "Senior School")]
    #[test_case("2", "Senior School Boarding")]
    #[test_case("3", "Junior School")]
    #[test_case("4", "")]
    #[test_case("", "")]
    fn test_campus_name(id: &str, expected: &str) {
        assert_eq!(campus_name(id), expected);
    }

    #[test]
    fn test_annotate_campus_accepts_numeric_ids() {
        let record = annotate_campus(json!({"attributes": {"campusId": 1}}));
        assert_eq!(record["attributes"]["campusName"], "Senior School");
        let untouched = annotate_campus(json!({"attributes": {"name": "Blue"}}));
        assert!(untouched["attributes"].get("campusName").is_none());
    }
}
