use serde::{Deserialize, Serialize};

/// DNS record types the solver writes. DNS-01 only ever needs TXT.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    #[default]
    Txt,
}

/// Which modification set a record is placed in.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Operation {
    Add,
    Remove,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneRecord {
    pub name: String,
    pub prio: u32,
    pub ttl: u32,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: String,
}

/// Records to add, remove or replace in a zone. Empty sets are left out of the request body.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RecordModificationSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<ZoneRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<ZoneRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replace: Vec<ZoneRecord>,
}

/// Body of a `PUT /v1beta/dns/zones/{zone}` request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub struct ZoneUpdateRequest {
    #[serde(rename = "Name")]
    pub name: String,
    pub records: RecordModificationSet,
}

/// Build a zone update holding a single record, placed in the set selected by `operation`.
///
/// Zone names are sent without a trailing dot; the record name is kept as given.
#[must_use]
pub fn build(
    fqdn: &str,
    zone: &str,
    ttl: u32,
    record_type: RecordType,
    value: &str,
    operation: Operation,
) -> ZoneUpdateRequest {
    let record = ZoneRecord {
        name: fqdn.to_string(),
        prio: 0,
        ttl,
        record_type,
        value: value.to_string(),
    };
    let records = match operation {
        Operation::Add => RecordModificationSet {
            add: vec![record],
            ..RecordModificationSet::default()
        },
        Operation::Remove => RecordModificationSet {
            remove: vec![record],
            ..RecordModificationSet::default()
        },
    };
    ZoneUpdateRequest {
        name: zone.trim_end_matches('.').to_string(),
        records,
    }
}
