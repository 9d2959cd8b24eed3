//! Minimal NSKeyedArchiver walker.
//!
//! A keyed archive is a binary plist holding a flat `$objects` table;
//! dictionary fields reference other table entries by UID index, so the
//! table forms a graph that may share entries or cycle. We never traverse
//! that graph — the one descent we need is "first dictionary carrying a
//! named field whose UID resolves to a raw-data entry", and every index
//! lookup is bounds-checked against the table.

use std::io::Cursor;

use plist::Value;

/// Minimum length for a data entry to plausibly start with a
/// compressed-block header.
const MIN_PAYLOAD_LEN: usize = 4;

/// Locate the compressed payload referenced by `field_name` inside a keyed
/// archive.
///
/// Scans the object table in order. A matching field whose reference is out
/// of range, points at a non-data entry, or points at data too short to
/// carry a block header does not stop the scan; later entries may still
/// hold a usable payload. Returns `None` when the outer structure is not a
/// parseable plist or the table is exhausted.
pub fn find_compressed_payload(bytes: &[u8], field_name: &str) -> Option<Vec<u8>> {
    let value = Value::from_reader(Cursor::new(bytes)).ok()?;
    let objects = value.as_dictionary()?.get("$objects")?.as_array()?;

    for object in objects {
        let Some(dict) = object.as_dictionary() else {
            continue;
        };
        let Some(reference) = dict.get(field_name) else {
            continue;
        };
        let Some(index) = reference_index(reference) else {
            continue;
        };
        // Out-of-range reference: treated as "not found", not a fault.
        let Some(target) = objects.get(index) else {
            continue;
        };
        if let Some(data) = target.as_data() {
            if data.len() >= MIN_PAYLOAD_LEN {
                return Some(data.to_vec());
            }
        }
    }

    None
}

/// Interpret a field value as an index into the object table.
///
/// Archives written by the platform use UID markers, but integer indices
/// show up in hand-rolled variants and are accepted too.
fn reference_index(value: &Value) -> Option<usize> {
    match value {
        Value::Uid(uid) => usize::try_from(uid.get()).ok(),
        Value::Integer(i) => usize::try_from(i.as_unsigned()?).ok(),
        _ => None,
    }
}
