//! Checksum behaviour over wizard snapshots.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use purviewx_hash::{checksum, checksum_of, checksum_value};
use std::collections::BTreeMap;
use purviewx_types::WizardData;
use serde_json::{Map, Value};

#[test]
fn identical_snapshots_share_a_checksum() {
    let a = WizardData::default();
    let b = WizardData::default();
    assert_eq!(checksum(&a).unwrap(), checksum(&b).unwrap());
}

#[test]
fn checksum_is_hex_with_prefix() {
    let sum = checksum(&WizardData::default()).unwrap();
    assert!(sum.starts_with("0x"));
    assert!(sum[2..].chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn consent_insertion_order_does_not_matter() {
    let mut a = WizardData::default();
    a.consents.insert("User.Read.All".into(), true);
    a.consents.insert("Policy.Read.All".into(), true);

    let mut b = WizardData::default();
    b.consents.insert("Policy.Read.All".into(), true);
    b.consents.insert("User.Read.All".into(), true);

    assert_eq!(checksum(&a).unwrap(), checksum(&b).unwrap());
}

#[test]
fn nested_field_changes_alter_checksum() {
    let base = WizardData::default();
    let base_sum = checksum(&base).unwrap();

    let mut label = base.clone();
    label.sensitivity_labels[2].priority = 9;
    assert_ne!(checksum(&label).unwrap(), base_sum);

    let mut dlp = base.clone();
    dlp.dlp_policies[1].is_enabled = true;
    assert_ne!(checksum(&dlp).unwrap(), base_sum);

    let mut locations = base.clone();
    locations.dlp_policies[0].locations.pop();
    assert_ne!(checksum(&locations).unwrap(), base_sum);

    let mut audit = base.clone();
    audit.audit_settings.retention_days = 90;
    assert_ne!(checksum(&audit).unwrap(), base_sum);

    let mut case = base.clone();
    case.e_discovery_case.name.push('!');
    assert_ne!(checksum(&case).unwrap(), base_sum);
}

#[test]
fn reordering_labels_changes_checksum() {
    // Array order is content; only object key order is canonicalized.
    let base = WizardData::default();
    let mut reordered = base.clone();
    reordered.sensitivity_labels.reverse();
    assert_ne!(checksum(&reordered).unwrap(), checksum(&base).unwrap());
}

#[test]
fn wizard_checksum_matches_value_checksum() {
    let data = WizardData::default();
    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(checksum(&data).unwrap(), checksum_value(&value));
}

#[test]
fn unserializable_input_is_an_error_not_a_null_hash() {
    let mut tuple_keys = BTreeMap::new();
    tuple_keys.insert((1u8, 2u8), "x");
    assert!(checksum_of(&tuple_keys).is_err());
    assert_ne!(
        checksum_of(&WizardData::default()).unwrap(),
        checksum_value(&Value::Null)
    );
}

fn permuted_object(value: &Value, seed: &[usize]) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map
                .iter()
                .map(|(k, v)| (k.clone(), permuted_object(v, seed)))
                .collect();
            if !entries.is_empty() {
                for (i, s) in seed.iter().enumerate() {
                    let a = i % entries.len();
                    let b = s % entries.len();
                    entries.swap(a, b);
                }
            }
            let mut out = Map::new();
            for (k, v) in entries {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| permuted_object(v, seed)).collect()),
        other => other.clone(),
    }
}

proptest! {
    #[test]
    fn checksum_ignores_key_iteration_order(seed in prop::collection::vec(0usize..64, 0..16)) {
        let value = serde_json::to_value(WizardData::default()).unwrap();
        let permuted = permuted_object(&value, &seed);
        prop_assert_eq!(checksum_value(&value), checksum_value(&permuted));
    }
}

#[test]
fn collisions_are_possible() {
    // Same weakness as any 31-multiplier string hash: "Aa" and "BB" agree.
    assert_eq!(
        purviewx_hash::rolling_hash("Aa"),
        purviewx_hash::rolling_hash("BB")
    );
}
