//! Plan inclusion and ordering rules.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use purviewx_domain::{generate_plan, step_ids};
use purviewx_types::{CloudEnvironment, CustomSit, WizardData};
use std::collections::BTreeSet;

fn ids(data: &WizardData) -> Vec<&'static str> {
    generate_plan(data).iter().map(|s| s.id).collect()
}

/// No SITs, one enabled retention policy, no enabled DLP, auditing on, no case.
fn end_to_end_fixture() -> WizardData {
    let mut data = WizardData::default();
    data.custom_sits.clear();
    for (i, p) in data.retention_policies.iter_mut().enumerate() {
        p.is_enabled = i == 0;
    }
    for p in data.dlp_policies.iter_mut() {
        p.is_enabled = false;
    }
    data.audit_settings.is_enabled = true;
    data.e_discovery_case.create = false;
    data
}

#[test]
fn end_to_end_step_sequence() {
    assert_eq!(
        ids(&end_to_end_fixture()),
        vec![
            "connect-api",
            "configure-labels",
            "configure-retention",
            "enable-auditing",
            "verify-deployment",
        ]
    );
}

#[test]
fn baseline_step_sequence() {
    assert_eq!(
        ids(&WizardData::default()),
        vec![
            "connect-api",
            "configure-labels",
            "configure-retention",
            "configure-dlp",
            "enable-auditing",
            "create-ediscovery",
            "verify-deployment",
        ]
    );
}

#[test]
fn retention_step_omitted_when_nothing_enabled() {
    let mut data = WizardData::default();
    data.retention_policies.clear();
    assert!(!ids(&data).contains(&step_ids::CONFIGURE_RETENTION));

    let mut data = WizardData::default();
    for p in data.retention_policies.iter_mut() {
        p.is_enabled = false;
    }
    assert!(!ids(&data).contains(&step_ids::CONFIGURE_RETENTION));
}

#[test]
fn retention_title_counts_only_enabled_policies() {
    let plan = generate_plan(&end_to_end_fixture());
    let step = plan
        .iter()
        .find(|s| s.id == step_ids::CONFIGURE_RETENTION)
        .unwrap();
    assert_eq!(step.title, "Enable 1 Retention Policies");

    let mut data = WizardData::default();
    for p in data.retention_policies.iter_mut() {
        p.is_enabled = true;
    }
    let plan = generate_plan(&data);
    let step = plan
        .iter()
        .find(|s| s.id == step_ids::CONFIGURE_RETENTION)
        .unwrap();
    assert_eq!(step.title, "Enable 3 Retention Policies");
}

#[test]
fn sit_step_follows_connections() {
    let mut data = WizardData::default();
    data.custom_sits.push(CustomSit {
        id: "sit-1".to_string(),
        name: "Employee ID".to_string(),
        description: "ids".to_string(),
        keywords: vec![],
        confidence: 80,
        xml_content: String::new(),
    });
    let ids = ids(&data);
    assert_eq!(ids[0], step_ids::CONNECT_API);
    assert_eq!(ids[1], step_ids::IMPORT_SITS);
    assert_eq!(ids[2], step_ids::CONFIGURE_LABELS);
}

#[test]
fn minimal_plan_is_connect_labels_verify() {
    let mut data = end_to_end_fixture();
    data.retention_policies.clear();
    data.audit_settings.is_enabled = false;
    assert_eq!(
        ids(&data),
        vec!["connect-api", "configure-labels", "verify-deployment"]
    );
}

fn arb_wizard() -> impl Strategy<Value = WizardData> {
    (
        prop::sample::select(CloudEnvironment::ALL.to_vec()),
        0usize..4,
        prop::collection::vec(any::<bool>(), 3),
        prop::collection::vec(any::<bool>(), 3),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(cloud, sits, retention, dlp, audit, case)| {
            let mut data = WizardData::default();
            data.cloud_environment = cloud;
            data.custom_sits = (0..sits)
                .map(|i| CustomSit {
                    id: format!("sit-{i}"),
                    name: format!("SIT {i}"),
                    description: String::new(),
                    keywords: vec![],
                    confidence: 75,
                    xml_content: String::new(),
                })
                .collect();
            for (p, on) in data.retention_policies.iter_mut().zip(retention) {
                p.is_enabled = on;
            }
            for (p, on) in data.dlp_policies.iter_mut().zip(dlp) {
                p.is_enabled = on;
            }
            data.audit_settings.is_enabled = audit;
            data.e_discovery_case.create = case;
            data
        })
}

proptest! {
    #[test]
    fn plan_is_deterministic(data in arb_wizard()) {
        let first: Vec<_> = generate_plan(&data);
        let second: Vec<_> = generate_plan(&data);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn plan_ids_unique_and_bracketed(data in arb_wizard()) {
        let ids = ids(&data);
        let unique: BTreeSet<_> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());
        prop_assert_eq!(ids.first().copied(), Some(step_ids::CONNECT_API));
        prop_assert_eq!(ids.last().copied(), Some(step_ids::VERIFY_DEPLOYMENT));
        prop_assert!(ids.contains(&step_ids::CONFIGURE_LABELS));
    }

    #[test]
    fn optional_steps_track_their_flags(data in arb_wizard()) {
        let ids = ids(&data);
        prop_assert_eq!(ids.contains(&step_ids::IMPORT_SITS), !data.custom_sits.is_empty());
        prop_assert_eq!(
            ids.contains(&step_ids::CONFIGURE_RETENTION),
            data.enabled_retention_policies().count() > 0
        );
        prop_assert_eq!(
            ids.contains(&step_ids::CONFIGURE_DLP),
            data.enabled_dlp_policies().count() > 0
        );
        prop_assert_eq!(ids.contains(&step_ids::ENABLE_AUDITING), data.audit_settings.is_enabled);
        prop_assert_eq!(ids.contains(&step_ids::CREATE_EDISCOVERY), data.e_discovery_case.create);
    }
}
