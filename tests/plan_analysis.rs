use std::path::Path;

use tfdrift::output::{self, OutputFormat, parse_summary};
use tfdrift::plan::{DisplayValue, PlanAnalysis, SENSITIVE_PLACEHOLDER, UNKNOWN_PLACEHOLDER};
use tfdrift::{ChangeKind, DriftReport, Plan, Severity};

fn fixture(name: &str) -> Plan {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    Plan::from_path(&path).unwrap()
}

#[test]
fn test_mixed_plan_classification() {
    let report = DriftReport::from_plan(&fixture("plan_mixed.json"), "/infra/prod");
    let summary = &report.summary;

    assert_eq!(summary.create, 1);
    assert_eq!(summary.update, 1);
    assert_eq!(summary.replace, 1);
    assert_eq!(summary.delete, 1);
    assert_eq!(summary.no_op, 1);
    assert_eq!(summary.total(), report.changes.len());
    assert_eq!(report.severity, Severity::High);
    assert!(!report.safe_to_remediate);
    assert_eq!(
        summary.addresses(ChangeKind::Replace),
        ["module.db.aws_db_instance.main"]
    );
    assert_eq!(report.drifted, vec!["aws_security_group.web".to_string()]);
}

#[test]
fn test_data_source_reads_are_not_counted() {
    let report = DriftReport::from_plan(&fixture("plan_mixed.json"), "/infra/prod");
    assert!(
        report
            .changes
            .iter()
            .all(|c| !c.address.starts_with("data."))
    );
}

#[test]
fn test_replace_attributes_hide_secrets() {
    let report = DriftReport::from_plan(&fixture("plan_mixed.json"), "/infra/prod");
    let db = report
        .changes
        .iter()
        .find(|c| c.kind == ChangeKind::Replace)
        .unwrap();

    assert_eq!(db.action_reason.as_deref(), Some("replace_because_cannot_update"));
    let password = db.attributes.iter().find(|a| a.path == "password").unwrap();
    assert_eq!(password.before, DisplayValue::Sensitive);
    assert_eq!(password.after, DisplayValue::Sensitive);
    let endpoint = db.attributes.iter().find(|a| a.path == "endpoint").unwrap();
    assert_eq!(endpoint.after, DisplayValue::Unknown);

    let text = output::render(&report, OutputFormat::Text, false).unwrap();
    assert!(!text.contains("old-secret"));
    assert!(!text.contains("new-secret"));
    assert!(text.contains(SENSITIVE_PLACEHOLDER));
    assert!(text.contains(UNKNOWN_PLACEHOLDER));
}

#[test]
fn test_additive_plan_is_safe() {
    let report = DriftReport::from_plan(&fixture("plan_additive.json"), "/infra/prod");
    assert_eq!(report.severity, Severity::Medium);
    assert!(report.safe_to_remediate);
}

#[test]
fn test_rendered_summary_recovers_counts() {
    for name in ["plan_mixed.json", "plan_additive.json"] {
        let report = DriftReport::from_plan(&fixture(name), "/infra/prod");
        for format in [OutputFormat::Text, OutputFormat::Table] {
            let rendered = output::render(&report, format, false).unwrap();
            let counts = parse_summary(&rendered).unwrap();
            assert_eq!(counts, report.summary.counts(), "{} {:?}", name, format);
        }
    }
}

#[test]
fn test_plan_analysis_breakdown() {
    let analysis = PlanAnalysis::from_plan(&fixture("plan_mixed.json"));

    assert_eq!(analysis.by_provider["aws"], 3);
    assert_eq!(analysis.by_provider["cloudflare"], 1);
    assert_eq!(analysis.by_module["module.db"], 1);
    assert_eq!(analysis.by_module["root"], 3);
    assert!(!analysis.by_type.contains_key("aws_iam_role"));
    assert_eq!(analysis.output_changes["bucket_arn"], ChangeKind::Create);
    assert_eq!(analysis.output_changes["db_endpoint"], ChangeKind::Update);
    assert!(analysis.has_changes());
}
