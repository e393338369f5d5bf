use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::drift::DriftReport;
use crate::plan::{ChangeKind, PlanAnalysis};

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Action")]
    action: &'static str,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Changed attributes")]
    attributes: usize,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Changes")]
    count: usize,
}

pub fn render(report: &DriftReport) -> String {
    let rows: Vec<ChangeRow> = report
        .changes
        .iter()
        .filter(|c| c.kind != ChangeKind::NoOp)
        .map(|c| ChangeRow {
            action: c.kind.label(),
            address: c.address.clone(),
            resource_type: c.resource_type.clone(),
            attributes: c.attributes.len(),
        })
        .collect();

    if rows.is_empty() {
        return format!("No changes.\n{}\n", super::text::summary_line(report));
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n{}\n", table, super::text::summary_line(report))
}

/// Per type / provider / module breakdown from [`PlanAnalysis`].
pub fn render_breakdown(analysis: &PlanAnalysis) -> String {
    let groups = [
        ("type", &analysis.by_type),
        ("provider", &analysis.by_provider),
        ("module", &analysis.by_module),
    ];

    let rows: Vec<CountRow> = groups
        .into_iter()
        .flat_map(|(group, counts)| {
            counts.iter().map(move |(key, count)| CountRow {
                group: group.to_string(),
                key: key.clone(),
                count: *count,
            })
        })
        .collect();

    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n", table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Plan;
    use crate::testing::plan_with_actions;

    #[test]
    fn test_table_lists_pending_changes() {
        let plan = plan_with_actions(&[&["create"], &["no-op"], &["delete"]]);
        let output = render(&DriftReport::from_plan(&plan, "/infra"));

        assert!(output.contains("Action"));
        assert!(output.contains("null_resource.r0"));
        assert!(output.contains("null_resource.r2"));
        assert!(!output.contains("null_resource.r1"));
        assert!(output.contains("Summary: 1 to create"));
    }

    #[test]
    fn test_table_empty_report() {
        let output = render(&DriftReport::from_plan(&Plan::default(), "/infra"));
        assert!(output.starts_with("No changes."));
    }

    #[test]
    fn test_breakdown_groups() {
        let plan = plan_with_actions(&[&["create"], &["update"]]);
        let output = render_breakdown(&PlanAnalysis::from_plan(&plan));
        assert!(output.contains("null_resource"));
        assert!(output.contains("provider"));
        assert!(output.contains("root"));
    }
}
