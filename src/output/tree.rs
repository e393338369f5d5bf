use termtree::Tree;

use crate::drift::DriftReport;
use crate::plan::ChangeKind;

pub fn render(report: &DriftReport) -> String {
    let root = format!(
        "{} [severity: {}]",
        report.working_dir.display(),
        report.severity
    );
    let mut tree = Tree::new(root);

    for kind in ChangeKind::ALL {
        let addresses = report.summary.addresses(kind);
        if addresses.is_empty() || kind == ChangeKind::NoOp {
            continue;
        }
        let branch = Tree::new(format!("{} ({})", kind.label(), addresses.len()))
            .with_leaves(addresses.iter().cloned());
        tree.push(branch);
    }

    if !report.drifted.is_empty() {
        let branch = Tree::new(format!("drifted ({})", report.drifted.len()))
            .with_leaves(report.drifted.iter().cloned());
        tree.push(branch);
    }

    tree.to_string()
}
