use std::fmt::{self, Write};
use std::sync::LazyLock;

use colored::{ColoredString, Colorize};
use regex::Regex;

use crate::drift::{ChangeCounts, DriftReport, Severity};
use crate::plan::{AttributeChange, ChangeKind, DisplayValue};

/// Sections are printed most-dangerous first.
const SECTION_ORDER: [ChangeKind; 4] = [
    ChangeKind::Replace,
    ChangeKind::Delete,
    ChangeKind::Update,
    ChangeKind::Create,
];

// Anchored to a whole line; attribute lines are always indented.
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^Summary: (\d+) to create, (\d+) to update, (\d+) to replace, (\d+) to delete, (\d+) unchanged\.$",
    )
    .expect("summary pattern is valid")
});

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ansi pattern is valid"));

pub fn render(report: &DriftReport, color: bool) -> Result<String, fmt::Error> {
    let mut out = String::new();

    write!(out, "Terraform drift report for {}", report.working_dir.display())?;
    if let Some(version) = &report.terraform_version {
        write!(out, " (terraform {})", version)?;
    }
    out.push_str("\n\n");

    if report.summary.pending() == 0 {
        out.push_str("No changes. Infrastructure matches the configuration.\n\n");
    }

    for kind in SECTION_ORDER {
        write_section(&mut out, report, kind, color)?;
    }

    if !report.drifted.is_empty() {
        out.push_str("Changed outside of Terraform:\n");
        for address in &report.drifted {
            writeln!(out, "  {}", address)?;
        }
        out.push('\n');
    }

    writeln!(out, "{}", summary_line(report))?;
    let safe = if report.safe_to_remediate { "yes" } else { "no" };
    let severity = report.severity.to_string();
    let severity = if color {
        severity_color(report.severity, &severity).to_string()
    } else {
        severity
    };
    writeln!(out, "Severity: {} (safe to remediate: {})", severity, safe)?;

    Ok(out)
}

fn write_section(
    out: &mut String,
    report: &DriftReport,
    kind: ChangeKind,
    color: bool,
) -> fmt::Result {
    let mut changes = report.changes_of(kind).peekable();
    if changes.peek().is_none() {
        return Ok(());
    }

    let title = section_title(kind);
    if color {
        writeln!(out, "{}", paint(&title, kind, color).bold())?;
    } else {
        writeln!(out, "{}", title)?;
    }
    for change in changes {
        write!(out, "  {} {}", paint(kind.symbol(), kind, color), change.address)?;
        if let Some(reason) = &change.action_reason {
            write!(out, " ({})", reason)?;
        }
        out.push('\n');
        for attribute in &change.attributes {
            writeln!(out, "        {}", attribute_line(kind, attribute))?;
        }
    }
    out.push('\n');
    Ok(())
}

pub fn summary_line(report: &DriftReport) -> String {
    format!("Summary: {}.", report.summary)
}

/// Recovers the counts from the last rendered summary line; ANSI escapes are ignored.
pub fn parse_summary(text: &str) -> Option<ChangeCounts> {
    let plain = ANSI_RE.replace_all(text, "");
    let caps = SUMMARY_RE.captures_iter(&plain).last()?;
    let n = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<usize>().ok());

    Some(ChangeCounts {
        create: n(1)?,
        update: n(2)?,
        replace: n(3)?,
        delete: n(4)?,
        no_op: n(5)?,
    })
}

fn section_title(kind: ChangeKind) -> String {
    let verb = match kind {
        ChangeKind::Create => "created",
        ChangeKind::Update => "updated in-place",
        ChangeKind::Delete => "destroyed",
        ChangeKind::Replace => "replaced",
        ChangeKind::NoOp => "left unchanged",
    };
    format!("Resources to be {}:", verb)
}

fn attribute_line(kind: ChangeKind, attribute: &AttributeChange) -> String {
    let path = if attribute.path.is_empty() {
        "(value)"
    } else {
        attribute.path.as_str()
    };

    match (kind, &attribute.before, &attribute.after) {
        (ChangeKind::Create, DisplayValue::Absent, after) => format!("{} = {}", path, after),
        (ChangeKind::Delete, before, _) => format!("{} = {}", path, before),
        (_, before, after) => format!("{}: {} -> {}", path, before, after),
    }
}

fn paint(text: &str, kind: ChangeKind, color: bool) -> ColoredString {
    if !color {
        return text.normal();
    }
    match kind {
        ChangeKind::Create => text.green(),
        ChangeKind::Update => text.yellow(),
        ChangeKind::Delete => text.red(),
        ChangeKind::Replace => text.magenta(),
        ChangeKind::NoOp => text.normal(),
    }
}

fn severity_color(severity: Severity, text: &str) -> ColoredString {
    match severity {
        Severity::High => text.red().bold(),
        Severity::Medium => text.yellow(),
        Severity::Low => text.cyan(),
        Severity::None => text.green(),
    }
}
