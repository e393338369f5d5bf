#![allow(dead_code)]

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use tempfile::TempDir;

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[cfg(unix)]
/// A throwaway working directory plus a shell script that mimics the
/// `terraform` subcommands tfdrift uses, replaying fixture JSON.
pub struct FakeTerraform {
    pub dir: TempDir,
    pub binary: PathBuf,
}

#[cfg(unix)]
impl FakeTerraform {
    pub fn new(plan_fixture: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("fake-terraform");
        let log = dir.path().join("calls.log");

        let script = format!(
            r#"#!/bin/sh
echo "$@" >> "{log}"
if [ -n "$FAKE_TF_FAIL" ]; then
  echo "Error: simulated failure" >&2
  exit 1
fi
case "$1" in
  version)
    echo '{{"terraform_version":"1.7.5","platform":"linux_amd64"}}'
    ;;
  init)
    echo "Terraform has been successfully initialized!"
    ;;
  plan)
    for arg in "$@"; do
      case "$arg" in
        -out=*) : > "${{arg#-out=}}" ;;
      esac
    done
    exit 2
    ;;
  show)
    if [ -n "$4" ]; then
      cat "{plan}"
    else
      cat "{state}"
    fi
    ;;
  apply)
    echo "Apply complete! Resources: 1 added, 1 changed, 0 destroyed."
    ;;
  state)
    echo "aws_s3_bucket.logs"
    echo "module.db.aws_db_instance.main"
    ;;
  output)
    echo '{{"bucket":{{"sensitive":false,"type":"string","value":"acme-logs"}}}}'
    ;;
  *)
    echo "unknown command: $1" >&2
    exit 1
    ;;
esac
"#,
            log = log.display(),
            plan = fixture_path(plan_fixture).display(),
            state = fixture_path("state.json").display(),
        );

        std::fs::write(&binary, script).unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, binary }
    }

    pub fn working_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
