//! Running the project's own install and build scripts.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{info, instrument};

/// Which JavaScript package manager a project uses, judged by its lockfile.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    #[display("npm")]
    Npm,
    #[display("pnpm")]
    Pnpm,
    #[display("yarn")]
    Yarn,
}

impl PackageManager {
    /// `pnpm-lock.yaml` wins over `yarn.lock`; anything else is npm.
    pub fn detect(project: &Path) -> Self {
        if project.join("pnpm-lock.yaml").exists() {
            Self::Pnpm
        } else if project.join("yarn.lock").exists() {
            Self::Yarn
        } else {
            Self::Npm
        }
    }

    pub fn executable(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }

    /// Arguments for the install step followed by the build step.
    pub fn steps(&self, project: &Path) -> [&'static [&'static str]; 2] {
        const INSTALL: &[&str] = &["install"];
        const FROZEN_INSTALL: &[&str] = &["install", "--frozen-lockfile"];
        const CLEAN_INSTALL: &[&str] = &["ci"];
        const RUN_BUILD: &[&str] = &["run", "build"];
        const BUILD: &[&str] = &["build"];
        match self {
            Self::Pnpm if project.join("pnpm-lock.yaml").exists() => [FROZEN_INSTALL, RUN_BUILD],
            Self::Pnpm => [INSTALL, RUN_BUILD],
            Self::Yarn => [INSTALL, BUILD],
            Self::Npm if project.join("package-lock.json").exists() => [CLEAN_INSTALL, RUN_BUILD],
            Self::Npm => [INSTALL, RUN_BUILD],
        }
    }
}

/// Install dependencies and run the `build` script, optionally removing
/// `dist/` first.
#[instrument(skip_all, fields(project = %project.display(), manager))]
pub fn build(project: &Path, clean: bool) -> Result<()> {
    let manager = PackageManager::detect(project);
    tracing::Span::current().record("manager", manager.executable());
    // `which` also resolves `npm.cmd` and friends on Windows.
    let Ok(executable) = which::which(manager.executable()) else {
        exn::bail!(ErrorKind::ToolNotFound(manager.executable().to_string()));
    };

    if clean {
        let dist = project.join(crate::DIST_DIR);
        if dist.exists() {
            info!(dist = %dist.display(), "Cleaning build output");
            fs::remove_dir_all(&dist).map_err(ErrorKind::Io)?;
        }
    }

    for args in manager.steps(project) {
        let command = format!("{} {}", manager, args.join(" "));
        info!(%command, "Running");
        let status = Command::new(&executable).args(args).current_dir(project).status().map_err(ErrorKind::Io)?;
        if !status.success() {
            exn::bail!(ErrorKind::CommandFailed { command, code: status.code() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], PackageManager::Npm)]
    #[case(&["package-lock.json"], PackageManager::Npm)]
    #[case(&["yarn.lock"], PackageManager::Yarn)]
    #[case(&["pnpm-lock.yaml"], PackageManager::Pnpm)]
    #[case(&["yarn.lock", "pnpm-lock.yaml"], PackageManager::Pnpm)]
    fn test_detect(#[case] lockfiles: &[&str], #[case] expected: PackageManager) {
        let project = tempfile::tempdir().unwrap();
        for lockfile in lockfiles {
            fs::write(project.path().join(lockfile), b"").unwrap();
        }
        assert_eq!(PackageManager::detect(project.path()), expected);
    }

    #[rstest]
    #[case(PackageManager::Npm, &[], ["install", "run build"])]
    #[case(PackageManager::Npm, &["package-lock.json"], ["ci", "run build"])]
    #[case(PackageManager::Pnpm, &[], ["install", "run build"])]
    #[case(PackageManager::Pnpm, &["pnpm-lock.yaml"], ["install --frozen-lockfile", "run build"])]
    #[case(PackageManager::Yarn, &["yarn.lock"], ["install", "build"])]
    fn test_steps(#[case] manager: PackageManager, #[case] lockfiles: &[&str], #[case] expected: [&str; 2]) {
        let project = tempfile::tempdir().unwrap();
        for lockfile in lockfiles {
            fs::write(project.path().join(lockfile), b"").unwrap();
        }
        let steps = manager.steps(project.path()).map(|args| args.join(" "));
        assert_eq!(steps, expected);
    }
}
