use std::path::{Path, PathBuf};
use std::process::Command;

/// Run git in the workspace root and return trimmed stdout on success.
fn git(root: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(root).args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_owned())
}

fn main() {
    let root = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .and_then(|dir| dir.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(".."));

    // `<sha>` or `<sha>-dirty`; `unknown` outside a checkout
    let stamp = match git(&root, &["rev-parse", "--short", "HEAD"]).filter(|s| !s.is_empty()) {
        Some(sha) => {
            let dirty = git(&root, &["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|s| !s.is_empty());
            if dirty { format!("{sha}-dirty") } else { sha }
        }
        None => "unknown".to_owned(),
    };

    println!("cargo:rustc-env=TASKBOARD_BUILD_SHA={stamp}");
    for watched in [".git/HEAD", ".git/index"] {
        println!("cargo:rerun-if-changed={}", root.join(watched).display());
    }
}
