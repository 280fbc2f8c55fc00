use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

// multiple paths lets Dockerfile find them
const PROTO_DIRS: &[&str] = &["./proto", "../proto"];
const EXCLUDE_DIRS: &[&str] = &[".direnv"];

fn main() -> Result<()> {
    let includes: Vec<_> = PROTO_DIRS
        .iter()
        .filter(|dir| Path::new(dir).exists())
        .collect();

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&proto_files()?, &includes)
        .context("Failed to compile protos")
}

fn proto_files() -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir in PROTO_DIRS {
        if Path::new(dir).exists() {
            find_recursive(Path::new(dir), &mut files)?;
        }
    }
    Ok(files)
}

fn find_recursive(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let is_excluded = || {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| EXCLUDE_DIRS.contains(&name))
            .unwrap_or_default()
    };

    if !path.is_dir() || is_excluded() {
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let path = entry?.path();
        if path.is_dir() {
            find_recursive(&path, files)?;
        } else if path.extension().map_or(false, |ext| ext == "proto") {
            println!("cargo:rerun-if-changed={}", path.display());
            files.push(path.clone());
        }
    }

    Ok(())
}
