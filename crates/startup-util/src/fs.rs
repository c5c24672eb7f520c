use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read a module source file, replacing invalid UTF-8 with U+FFFD.
///
/// Module sources handed to the transform pipeline must be text; a stray
/// byte should not abort a build.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_source(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Write transformed output next to its final location, then rename it into place.
///
/// Readers see either the previous contents or the new ones.
///
/// # Errors
/// Returns an error if the staging write or the rename fails.
pub fn write_output(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let staging = staging_path(path);

    let result = File::create(&staging).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = result {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    if let Err(e) = fs::rename(&staging, path) {
        // Windows refuses to rename over an existing file.
        if cfg!(windows) {
            fs::copy(&staging, path)?;
            let _ = fs::remove_file(&staging);
            return Ok(());
        }
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let dir = path.parent().unwrap_or(Path::new("."));
    dir.join(format!(".{name}.{}.partial", std::process::id()))
}
