//! Canonical JSON and atomic writes.
//! - Objects: keys sorted lexicographically (byte order), recursively
//! - Arrays: order preserved
//! - Output: compact, no trailing newline
//! - `write_bytes_atomic`: temp file beside the target + fsync + rename;
//!   if the rename fails, write the target in place and drop the temp

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::IoResult;

/// Compact canonical bytes for `v`.
pub fn to_canonical_json_bytes(v: &Value) -> Vec<u8> {
    let mut out = String::with_capacity(256);
    push_value(v, &mut out);
    out.into_bytes()
}

/// Serialize `v` canonically and write it to `path` atomically.
pub fn write_canonical_file(path: &Path, v: &Value) -> IoResult<()> {
    write_bytes_atomic(path, &to_canonical_json_bytes(v))
}

/// Replace the contents of `path` with `bytes`, creating parent directories.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> IoResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let tmp = unique_tmp_path(path);
    {
        let mut tf = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
        tf.write_all(bytes)?;
        tf.sync_all()?;
    }

    if fs::rename(&tmp, path).is_err() {
        let direct = write_in_place(path, bytes);
        let _ = fs::remove_file(&tmp);
        direct?;
    }
    let _ = fsync_dir(&parent);
    Ok(())
}

fn write_in_place(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    f.write_all(bytes)?;
    f.sync_all()
}

fn push_value(v: &Value, out: &mut String) {
    match v {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_string(k, out);
                out.push(':');
                push_value(val, out);
            }
            out.push('}');
        }
        Value::String(s) => push_string(s, out),
        // Scalars have a single compact rendering.
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn push_string(s: &str, out: &mut String) {
    // Display on a string Value yields the escaped, quoted literal.
    out.push_str(&Value::String(s.to_owned()).to_string());
}

/// "<filename>.<pid>.<counter>.tmp" next to `target`.
fn unique_tmp_path(target: &Path) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    target.with_file_name(format!("{fname}.{}.{n}.tmp", std::process::id()))
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}

#[cfg(not(unix))]
#[inline]
fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
