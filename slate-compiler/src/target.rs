//! Target descriptors and host platform detection.

use std::process::Command;

/// A code generation target: LLVM data layout, triple, and pointer width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub data_layout: String,
    pub triple: String,
    pub word_size: u32,
}

const DARWIN_I686_LAYOUT: &str = "e-p:32:32:32-i1:8:8-i8:8:8-i16:16:16-i32:32:32-i64:32:64-f32:32:32-f64:32:64-v64:64:64-v128:128:128-a0:0:64-f80:128:128-n8:16:32-S128";
const DARWIN_X86_64_LAYOUT: &str = "e-p:64:64:64-i1:8:8-i8:8:8-i16:16:16-i32:32:32-i64:64:64-f32:32:32-f64:64:64-v64:64:64-v128:128:128-a0:0:64-s0:64:64-f80:128:128-n8:16:32:64-S128";

impl Target {
    pub fn i686_darwin() -> Self {
        Self {
            data_layout: DARWIN_I686_LAYOUT.to_string(),
            triple: "i686-apple-darwin".to_string(),
            word_size: 32,
        }
    }

    pub fn x86_64_darwin() -> Self {
        Self {
            data_layout: DARWIN_X86_64_LAYOUT.to_string(),
            triple: "x86_64-apple-darwin".to_string(),
            word_size: 64,
        }
    }

    /// Look up the descriptor for an (os, arch) pair reported by `uname`.
    pub fn lookup(os: &str, arch: &str) -> Option<Self> {
        match (os, arch) {
            ("Darwin", "i686") => Some(Self::i686_darwin()),
            ("Darwin", "x86_64") => Some(Self::x86_64_darwin()),
            _ => None,
        }
    }

    /// Detect the descriptor for the machine we are running on.
    pub fn native() -> Option<Self> {
        let (os, _release, arch) = uname();
        Self::lookup(&os, &arch)
    }
}

/// Run `uname -srm` and split the result into (os, release, arch).
/// All three come back as `"unknown"` when the command fails.
pub fn uname() -> (String, String, String) {
    let unknown = || {
        (
            "unknown".to_string(),
            "unknown".to_string(),
            "unknown".to_string(),
        )
    };
    let out = match Command::new("uname").arg("-srm").output() {
        Ok(out) if out.status.success() => out,
        _ => return unknown(),
    };
    let text = String::from_utf8_lossy(&out.stdout);
    let mut toks = text.trim().split_whitespace();
    match (toks.next(), toks.next(), toks.next()) {
        (Some(os), Some(release), Some(arch)) => {
            (os.to_string(), release.to_string(), arch.to_string())
        }
        _ => unknown(),
    }
}
