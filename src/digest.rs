use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::archive::extract_class;
use crate::classfile::MethodBytecode;
use crate::error::Result;

/// Suffix identifying how method bytecode is serialized before hashing.
/// Instruction digests in the known-hash tables carry it.
pub const INSTRUCTION_SCHEME: &str = "v0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassHash {
    pub size: u64,
    pub content_digest: String,
    pub instruction_digest: String,
}

pub fn hash_content(raw: &[u8]) -> String {
    hex::encode(md5::compute(raw).0)
}

pub fn hash_instructions(methods: &[MethodBytecode]) -> String {
    let mut ctx = md5::Context::new();
    for method in methods {
        ctx.consume(method);
    }
    format!("{}-{INSTRUCTION_SCHEME}", hex::encode(ctx.compute().0))
}

pub fn hash_class(jar_path: &Path, class_name: &str) -> Result<ClassHash> {
    let extracted = extract_class(jar_path, class_name)?;
    Ok(ClassHash {
        size: extracted.raw.len() as u64,
        content_digest: hash_content(&extracted.raw),
        instruction_digest: hash_instructions(&extracted.methods),
    })
}
