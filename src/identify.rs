use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::archive::read_class_bytes;
use crate::classfile::{DecodeError, method_bytecode};
use crate::digest::{hash_content, hash_instructions};
use crate::error::Result;
use crate::known::KnownHashes;
use crate::matcher::SignatureMatcher;

/// Class the built-in tables were generated from.
pub const DEFAULT_CLASS: &str = "org.apache.logging.log4j.core.net.JndiManager";

/// Which tier produced the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    ContentHash,
    InstructionHash,
    Signature,
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub size: u64,
    pub content_digest: String,
    /// Absent when the content digest alone identified the class.
    pub instruction_digest: Option<String>,
    pub version: Option<String>,
    pub evidence: Evidence,
    /// Every version confirmed by the signature matcher, best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
}

impl Identification {
    pub fn is_identified(&self) -> bool {
        self.version.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter<'k> {
    known: &'k KnownHashes,
    matcher: SignatureMatcher,
}

impl Fingerprinter<'static> {
    pub fn builtin() -> Self {
        Self::new(KnownHashes::builtin(), SignatureMatcher::builtin())
    }
}

impl<'k> Fingerprinter<'k> {
    pub fn new(known: &'k KnownHashes, matcher: SignatureMatcher) -> Self {
        Self { known, matcher }
    }

    pub fn identify(&self, jar_path: &Path, class_name: &str) -> Result<Identification> {
        let raw = read_class_bytes(jar_path, class_name)?;
        let identification = self.identify_bytes(&raw)?;
        debug!(
            jar = %jar_path.display(),
            class = class_name,
            version = ?identification.version,
            evidence = ?identification.evidence,
            "identified class"
        );
        Ok(identification)
    }

    /// Content digest first, then instruction digest, then signatures.
    /// The class is only decoded when the content digest is unknown.
    pub fn identify_bytes(&self, raw: &[u8]) -> std::result::Result<Identification, DecodeError> {
        let content_digest = hash_content(raw);
        let mut identification = Identification {
            size: raw.len() as u64,
            content_digest,
            instruction_digest: None,
            version: None,
            evidence: Evidence::Unmatched,
            candidates: Vec::new(),
        };

        if let Some(version) = self.known.lookup_by_content_hash(&identification.content_digest) {
            identification.version = Some(version.to_string());
            identification.evidence = Evidence::ContentHash;
            return Ok(identification);
        }

        let methods = method_bytecode(raw)?;
        let instruction_digest = hash_instructions(&methods);
        let known_version = self.known.lookup_by_instruction_hash(&instruction_digest);
        identification.instruction_digest = Some(instruction_digest);
        if let Some(version) = known_version {
            identification.version = Some(version.to_string());
            identification.evidence = Evidence::InstructionHash;
            return Ok(identification);
        }

        let report = self.matcher.report(&methods);
        if let Some(version) = report.best() {
            identification.version = Some(version.to_string());
            identification.evidence = Evidence::Signature;
            identification.candidates = report.confirmed.iter().map(|v| v.to_string()).collect();
        }
        Ok(identification)
    }
}
