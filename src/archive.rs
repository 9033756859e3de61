use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::classfile::{MethodBytecode, method_bytecode};
use crate::error::{Error, Result};

/// Class entries larger than this are rejected as corrupt.
const MAX_CLASS_BYTES: u64 = 64 * 1024 * 1024;
/// Upper bound on the buffer preallocated from the size an entry declares.
const PREALLOC_LIMIT: u64 = 1024 * 1024;

/// Raw bytes of a class entry together with its decoded method bodies.
#[derive(Debug, Clone)]
pub struct ExtractedClass {
    pub raw: Vec<u8>,
    pub methods: Vec<MethodBytecode>,
}

pub fn class_name_to_entry_name(class_name: &str) -> String {
    format!("{}.class", class_name.replace('.', "/"))
}

fn map_jar(jar_path: &Path) -> Result<Mmap> {
    let file = File::open(jar_path).map_err(|e| Error::archive(jar_path, e))?;
    // SAFETY: The file is opened read-only and the mapping never outlives this call chain.
    unsafe { Mmap::map(&file) }.map_err(|e| Error::archive(jar_path, e))
}

fn open_archive<'a>(jar_path: &Path, mmap: &'a Mmap) -> Result<ZipArchive<Cursor<&'a [u8]>>> {
    ZipArchive::new(Cursor::new(&mmap[..])).map_err(|e| Error::archive(jar_path, e))
}

pub fn read_class_bytes(jar_path: &Path, class_name: &str) -> Result<Vec<u8>> {
    let mmap = map_jar(jar_path)?;
    let mut archive = open_archive(jar_path, &mmap)?;
    let entry_name = class_name_to_entry_name(class_name);

    let mut entry = match archive.by_name(&entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(Error::NotFound {
                path: jar_path.to_path_buf(),
                entry: entry_name,
            });
        }
        Err(e) => return Err(Error::archive(jar_path, e)),
    };

    let declared = entry.size();
    read_bounded(&mut entry, declared, MAX_CLASS_BYTES).map_err(|e| Error::archive(jar_path, e))
}

/// Read at most `limit` bytes. `declared` comes from the zip headers and is
/// only used, capped, as a capacity hint.
fn read_bounded(
    reader: impl Read,
    declared: u64,
    limit: u64,
) -> std::result::Result<Vec<u8>, ZipError> {
    let mut buf = Vec::with_capacity(declared.min(limit).min(PREALLOC_LIMIT) as usize);
    reader.take(limit.saturating_add(1)).read_to_end(&mut buf)?;
    if buf.len() as u64 > limit {
        return Err(ZipError::InvalidArchive("class entry exceeds the size limit"));
    }
    Ok(buf)
}

pub fn extract_class(jar_path: &Path, class_name: &str) -> Result<ExtractedClass> {
    let raw = read_class_bytes(jar_path, class_name)?;
    let methods = method_bytecode(&raw)?;
    tracing::trace!(
        jar = %jar_path.display(),
        class = class_name,
        methods = methods.len(),
        "extracted class"
    );
    Ok(ExtractedClass { raw, methods })
}

/// Names of every `.class` entry in the archive, in central directory order.
pub fn class_entry_names(jar_path: &Path) -> Result<Vec<String>> {
    let mmap = map_jar(jar_path)?;
    let archive = open_archive(jar_path, &mmap)?;

    Ok(archive
        .file_names()
        .filter(|name| name.ends_with(".class"))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classfile::tests::ClassBuilder;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};
    use zip::write::{FileOptions, ZipWriter};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    pub(crate) fn temp_jar_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        p.push(format!(
            "log4j-fingerprint-{}-{}-{}-{}.jar",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos(),
            n,
            name
        ));
        p
    }

    pub(crate) fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn class_name_to_entry_name_uses_slashes() {
        assert_eq!(
            class_name_to_entry_name("org.apache.logging.log4j.core.net.JndiManager"),
            "org/apache/logging/log4j/core/net/JndiManager.class"
        );
        assert_eq!(class_name_to_entry_name("Root"), "Root.class");
    }

    #[test]
    fn read_class_bytes_returns_entry_content() {
        let jar = temp_jar_path("read");
        write_jar(
            &jar,
            &[
                ("org/example/A.class", b"abc".as_slice()),
                ("META-INF/MANIFEST.MF", b"".as_slice()),
            ],
        );

        assert_eq!(read_class_bytes(&jar, "org.example.A").unwrap(), b"abc");

        let _ = std::fs::remove_file(&jar);
    }

    #[test]
    fn missing_entry_is_not_found() {
        let jar = temp_jar_path("missing");
        write_jar(&jar, &[("org/example/A.class", b"abc")]);

        let err = read_class_bytes(&jar, "org.example.B").unwrap_err();
        match err {
            Error::NotFound { entry, .. } => assert_eq!(entry, "org/example/B.class"),
            other => panic!("unexpected error: {other:?}"),
        }

        let _ = std::fs::remove_file(&jar);
    }

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = !0u32;
        for &b in data {
            crc ^= b as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    /// A stored single-entry zip whose central directory declares an
    /// uncompressed size of `u64::MAX` through a zip64 extra field.
    fn zip_with_huge_declared_size(name: &str, content: &[u8]) -> Vec<u8> {
        let crc = crc32(content);
        let len = content.len() as u32;
        let mut out = Vec::new();

        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&[20, 0, 0, 0, 0, 0, 0, 0, 0x21, 0]);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(content);

        let central_start = out.len() as u32;
        out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        out.extend_from_slice(&[20, 0, 20, 0, 0, 0, 0, 0, 0, 0, 0x21, 0]);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&u32::MAX.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&12u16.to_le_bytes()); // extra field length
        out.extend_from_slice(&[0; 6]); // comment length, disk, internal attributes
        out.extend_from_slice(&0u32.to_le_bytes()); // external attributes
        out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&0x0001u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&u64::MAX.to_le_bytes());
        let central_len = out.len() as u32 - central_start;

        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0, 0, 1, 0, 1, 0]);
        out.extend_from_slice(&central_len.to_le_bytes());
        out.extend_from_slice(&central_start.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn declared_entry_size_does_not_drive_allocation() {
        let jar = temp_jar_path("zip64-size");
        let zip = zip_with_huge_declared_size("a/B.class", b"\xca\xfe\xba\xbe");
        std::fs::write(&jar, zip).unwrap();

        let mmap = map_jar(&jar).unwrap();
        let mut archive = open_archive(&jar, &mmap).unwrap();
        assert_eq!(archive.by_name("a/B.class").unwrap().size(), u64::MAX);
        drop(archive);

        assert_eq!(read_class_bytes(&jar, "a.B").unwrap(), b"\xca\xfe\xba\xbe");

        let _ = std::fs::remove_file(&jar);
    }

    #[test]
    fn read_bounded_rejects_oversized_entries() {
        assert_eq!(read_bounded(&b"abcd"[..], u64::MAX, 4).unwrap(), b"abcd");
        assert!(matches!(
            read_bounded(&b"abcde"[..], 5, 4),
            Err(ZipError::InvalidArchive(_))
        ));
    }

    #[test]
    fn unreadable_archive_is_archive_error() {
        let missing = temp_jar_path("does-not-exist");
        assert!(matches!(
            read_class_bytes(&missing, "org.example.A"),
            Err(Error::Archive { .. })
        ));

        let not_a_zip = temp_jar_path("garbage");
        std::fs::write(&not_a_zip, b"this is not a zip archive").unwrap();
        assert!(matches!(
            read_class_bytes(&not_a_zip, "org.example.A"),
            Err(Error::Archive { .. })
        ));
        let _ = std::fs::remove_file(&not_a_zip);
    }

    #[test]
    fn extract_class_decodes_methods() {
        let class = ClassBuilder::new()
            .method(&[0x2a, 0xb7, 0x00, 0x01, 0xb1])
            .abstract_method()
            .method(&[0x12, 0x05, 0xb0])
            .build();
        let jar = temp_jar_path("extract");
        write_jar(&jar, &[("a/b/C.class", class.as_slice())]);

        let extracted = extract_class(&jar, "a.b.C").unwrap();
        assert_eq!(extracted.raw, class);
        assert_eq!(extracted.methods, vec![vec![0x2a, 0xb7, 0xb1], vec![0x12, 0xb0]]);

        let _ = std::fs::remove_file(&jar);
    }

    #[test]
    fn extract_class_surfaces_decode_errors() {
        let jar = temp_jar_path("bad-class");
        write_jar(&jar, &[("a/B.class", b"\xca\xfe\xba\xbe\x00")]);

        assert!(matches!(extract_class(&jar, "a.B"), Err(Error::Decode(_))));

        let _ = std::fs::remove_file(&jar);
    }

    #[test]
    fn class_entry_names_skips_resources() {
        let jar = temp_jar_path("names");
        write_jar(
            &jar,
            &[
                ("org/example/A.class", b""),
                ("org/example/A$Inner.class", b""),
                ("META-INF/MANIFEST.MF", b""),
            ],
        );

        let mut names = class_entry_names(&jar).unwrap();
        names.sort();
        assert_eq!(names, vec!["org/example/A$Inner.class", "org/example/A.class"]);

        let _ = std::fs::remove_file(&jar);
    }
}
