//! Archive extraction.
//!
//! Tarballs compressed with gzip, xz or zstd are unpacked in-process. Other
//! compressions (bzip2) are handed to the host `tar`, which every system that
//! can build crosstool-ng already has.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{IoContext, Result, ToolchainError};
use crate::process::{self, CommandSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Tar,
    TarGz,
    TarXz,
    TarZst,
    /// Anything the host `tar` understands but we don't decode ourselves.
    HostTar,
}

impl ArchiveFormat {
    pub fn detect(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_ascii_lowercase())
            .ok_or_else(|| ToolchainError::UnsupportedArchive(path.to_path_buf()))?;

        let format = if name.ends_with(".tar") {
            ArchiveFormat::Tar
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            ArchiveFormat::TarGz
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            ArchiveFormat::TarXz
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            ArchiveFormat::TarZst
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") || name.ends_with(".tbz") {
            ArchiveFormat::HostTar
        } else {
            return Err(ToolchainError::UnsupportedArchive(path.to_path_buf()));
        };
        Ok(format)
    }
}

/// Extract `archive` into `dest_dir` (which must exist).
pub fn extract_archive(archive: &Path, dest_dir: &Path) -> Result<()> {
    let format = ArchiveFormat::detect(archive)?;
    log::debug!(
        "extracting {} ({:?}) into {}",
        archive.display(),
        format,
        dest_dir.display()
    );

    let file = File::open(archive)
        .io_context(|| format!("opening archive '{}'", archive.display()))?;
    let reader = BufReader::new(file);
    let decoded: Box<dyn Read> = match format {
        ArchiveFormat::HostTar => return extract_with_host_tar(archive, dest_dir),
        ArchiveFormat::Tar => Box::new(reader),
        ArchiveFormat::TarGz => Box::new(flate2::read::GzDecoder::new(reader)),
        ArchiveFormat::TarXz => Box::new(xz2::read::XzDecoder::new(reader)),
        ArchiveFormat::TarZst => {
            let decoder = zstd::stream::read::Decoder::new(reader)
                .io_context(|| format!("opening zstd stream '{}'", archive.display()))?;
            Box::new(decoder)
        }
    };

    let mut tar = tar::Archive::new(decoded);
    tar.set_preserve_permissions(true);
    tar.set_overwrite(true);
    tar.unpack(dest_dir).map_err(|e| ToolchainError::Extract {
        archive: archive.to_path_buf(),
        message: e.to_string(),
    })
}

fn extract_with_host_tar(archive: &Path, dest_dir: &Path) -> Result<()> {
    let tar = which::which("tar").map_err(|e| ToolchainError::Extract {
        archive: archive.to_path_buf(),
        message: format!("host `tar` is required for this format: {e}"),
    })?;

    let spec = CommandSpec::new(tar, dest_dir)
        .arg("-xf")
        .arg(archive.as_os_str())
        .arg("-C")
        .arg(dest_dir.as_os_str());

    process::run(&spec).map_err(|e| ToolchainError::Extract {
        archive: archive.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tar_bytes() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let body = b"#!/bin/sh\necho gcc\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "aarch64-linux-gnu/bin/aarch64-linux-gnu-gcc", &body[..])
            .unwrap();
        builder.into_inner().unwrap()
    }

    fn write_archive(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let raw = tar_bytes();
        let bytes = match ArchiveFormat::detect(&path).unwrap() {
            ArchiveFormat::Tar => raw,
            ArchiveFormat::TarGz => {
                let mut enc =
                    flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
                enc.write_all(&raw).unwrap();
                enc.finish().unwrap()
            }
            ArchiveFormat::TarXz => {
                let mut enc = xz2::write::XzEncoder::new(Vec::new(), 6);
                enc.write_all(&raw).unwrap();
                enc.finish().unwrap()
            }
            ArchiveFormat::TarZst => zstd::stream::encode_all(raw.as_slice(), 3).unwrap(),
            ArchiveFormat::HostTar => panic!("not generated in-process"),
        };
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_detect_formats() {
        let cases = [
            ("a.tar", ArchiveFormat::Tar),
            ("a.tar.gz", ArchiveFormat::TarGz),
            ("a.TGZ", ArchiveFormat::TarGz),
            ("crosstool-ng-1.25.0.tar.xz", ArchiveFormat::TarXz),
            ("a.tar.zst", ArchiveFormat::TarZst),
            ("crosstool-ng-1.25.0.tar.bz2", ArchiveFormat::HostTar),
        ];
        for (name, expected) in cases {
            assert_eq!(ArchiveFormat::detect(Path::new(name)).unwrap(), expected);
        }
        assert!(ArchiveFormat::detect(Path::new("a.zip")).is_err());
    }

    #[test]
    fn test_extract_native_formats() {
        for name in ["t.tar", "t.tar.gz", "t.tar.xz", "t.tar.zst"] {
            let tmp = TempDir::new().unwrap();
            let archive = write_archive(tmp.path(), name);
            let dest = tmp.path().join("root");
            fs::create_dir_all(&dest).unwrap();

            extract_archive(&archive, &dest).unwrap();

            let gcc = dest.join("aarch64-linux-gnu/bin/aarch64-linux-gnu-gcc");
            assert!(gcc.is_file(), "{name} should extract the compiler");
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mode = fs::metadata(&gcc).unwrap().permissions().mode();
                assert_eq!(mode & 0o111, 0o111, "{name} should keep exec bits");
            }
        }
    }

    #[test]
    fn test_extract_corrupt_archive() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("broken.tar.xz");
        fs::write(&archive, b"definitely not xz").unwrap();
        assert!(matches!(
            extract_archive(&archive, tmp.path()),
            Err(ToolchainError::Extract { .. })
        ));
    }
}
