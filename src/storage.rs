// SPDX-License-Identifier: GPL-3.0-only

//! Output directory and frame file naming

use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Printf-style frame filename pattern with exactly one integer conversion
///
/// Accepts `%d` and zero-padded `%0Nd`; `%%` is a literal percent sign.
/// The raw pattern is handed to `multifilesink` unchanged, so only the
/// conversions both sides agree on are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePattern {
    raw: String,
    prefix: String,
    width: usize,
    suffix: String,
}

impl FramePattern {
    /// Parse and validate a pattern such as `frame%d.png`
    pub fn parse(pattern: &str) -> AppResult<Self> {
        if pattern.contains(['/', '\\']) {
            return Err(AppError::Config(format!(
                "Filename pattern '{}' must not contain path separators",
                pattern
            )));
        }

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut width = None;
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            let target = if width.is_some() {
                &mut suffix
            } else {
                &mut prefix
            };

            if c != '%' {
                target.push(c);
                continue;
            }

            if chars.peek() == Some(&'%') {
                chars.next();
                target.push('%');
                continue;
            }

            if width.is_some() {
                return Err(AppError::Config(format!(
                    "Filename pattern '{}' has more than one conversion",
                    pattern
                )));
            }

            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }

            if chars.next() != Some('d') || (!digits.is_empty() && !digits.starts_with('0')) {
                return Err(AppError::Config(format!(
                    "Filename pattern '{}' supports only %d or %0Nd",
                    pattern
                )));
            }

            let padding = if digits.is_empty() {
                0
            } else {
                digits.parse::<usize>().map_err(|_| {
                    AppError::Config(format!(
                        "Filename pattern '{}' has an unusable padding width",
                        pattern
                    ))
                })?
            };
            width = Some(padding);
        }

        let Some(width) = width else {
            return Err(AppError::Config(format!(
                "Filename pattern '{}' has no %d conversion for the frame index",
                pattern
            )));
        };

        Ok(Self {
            raw: pattern.to_string(),
            prefix,
            width,
            suffix,
        })
    }

    /// The pattern as written, for `multifilesink`'s `location`
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// File name the sink writes for frame `index`
    pub fn file_name(&self, index: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.suffix,
            width = self.width
        )
    }

    /// Frame index encoded in `file_name`, if it was produced by this pattern
    pub fn index_of(&self, file_name: &str) -> Option<u64> {
        let digits = file_name
            .strip_prefix(&self.prefix)?
            .strip_suffix(&self.suffix)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        // Unpadded indices never carry leading zeros, padded ones are at least `width` wide
        let canonical = if self.width == 0 {
            digits == "0" || !digits.starts_with('0')
        } else {
            digits.len() >= self.width && (digits.len() == self.width || !digits.starts_with('0'))
        };

        if !canonical {
            return None;
        }

        digits.parse().ok()
    }
}

/// Directory frames are written to; the working directory when unset
pub fn resolve_output_dir(configured: Option<&str>) -> PathBuf {
    match configured.map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from("."),
    }
}

/// Ensure the output directory exists, creating it if necessary
pub fn ensure_output_dir(dir: &Path) -> AppResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    info!(path = %dir.display(), "Output directory ready");
    Ok(dir.to_path_buf())
}

/// Full `location` for the file sink
///
/// The sink formats the whole location, so a `%` in the directory is
/// doubled to stay literal.
pub fn frame_location(dir: &Path, pattern: &FramePattern) -> PathBuf {
    let dir = dir.to_string_lossy().replace('%', "%%");
    PathBuf::from(dir).join(pattern.as_str())
}

/// Frames in `dir` written with `pattern`, ordered by index
pub fn list_frames(dir: &Path, pattern: &FramePattern) -> std::io::Result<Vec<(u64, PathBuf)>> {
    let mut frames = Vec::new();

    for entry in std::fs::read_dir(dir)?.flatten() {
        let name = entry.file_name();
        let Some(index) = name.to_str().and_then(|n| pattern.index_of(n)) else {
            continue;
        };
        frames.push((index, entry.path()));
    }

    frames.sort_by_key(|(index, _)| *index);
    debug!(path = %dir.display(), count = frames.len(), "Listed frames");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let pattern = FramePattern::parse("frame%d.png").unwrap();
        assert_eq!(pattern.file_name(0), "frame0.png");
        assert_eq!(pattern.file_name(42), "frame42.png");
        assert_eq!(pattern.index_of("frame42.png"), Some(42));
        assert_eq!(pattern.index_of("frame0.png"), Some(0));
    }

    #[test]
    fn test_padded_pattern() {
        let pattern = FramePattern::parse("shot_%05d.png").unwrap();
        assert_eq!(pattern.file_name(7), "shot_00007.png");
        assert_eq!(pattern.index_of("shot_00007.png"), Some(7));
        assert_eq!(pattern.index_of("shot_123456.png"), Some(123456));
        assert_eq!(pattern.index_of("shot_007.png"), None);
    }

    #[test]
    fn test_index_of_rejects_foreign_names() {
        let pattern = FramePattern::parse("frame%d.png").unwrap();
        assert_eq!(pattern.index_of("frame.png"), None);
        assert_eq!(pattern.index_of("frame01.png"), None);
        assert_eq!(pattern.index_of("frame1.jpg"), None);
        assert_eq!(pattern.index_of("frameX.png"), None);
        assert_eq!(pattern.index_of("other3.png"), None);
    }

    #[test]
    fn test_literal_percent() {
        let pattern = FramePattern::parse("100%%_%d.png").unwrap();
        assert_eq!(pattern.file_name(3), "100%_3.png");
        assert_eq!(pattern.index_of("100%_3.png"), Some(3));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(FramePattern::parse("frame.png").is_err());
        assert!(FramePattern::parse("frame%d_%d.png").is_err());
        assert!(FramePattern::parse("frame%s.png").is_err());
        assert!(FramePattern::parse("frame%5d.png").is_err());
        assert!(FramePattern::parse("dir/frame%d.png").is_err());
    }

    #[test]
    fn test_overflowing_padding_is_rejected() {
        let err = FramePattern::parse("frame%099999999999999999999999d.png").unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "unexpected error: {err}");
    }

    #[test]
    fn test_frame_location_escapes_directory_percent() {
        let pattern = FramePattern::parse("frame%d.png").unwrap();
        assert_eq!(
            frame_location(Path::new("/tmp/100%done"), &pattern),
            PathBuf::from("/tmp/100%%done/frame%d.png")
        );
        assert_eq!(
            frame_location(Path::new("/tmp/out"), &pattern),
            PathBuf::from("/tmp/out/frame%d.png")
        );
    }

    #[test]
    fn test_resolve_output_dir() {
        assert_eq!(resolve_output_dir(None), PathBuf::from("."));
        assert_eq!(resolve_output_dir(Some("  ")), PathBuf::from("."));
        assert_eq!(resolve_output_dir(Some("/tmp/frames")), PathBuf::from("/tmp/frames"));
    }
}
