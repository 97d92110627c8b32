//! `animation.ani` descriptors.
//!
//! One animation per line:
//!
//! ```text
//! # comment
//! frames walk 100 walk_0 walk_1.png walk_2
//! strip  fire 80 fire.png 16 16
//! ```
//!
//! `frames` lists individual images in playback order. `strip` slices one
//! image into equal cells, read left to right, top to bottom.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, StitchError};

/// File name of the per-directory animation descriptor
pub const DESCRIPTOR_FILE: &str = "animation.ani";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    /// Separate images, by file stem
    Frames(Vec<String>),
    /// One image cut into `cell_width` x `cell_height` cells
    Strip {
        file: String,
        cell_width: u32,
        cell_height: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSpec {
    /// Entry name, without namespace
    pub name: String,
    pub frame_duration_ms: u32,
    pub source: FrameSource,
    /// 1-based line in the descriptor, for error reporting
    pub line: usize,
}

/// The parsed descriptor of one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSet {
    /// Descriptor path, for error reporting
    pub path: PathBuf,
    pub specs: Vec<AnimationSpec>,
}

impl AnimationSet {
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let path = path.into();
        let specs = parse_descriptor(&path, text)?;
        Ok(Self { path, specs })
    }
}

/// Read `dir/animation.ani` if present
pub fn load_descriptor(dir: &Path) -> Result<Option<AnimationSet>> {
    let path = dir.join(DESCRIPTOR_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(&path).map_err(|e| StitchError::Io {
        path: path.clone(),
        source: e,
    })?;
    AnimationSet::parse(path, &text).map(Some)
}

pub fn parse_descriptor(path: &Path, text: &str) -> Result<Vec<AnimationSpec>> {
    let mut specs = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content.split_whitespace().collect();
        let err = |message: String| StitchError::format(path, line, message);

        let [keyword, name, duration, rest @ ..] = fields.as_slice() else {
            return Err(err(format!("expected '<kind> <name> <duration_ms> ...', got '{}'", content)));
        };

        let frame_duration_ms = parse_number(duration)
            .ok_or_else(|| err(format!("invalid frame duration '{}'", duration)))?;

        let source = match *keyword {
            "frames" => {
                if rest.is_empty() {
                    return Err(err(format!("animation '{}' lists no frames", name)));
                }
                FrameSource::Frames(rest.iter().map(|f| file_stem(f).to_string()).collect())
            }
            "strip" => {
                let [file, w, h] = rest else {
                    return Err(err(
                        "expected 'strip <name> <duration_ms> <file> <cell_width> <cell_height>'"
                            .to_string(),
                    ));
                };
                let cell_width = parse_number(w)
                    .filter(|&n| n > 0)
                    .ok_or_else(|| err(format!("invalid cell width '{}'", w)))?;
                let cell_height = parse_number(h)
                    .filter(|&n| n > 0)
                    .ok_or_else(|| err(format!("invalid cell height '{}'", h)))?;
                FrameSource::Strip {
                    file: file_stem(file).to_string(),
                    cell_width,
                    cell_height,
                }
            }
            other => return Err(err(format!("unknown animation kind '{}'", other))),
        };

        if !seen.insert(name.to_string()) {
            return Err(err(format!("duplicate animation '{}'", name)));
        }

        specs.push(AnimationSpec {
            name: name.to_string(),
            frame_duration_ms,
            source,
            line,
        });
    }

    Ok(specs)
}

fn parse_number(s: &str) -> Option<u32> {
    s.parse::<u32>().ok()
}

/// `walk_0.png` and `walk_0` both name the image with stem `walk_0`
fn file_stem(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.eq_ignore_ascii_case("png") => stem,
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Vec<AnimationSpec>> {
        parse_descriptor(Path::new("animation.ani"), text)
    }

    #[test]
    fn test_parse_frames_and_strip() {
        let specs = parse(
            "# player\n\
             frames walk 100 walk_0 walk_1.png walk_2.PNG\n\
             \n\
             strip fire 80 fire.png 16 8 # flames\n",
        )
        .unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "walk");
        assert_eq!(specs[0].frame_duration_ms, 100);
        assert_eq!(
            specs[0].source,
            FrameSource::Frames(vec!["walk_0".into(), "walk_1".into(), "walk_2".into()])
        );
        assert_eq!(specs[0].line, 2);
        assert_eq!(
            specs[1].source,
            FrameSource::Strip {
                file: "fire".into(),
                cell_width: 16,
                cell_height: 8
            }
        );
        assert_eq!(specs[1].line, 4);
    }

    #[test]
    fn test_unknown_keyword_is_format_error() {
        let err = parse("loop walk 100 a b").unwrap_err();
        match err {
            StitchError::Format { line, message, .. } => {
                assert_eq!(line, 1);
                assert!(message.contains("loop"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        assert!(parse("frames walk fast a b").is_err());
        assert!(parse("strip fire 80 fire.png 0 16").is_err());
        assert!(parse("strip fire 80 fire.png 16").is_err());
        assert!(parse("frames walk 100").is_err());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = parse("frames a 10 x\nframes a 10 y").unwrap_err();
        assert!(matches!(err, StitchError::Format { line: 2, .. }));
    }

    #[test]
    fn test_missing_descriptor_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_descriptor(dir.path()).unwrap().is_none());
    }
}
