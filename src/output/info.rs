//! Textual `.info` records stored next to each stitched atlas image.
//!
//! ```text
//! stitchmap-info 1
//! size 32 16
//! kind texture
//! entry icons:a 0.000000000 0.500000000 0.000000000 1.000000000 frames 0
//! entry icons:walk 0.500000000 0.750000000 0.000000000 1.000000000 frames 2 duration 100
//! frame 0 0.500000000 0.750000000 0.000000000 1.000000000
//! frame 1 0.750000000 1.000000000 0.000000000 1.000000000
//! ```
//!
//! UV columns are `min_u max_u min_v max_v`. Names escape `%`, spaces and
//! tabs as `%25`, `%20` and `%09`.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::atlas::{AtlasInfo, AtlasKind, InfoEntry, UvRect};
use crate::error::{Result, StitchError};

const HEADER: &str = "stitchmap-info";
const VERSION: u32 = 1;

/// Write an info record to `path`
pub fn write_info(info: &AtlasInfo, path: &Path) -> Result<()> {
    fs::write(path, render_info(info)).map_err(|e| StitchError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read and parse the info record at `path`
pub fn read_info(path: &Path) -> Result<AtlasInfo> {
    let text = fs::read_to_string(path).map_err(|e| StitchError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_info(path, &text)
}

pub fn render_info(info: &AtlasInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", HEADER, VERSION);
    let _ = writeln!(out, "size {} {}", info.width, info.height);
    let _ = writeln!(out, "kind {}", info.kind.as_str());

    for entry in info.entries() {
        let _ = write!(
            out,
            "entry {} {} frames {}",
            escape_name(&entry.name),
            uv_columns(&entry.uv),
            entry.frame_count()
        );
        if let Some(ms) = entry.frame_duration_ms {
            let _ = write!(out, " duration {}", ms);
        }
        out.push('\n');

        for (i, frame) in entry.frames.iter().enumerate() {
            let _ = writeln!(out, "frame {} {}", i, uv_columns(frame));
        }
    }

    out
}

pub fn parse_info(path: &Path, text: &str) -> Result<AtlasInfo> {
    let mut size: Option<(u32, u32)> = None;
    let mut kind: Option<AtlasKind> = None;
    let mut entries: Vec<InfoEntry> = Vec::new();
    // Frames still owed to the last entry
    let mut pending_frames = 0usize;
    let mut saw_header = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let err = |message: String| StitchError::format(path, line, message);
        let fields: Vec<&str> = content.split_whitespace().collect();

        if !saw_header {
            match fields.as_slice() {
                [HEADER, version] if version.parse::<u32>().ok() == Some(VERSION) => {
                    saw_header = true;
                    continue;
                }
                _ => return Err(err(format!("expected '{} {}' header", HEADER, VERSION))),
            }
        }

        if pending_frames > 0 && fields[0] != "frame" {
            return Err(err(format!("expected {} more frame line(s)", pending_frames)));
        }

        match fields.as_slice() {
            ["size", w, h] => {
                let w = parse_field::<u32>(w).ok_or_else(|| err(format!("invalid width '{}'", w)))?;
                let h = parse_field::<u32>(h).ok_or_else(|| err(format!("invalid height '{}'", h)))?;
                size = Some((w, h));
            }
            ["kind", k] => {
                kind = Some(AtlasKind::parse(k).ok_or_else(|| err(format!("unknown kind '{}'", k)))?);
            }
            ["entry", name, u0, u1, v0, v1, "frames", count, rest @ ..] => {
                let uv = parse_uv([u0, u1, v0, v1]).ok_or_else(|| err("invalid UV bounds".to_string()))?;
                let count = parse_field::<usize>(count)
                    .ok_or_else(|| err(format!("invalid frame count '{}'", count)))?;
                let frame_duration_ms = match rest {
                    [] => None,
                    ["duration", ms] => Some(
                        parse_field::<u32>(ms)
                            .ok_or_else(|| err(format!("invalid duration '{}'", ms)))?,
                    ),
                    _ => return Err(err(format!("unexpected trailing fields in '{}'", content))),
                };
                let name = unescape_name(name).ok_or_else(|| err(format!("bad escape in '{}'", name)))?;
                if entries.iter().any(|e| e.name == name) {
                    return Err(err(format!("duplicate entry '{}'", name)));
                }

                entries.push(InfoEntry {
                    name,
                    uv,
                    frames: Vec::with_capacity(count),
                    frame_duration_ms,
                });
                pending_frames = count;
            }
            ["frame", index, u0, u1, v0, v1] => {
                let Some(entry) = entries.last_mut().filter(|_| pending_frames > 0) else {
                    return Err(err("frame line without a preceding animated entry".to_string()));
                };
                if parse_field::<usize>(index) != Some(entry.frames.len()) {
                    return Err(err(format!("frame index '{}' out of order", index)));
                }
                let uv = parse_uv([u0, u1, v0, v1]).ok_or_else(|| err("invalid UV bounds".to_string()))?;
                entry.frames.push(uv);
                pending_frames -= 1;
            }
            _ => return Err(err(format!("unrecognized line '{}'", content))),
        }
    }

    let last_line = text.lines().count();
    if !saw_header {
        return Err(StitchError::format(path, last_line, "empty info record"));
    }
    if pending_frames > 0 {
        return Err(StitchError::format(
            path,
            last_line,
            format!("record ends {} frame line(s) early", pending_frames),
        ));
    }
    let (width, height) =
        size.ok_or_else(|| StitchError::format(path, last_line, "missing 'size' line"))?;
    // Records without a kind line fall back to the key in the file name
    let kind = kind.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(AtlasKind::for_key)
            .unwrap_or(AtlasKind::Texture)
    });

    Ok(AtlasInfo::new(width, height, kind, entries))
}

fn uv_columns(uv: &UvRect) -> String {
    format!(
        "{:.9} {:.9} {:.9} {:.9}",
        uv.min_u, uv.max_u, uv.min_v, uv.max_v
    )
}

fn parse_field<T: std::str::FromStr>(s: &str) -> Option<T> {
    s.parse::<T>().ok()
}

fn parse_uv(columns: [&&str; 4]) -> Option<UvRect> {
    let [min_u, max_u, min_v, max_v] = columns.map(|c| parse_field::<f32>(c));
    let uv = UvRect {
        min_u: min_u?,
        max_u: max_u?,
        min_v: min_v?,
        max_v: max_v?,
    };
    let in_range = |x: f32| (0.0..=1.0).contains(&x);
    let valid = [uv.min_u, uv.max_u, uv.min_v, uv.max_v].into_iter().all(in_range)
        && uv.min_u <= uv.max_u
        && uv.min_v <= uv.max_v;
    valid.then_some(uv)
}

fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '\t' => out.push_str("%09"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_name(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3)?;
        out.push(match code {
            "25" => '%',
            "20" => ' ',
            "09" => '\t',
            _ => return None,
        });
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{Atlas, AtlasEntry, AtlasInfo};
    use crate::sprite::PackedSprite;

    fn px(x: u32, y: u32, width: u32, height: u32) -> PackedSprite {
        PackedSprite {
            x,
            y,
            width,
            height,
        }
    }

    fn sample_info() -> AtlasInfo {
        let mut atlas = Atlas::new("icons", AtlasKind::Texture, 48, 17);
        atlas.entries.push(AtlasEntry::still("icons:a", px(0, 0, 16, 16)));
        atlas.entries.push(AtlasEntry::still("icons:with space%", px(16, 0, 5, 17)));
        atlas.entries.push(AtlasEntry {
            name: "icons:walk".into(),
            rect: px(21, 0, 13, 9),
            frames: vec![px(21, 0, 13, 9), px(34, 0, 13, 9)],
            frame_duration_ms: Some(100),
        });
        AtlasInfo::from_atlas(&atlas)
    }

    #[test]
    fn test_round_trip_preserves_uvs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icons.info");
        let original = sample_info();

        write_info(&original, &path).unwrap();
        let loaded = read_info(&path).unwrap();

        assert_eq!((loaded.width, loaded.height), (48, 17));
        assert_eq!(loaded.kind, AtlasKind::Texture);
        assert_eq!(loaded.len(), original.len());
        for (a, b) in original.entries().iter().zip(loaded.entries()) {
            assert_eq!(a.name, b.name);
            assert!(a.uv.approx_eq(&b.uv, 1e-6), "{:?} != {:?}", a.uv, b.uv);
            assert_eq!(a.frames.len(), b.frames.len());
            for (fa, fb) in a.frames.iter().zip(&b.frames) {
                assert!(fa.approx_eq(fb, 1e-6));
            }
            assert_eq!(a.frame_duration_ms, b.frame_duration_ms);
        }
        assert_eq!(loaded.pixel_rect("icons:with space%"), Some(px(16, 0, 5, 17)));
    }

    #[test]
    fn test_render_lists_one_row_per_entry() {
        let text = render_info(&sample_info());
        assert!(text.starts_with("stitchmap-info 1\nsize 48 17\nkind texture\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("entry ")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("frame ")).count(), 2);
        assert!(text.contains("entry icons:with%20space%25 "));
        assert!(text.contains("frames 2 duration 100\n"));
    }

    #[test]
    fn test_font_kind_survives() {
        let info = AtlasInfo::new(8, 8, AtlasKind::Font, Vec::new());
        let parsed = parse_info(Path::new("f.info"), &render_info(&info)).unwrap();
        assert_eq!(parsed.kind, AtlasKind::Font);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_kind_defaults_from_file_name() {
        let text = "stitchmap-info 1\nsize 8 8\nentry fonts:title:A 0 1 0 1 frames 0\n";
        let font = parse_info(Path::new("stitched/fonts:title.info"), text).unwrap();
        assert_eq!(font.kind, AtlasKind::Font);
        let plain = parse_info(Path::new("stitched/ui:button.info"), text).unwrap();
        assert_eq!(plain.kind, AtlasKind::Texture);
    }

    #[test]
    fn test_malformed_records_are_format_errors() {
        let bad = [
            "",
            "not-an-info 1\n",
            "stitchmap-info 1\nsize 8\nkind texture\n",
            "stitchmap-info 1\nsize 8 8\nkind sprite\n",
            "stitchmap-info 1\nsize 8 8\nkind texture\nentry a 0 2 0 1 frames 0\n",
            "stitchmap-info 1\nsize 8 8\nkind texture\nentry a 0 1 0 1 frames 1\n",
            "stitchmap-info 1\nsize 8 8\nkind texture\nframe 0 0 1 0 1\n",
            "stitchmap-info 1\nsize 8 8\nkind texture\nentry a 0 1 0 1 frames 0\nentry a 0 1 0 1 frames 0\n",
        ];
        for text in bad {
            let err = parse_info(Path::new("bad.info"), text).unwrap_err();
            assert!(matches!(err, StitchError::Format { .. }), "{:?} -> {:?}", text, err);
        }
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_info(&dir.path().join("nope.info")).unwrap_err();
        assert!(err.is_io_failure());
    }

    #[test]
    fn test_escape_round_trip() {
        for name in ["plain", "a b", "100%", "tab\there", "%20"] {
            assert_eq!(unescape_name(&escape_name(name)).as_deref(), Some(name));
        }
        assert_eq!(unescape_name("bad%2"), None);
        assert_eq!(unescape_name("bad%zz"), None);
    }
}
