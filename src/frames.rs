//! Landmark frames as delivered by the face-mesh detector, one JSON object per
//! line:
//!
//! ```text
//! {"viewport":{"width":640,"height":480},"faces":[[{"x":0.41,"y":0.37,"z":-0.02}, ...]]}
//! ```
//!
//! An empty or missing `faces` array means no face was found in that frame.

use anyhow::{Context, Result};
use hairfit_align::{LandmarkSet, Viewport};
use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct FrameRecord {
    pub viewport: Viewport,
    #[serde(default)]
    pub faces: Vec<LandmarkSet>,
}

/// One delivered frame, reduced to the single face the engine tracks.
#[derive(Debug, Clone)]
pub struct Frame {
    /// 1-based line number in the source stream.
    pub number: usize,
    pub viewport: Viewport,
    pub face: Option<LandmarkSet>,
    /// Faces reported beyond the first; never aligned.
    pub ignored_faces: usize,
}

impl From<(usize, FrameRecord)> for Frame {
    fn from((number, record): (usize, FrameRecord)) -> Self {
        let ignored_faces = record.faces.len().saturating_sub(1);
        if ignored_faces > 0 {
            log::debug!(
                "frame {}: {} faces reported, tracking the first",
                number,
                record.faces.len()
            );
        }
        Self {
            number,
            viewport: record.viewport,
            face: record.faces.into_iter().next(),
            ignored_faces,
        }
    }
}

pub fn parse_frame(number: usize, line: &str) -> Result<Frame> {
    let record: FrameRecord =
        serde_json::from_str(line).with_context(|| format!("parsing frame {}", number))?;
    Ok(Frame::from((number, record)))
}

/// Read a single frame from a JSON file (pretty-printed or not).
pub fn read_frame_file(path: &Path) -> Result<Frame> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading frame {}", path.display()))?;
    parse_frame(1, &raw).with_context(|| format!("in {}", path.display()))
}

/// Iterator over a JSON-lines frame stream. Blank lines are skipped; a line
/// that fails to parse yields an error for that frame only.
pub struct FrameReader<R> {
    lines: std::io::Lines<R>,
    number: usize,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            number: 0,
        }
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.number += 1;
            let line = match line.with_context(|| format!("reading frame {}", self.number)) {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_frame(self.number, &line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn face_json(len: usize) -> String {
        let points: Vec<String> = (0..len)
            .map(|_| r#"{"x":0.5,"y":0.5,"z":0.0}"#.to_string())
            .collect();
        format!("[{}]", points.join(","))
    }

    #[test]
    fn parses_frame_with_face() {
        let line = format!(
            r#"{{"viewport":{{"width":640,"height":480}},"faces":[{}]}}"#,
            face_json(468)
        );
        let frame = parse_frame(3, &line).unwrap();
        assert_eq!(frame.number, 3);
        assert_eq!(frame.viewport, Viewport::new(640.0, 480.0));
        assert_eq!(frame.face.unwrap().len(), 468);
        assert_eq!(frame.ignored_faces, 0);
    }

    #[test]
    fn missing_faces_means_no_face() {
        let frame = parse_frame(1, r#"{"viewport":{"width":10,"height":10}}"#).unwrap();
        assert!(frame.face.is_none());
        let frame = parse_frame(1, r#"{"viewport":{"width":10,"height":10},"faces":[]}"#).unwrap();
        assert!(frame.face.is_none());
    }

    #[test]
    fn keeps_only_first_face() {
        let line = format!(
            r#"{{"viewport":{{"width":10,"height":10}},"faces":[{},{}]}}"#,
            face_json(2),
            face_json(3)
        );
        let frame = parse_frame(1, &line).unwrap();
        assert_eq!(frame.face.unwrap().len(), 2);
        assert_eq!(frame.ignored_faces, 1);
    }

    #[test]
    fn reader_skips_blank_lines_and_isolates_bad_frames() {
        let input = concat!(
            "{\"viewport\":{\"width\":10,\"height\":10}}\n",
            "\n",
            "not json\n",
            "{\"viewport\":{\"width\":20,\"height\":10}}\n",
        );
        let frames: Vec<_> = FrameReader::new(Cursor::new(input)).collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].as_ref().unwrap().number, 1);
        let err = frames[1].as_ref().unwrap_err();
        assert!(format!("{:#}", err).contains("frame 3"));
        let last = frames[2].as_ref().unwrap();
        assert_eq!(last.number, 4);
        assert_eq!(last.viewport.width, 20.0);
    }
}
