//! Text recognition through the Tesseract CLI.
//!
//! The frame's PNG is piped into `tesseract stdin stdout tsv`; the word rows
//! of the TSV report are grouped back into lines, one `TextBox` per line.

use super::backends::TextRecognizer;
use super::error::{AutomationError, AutomationResult};
use super::types::{BoundingBox, Frame, TextBox};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const RECOGNIZE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TesseractRecognizer {
    binary: String,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    async fn run(&self, png: &[u8]) -> AutomationResult<String> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.language, "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AutomationError::Recognition(format!("Failed to start '{}': {e}", self.binary))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(png)
                .await
                .map_err(|e| AutomationError::Recognition(format!("Failed to feed image: {e}")))?;
            // dropping stdin closes the pipe so tesseract starts working
        }

        let output = tokio::time::timeout(RECOGNIZE_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                AutomationError::Recognition(format!(
                    "tesseract timed out after {}s",
                    RECOGNIZE_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| AutomationError::Recognition(format!("tesseract failed: {e}")))?;

        if !output.status.success() {
            return Err(AutomationError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, frame: &Frame) -> AutomationResult<Vec<TextBox>> {
        let tsv = self.run(frame.png_bytes()).await?;
        Ok(parse_tsv_lines(&tsv))
    }
}

struct TsvWord<'a> {
    line_key: (u32, u32, u32, u32),
    bbox: BoundingBox,
    text: &'a str,
}

fn parse_word(row: &str) -> Option<TsvWord<'_>> {
    let cols: Vec<&str> = row.split('\t').collect();
    if cols.len() < 12 || cols[0] != "5" {
        return None;
    }
    let num = |i: usize| cols[i].trim().parse::<u32>().ok();
    let conf: f32 = cols[10].trim().parse().ok()?;
    let text = cols[11].trim();
    if conf < 0.0 || text.is_empty() {
        return None;
    }
    let (left, top, width, height) = (num(6)?, num(7)?, num(8)?, num(9)?);
    Some(TsvWord {
        line_key: (num(1)?, num(2)?, num(3)?, num(4)?),
        bbox: BoundingBox::from_rect(left, top, width, height),
        text,
    })
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{FF00}'..='\u{FFEF}')
}

fn append_word(line: &mut String, word: &str) {
    let needs_space = match (line.chars().last(), word.chars().next()) {
        (Some(prev), Some(next)) => !is_cjk(prev) && !is_cjk(next),
        _ => false,
    };
    if needs_space {
        line.push(' ');
    }
    line.push_str(word);
}

/// Groups the word rows of a Tesseract TSV report into lines, keeping the
/// order in which lines first appear.
pub fn parse_tsv_lines(tsv: &str) -> Vec<TextBox> {
    let mut lines: Vec<((u32, u32, u32, u32), TextBox)> = Vec::new();
    for word in tsv.lines().skip(1).filter_map(parse_word) {
        match lines.iter_mut().find(|(key, _)| *key == word.line_key) {
            Some((_, line)) => {
                append_word(&mut line.text, word.text);
                line.bbox = line.bbox.union(&word.bbox);
            }
            None => lines.push((word.line_key, TextBox::new(word.text, word.bbox))),
        }
    }
    lines.into_iter().map(|(_, line)| line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_automation::types::Point;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for r in rows {
            out.push('\n');
            out.push_str(r);
        }
        out
    }

    #[test]
    fn test_groups_words_into_lines() {
        let report = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t1280\t720\t-1\t",
            "4\t1\t1\t1\t1\t0\t100\t200\t40\t20\t-1\t",
            "5\t1\t1\t1\t1\t1\t100\t200\t20\t20\t91.5\t领取",
            "5\t1\t1\t1\t1\t2\t120\t202\t20\t18\t88.0\t奖励",
            "5\t1\t2\t1\t1\t1\t10\t10\t30\t12\t95.0\tDaily",
            "5\t1\t2\t1\t1\t2\t45\t10\t30\t12\t95.0\tTasks",
        ]);
        let lines = parse_tsv_lines(&report);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "领取奖励");
        assert_eq!(lines[0].bbox, BoundingBox::new(100, 200, 140, 220));
        assert_eq!(lines[0].center(), Point::new(120, 210));
        assert_eq!(lines[1].text, "Daily Tasks");
    }

    #[test]
    fn test_skips_empty_and_unconfident_rows() {
        let report = tsv(&[
            "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t-1\t",
            "5\t1\t1\t1\t2\t1\t0\t20\t10\t10\t80\t   ",
            "5\t1\t1\t1\t3\t1\t0\t40\t10\t10\t80\t31250",
        ]);
        let lines = parse_tsv_lines(&report);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "31250");
    }

    #[test]
    fn test_malformed_rows_are_ignored() {
        let report = tsv(&["5\t1\t1", "garbage", "5\t1\t1\t1\t1\t1\tx\t0\t10\t10\t80\tabc"]);
        assert!(parse_tsv_lines(&report).is_empty());
    }
}
