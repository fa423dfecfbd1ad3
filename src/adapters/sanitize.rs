//! Log sanitization for clinical values.
//!
//! Measurements typed into the form are patient data. Log lines are passed
//! through [`sanitize`] before they reach a file or stdout, which redacts:
//! - `<feature>=<number>` / `<feature>: <number>` pairs for every form column
//! - Dumped numeric vectors (four or more numbers in brackets)
//!
//! This is a fallback. Call sites should not format raw inputs in the first
//! place; the pipeline only logs class ids and labels.
//!
//! # Performance
//!
//! Input is capped at `GLYCOSENSE_SANITIZE_MAX_BYTES` (default 16 KiB) per call.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<ClinicalPatterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct ClinicalPattern {
    regex: Regex,
    replacement: &'static str,
}

struct ClinicalPatterns {
    set: RegexSet,
    patterns: Vec<ClinicalPattern>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("GLYCOSENSE_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static ClinicalPatterns {
    PATTERNS.get_or_init(|| {
        let rules: Vec<(&'static str, &'static str)> = vec![
            // Named measurements, quoted or not
            (
                r#"(?i)\b(gender|age|urea|cr|hba1c|chol|tg|hdl|ldl|vldl|bmi|text|value)\s*[:=]\s*"?-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?"?"#,
                "${1}=[REDACTED]",
            ),
            // Feature vector dumps: [1.0, 4.02, ...]
            (
                r"\[\s*-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?(?:\s*,\s*-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?){3,}\s*\]",
                "[REDACTED-VECTOR]",
            ),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let patterns = rules
            .into_iter()
            .map(|(pattern, replacement)| ClinicalPattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        ClinicalPatterns { set, patterns }
    })
}

/// Redact clinical values from a log line.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let pattern = &patterns.patterns[idx];
        result = pattern
            .regex
            .replace_all(&result, pattern.replacement)
            .to_string();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log output
/// line by line before it reaches the underlying sink.
#[derive(Debug)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<M> Clone for SanitizingMakeWriter<M>
where
    M: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.drain(..=pos).collect::<Vec<u8>>();
            let sanitized = sanitize(&String::from_utf8_lossy(&line));
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter writing one huge line with no newline must not buffer forever.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;

        if !self.buffer.is_empty() {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }

        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_named_values() {
        let sanitized = sanitize("field update HbA1c=8.4 BMI: 31.2 age=\"55\"");
        assert!(!sanitized.contains("8.4"));
        assert!(!sanitized.contains("31.2"));
        assert!(!sanitized.contains("55"));
        assert!(sanitized.contains("HbA1c=[REDACTED]"));
        assert!(sanitized.contains("BMI=[REDACTED]"));
    }

    #[test]
    fn test_sanitize_vector_dump() {
        let sanitized = sanitize("vector [0.0, 4.025, 1.723, 4.111, 2.197]");
        assert!(sanitized.contains("[REDACTED-VECTOR]"));
        assert!(!sanitized.contains("4.025"));
    }

    #[test]
    fn test_class_ids_and_labels_survive() {
        let line = "Prediction complete class_id=2 label=\"Diabetes (Y)\"";
        assert_eq!(sanitize(line), line);
        assert_eq!(sanitize("Loaded model from models"), "Loaded model from models");
    }

    #[test]
    fn test_sanitize_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("prefix BMI=30.0 and a long tail", 12);
        assert!(sanitized.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut out);
            writer.write_all(b"LDL=2.5\npartial Cr=").expect("write");
            writer.write_all(b"60\n").expect("write");
            writer.flush().expect("flush");
        }
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "LDL=[REDACTED]\npartial Cr=[REDACTED]\n");
    }
}
