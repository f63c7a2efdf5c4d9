//! Inline script extraction
//!
//! Locates `<script>...</script>` regions in a page body without parsing the
//! HTML. Tags are matched case-insensitively and may contain whitespace
//! (`< SCRIPT >`), region contents may span lines. A tag carrying attributes is
//! not a match, and an unterminated tag yields nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ScanMode;

static SCRIPT_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*script\s*>(.*?)<\s*/\s*script\s*>").expect("Invalid regex pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRegion<'a> {
    pub text: &'a str,
    /// Byte offset of `text` within the page body.
    pub offset: usize,
    /// 1-based line of the first byte of `text`.
    pub line: usize,
}

impl ScriptRegion<'_> {
    /// Line within the page of a byte offset relative to this region.
    pub fn line_at(&self, offset_in_region: usize) -> usize {
        let end = offset_in_region.min(self.text.len());
        self.line + count_newlines(&self.text[..end])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptExtractor {
    mode: ScanMode,
}

impl Default for ScriptExtractor {
    fn default() -> Self {
        Self::new(ScanMode::First)
    }
}

impl ScriptExtractor {
    pub fn new(mode: ScanMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Lazily yields script regions of `body`, in document order.
    pub fn extract<'a>(
        &self,
        body: &'a str,
    ) -> impl Iterator<Item = ScriptRegion<'a>> + use<'a> {
        SCRIPT_REGION
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .take(self.mode.limit())
            .map(move |m| ScriptRegion {
                text: m.as_str(),
                offset: m.start(),
                line: count_newlines(&body[..m.start()]) + 1,
            })
    }
}

/// Text of every script region of `body` under the given scan mode.
pub fn extract_scripts(body: &str, mode: ScanMode) -> Vec<&str> {
    ScriptExtractor::new(mode)
        .extract(body)
        .map(|region| region.text)
        .collect()
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_script_tag_yields_nothing() {
        for body in [
            "",
            "<html><body><p>hello</p></body></html>",
            "<scrip>eval(document.URL)</scrip>",
            "script document.write(document.URL) /script",
        ] {
            assert!(extract_scripts(body, ScanMode::All).is_empty(), "{body}");
        }
    }

    #[test]
    fn extracts_simple_region() {
        let scripts = extract_scripts("<p>a</p><script>var a = 1;</script>", ScanMode::First);
        assert_eq!(scripts, vec!["var a = 1;"]);
    }

    #[test]
    fn tag_matching_is_case_insensitive_and_whitespace_tolerant() {
        let body = "< SCRIPT >eval(1)</ Script >";
        assert_eq!(extract_scripts(body, ScanMode::First), vec!["eval(1)"]);

        let body = "<\n\tscript\n>x</script\t>";
        assert_eq!(extract_scripts(body, ScanMode::First), vec!["x"]);
    }

    #[test]
    fn region_spans_newlines() {
        let body = "<script>\nvar a = 1;\nvar b = 2;\n</script>";
        assert_eq!(
            extract_scripts(body, ScanMode::First),
            vec!["\nvar a = 1;\nvar b = 2;\n"]
        );
    }

    #[test]
    fn region_ends_at_nearest_closing_tag() {
        let body = "<script>a</script>middle<script>b</script>";
        assert_eq!(extract_scripts(body, ScanMode::All), vec!["a", "b"]);
    }

    #[test]
    fn first_mode_only_returns_first_region() {
        let body = "<script>a</script><script>b</script>";
        assert_eq!(extract_scripts(body, ScanMode::First), vec!["a"]);
    }

    #[test]
    fn unterminated_script_yields_nothing() {
        let body = "<script>document.write(document.URL);";
        assert!(extract_scripts(body, ScanMode::All).is_empty());
    }

    #[test]
    fn script_with_attributes_is_not_matched() {
        let body = r#"<script type="text/javascript">eval(window.location)</script>"#;
        assert!(extract_scripts(body, ScanMode::All).is_empty());
    }

    #[test]
    fn empty_region_is_yielded() {
        assert_eq!(extract_scripts("<script></script>", ScanMode::All), vec![""]);
    }

    #[test]
    fn region_reports_offset_and_line() {
        let body = "<html>\n<body>\n<script>\nfoo();\n</script>";
        let extractor = ScriptExtractor::new(ScanMode::All);
        let region = extractor.extract(body).next().unwrap();

        assert_eq!(&body[region.offset..region.offset + region.text.len()], region.text);
        assert_eq!(region.line, 3);
        assert_eq!(region.line_at(1), 4);
    }

    #[test]
    fn extraction_is_lazy() {
        let body = "<script>a</script><script>b</script><script>c</script>";
        let extractor = ScriptExtractor::new(ScanMode::All);
        let mut regions = extractor.extract(body);

        assert_eq!(regions.next().map(|r| r.text), Some("a"));
        assert_eq!(regions.next().map(|r| r.text), Some("b"));
    }
}
