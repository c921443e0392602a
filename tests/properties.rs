//! Property tests for front-matter extraction.

use std::path::Path;

use proptest::prelude::*;

use inkpress::content::extract_front_matter;

proptest! {
    /// Extraction never panics, whatever bytes a content file holds.
    #[test]
    fn extract_never_panics(content in ".*") {
        let _ = extract_front_matter(&content, Path::new("post.md"));
    }

    /// A well-formed file yields exactly the YAML between the delimiters.
    #[test]
    fn extract_recovers_yaml_block(
        title in "[A-Za-z0-9 ]{1,40}",
        body in "[A-Za-z0-9 ][A-Za-z0-9 \n]{0,80}",
    ) {
        let content = format!("---\ntitle: {title}\n---\n{body}");
        let raw = extract_front_matter(&content, Path::new("post.md")).unwrap();

        prop_assert_eq!(raw.yaml, format!("title: {title}"));
        prop_assert_eq!(raw.end_line, 3);
    }

    /// Without an opening delimiter the file is rejected, never misparsed.
    #[test]
    fn extract_rejects_missing_opening(first in "[A-Za-z0-9][^\n]{0,40}") {
        let content = format!("{first}\n---\ntitle: x\n---\n");
        prop_assert!(extract_front_matter(&content, Path::new("post.md")).is_err());
    }
}
