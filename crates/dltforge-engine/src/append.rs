//! Appendix merging
//!
//! An appendix is spliced in after the subtree of the anchor section: before
//! the next section whose level is at or above the anchor's. Merging is not
//! idempotent; appending twice yields two copies.

use dltforge_templates::MarkdownSection;
use dltforge_utils::error::AppendError;

use crate::document::ResolvedDocument;

const MAX_HEADING_LEVEL: u8 = 6;

/// Merge `appendix` into `host` at the section carrying `anchor`.
///
/// Appendix headings are shifted so that the shallowest one sits one level
/// below the anchor heading. The appendix preamble is not merged.
pub fn append(
    host: &ResolvedDocument,
    appendix: &ResolvedDocument,
    anchor: &str,
) -> Result<ResolvedDocument, AppendError> {
    let Some(anchor_index) = host.find_anchor(anchor) else {
        return Err(AppendError::AnchorNotFound {
            anchor: anchor.to_string(),
            available: host.anchors(),
        });
    };

    if !appendix.preamble.trim().is_empty() {
        tracing::warn!(anchor = %anchor, "Appendix text before its first heading is not merged");
    }

    let anchor_level = host.sections[anchor_index].level;
    let insert_at = host.sections[anchor_index + 1..]
        .iter()
        .position(|s| s.level <= anchor_level)
        .map_or(host.sections.len(), |offset| anchor_index + 1 + offset);

    let rebased = rebase_levels(&appendix.sections, anchor_level);

    tracing::debug!(
        anchor = %anchor,
        sections = rebased.len(),
        position = insert_at,
        "Merging appendix"
    );

    let mut sections = Vec::with_capacity(host.sections.len() + rebased.len());
    sections.extend_from_slice(&host.sections[..insert_at]);
    sections.extend(rebased);
    sections.extend_from_slice(&host.sections[insert_at..]);

    Ok(ResolvedDocument {
        preamble: host.preamble.clone(),
        sections,
    })
}

/// Shift `sections` so the shallowest sits at `anchor_level + 1`.
///
/// Levels are clamped to 6; appendix anchors are dropped so they cannot
/// collide with the host's.
fn rebase_levels(sections: &[MarkdownSection], anchor_level: u8) -> Vec<MarkdownSection> {
    let Some(shallowest) = sections.iter().map(|s| s.level).min() else {
        return Vec::new();
    };
    let target = (anchor_level + 1).min(MAX_HEADING_LEVEL);

    sections
        .iter()
        .map(|section| {
            let shifted = i16::from(section.level) - i16::from(shallowest) + i16::from(target);
            let level = u8::try_from(shifted.clamp(1, i16::from(MAX_HEADING_LEVEL)))
                .unwrap_or(MAX_HEADING_LEVEL);
            MarkdownSection {
                level,
                heading: section.heading.clone(),
                anchor: None,
                body: section.body.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> ResolvedDocument {
        ResolvedDocument {
            preamble: String::new(),
            sections: vec![
                MarkdownSection::new(2, "Summary", "s\n"),
                MarkdownSection::new(2, "Pagination", "p\n").with_anchor("pagination"),
                MarkdownSection::new(2, "Resources", "r\n"),
            ],
        }
    }

    fn appendix() -> ResolvedDocument {
        ResolvedDocument {
            preamble: String::new(),
            sections: vec![MarkdownSection::new(2, "Complex Pagination Details", "d\n")],
        }
    }

    #[test]
    fn test_insert_after_anchor_section() {
        let merged = append(&host(), &appendix(), "pagination").unwrap();
        assert_eq!(
            merged.headings(),
            vec![
                "Summary",
                "Pagination",
                "Complex Pagination Details",
                "Resources"
            ]
        );
        assert_eq!(merged.sections[2].level, 3);
    }

    #[test]
    fn test_insert_after_anchor_subtree() {
        let mut host = host();
        host.sections
            .insert(2, MarkdownSection::new(3, "Cursor details", "c\n"));
        let merged = append(&host, &appendix(), "pagination").unwrap();
        assert_eq!(
            merged.headings(),
            vec![
                "Summary",
                "Pagination",
                "Cursor details",
                "Complex Pagination Details",
                "Resources"
            ]
        );
    }

    #[test]
    fn test_anchor_on_last_section_appends_at_end() {
        let mut host = host();
        host.sections[2].anchor = Some("resources".to_string());
        let merged = append(&host, &appendix(), "resources").unwrap();
        assert_eq!(
            merged.headings().last(),
            Some(&"Complex Pagination Details")
        );
    }

    #[test]
    fn test_missing_anchor_lists_available() {
        let err = append(&host(), &appendix(), "auth").unwrap_err();
        assert_eq!(
            err,
            AppendError::AnchorNotFound {
                anchor: "auth".to_string(),
                available: vec!["pagination".to_string()],
            }
        );
    }

    #[test]
    fn test_double_merge_duplicates() {
        let once = append(&host(), &appendix(), "pagination").unwrap();
        let twice = append(&once, &appendix(), "pagination").unwrap();
        let copies = twice
            .headings()
            .into_iter()
            .filter(|h| *h == "Complex Pagination Details")
            .count();
        assert_eq!(copies, 2);
        assert_eq!(twice.sections.len(), 5);
    }

    #[test]
    fn test_levels_rebase_and_clamp() {
        let deep = ResolvedDocument {
            preamble: "ignored\n".to_string(),
            sections: vec![
                MarkdownSection::new(1, "Top", "").with_anchor("inner"),
                MarkdownSection::new(2, "Sub", ""),
                MarkdownSection::new(3, "SubSub", ""),
            ],
        };
        let host = ResolvedDocument {
            preamble: String::new(),
            sections: vec![MarkdownSection::new(5, "Deep", "").with_anchor("deep")],
        };
        let merged = append(&host, &deep, "deep").unwrap();
        let levels: Vec<u8> = merged.sections.iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![5, 6, 6, 6]);
        assert_eq!(merged.anchors(), vec!["deep"]);
        assert_eq!(merged.preamble, "");
    }
}
