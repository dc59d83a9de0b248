//! Line-oriented fallback autolinker
//!
//! Works without a document parser: fenced blocks are tracked line by line,
//! and any line holding a link, inline code, inline math or a URL is passed
//! through whole. Remaining lines are scanned word by word against the
//! [`CandidateList`](crate::CandidateList) and matches become `[alias](key)`.

use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::autolinker::{AutolinkContext, Autolinked, Autolinker, MatchCandidate};
use crate::candidates::{is_line_boundary, CandidateList};
use crate::error::AutolinkResult;
use crate::markdown::escape_link_opener;
use crate::protected::{is_protected_line, BlockFence};

/// Autolinker that needs no document tree
#[derive(Debug, Clone, Copy, Default)]
pub struct LineAutolinker;

impl LineAutolinker {
    pub fn new() -> Self {
        Self
    }

    /// Link one line that is known not to be protected. Returns the number
    /// of links written to `out`.
    pub fn link_line(
        &self,
        line: &str,
        candidates: &CandidateList,
        case_insensitive: bool,
        out: &mut String,
    ) -> usize {
        let mut links = 0;
        let mut pos = 0;

        while pos < line.len() {
            let rest = &line[pos..];

            if let Some(hit) = candidates.match_prefix(rest, case_insensitive) {
                let found = MatchCandidate {
                    start: pos,
                    len: hit.len(),
                    matched: hit.label().to_string(),
                    case_folded: hit.case_folded,
                };
                trace!("Line match {:?} -> {}", found, hit.candidate.key);
                escape_link_opener(out);
                out.push('[');
                out.push_str(&found.matched);
                out.push_str("](");
                out.push_str(&hit.candidate.key);
                out.push(')');
                links += 1;
                pos = found.end();

                // The boundary after a link is copied as is
                let next = line[pos..].chars().next();
                if let Some(boundary) = next.filter(|&c| is_line_boundary(c)) {
                    out.push(boundary);
                    pos += boundary.len_utf8();
                }
                continue;
            }

            match rest.find([' ', '\t']) {
                Some(i) => {
                    out.push_str(&rest[..=i]);
                    pos += i + 1;
                }
                None => {
                    out.push_str(rest);
                    break;
                }
            }
        }

        links
    }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(['\n', '\r']);
    (content, &line[content.len()..])
}

impl Autolinker for LineAutolinker {
    fn name(&self) -> &'static str {
        "line"
    }

    fn process(&self, body: &str, ctx: &AutolinkContext<'_>) -> AutolinkResult<Autolinked> {
        let start = Instant::now();
        let mut out = String::with_capacity(body.len() + body.len() / 4);
        let mut fence = BlockFence::new();
        let mut links = 0;
        let mut truncated = false;

        let mut offset = 0;
        for line in body.split_inclusive('\n') {
            if ctx.deadline.expired() {
                warn!("Autolinking deadline expired at byte {} of {}", offset, body.len());
                out.push_str(&body[offset..]);
                truncated = true;
                break;
            }
            offset += line.len();

            let (content, ending) = split_line_ending(line);
            if let Some(kind) = fence.observe(content) {
                trace!("Passing through {:?} line", kind);
                out.push_str(line);
                continue;
            }
            if is_protected_line(content) {
                trace!("Passing through protected line at byte {}", offset - line.len());
                out.push_str(line);
                continue;
            }

            let case_insensitive = ctx.options.case_insensitive;
            links += self.link_line(content, ctx.candidates, case_insensitive, &mut out);
            out.push_str(ending);
        }

        if fence.in_block() && !truncated {
            debug!("Body ends inside an unclosed fenced block");
        }
        debug!(
            "Line autolinker injected {} links in {:?}",
            links,
            start.elapsed()
        );

        let text = if links == 0 { body.to_string() } else { out };
        Ok(Autolinked {
            text,
            links,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autolinker::{AutolinkOptions, Deadline};
    use crate::entity::Entity;
    use crate::name_index::NameIndex;
    use std::time::Duration;

    fn run(entities: &[Entity], body: &str, case_insensitive: bool) -> Autolinked {
        let index = NameIndex::default();
        let candidates = CandidateList::build(entities, |alias| alias == "http");
        let options = AutolinkOptions {
            case_insensitive,
            ..AutolinkOptions::default()
        };
        let ctx = AutolinkContext {
            index: &index,
            candidates: &candidates,
            options: &options,
            deadline: Deadline::none(),
        };
        LineAutolinker::new().process(body, &ctx).unwrap()
    }

    fn link(entities: &[Entity], body: &str) -> String {
        run(entities, body, false).text
    }

    #[test]
    fn test_links_whole_words() {
        let entities = [Entity::note("notes/aaa.md", "AAA")];
        assert_eq!(
            link(&entities, "Text of AAA.\n"),
            "Text of [AAA](notes/aaa.md).\n"
        );
        assert_eq!(link(&entities, "AAABBB\n"), "AAABBB\n");
        assert_eq!(link(&entities, "AAA BBB"), "[AAA](notes/aaa.md) BBB");
    }

    #[test]
    fn test_boundary_after_link_is_kept() {
        let entities = [Entity::note("a", "AAA"), Entity::note("b", "BBB")];
        assert_eq!(link(&entities, "AAA,BBB"), "[AAA](a),[BBB](b)");
        assert_eq!(link(&entities, "AAA\tBBB"), "[AAA](a)\t[BBB](b)");
    }

    #[test]
    fn test_bang_boundary_does_not_open_image() {
        let entities = [Entity::note("a", "AAA")];
        assert_eq!(link(&entities, "AAA!AAA"), "[AAA](a)\\![AAA](a)");
    }

    #[test]
    fn test_protected_lines_pass_through() {
        let entities = [Entity::note("f", "foo")];
        let body = "Use `foo bar` here\nsee [foo](http://x)\n$foo$ math\nhttps://foo.org foo\n";
        assert_eq!(link(&entities, body), body);
    }

    #[test]
    fn test_fenced_blocks_pass_through() {
        let entities = [Entity::note("f", "foo")];
        let body = "```\nfoo\n```\nfoo\n~~~\nfoo\n~~~\n$$\nfoo\n$$\n";
        assert_eq!(
            link(&entities, body),
            "```\nfoo\n```\n[foo](f)\n~~~\nfoo\n~~~\n$$\nfoo\n$$\n"
        );
    }

    #[test]
    fn test_crlf_preserved() {
        let entities = [Entity::note("f", "foo")];
        assert_eq!(link(&entities, "foo\r\nbar\r\n"), "[foo](f)\r\nbar\r\n");
    }

    #[test]
    fn test_longest_candidate_first() {
        let entities = [Entity::note("short", "Rust"), Entity::note("long", "Rust Book")];
        assert_eq!(link(&entities, "Rust Book rocks"), "[Rust Book](long) rocks");
    }

    #[test]
    fn test_case_insensitive_label() {
        let entities = [Entity::note("r", "Rust")];
        assert_eq!(run(&entities, "rust rocks", false).text, "rust rocks");

        let result = run(&entities, "rust rocks", true);
        assert_eq!(result.text, "[rust](r) rocks");
        assert_eq!(result.links, 1);
    }

    #[test]
    fn test_abbreviation_links_to_entity() {
        let entities = [Entity::note("gt.md", "Graph Theory").with_abbreviation("GT")];
        assert_eq!(link(&entities, "GT basics"), "[GT](gt.md) basics");
    }

    #[test]
    fn test_expired_deadline() {
        let index = NameIndex::default();
        let entities = [Entity::note("f", "foo")];
        let candidates = CandidateList::build(&entities, |_| false);
        let options = AutolinkOptions::default();
        let ctx = AutolinkContext {
            index: &index,
            candidates: &candidates,
            options: &options,
            deadline: Deadline::after(Duration::ZERO),
        };
        let result = LineAutolinker::new().process("foo\nfoo\n", &ctx).unwrap();
        assert!(result.truncated);
        assert_eq!(result.text, "foo\nfoo\n");
    }
}
