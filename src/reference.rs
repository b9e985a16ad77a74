//! Reference anchors, subpaths, and content-range extraction.
//!
//! A reference may scope its target to a sub-section via an anchor suffix:
//! `name` (heading, matched by slug), `name,N` (heading plus line offset),
//! `^name` (block), `^begin`/`^end`/`*` (special markers), optionally
//! followed by `:#` and a second anchor forming an explicit range.

use crate::host::{DocumentMeta, FileInfo, HeadingMeta};
use crate::note::NoteId;
use crate::vault::Vault;
use unicode_normalization::UnicodeNormalization;

/// One endpoint of a content-range reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefAnchor {
    Begin,
    End,
    Wildcard,
    Block { name: String },
    Header { name: String, line_offset: usize },
}

/// Byte-offset range into a document's raw text. `end == None` means
/// through end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefRange {
    pub start: usize,
    pub start_line_offset: usize,
    pub end: Option<usize>,
}

impl RefRange {
    /// Advance `start` forward, counting newlines, until `start_line_offset`
    /// lines have been skipped. Lets a reference point a few lines into a
    /// section rather than exactly at its heading line. Runs off the end of
    /// the text when the section has fewer lines than the offset.
    pub fn apply_line_offset(&mut self, text: &str) {
        if self.start_line_offset == 0 {
            return;
        }
        let Some(tail) = text.get(self.start..) else {
            return;
        };
        let mut lines = 0;
        for (idx, ch) in tail.char_indices() {
            if ch == '\n' {
                lines += 1;
                if lines == self.start_line_offset {
                    self.start += idx + 1;
                    return;
                }
            }
        }
        self.start = text.len();
    }
}

/// Parsed anchor suffix of a reference: start anchor and optional end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSubpath {
    /// The raw suffix text, kept for diagnostics.
    pub text: String,
    pub start: RefAnchor,
    pub end: Option<RefAnchor>,
}

/// A resolved reference whose target vault or note may not (yet) exist.
#[derive(Debug)]
pub struct MaybeNoteRef<'a> {
    /// Vault name as written in the reference, case preserved.
    pub vault_name: String,
    /// Present only when the named vault is configured.
    pub vault: Option<&'a Vault>,
    /// Present only when the note exists in the vault's tree.
    pub note: Option<NoteId>,
    /// Note path as written in the reference, case preserved.
    pub path: String,
    pub subpath: Option<RefSubpath>,
}

impl MaybeNoteRef<'_> {
    /// Case-normalized key used by downstream consumers to index targets.
    pub fn key(&self) -> String {
        format!("{}/{}", self.vault_name, self.path).to_lowercase()
    }
}

/// Result of resolving a reference.
#[derive(Debug)]
pub enum RefTarget<'a> {
    MaybeNote(MaybeNoteRef<'a>),
    /// Target resolved to a non-markdown document, handled outside the
    /// note namespace.
    File(FileInfo),
}

/// Split a link text into its path and anchor suffix. The `#` marker is a
/// structural delimiter and is not part of the returned suffix.
pub fn parse_link_text(link: &str) -> (&str, &str) {
    match link.split_once('#') {
        Some((path, subpath)) => (path, subpath),
        None => (link, ""),
    }
}

/// Parse a single anchor token.
pub fn parse_ref_anchor(token: &str) -> RefAnchor {
    if token == "*" {
        RefAnchor::Wildcard
    } else if token == "^begin" {
        RefAnchor::Begin
    } else if token == "^end" {
        RefAnchor::End
    } else if let Some(name) = token.strip_prefix('^') {
        RefAnchor::Block {
            name: name.to_string(),
        }
    } else {
        let (name, offset) = match token.split_once(',') {
            Some((name, offset)) => (name, offset),
            None => (token, ""),
        };
        RefAnchor::Header {
            name: name.to_string(),
            // non-numeric offsets fall back to 0 instead of erroring
            line_offset: offset.parse().unwrap_or(0),
        }
    }
}

/// Parse an anchor suffix, splitting on the `:#` range delimiter.
pub fn parse_ref_subpath(raw: &str) -> Option<RefSubpath> {
    if raw.is_empty() {
        return None;
    }
    let (start, end) = match raw.split_once(":#") {
        Some((start, end)) => (start, Some(end)),
        None => (raw, None),
    };
    Some(RefSubpath {
        text: raw.to_string(),
        start: parse_ref_anchor(start),
        end: end.map(parse_ref_anchor),
    })
}

/// Slug a heading text the way the host anchors its own headings:
/// NFC-normalize, lowercase, strip punctuation, whitespace to hyphens.
pub fn slugify_heading(text: &str) -> String {
    let normalized: String = text.trim().nfc().collect();
    normalized
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

/// First heading (in document order) whose slug equals `name`.
pub fn find_heading_by_slug<'a>(
    headings: &'a [HeadingMeta],
    name: &str,
) -> Option<(usize, &'a HeadingMeta)> {
    headings
        .iter()
        .enumerate()
        .find(|(_, heading)| slugify_heading(&heading.text) == name)
}

/// Compute the byte range a subpath selects inside a document.
///
/// `None` means the anchor does not resolve: an invalid start marker, or a
/// referenced heading/block that the document does not contain. Consumers
/// render that as an inline diagnostic, never as a hard failure.
pub fn get_ref_content_range(subpath: &RefSubpath, meta: &DocumentMeta) -> Option<RefRange> {
    let mut range = RefRange {
        start: 0,
        start_line_offset: 0,
        end: None,
    };

    match &subpath.start {
        RefAnchor::Begin => {
            range.start = 0;
            range.end = meta.headings.first().map(|heading| heading.start);
        }
        // a range cannot begin at "end" or with a wildcard
        RefAnchor::End | RefAnchor::Wildcard => return None,
        RefAnchor::Block { name } => {
            let block = meta.blocks.get(name)?;
            range.start = block.start;
            range.end = Some(block.end);
        }
        RefAnchor::Header { name, line_offset } => {
            let (start_index, start_heading) = find_heading_by_slug(&meta.headings, name)?;
            range.start = start_heading.start;
            range.start_line_offset = *line_offset;

            let end_heading = if matches!(subpath.end, Some(RefAnchor::Wildcard)) {
                // explicit wildcard end: the immediately next heading,
                // regardless of level
                meta.headings.get(start_index + 1)
            } else {
                // default: until the next sibling-or-shallower section
                meta.headings
                    .iter()
                    .enumerate()
                    .find(|(index, heading)| {
                        *index > start_index && heading.level <= start_heading.level
                    })
                    .map(|(_, heading)| heading)
            };
            range.end = end_heading.map(|heading| heading.start);
        }
    }

    let Some(end) = &subpath.end else {
        return Some(range);
    };

    match end {
        RefAnchor::Begin => return None,
        RefAnchor::End => range.end = None,
        // already narrowed the default end above
        RefAnchor::Wildcard => {}
        RefAnchor::Header { name, .. } => {
            let (_, heading) = find_heading_by_slug(&meta.headings, name)?;
            // unlike the default rule, an explicit header end includes its
            // own line
            range.end = Some(heading.end);
        }
        RefAnchor::Block { name } => {
            let block = meta.blocks.get(name)?;
            range.end = Some(block.end);
        }
    }

    Some(range)
}

/// Content extracted for an embed, or the diagnostic placeholder shown in
/// its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefContent {
    Section(String),
    Missing(String),
}

impl RefContent {
    pub fn text(&self) -> &str {
        match self {
            RefContent::Section(text) | RefContent::Missing(text) => text,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RefContent::Section(_))
    }
}

/// Slice the referenced sub-section out of a document's raw text.
pub fn extract_ref_content(
    text: &str,
    basename: &str,
    subpath: &RefSubpath,
    meta: &DocumentMeta,
) -> RefContent {
    match get_ref_content_range(subpath, meta) {
        Some(mut range) => {
            range.apply_line_offset(text);
            let end = range.end.unwrap_or(text.len()).min(text.len());
            let start = range.start.min(end);
            RefContent::Section(text[start..end].to_string())
        }
        None => RefContent::Missing(format!(
            "### Unable to find section {} in {}",
            subpath.text, basename
        )),
    }
}

/// Render an anchor back into a link suffix. Header anchors are upgraded
/// to the matched heading's display text when the heading table is known.
pub fn anchor_to_link_suffix(anchor: &RefAnchor, headings: Option<&[HeadingMeta]>) -> String {
    match anchor {
        RefAnchor::Header { name, .. } => {
            let display = headings
                .and_then(|headings| find_heading_by_slug(headings, name))
                .map(|(_, heading)| heading.text.clone())
                .unwrap_or_else(|| name.clone());
            format!("#{}", display)
        }
        RefAnchor::Block { name } => format!("#^{}", name),
        _ => String::new(),
    }
}
