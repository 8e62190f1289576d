//! Fence state tracking over raw docstring text.
//!
//! Fence markers are recognized only at line starts (after indentation):
//! three or more backticks or tildes. The closing marker must use the same
//! character and be at least as long as the opening one. A marker glued to
//! the middle of a line never changes state; the glued form is itself a
//! validation defect reported by the rule scans.

/// Scanner state while walking the text line by line.
///
/// `InFenceLanguageTag` covers the remainder of the opening marker line
/// (the optional info string); the newline moves it to `InFence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceState {
    Outside,
    InFenceLanguageTag,
    InFence,
}

/// Whether a marker opens or closes a fenced block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkerKind {
    Open,
    Close,
}

/// One line-start fence marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FenceMarker {
    pub(crate) kind: MarkerKind,
    /// Byte offset of the first fence character.
    pub(crate) offset: usize,
    /// Byte offset of the start of the marker's line.
    pub(crate) line_start: usize,
    /// Byte offset one past the marker's line, including its newline.
    pub(crate) line_end: usize,
}

/// A fenced region, marker lines included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FenceRegion {
    start: usize,
    end: usize,
}

/// Result of one scan: fenced byte ranges, the marker list, and the offset
/// of an opening marker that was never closed.
#[derive(Debug)]
pub struct FenceMap {
    regions: Vec<FenceRegion>,
    markers: Vec<FenceMarker>,
    unclosed: Option<usize>,
}

impl FenceMap {
    /// Walk the text once and record every fence transition.
    #[must_use]
    pub fn scan(text: &str) -> Self {
        let mut state = FenceState::Outside;
        let mut fence_char = ' ';
        let mut fence_len = 0;
        let mut region_start = 0;

        let mut regions = Vec::new();
        let mut markers = Vec::new();
        let mut unclosed = None;

        for (line_start, line) in lines_with_offsets(text) {
            let line_end = line_start + line.len();
            let trimmed_at = line_start + indent_len(line);
            let trimmed = line.trim_start().trim_end_matches(['\n', '\r']);

            match state {
                FenceState::Outside => {
                    if let Some((ch, len)) = detect_fence(trimmed) {
                        state = if trimmed.len() > len {
                            FenceState::InFenceLanguageTag
                        } else {
                            FenceState::InFence
                        };
                        fence_char = ch;
                        fence_len = len;
                        region_start = trimmed_at;
                        markers.push(FenceMarker {
                            kind: MarkerKind::Open,
                            offset: trimmed_at,
                            line_start,
                            line_end,
                        });
                    }
                }
                FenceState::InFenceLanguageTag => {
                    // The newline after the info string put us on a fresh
                    // line; fall through to in-fence handling.
                    state = FenceState::InFence;
                    if is_closing_fence(trimmed, fence_char, fence_len) {
                        state = FenceState::Outside;
                        markers.push(FenceMarker {
                            kind: MarkerKind::Close,
                            offset: trimmed_at,
                            line_start,
                            line_end,
                        });
                        regions.push(FenceRegion {
                            start: region_start,
                            end: line_end,
                        });
                    }
                }
                FenceState::InFence => {
                    if is_closing_fence(trimmed, fence_char, fence_len) {
                        state = FenceState::Outside;
                        markers.push(FenceMarker {
                            kind: MarkerKind::Close,
                            offset: trimmed_at,
                            line_start,
                            line_end,
                        });
                        regions.push(FenceRegion {
                            start: region_start,
                            end: line_end,
                        });
                    }
                }
            }
        }

        if state != FenceState::Outside {
            unclosed = Some(region_start);
            // The unterminated block still shadows its content from the
            // outside-text rule scans.
            regions.push(FenceRegion {
                start: region_start,
                end: text.len(),
            });
        }

        Self {
            regions,
            markers,
            unclosed,
        }
    }

    /// True if the byte offset falls inside a fenced block (markers included).
    #[must_use]
    pub fn in_fence(&self, offset: usize) -> bool {
        self.regions
            .iter()
            .any(|r| offset >= r.start && offset < r.end)
    }

    /// Offset of an opening marker that was never closed, if any.
    #[must_use]
    pub fn unclosed(&self) -> Option<usize> {
        self.unclosed
    }

    pub(crate) fn markers(&self) -> &[FenceMarker] {
        &self.markers
    }

    /// Byte ranges of the text outside any fenced block, in order.
    pub(crate) fn outside_ranges(&self, len: usize) -> Vec<(usize, usize)> {
        let mut ranges = Vec::with_capacity(self.regions.len() + 1);
        let mut cursor = 0;
        for region in &self.regions {
            if region.start > cursor {
                ranges.push((cursor, region.start));
            }
            cursor = region.end;
        }
        if cursor < len {
            ranges.push((cursor, len));
        }
        ranges
    }
}

/// Iterate lines with their starting byte offsets, newlines kept.
pub(crate) fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        (start, line)
    })
}

pub(crate) fn indent_len(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Detect an opening fence at the (trimmed) start of a line.
///
/// Returns the fence character and run length when the line starts with
/// three or more backticks or tildes.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// Check whether a line closes the currently open fence.
///
/// The closing marker must use the same character, be at least as long as
/// the opening one, and carry nothing but whitespace after the run.
fn is_closing_fence(trimmed: &str, expected: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}
