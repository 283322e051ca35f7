//! Conditional-block pruning.
//!
//! `reduce_blocks` is the first pass over a raw template: it consumes
//! every `IF`/`ELIF`/`ELSE`/`ENDIF` token and deletes the branches whose
//! conditions lose, leaving only kept content (and any substitution
//! tokens inside it) for the substitution pass.
//!
//! The algorithm is a single forward scan over the control tokens with a
//! per-nesting-level status stack. Level 0 is the document itself and is
//! always kept; each `IF` pushes a level, each `ENDIF` pops one. Content
//! is dropped whenever the current level is not in a kept state, tracked
//! as byte spans that one final splice removes.

use fieldmark_scan::{control_tokens, Keyword};

/// Per-level keep/drop state.
///
/// - `Open`: top-level content, always kept.
/// - `Keep`: a branch whose condition matched; content survives.
/// - `More`: no branch has matched yet; content is dropped but a later
///   `ELIF`/`ELSE` may still switch the level to `Keep`.
/// - `Drop`: a branch already matched, or an ancestor is not kept; this
///   and all nested blocks are dropped unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Open,
    Keep,
    More,
    Drop,
}

impl Status {
    fn keeps(self) -> bool {
        matches!(self, Status::Open | Status::Keep)
    }
}

/// Prunes conditional blocks from `template`, deciding each reachable
/// branch with `eval_condition`.
///
/// `eval_condition` receives the raw condition tail (`fieldname
/// [operator [value]]`) and runs exactly once per reachable `IF`/`ELIF`.
/// Branches inside an already-dropped region are short-circuited: their
/// conditions are never evaluated, so side-effecting resolvers cannot
/// observe unreachable branches.
///
/// Control tokens never survive into the output. `ELIF`/`ELSE`/`ENDIF`
/// without a matching `IF` are consumed as no-ops; an unterminated `IF`
/// keeps or drops the rest of the template according to its condition.
pub fn reduce_blocks<F>(template: &str, mut eval_condition: F) -> String
where
    F: FnMut(&str) -> bool,
{
    let tokens = control_tokens(template);
    if tokens.is_empty() {
        return template.to_string();
    }

    let mut status = vec![Status::Open];
    let mut drop_from: Option<usize> = None;
    let mut cut: Vec<(usize, usize)> = Vec::with_capacity(tokens.len());

    for token in &tokens {
        if let Some(from) = drop_from {
            if token.start > from {
                cut.push((from, token.start));
            }
        }
        cut.push((token.start, token.end));

        let level = status.len() - 1;
        let current = status[level];
        match token.keyword {
            Keyword::If => {
                let entered = if current.keeps() {
                    if eval_condition(token.tail) {
                        Status::Keep
                    } else {
                        Status::More
                    }
                } else {
                    Status::Drop
                };
                status.push(entered);
            }
            Keyword::Elif => match current {
                // First match wins: the kept branch ends here.
                Status::Keep => status[level] = Status::Drop,
                Status::More => {
                    if eval_condition(token.tail) {
                        status[level] = Status::Keep;
                    }
                }
                Status::Drop | Status::Open => {}
            },
            Keyword::Else => match current {
                Status::Keep => status[level] = Status::Drop,
                Status::More => status[level] = Status::Keep,
                Status::Drop | Status::Open => {}
            },
            Keyword::Endif => {
                // Level 0 is never popped; a stray ENDIF is a no-op.
                if status.len() > 1 {
                    status.pop();
                }
            }
        }

        let now = *status.last().expect("level 0 always present");
        drop_from = match now {
            Status::More | Status::Drop => Some(token.end),
            Status::Open | Status::Keep => None,
        };
    }

    if let Some(from) = drop_from {
        if from < template.len() {
            cut.push((from, template.len()));
        }
    }

    splice_out(template, &cut)
}

/// Copies the parts of `input` not covered by `cut`. The spans are
/// non-overlapping and ordered, as the forward scan produces them.
fn splice_out(input: &str, cut: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    for &(start, end) in cut {
        if start > pos {
            out.push_str(&input[pos..start]);
        }
        pos = pos.max(end);
    }
    if pos < input.len() {
        out.push_str(&input[pos..]);
    }
    out
}
