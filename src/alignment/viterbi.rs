use crate::error::AlignmentError;
use crate::model::evidence::EvidenceMatrix;
use crate::types::{AlignmentPath, PhonemeSequence, Segment};

/// Emissions below this are clamped so that a reachable state never scores
/// `-inf`; only structurally unreachable states do.
const LOG_PROB_FLOOR: f32 = -1.0e10;

/// Back-pointer for one `(frame, phoneme)` cell.
///
/// Only two duration buckets carry a choice: `d == 1` (entered from the
/// previous phoneme at some bucket `advance_from`) and the saturated bucket
/// `d == min` (held from itself, or reached by one more frame / an advance
/// when `min == 1`). Every other bucket `d` comes from `d - 1`.
#[derive(Debug, Clone, Copy, Default)]
struct Trace {
    advance_from: u32,
    held: bool,
}

/// Frame counts a phoneme must occupy before the next one may begin.
fn min_frames(sequence: &PhonemeSequence, p: usize, min_aligned_timeframe: usize) -> usize {
    if sequence.is_boundary(p) {
        1
    } else {
        min_aligned_timeframe
    }
}

/// Checks that the evidence has enough frames for the requested minimum.
pub fn check_feasible(
    num_frames: usize,
    sequence: &PhonemeSequence,
    min_aligned_timeframe: usize,
) -> Result<(), AlignmentError> {
    // Saturates: an overflowing requirement can never be met anyway.
    let required_frames = (0..sequence.len())
        .map(|p| min_frames(sequence, p, min_aligned_timeframe))
        .fold(0usize, usize::saturating_add);
    if num_frames >= required_frames {
        return Ok(());
    }

    let boundary = (0..sequence.len()).filter(|&p| sequence.is_boundary(p)).count();
    let interior = sequence.len() - boundary;
    let max_feasible_min = match num_frames.checked_sub(boundary) {
        Some(spare) if interior > 0 && spare >= interior => Some(spare / interior),
        _ => None,
    };
    Err(AlignmentError::InfeasibleAlignment {
        required_frames,
        available_frames: num_frames,
        min_aligned_timeframe,
        max_feasible_min,
    })
}

/// Duration-constrained Viterbi segmentation.
///
/// A path assigns every frame to one phoneme, in order, each phoneme at least
/// one frame and non-boundary phonemes at least `min_aligned_timeframe`.
/// Frame `f` scores the transition log-prob of `phonemes[p-1] -> phonemes[p]`
/// when phoneme `p > 0` starts at `f`, and the blank log-prob otherwise. The
/// path with the highest total wins; ties go to the path whose phonemes
/// started earliest.
pub fn decode_min_duration(
    evidence: &EvidenceMatrix,
    sequence: &PhonemeSequence,
    min_aligned_timeframe: usize,
) -> Result<AlignmentPath, AlignmentError> {
    if min_aligned_timeframe == 0 {
        return Err(AlignmentError::invalid_input(
            "min_aligned_timeframe must be a positive integer",
        ));
    }
    if sequence.is_empty() {
        return Err(AlignmentError::EmptyPhonemeSequence);
    }
    if sequence.transition_ids.len() + 1 != sequence.len() {
        return Err(AlignmentError::invalid_input(format!(
            "{} phonemes need {} transition ids, got {}",
            sequence.len(),
            sequence.len() - 1,
            sequence.transition_ids.len()
        )));
    }
    if let Some(&bad) = sequence
        .transition_ids
        .iter()
        .find(|&&id| id >= evidence.vocab_size())
    {
        return Err(AlignmentError::inference(
            "decode",
            format!(
                "transition id {bad} outside model vocabulary of {}",
                evidence.vocab_size()
            ),
        ));
    }

    let t_len = evidence.num_frames();
    let p_len = sequence.len();
    check_feasible(t_len, sequence, min_aligned_timeframe)?;

    // No phoneme can hold more than `t_len` frames, so longer buckets are
    // never reached. Only an all-boundary sequence gets here with a larger
    // minimum.
    let d_len = min_aligned_timeframe.min(t_len);
    let idx = |p: usize, d: usize| p * d_len + (d - 1);
    let stay = |f: usize| evidence.blank(f).max(LOG_PROB_FLOOR);
    let enter = |f: usize, p: usize| {
        evidence
            .transition(f, sequence.transition_ids[p - 1])
            .max(LOG_PROB_FLOOR)
    };
    let exempt: Vec<bool> = (0..p_len).map(|p| sequence.is_boundary(p)).collect();

    let mut prev = vec![f32::NEG_INFINITY; p_len * d_len];
    let mut curr = vec![f32::NEG_INFINITY; p_len * d_len];
    let mut traces = vec![Trace::default(); t_len * p_len];

    prev[idx(0, 1)] = stay(0);

    for f in 1..t_len {
        let stay_f = stay(f);
        let row = &mut traces[f * p_len..(f + 1) * p_len];
        // Phoneme p needs at least p frames before it, the phonemes after it
        // at least one frame each.
        let p_hi = f.min(p_len - 1);
        let p_lo = (p_len - 1).saturating_sub(t_len - 1 - f);
        curr.fill(f32::NEG_INFINITY);

        for p in p_lo..=p_hi {
            let (advance, advance_from) = if p == 0 {
                (f32::NEG_INFINITY, 0)
            } else {
                let lowest = if exempt[p - 1] { 1 } else { d_len };
                let mut best = f32::NEG_INFINITY;
                let mut best_d = d_len;
                // Longest-running predecessor first so that it wins ties.
                for d in (lowest..=d_len).rev() {
                    let cand = prev[idx(p - 1, d)];
                    if cand > best {
                        best = cand;
                        best_d = d;
                    }
                }
                (best + enter(f, p), best_d)
            };

            let hold = prev[idx(p, d_len)] + stay_f;
            let trace = &mut row[p];
            trace.advance_from = advance_from as u32;

            if d_len == 1 {
                trace.held = hold >= advance;
                curr[idx(p, 1)] = hold.max(advance);
                continue;
            }

            curr[idx(p, 1)] = advance;
            for d in 2..d_len {
                curr[idx(p, d)] = prev[idx(p, d - 1)] + stay_f;
            }
            let progress = prev[idx(p, d_len - 1)] + stay_f;
            trace.held = hold >= progress;
            curr[idx(p, d_len)] = hold.max(progress);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    let last = p_len - 1;
    let lowest_final = if exempt[last] { 1 } else { d_len };
    let mut log_score = f32::NEG_INFINITY;
    let mut d = d_len;
    for cand_d in (lowest_final..=d_len).rev() {
        let cand = prev[idx(last, cand_d)];
        if cand > log_score {
            log_score = cand;
            d = cand_d;
        }
    }
    if log_score == f32::NEG_INFINITY {
        return Err(AlignmentError::inference(
            "decode",
            "no path reaches the final phoneme",
        ));
    }

    let mut starts = vec![0usize; p_len];
    let mut p = last;
    for f in (1..t_len).rev() {
        let trace = traces[f * p_len + p];
        let advanced = if d == d_len {
            if trace.held {
                false
            } else if d_len == 1 {
                true
            } else {
                d = d_len - 1;
                false
            }
        } else if d == 1 {
            true
        } else {
            d -= 1;
            false
        };
        if advanced {
            starts[p] = f;
            d = trace.advance_from as usize;
            p -= 1;
        }
    }
    debug_assert_eq!(p, 0, "backtrace must end on the first phoneme");

    let segments = (0..p_len)
        .map(|p| Segment {
            start_frame: starts[p],
            end_frame: if p == last { t_len } else { starts[p + 1] },
            phoneme: sequence.phonemes[p].clone(),
        })
        .collect();

    Ok(AlignmentPath {
        segments,
        num_frames: t_len,
        log_score,
    })
}
