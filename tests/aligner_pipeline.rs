use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use domino_rs::{
    labels, Aligner, AlignerBuilder, AlignerConfig, AlignmentError, EvidenceMatrix,
    FrameSequence, PhonemeAlignment, TransitionScorer, TransitionVocab, Waveform,
};

const DOWANGO: [&str; 9] = ["pau", "d", "o", "w", "a", "N", "g", "o", "pau"];

fn dowango_vocab() -> TransitionVocab {
    let tokens: Vec<String> = DOWANGO
        .windows(2)
        .map(|pair| format!("{}->{}", pair[0], pair[1]))
        .collect();
    TransitionVocab::from_tokens(tokens)
}

/// Fires transition `k` at `peaks[k]`, scaled to the audio length.
struct PeakScorer {
    peaks: Vec<f64>,
    vocab_size: usize,
    calls: Arc<AtomicUsize>,
    released: AtomicBool,
}

impl PeakScorer {
    fn new(peaks: &[f64], vocab_size: usize) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let scorer = Self {
            peaks: peaks.to_vec(),
            vocab_size,
            calls: calls.clone(),
            released: AtomicBool::new(false),
        };
        (scorer, calls)
    }
}

impl TransitionScorer for PeakScorer {
    fn score(&self, frames: &FrameSequence) -> Result<EvidenceMatrix, AlignmentError> {
        if self.is_released() {
            return Err(AlignmentError::UsedAfterRelease);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let t_len = frames.num_frames();
        let v = self.vocab_size;
        let mut transitions = vec![-9.0f32; t_len * v];
        let mut blank = vec![-0.05f32; t_len];
        for (k, &pos) in self.peaks.iter().enumerate() {
            let t = ((pos * t_len as f64) as usize).min(t_len - 1);
            transitions[t * v + k] = -0.01;
            blank[t] = -5.0;
        }
        EvidenceMatrix::new(t_len, v, transitions, blank)
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    fn label(&self) -> String {
        "peaks".to_string()
    }
}

fn dowango_aligner(peaks: &[f64]) -> (Aligner, Arc<AtomicUsize>) {
    let (scorer, calls) = PeakScorer::new(peaks, DOWANGO.len() - 1);
    let aligner = AlignerBuilder::new(AlignerConfig::default())
        .with_scorer(Box::new(scorer))
        .with_vocab(dowango_vocab())
        .build()
        .expect("build should succeed");
    (aligner, calls)
}

fn even_peaks() -> Vec<f64> {
    (1..DOWANGO.len()).map(|k| k as f64 / DOWANGO.len() as f64).collect()
}

fn one_second() -> Vec<f32> {
    (0..16_000).map(|i| (i as f32 * 0.05).sin() * 0.1).collect()
}

fn assert_well_formed(result: &[PhonemeAlignment], total_seconds: f64) {
    assert!((result[0].start_seconds - 0.0).abs() < 1e-12);
    assert!((result.last().unwrap().end_seconds - total_seconds).abs() < 1e-9);
    for pair in result.windows(2) {
        assert_eq!(pair[0].end_seconds, pair[1].start_seconds);
        assert!(pair[1].start_seconds > pair[0].start_seconds);
    }
}

#[test]
fn dowango_segments_respect_minimum_duration() {
    let (aligner, _) = dowango_aligner(&even_peaks());
    let samples = one_second();
    let result = aligner
        .align(&Waveform::mono_16k(&samples), "d o w a N g o", 3)
        .unwrap();

    let phonemes: Vec<&str> = result.iter().map(|r| r.phoneme.as_str()).collect();
    assert_eq!(phonemes, DOWANGO);
    let interior = &result[1..result.len() - 1];
    assert_eq!(interior.len(), 7);
    for record in interior {
        assert!(record.end_seconds - record.start_seconds >= 0.03 - 1e-9);
    }
    assert_well_formed(&result, 1.0);
}

#[test]
fn frame_ranges_partition_the_audio() {
    let (aligner, _) = dowango_aligner(&[0.05, 0.1, 0.2, 0.3, 0.45, 0.5, 0.7, 0.95]);
    let samples = vec![0.0f32; 16_000 + 37];
    let path = aligner
        .align_frames(&Waveform::mono_16k(&samples), "d o w a N g o", 4)
        .unwrap();
    assert_eq!(path.num_frames, 101);
    assert_eq!(path.segments[0].start_frame, 0);
    assert_eq!(path.segments.last().unwrap().end_frame, 101);
    for pair in path.segments.windows(2) {
        assert_eq!(pair[0].end_frame, pair[1].start_frame);
    }
    for seg in &path.segments[1..path.segments.len() - 1] {
        assert!(seg.num_frames() >= 4);
    }
}

#[test]
fn identical_inputs_give_identical_output() {
    let (aligner, calls) = dowango_aligner(&even_peaks());
    let samples = one_second();
    let a = aligner
        .align(&Waveform::mono_16k(&samples), "d o w a N g o", 3)
        .unwrap();
    let b = aligner
        .align(&Waveform::mono_16k(&samples), "d o w a N g o", 3)
        .unwrap();
    assert_eq!(labels::format_lab(&a), labels::format_lab(&b));
    assert_eq!(a, b);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn short_audio_is_infeasible_without_partial_output() {
    let (aligner, _) = dowango_aligner(&even_peaks());
    // 15 frames < 7 phonemes x 3 frames
    let samples = vec![0.0f32; 160 * 15];
    let err = aligner
        .align(&Waveform::mono_16k(&samples), "d o w a N g o", 3)
        .unwrap_err();
    match err {
        AlignmentError::InfeasibleAlignment {
            required_frames,
            available_frames,
            max_feasible_min,
            ..
        } => {
            assert_eq!(required_frames, 23);
            assert_eq!(available_frames, 15);
            assert_eq!(max_feasible_min, Some(1));
        }
        other => panic!("expected infeasible alignment, got {other:?}"),
    }
}

#[test]
fn minimum_beyond_audio_length_is_infeasible() {
    let (aligner, _) = dowango_aligner(&even_peaks());
    let samples = vec![0.0f32; 1600];
    for min in [11, i64::MAX] {
        let err = aligner
            .align(&Waveform::mono_16k(&samples), "d o w a N g o", min)
            .unwrap_err();
        match err {
            AlignmentError::InfeasibleAlignment {
                available_frames,
                max_feasible_min,
                ..
            } => {
                assert_eq!(available_frames, 10);
                assert_eq!(max_feasible_min, Some(1));
            }
            other => panic!("min {min}: expected infeasible alignment, got {other:?}"),
        }
    }
}

#[test]
fn pause_only_transcription_spans_the_audio() {
    let (aligner, calls) = dowango_aligner(&even_peaks());
    let samples = vec![0.0f32; 1600];
    for phonemes in ["pau", "pau pau"] {
        for min in [3, 11, i64::MAX / 4] {
            let result = aligner
                .align(&Waveform::mono_16k(&samples), phonemes, min)
                .unwrap();
            assert_eq!(result.len(), 1, "{phonemes:?} with min {min}");
            assert_eq!(result[0].phoneme, "pau");
            assert_well_formed(&result, 0.1);
        }
    }
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[test]
fn empty_transcription_runs_no_inference() {
    let (aligner, calls) = dowango_aligner(&even_peaks());
    let samples = one_second();
    let err = aligner
        .align(&Waveform::mono_16k(&samples), "", 3)
        .unwrap_err();
    assert!(matches!(err, AlignmentError::EmptyPhonemeSequence));
    assert_eq!(err.kind(), "EmptyPhonemeSequenceError");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn wrong_sample_rate_is_invalid_argument() {
    let (aligner, calls) = dowango_aligner(&even_peaks());
    let samples = vec![0.0f32; 8_000];
    let err = aligner
        .align(&Waveform::new(&samples, 8_000), "d o w a N g o", 3)
        .unwrap_err();
    assert!(matches!(err, AlignmentError::InvalidArgument { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn align_after_release_fails_and_double_release_is_safe() {
    let (aligner, _) = dowango_aligner(&even_peaks());
    let samples = one_second();
    aligner.release();
    aligner.release();
    let err = aligner
        .align(&Waveform::mono_16k(&samples), "d o w a N g o", 3)
        .unwrap_err();
    assert!(matches!(err, AlignmentError::UsedAfterRelease));
}

#[test]
fn missing_model_fails_construction() {
    let result = Aligner::new("/nonexistent/onnx_model/phoneme_transition_model.onnx");
    match result {
        Err(err) => assert_eq!(err.kind(), "ModelLoadError"),
        Ok(_) => panic!("construction must fail for a missing model"),
    }
}

#[test]
fn shared_aligner_serves_threads_consistently() {
    let (aligner, calls) = dowango_aligner(&even_peaks());
    let aligner = Arc::new(aligner);
    let samples = Arc::new(one_second());
    let expected = aligner
        .align(&Waveform::mono_16k(&samples), "d o w a N g o", 3)
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let aligner = Arc::clone(&aligner);
            let samples = Arc::clone(&samples);
            std::thread::spawn(move || {
                aligner
                    .align(&Waveform::mono_16k(&samples), "d o w a N g o", 3)
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("worker panicked"), expected);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

/// Runs the real model when `DOMINO_IT_MODEL` and `DOMINO_IT_WAV` point at files.
#[test]
#[ignore = "needs a phoneme transition model and a recording"]
fn real_model_alignment_is_well_formed() {
    let (Ok(model), Ok(wav)) = (std::env::var("DOMINO_IT_MODEL"), std::env::var("DOMINO_IT_WAV"))
    else {
        return;
    };
    let phonemes = std::env::var("DOMINO_IT_PHONEMES").unwrap_or_else(|_| "d o w a N g o".into());
    let aligner = Aligner::new(model).expect("model should load");
    let samples = domino_rs::audio::read_wav_mono_16k(wav.as_ref()).expect("wav should load");
    let result = aligner
        .align(&Waveform::mono_16k(&samples), &phonemes, 3)
        .expect("alignment should succeed");
    let max_end = samples.len().div_ceil(160) as f64 * 0.01;
    assert!(result.last().unwrap().end_seconds <= max_end + 1e-9);
    for pair in result.windows(2) {
        assert_eq!(pair[0].end_seconds, pair[1].start_seconds);
    }
    aligner.release();
}
