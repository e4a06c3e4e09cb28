pub mod tokenization;
pub mod viterbi;
