pub mod evidence;
pub mod featurizer;
pub mod vocab;
