//! Deterministic pseudo-random embeddings for local runs and tests. Vectors carry no semantics.

use rand::{Rng, SeedableRng, rngs::StdRng};

pub fn embed(texts: &[String], dimensions: u32) -> Vec<Vec<f32>> {
	texts.iter().map(|text| embed_one(text, dimensions)).collect()
}

fn embed_one(text: &str, dimensions: u32) -> Vec<f32> {
	let mut rng = StdRng::from_seed(*blake3::hash(text.as_bytes()).as_bytes());
	let mut vec: Vec<f32> = (0..dimensions).map(|_| rng.gen_range(-1.0..1.0)).collect();
	let norm = vec.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 {
		vec.iter_mut().for_each(|value| *value /= norm);
	}

	vec
}

#[cfg(test)]
mod tests {
	#[test]
	fn same_text_yields_same_unit_vector() {
		let texts = vec!["housing".to_string(), "housing".to_string(), "visa".to_string()];
		let vectors = crate::random::embed(&texts, 16);

		assert_eq!(vectors[0], vectors[1]);
		assert_ne!(vectors[0], vectors[2]);

		let norm = vectors[0].iter().map(|value| value * value).sum::<f32>().sqrt();

		assert!((norm - 1.0).abs() < 1e-4);
	}
}
