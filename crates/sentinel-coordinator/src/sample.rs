//! Deterministic sampling for oversized page text.

/// Page text above this many bytes is sampled instead of fully scanned.
pub const PAGE_TEXT_CEILING: usize = 50 * 1024;

/// Keep every Nth whitespace-delimited token when sampling.
pub const SAMPLE_STRIDE: usize = 10;

/// Return the text to scan for an initial page pass.
///
/// At or below [`PAGE_TEXT_CEILING`] the full text is scanned. Above
/// it, a uniform sample of the whitespace-delimited tokens (one in
/// [`SAMPLE_STRIDE`], evenly strided from the first token) is scanned
/// instead, trading recall for bounded latency. Deterministic: the same
/// input always yields the same sample.
#[must_use]
pub fn page_sample(text: &str) -> String {
    if text.len() <= PAGE_TEXT_CEILING {
        return text.to_string();
    }

    text.split_whitespace()
        .step_by(SAMPLE_STRIDE)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_untouched() {
        assert_eq!(page_sample("hello world"), "hello world");
    }

    #[test]
    fn test_large_text_sampled() {
        // ~60KB of 5-byte tokens
        let tokens: Vec<String> = (0..12_000).map(|i| format!("t{i:04}")).collect();
        let text = tokens.join(" ");
        assert!(text.len() > PAGE_TEXT_CEILING);

        let sample = page_sample(&text);
        let sampled: Vec<&str> = sample.split(' ').collect();
        assert_eq!(sampled.len(), 1200);
        assert_eq!(sampled[0], "t0000");
        assert_eq!(sampled[1], "t0010");
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let text = "x".repeat(PAGE_TEXT_CEILING + 1);
        assert_eq!(page_sample(&text), page_sample(&text));
    }
}
