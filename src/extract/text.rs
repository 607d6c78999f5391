//! Interpretation of text chunk key/value pairs
//!
//! Generators such as the Stable Diffusion web UI write a single `parameters`
//! entry: the prompt on the first line, an optional `Negative prompt:` line,
//! then a settings line (`Steps: 20, Sampler: ...`).

use super::ImageMetadata;

const PARAMETERS_KEY: &str = "parameters";
const PROMPT_KEY: &str = "prompt";
const NEGATIVE_PROMPT_KEY: &str = "negative_prompt";
const NEGATIVE_PROMPT_PREFIX: &str = "Negative prompt:";

/// Decode bytes one-to-one into code points (ISO 8859-1)
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Split a decoded text payload on its first null byte
pub fn split_keyword(text: &str) -> Option<(&str, &str)> {
    text.split_once('\0')
}

fn apply_parameters(metadata: &mut ImageMetadata, raw: &str) {
    let parameters = raw.trim();
    let mut lines = parameters.split('\n');

    if let Some(first) = lines.next() {
        if !first.is_empty() {
            metadata.prompt = first.trim().to_string();
        }
    }

    // Every matching line overwrites the previous one
    for line in lines {
        if let Some(rest) = line.strip_prefix(NEGATIVE_PROMPT_PREFIX) {
            metadata.negative_prompt = rest.trim().to_string();
        }
    }

    metadata.parameters = parameters.to_string();
}

/// Accumulates key/value entries across the text chunks of one file
#[derive(Debug, Default)]
pub struct TextScan {
    metadata: ImageMetadata,
    matched: bool,
}

impl TextScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one entry. Returns true once a `parameters` entry has been
    /// consumed, after which the caller stops scanning.
    pub fn apply(&mut self, key: &str, value: &str) -> bool {
        match key {
            PARAMETERS_KEY => {
                apply_parameters(&mut self.metadata, value);
                self.matched = true;
                true
            }
            PROMPT_KEY => {
                self.metadata.prompt = value.to_string();
                self.matched = true;
                false
            }
            NEGATIVE_PROMPT_KEY => {
                self.metadata.negative_prompt = value.to_string();
                self.matched = true;
                false
            }
            _ => false,
        }
    }

    /// `None` when no recognised key was seen
    pub fn finish(self) -> Option<ImageMetadata> {
        self.matched.then_some(self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_parameters(raw: &str) -> ImageMetadata {
        let mut scan = TextScan::new();
        assert!(scan.apply(PARAMETERS_KEY, raw));
        scan.finish().unwrap()
    }

    #[test]
    fn test_parse_parameters_block() {
        let metadata = parse_parameters("a cat\nNegative prompt: blurry\nSteps: 20");
        assert_eq!(metadata.prompt, "a cat");
        assert_eq!(metadata.negative_prompt, "blurry");
        assert_eq!(metadata.parameters, "a cat\nNegative prompt: blurry\nSteps: 20");
    }

    #[test]
    fn test_parameters_are_trimmed() {
        let metadata = parse_parameters("\n  a cat  \nSteps: 20\n\n");
        assert_eq!(metadata.prompt, "a cat");
        assert_eq!(metadata.negative_prompt, "");
        assert_eq!(metadata.parameters, "a cat  \nSteps: 20");
    }

    #[test]
    fn test_last_negative_prompt_wins() {
        let metadata =
            parse_parameters("a cat\nNegative prompt: blurry\nNegative prompt: lowres, jpeg\nSteps: 20");
        assert_eq!(metadata.negative_prompt, "lowres, jpeg");
    }

    #[test]
    fn test_negative_prompt_on_first_line_is_the_prompt() {
        let metadata = parse_parameters("Negative prompt: blurry");
        assert_eq!(metadata.prompt, "Negative prompt: blurry");
        assert_eq!(metadata.negative_prompt, "");
    }

    #[test]
    fn test_latin1_is_lossless() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let decoded = decode_latin1(&bytes);
        assert_eq!(decoded.chars().count(), 256);
        let round_trip: Vec<u8> = decoded.chars().map(|c| c as u32 as u8).collect();
        assert_eq!(round_trip, bytes);
    }

    #[test]
    fn test_split_keyword_on_first_null() {
        assert_eq!(split_keyword("parameters\0a\0b"), Some(("parameters", "a\0b")));
        assert_eq!(split_keyword("no separator"), None);
    }

    #[test]
    fn test_scan_is_additive() {
        let mut scan = TextScan::new();
        assert!(!scan.apply("negative_prompt", "ugly"));
        assert!(!scan.apply("Software", "ignored"));
        assert!(scan.apply("parameters", "a dog\nSteps: 30"));
        let metadata = scan.finish().unwrap();
        assert_eq!(metadata.prompt, "a dog");
        assert_eq!(metadata.negative_prompt, "ugly");
        assert_eq!(metadata.parameters, "a dog\nSteps: 30");
    }

    #[test]
    fn test_scan_without_known_keys() {
        let mut scan = TextScan::new();
        scan.apply("Software", "some editor");
        assert!(scan.finish().is_none());
    }
}
