use unicode_segmentation::UnicodeSegmentation;

use crate::error::{MontazhError, Result};
use crate::types::Chunk;

/// Number of consecutive sentences grouped into one chunk.
pub const SENTENCES_PER_CHUNK: usize = 2;

/// Split a transcript into ordered two-sentence chunks.
///
/// Sentences are detected on UAX #29 boundaries, trimmed, and grouped two at
/// a time in original order; an odd sentence count leaves a final
/// one-sentence chunk. An empty or whitespace-only transcript yields an
/// empty sequence. Pure function: the same transcript always produces the
/// same chunks.
pub fn segment(transcript: &str) -> Result<Vec<Chunk>> {
    // NUL bytes mean the input is not plain text; refuse rather than chunk
    // it blindly.
    if transcript.contains('\0') {
        return Err(MontazhError::Segmentation {
            reason: "transcript contains NUL bytes and is not plain text".to_string(),
        });
    }

    let sentences: Vec<&str> = transcript
        .unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let chunks = sentences
        .chunks(SENTENCES_PER_CHUNK)
        .enumerate()
        .map(|(chunk_id, group)| Chunk {
            chunk_id,
            original_text: group.join(" "),
        })
        .collect();

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_sentences_form_one_chunk() {
        let chunks = segment("A. B.").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_id, 0);
        assert_eq!(chunks[0].original_text, "A. B.");
    }

    #[test]
    fn test_five_sentences_form_three_chunks() {
        let chunks = segment("One. Two. Three. Four. Five.").unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].original_text, "One. Two.");
        assert_eq!(chunks[1].original_text, "Three. Four.");
        assert_eq!(chunks[2].original_text, "Five.");
    }

    #[test]
    fn test_chunk_ids_are_contiguous_from_zero() {
        let chunks = segment("A. B. C. D. E. F. G.").unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_id, i);
        }
    }

    #[test]
    fn test_chunk_count_is_ceil_of_half() {
        for n in 1..=9usize {
            let transcript = (0..n).map(|i| format!("Sentence {i}.")).collect::<Vec<_>>().join(" ");
            let chunks = segment(&transcript).unwrap();
            assert_eq!(chunks.len(), n.div_ceil(SENTENCES_PER_CHUNK), "for {n} sentences");
            let last_len = chunks.last().unwrap().original_text.matches('.').count();
            if n % 2 == 1 {
                assert_eq!(last_len, 1, "odd count leaves a one-sentence tail");
            } else {
                assert_eq!(last_len, 2);
            }
        }
    }

    #[test]
    fn test_concatenated_chunks_restore_transcript_sentences() {
        let transcript = "The cat sat. The dog barked. Rain fell on the roof.";
        let chunks = segment(transcript).unwrap();
        let restored = chunks
            .iter()
            .map(|c| c.original_text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(restored, transcript);
    }

    #[test]
    fn test_empty_transcript_yields_no_chunks() {
        assert!(segment("").unwrap().is_empty());
        assert!(segment("   \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_segment_is_idempotent() {
        let transcript = "First point. Second point. A third one follows.";
        assert_eq!(segment(transcript).unwrap(), segment(transcript).unwrap());
    }

    #[test]
    fn test_nul_bytes_are_rejected() {
        let err = segment("Hello\0world.").unwrap_err();
        assert!(matches!(err, MontazhError::Segmentation { .. }));
    }
}
