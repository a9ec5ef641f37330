/* Call and log framing around the head/tail body */

use crate::errors::DecodeError;
use crate::word::ensure_len;
use alloy_primitives::B256;

/// An event log: indexed topics plus the ABI-encoded data payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Log {
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
}

/// Checks the 4-byte selector prefix and returns the argument body.
pub fn check_selector<'a>(data: &'a [u8], expected: &[u8; 4]) -> Result<&'a [u8], DecodeError> {
    ensure_len(data, 4)?;
    let mut actual = [0u8; 4];
    actual.copy_from_slice(&data[..4]);
    if actual != *expected {
        return Err(DecodeError::SelectorMismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(&data[4..])
}

/// Checks the topic count and, for non-anonymous events, topic0.
pub fn check_topics(
    topics: &[B256],
    expected: usize,
    topic0: Option<&[u8; 32]>,
) -> Result<(), DecodeError> {
    if topics.len() != expected {
        return Err(DecodeError::TopicCount {
            expected,
            actual: topics.len(),
        });
    }
    if let Some(signature) = topic0 {
        if topics[0].0 != *signature {
            return Err(DecodeError::TopicMismatch);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_prefix() {
        let data = [0xa9, 0x05, 0x9c, 0xbb, 1, 2];
        assert_eq!(check_selector(&data, &[0xa9, 0x05, 0x9c, 0xbb]), Ok(&data[4..]));
        assert_eq!(
            check_selector(&data, &[0, 0, 0, 0]),
            Err(DecodeError::SelectorMismatch {
                expected: [0, 0, 0, 0],
                actual: [0xa9, 0x05, 0x9c, 0xbb],
            })
        );
        assert!(matches!(
            check_selector(&data[..3], &[0; 4]),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn topic_checks() {
        let topic0 = [7u8; 32];
        let topics = [B256::from(topic0), B256::ZERO];
        assert_eq!(check_topics(&topics, 2, Some(&topic0)), Ok(()));
        assert_eq!(check_topics(&topics, 2, Some(&[0u8; 32])), Err(DecodeError::TopicMismatch));
        assert_eq!(
            check_topics(&topics, 3, None),
            Err(DecodeError::TopicCount {
                expected: 3,
                actual: 2
            })
        );
    }
}
