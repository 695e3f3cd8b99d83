use chrono::Utc;
use rand::Rng;

const ID_PREFIX: &str = "conv_";
const SUFFIX_LEN: usize = 9;
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `conv_<unix millis>_<9 random base36 chars>`.
pub fn generate_conversation_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{ID_PREFIX}{}_{suffix}", Utc::now().timestamp_millis())
}

/// Accepts `conv_` followed by at least one ASCII alphanumeric or underscore.
pub fn is_valid_conversation_id(id: &str) -> bool {
    id.strip_prefix(ID_PREFIX).is_some_and(|rest| {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_shape() {
        let id = generate_conversation_id();
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "conv");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(is_valid_conversation_id(&id));
    }

    #[test]
    fn test_validation_rejects_foreign_shapes() {
        assert!(!is_valid_conversation_id(""));
        assert!(!is_valid_conversation_id("conv_"));
        assert!(!is_valid_conversation_id("chat_123_abc"));
        assert!(!is_valid_conversation_id("conv_12-3"));
        assert!(!is_valid_conversation_id("conv_123 abc"));
        assert!(is_valid_conversation_id("conv_1712345678901_k3j9x0a1b"));
    }
}
