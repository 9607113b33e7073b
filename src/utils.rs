/// Short form of a secret for display: the first and last few characters,
/// or only dots when the secret is too short to show any of it
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let len = chars.len();
    if len <= 15 {
        // Too short to safely show, just show dots
        return "•".repeat(len);
    }

    let first: String = chars[..4].iter().collect();
    let last: String = chars[len - 4..].iter().collect();
    format!("{first}...{last}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_token_fully_masked() {
        assert_eq!(mask_token("pat_123"), "•••••••");
        assert_eq!(mask_token(""), "");
    }

    #[test]
    fn test_long_token_shows_edges() {
        assert_eq!(mask_token("pat_abcdefghijklmnop"), "pat_...mnop");
    }

    #[test]
    fn test_multibyte_token() {
        let masked = mask_token("ключ-ключ-ключ-ключ");
        assert_eq!(masked, "ключ...ключ");
    }
}
