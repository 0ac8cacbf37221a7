use {
    once_cell::sync::Lazy,
    regex::Regex,
};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strips tags, urls and punctuation, lowercases and leaves words separated by single spaces.
pub fn normalize(raw: &str) -> String {
    let text = TAG.replace_all(raw, " ");
    let text = URL.replace_all(&text, " ");
    let text = NON_WORD.replace_all(&text, " ");
    let text = text.to_lowercase();

    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_tags_and_urls() {
        let normalized = normalize("<b>Great</b> food, see http://x.co");

        assert!(!normalized.contains('<'));
        assert!(!normalized.contains('>'));
        assert!(!normalized.contains("http"));
        assert_eq!(normalized, "great food see");
    }

    #[test]
    fn lowercases_and_single_spaces() {
        assert_eq!(normalize("  Очень   ВКУСНАЯ еда!!! <br> Рекомендую  "), "очень вкусная еда рекомендую");
        assert_eq!(normalize("line\none\ttwo"), "line one two");
    }

    #[test]
    fn strips_https_links_with_paths() {
        assert_eq!(normalize("menu: https://cafe.example/menu?id=3 ok"), "menu ok");
    }

    #[test]
    fn keeps_digits_and_underscores() {
        assert_eq!(normalize("Столик №5, заказ_12"), "столик 5 заказ_12");
    }

    #[test]
    fn empty_and_punctuation_only_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!! ... ???"), "");
        assert_eq!(normalize("<p></p>"), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "<b>Great</b> food, see http://x.co",
            "Очень вкусная еда! <br> Рекомендую",
            "a<<b>>c  --  https://x.y/z?q=1 Ü ß İstanbul",
            "\t\n  mixed\u{00a0}spaces\u{2003}here  ",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample: {:?}", sample);
        }
    }
}
