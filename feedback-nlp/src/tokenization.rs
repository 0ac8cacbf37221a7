use crate::lemmatization::LanguageModel;

/// Lemmas of the alphabetic, non stop-word tokens of `text`, in text order.
pub fn tokenize(model: &dyn LanguageModel, text: &str) -> Vec<String> {
    model.analyze(text)
        .into_iter()
        .filter(|token| token.is_alpha && !token.is_stop)
        .map(|token| token.lemma)
        .collect()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{lemmatization::tests::test_language_model, normalization::normalize},
    };

    #[test]
    fn drops_stop_words_and_non_alphabetic_tokens() {
        let model = test_language_model();

        assert_eq!(tokenize(&model, "123 и вкусно"), vec!["вкусно".to_owned()]);
    }

    #[test]
    fn keeps_text_order_and_repeats() {
        let model = test_language_model();
        let tokens = tokenize(&model, &normalize("Очень вкусная еда! <br> Рекомендую, еду рекомендую"));

        assert_eq!(tokens, vec!["вкусный", "еда", "рекомендовать", "еда", "рекомендовать"]);
    }

    #[test]
    fn mixed_alphanumeric_tokens_are_dropped() {
        let model = test_language_model();

        assert_eq!(tokenize(&model, "кофе covid19 2x кофе"), vec!["кофе", "кофе"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        let model = test_language_model();

        assert!(tokenize(&model, "").is_empty());
        assert!(tokenize(&model, "   ").is_empty());
        assert!(tokenize(&model, "и в не").is_empty());
    }
}
