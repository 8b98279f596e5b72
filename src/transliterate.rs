//! ASCII folding for text placed in exported documents.
//!
//! The report uses the standard Helvetica faces, which only cover a Latin-1 subset
//! reliably. Everything is folded to plain ASCII through an explicit table; characters
//! outside it become `?`. Lossy by nature and applied only at the export boundary.

const TABLE: &[(char, &str)] = &[
    ('à', "a"), ('á', "a"), ('â', "a"), ('ã', "a"), ('ä', "a"), ('å', "a"),
    ('À', "A"), ('Á', "A"), ('Â', "A"), ('Ã', "A"), ('Ä', "A"), ('Å', "A"),
    ('æ', "ae"), ('Æ', "AE"),
    ('ç', "c"), ('Ç', "C"),
    ('è', "e"), ('é', "e"), ('ê', "e"), ('ë', "e"),
    ('È', "E"), ('É', "E"), ('Ê', "E"), ('Ë', "E"),
    ('ì', "i"), ('í', "i"), ('î', "i"), ('ï', "i"),
    ('Ì', "I"), ('Í', "I"), ('Î', "I"), ('Ï', "I"),
    ('ñ', "n"), ('Ñ', "N"),
    ('ò', "o"), ('ó', "o"), ('ô', "o"), ('õ', "o"), ('ö', "o"), ('ø', "o"),
    ('Ò', "O"), ('Ó', "O"), ('Ô', "O"), ('Õ', "O"), ('Ö', "O"), ('Ø', "O"),
    ('œ', "oe"), ('Œ', "OE"),
    ('ù', "u"), ('ú', "u"), ('û', "u"), ('ü', "u"),
    ('Ù', "U"), ('Ú', "U"), ('Û', "U"), ('Ü', "U"),
    ('ý', "y"), ('ÿ', "y"), ('Ý', "Y"), ('Ÿ', "Y"),
    ('ß', "ss"),
    ('\u{2018}', "'"), ('\u{2019}', "'"), ('\u{201A}', "'"), ('\u{2032}', "'"),
    ('\u{201C}', "\""), ('\u{201D}', "\""), ('\u{201E}', "\""), ('«', "\""), ('»', "\""),
    ('\u{2013}', "-"), ('\u{2014}', "-"), ('\u{2212}', "-"),
    ('\u{2026}', "..."),
    ('\u{2022}', "-"), ('\u{00B7}', "-"),
    ('\u{00A0}', " "), ('\u{202F}', " "), ('\u{2009}', " "),
    ('€', "EUR"), ('£', "GBP"), ('°', "o"), ('×', "x"),
    ('\u{2192}', "->"), ('\u{2190}', "<-"),
    ('\u{2713}', "v"), ('\u{2714}', "v"),
];

fn fold_char(c: char, out: &mut String) {
    if c.is_ascii() {
        if c == '\t' {
            out.push(' ');
        } else if !c.is_ascii_control() || c == '\n' {
            out.push(c);
        }
        return;
    }
    match TABLE.iter().find(|(from, _)| *from == c) {
        Some((_, to)) => out.push_str(to),
        None => out.push('?'),
    }
}

/// Fold `text` to printable ASCII.
pub fn to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        fold_char(c, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_french_accents_fold() {
        assert_eq!(to_ascii("Généré le"), "Genere le");
        assert_eq!(to_ascii("Équipe recommandée"), "Equipe recommandee");
        assert_eq!(to_ascii("cohérence, complétude, cœur"), "coherence, completude, coeur");
    }

    #[test]
    fn test_typography_folds() {
        assert_eq!(to_ascii("l\u{2019}app \u{2014} «vite»\u{2026}"), "l'app - \"vite\"...");
        assert_eq!(to_ascii("75\u{00A0}000 €"), "75 000 EUR");
    }

    #[test]
    fn test_unknown_becomes_question_mark() {
        assert_eq!(to_ascii("go 🚀"), "go ?");
        assert_eq!(to_ascii("日本"), "??");
    }

    #[test]
    fn test_ascii_passes_through() {
        let s = "Plain ASCII (100%) - ok!";
        assert_eq!(to_ascii(s), s);
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(to_ascii("a\tb\u{0007}c"), "a bc");
    }
}
