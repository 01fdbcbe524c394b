use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","could","did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","him","his","how",
            "i","if","in","into","is","it","it's","its","itself",
            "me","more","most","my","no","nor","not","of","off","on","once","only","or","other","our","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","them","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours",
        ];
        words.iter().copied().collect()
    };
    // Quantities and units carry no information about which ingredient is meant.
    static ref UNITS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "cup","cups","tbsp","tbs","tablespoon","tablespoons","tsp","teaspoon","teaspoons",
            "oz","ounce","ounces","lb","lbs","pound","pounds","g","gram","grams","kg",
            "ml","l","litre","liter","pinch","dash","clove","cloves","slice","slices","can","cans",
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) || UNITS.contains(token) }

/// Tokenize free text into stemmed terms: NFKC normalization, lowercase, stopword and unit removal, English stemming.
///
/// The same function runs when an index is fitted and when a query is vectorized.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|token| !is_stopword(token))
        .map(|token| STEMMER.stem(token).into_owned())
        .collect()
}
