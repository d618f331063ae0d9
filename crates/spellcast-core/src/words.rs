//! Built-in drill word list.

/// The word set every fresh session is built from.
pub const DEFAULT_WORDS: &[&str] = &[
    "about", "above", "after", "again", "almost", "another", "answer", "are", "area",
    "around", "beautiful", "because", "before", "being", "best", "black", "body",
    "boy", "brothers", "bug", "can't", "car", "caught", "children", "city", "clock",
    "could", "crash", "crashed", "didn't", "don't", "door", "drink", "easy", "eating",
    "enough", "every", "favorite", "first", "float", "found", "friends", "girl",
    "have", "hear", "heard", "here", "horse", "house", "how", "however", "hurt",
    "idea", "it's", "joke", "jump", "junk", "kicked", "knew", "line", "listen",
    "little", "low", "made", "mail", "make", "many", "measure", "more", "name", "new",
    "nice", "off", "often", "once", "one", "order", "other", "our", "outside",
    "people", "phone", "piece", "played", "pretty", "questions", "rain", "really",
    "ride", "right", "said", "sale", "saw", "school", "second", "shook", "since",
    "sister", "skate", "slow", "small", "snap", "sometimes", "song", "soon", "sports",
    "stop", "sure", "talk", "tell", "than", "thank", "that's", "their", "them", "then",
    "there", "they", "they're", "thing", "those", "thought", "through", "to", "too",
    "trip", "truck", "two", "use", "usually", "very", "wanted", "was", "watch", "went",
    "were", "what", "when", "where", "who", "whole", "why", "will", "wind", "with",
    "won", "won't", "write", "writing", "young",
];

/// Owned copy of [`DEFAULT_WORDS`], ready for [`crate::session::Source::Fresh`].
pub fn default_words() -> Vec<String> {
    DEFAULT_WORDS.iter().map(|w| w.to_string()).collect()
}
