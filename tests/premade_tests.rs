use std::io::Write;
use tempfile::NamedTempFile;
use SpamSieve::error::PipelineError;
use SpamSieve::pipeline::premade::{article_pipeline, chat_pipeline, ArticleOptions, ChatOptions};

// A few paragraphs of ordinary prose without single-letter words.
const LEGITIMATE_ARTICLE: &str = "\
Lorem ipsum dolor sit amet, consetetur sadipscing elitr, sed diam nonumy eirmod
tempor invidunt ut labore et dolore magna aliquyam erat, sed diam voluptua. At
vero eos et accusam et justo duo dolores et ea rebum. Stet clita kasd
gubergren, no sea takimata sanctus est Lorem ipsum dolor sit amet. Lorem ipsum
dolor sit amet, consetetur sadipscing elitr, sed diam nonumy eirmod tempor
invidunt ut labore et dolore magna aliquyam erat, sed diam voluptua. At vero
eos et accusam et justo duo dolores et ea rebum. Stet clita kasd gubergren, no
sea takimata sanctus est Lorem ipsum dolor sit amet.

Duis autem vel eum iriure dolor in hendrerit in vulputate velit esse molestie
consequat, vel illum dolore eu feugiat nulla facilisis at vero eros et accumsan
et iusto odio dignissim qui blandit praesent luptatum zzril delenit augue duis
dolore te feugait nulla facilisi. Lorem ipsum dolor sit amet, consectetuer.
";

fn chat() -> SpamSieve::executor::Pipeline {
    chat_pipeline(ChatOptions::default()).unwrap()
}

fn article() -> SpamSieve::executor::Pipeline {
    article_pipeline(ArticleOptions::default()).unwrap()
}

#[test]
fn test_chat_lowercases_capitals() {
    let message = "CAPITAL LETTER MESSAGE.";
    let pipeline = chat();
    let result = pipeline.check(message).unwrap();

    assert_eq!(result.changes_made, 1);
    assert!(result.passed);
    assert_eq!(result.result, message.to_lowercase());
}

#[test]
fn test_chat_rejects_character_spam() {
    let pipeline = chat();
    for spam in [
        "oeidbnfpiowsubvpesirfsbugvp",
        "pqiwfdjhiweufgbwoirngvb",
        "<osedifhrepiugvbnepiugbnpeo",
        "eifhbnipwseubvrierug0983745gt38704h2poirnf2pgivubo8q7waegfc",
        "03rhfeiubfwiolgvop984i",
        "pefjouwbnfviurghnnreb",
    ] {
        let result = pipeline.check(spam).unwrap();
        assert!(!result.passed, "{}", spam);
        assert!(result.has_failed_named("WordLengthFilter"), "{}", spam);
    }
}

#[test]
fn test_chat_rejects_symbol_spam() {
    let pipeline = chat();
    for spam in [
        "§(/%=)§%&=(/$&())",
        "?=&%()/)\"(&%§?%)",
        ")/)(&/=)((%((>:>)",
        "[]}{}][]}{[ß]}",
    ] {
        assert!(!pipeline.check(spam).unwrap().passed, "{}", spam);
    }
}

#[test]
fn test_chat_detects_bypass_attempts() {
    let pipeline = chat();
    let result = pipeline
        .check("I want to b y p a s s the f i l t e r.")
        .unwrap();
    assert!(!result.passed);
    // Normal-quick stops at the bypass detector, the first filter.
    assert_eq!(result.failed_filter_names(), vec!["BypassDetector"]);

    assert!(
        !pipeline
            .check(
                "This is a fairly long text, but it does still contain some, \
                 let's say, s u s p i c i o u s string of text in it!"
            )
            .unwrap()
            .passed
    );
}

#[test]
fn test_chat_accepts_ordinary_messages() {
    let pipeline = chat();
    for message in ["hey, how are you doing?", "gg wp", "See you at 8pm!"] {
        let result = pipeline.check(message).unwrap();
        assert!(result.passed, "{}", message);
        assert_eq!(result.result, message);
    }
}

#[test]
fn test_chat_with_blocklist() {
    let mut list = NamedTempFile::new().unwrap();
    write!(list, r#"["pancake"]"#).unwrap();
    list.flush().unwrap();

    let pipeline = chat_pipeline(ChatOptions::default().with_blocklist(list.path())).unwrap();
    let result = pipeline.check("I want a pancake.").unwrap();
    assert!(!result.passed);
    assert_eq!(result.failed_filter_names(), vec!["BlocklistFilter"]);
}

#[test]
fn test_chat_with_missing_blocklist_file() {
    let result = chat_pipeline(ChatOptions::default().with_blocklist("/nope/words.json"));
    assert!(matches!(result, Err(PipelineError::IoError { .. })));
}

#[test]
fn test_article_accepts_legitimate_text() {
    let pipeline = article();
    let result = pipeline.check(LEGITIMATE_ARTICLE).unwrap();
    assert!(result.passed, "failed: {:?}", result.failed_filter_names());
    assert_eq!(result.changes_made, 0);
    assert_eq!(result.result, LEGITIMATE_ARTICLE);
}

#[test]
fn test_article_length_bounds() {
    let pipeline = article();

    let too_long = LEGITIMATE_ARTICLE.repeat(400);
    let result = pipeline.check(&too_long).unwrap();
    assert_eq!(result.changes_made, 0);
    assert!(!result.passed);
    assert_eq!(result.failed_filter_names(), vec!["LengthFilter"]);

    let too_short: String = LEGITIMATE_ARTICLE.chars().take(64).collect();
    let result = pipeline.check(&too_short).unwrap();
    assert!(!result.passed);
    assert!(result.has_failed_named("LengthFilter"));
}

#[test]
fn test_article_rejects_bypass_sequences() {
    let text = format!(
        "{}\nThis sequence of the a-r-t-i-c-l-e consists o_f__p#r-o/f!a(n)i%t.y!\n",
        LEGITIMATE_ARTICLE
    );
    let pipeline = article();
    let result = pipeline.check(&text).unwrap();
    assert!(!result.passed);
    assert!(result.has_failed_named("BypassDetector"));
}

#[test]
fn test_article_rejects_shouting_instead_of_fixing_it() {
    let text = LEGITIMATE_ARTICLE.to_uppercase();
    let pipeline = article();
    let result = pipeline.check(&text).unwrap();
    assert!(!result.passed);
    assert_eq!(result.changes_made, 0);
    assert_eq!(result.result, text);
    assert!(result.has_failed_named("CapitalsFilter"));
}
