use super::*;

#[test]
fn markdown_links_keep_their_label() {
    assert_eq!(
        clean_text("see [my post](https://example.com/p) for more"),
        "see my post for more"
    );
}

#[test]
fn bare_urls_are_removed() {
    assert_eq!(clean_text("link: https://x.y/z?q=1 ok"), "link:  ok");
}

#[test]
fn edit_lines_are_removed_case_insensitively() {
    let text = "Story body.\n\nEDIT: thanks for the gold\nUpdate: they moved out";
    assert_eq!(clean_text(text), "Story body.\nUpdate: they moved out");
    // Not preceded by a line break: kept.
    assert_eq!(clean_text("edit: inline"), "edit: inline");
}

#[test]
fn rule_runs_collapse_to_a_space() {
    assert_eq!(clean_text("part one----part two __ end"), "part one part two   end");
    assert_eq!(clean_text("well-known"), "well-known");
}

#[test]
fn empty_text_stays_empty() {
    assert_eq!(clean_text("   \n "), "");
}

#[test]
fn truncation_counts_characters_and_appends_ellipsis() {
    assert_eq!(truncate_body("short", 500), "short");
    assert_eq!(truncate_body("abcdef", 3), "abc...");
    assert_eq!(truncate_body("ééééé", 2), "éé...");
    let exact = "x".repeat(DEFAULT_BODY_LIMIT);
    assert_eq!(truncate_body(&exact, DEFAULT_BODY_LIMIT), exact);
}

#[test]
fn ticks_convert_to_seconds() {
    let words = boundaries_to_words(&[
        WordBoundary {
            text: "Hello".to_string(),
            offset: 1_000_000,
            duration: 4_000_000,
        },
        WordBoundary {
            text: "world".to_string(),
            offset: 6_000_000,
            duration: 5_000_000,
        },
    ]);
    assert_eq!(words[0], TimedWord::new("Hello", 0.1, 0.5));
    assert_eq!(words[1], TimedWord::new("world", 0.6, 1.1));
}
