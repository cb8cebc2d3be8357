use super::article::Section;

pub const WORDS_PER_MINUTE: u64 = 200;

/// Counts words separated by runs of whitespace. Empty and whitespace-only
/// strings have no words.
pub fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

pub fn count_section_words(section: &Section) -> u64 {
    let body: u64 = section
        .body
        .iter()
        .map(|paragraph| count_words(&paragraph.text))
        .sum();
    count_words(&section.heading) + body
}

pub fn count_article_words(sections: &[Section]) -> u64 {
    sections.iter().map(count_section_words).sum()
}

/// Minutes needed to read `word_count` words, any started minute counted as a full one.
pub fn read_time_for(word_count: u64) -> u64 {
    word_count.div_ceil(WORDS_PER_MINUTE)
}

pub fn compute_read_time(sections: &[Section]) -> u64 {
    read_time_for(count_article_words(sections))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> String {
        vec!["word"; count].join(" ")
    }

    #[test]
    fn test_empty_article_takes_no_time() {
        assert_eq!(compute_read_time(&[]), 0);
    }

    #[test]
    fn test_heading_and_body_are_counted() {
        let sections = vec![Section::new("Intro", ["one two three"])];

        assert_eq!(count_article_words(&sections), 4);
        assert_eq!(compute_read_time(&sections), 1);
    }

    #[test]
    fn test_empty_strings_have_no_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \t\n "), 0);

        let sections = vec![Section::new("", ["", "   "])];
        assert_eq!(count_article_words(&sections), 0);
        assert_eq!(compute_read_time(&sections), 0);
    }

    #[test]
    fn test_whitespace_distribution_does_not_matter() {
        let tight = vec![Section::new("A title", ["one two three", "four five"])];
        let loose = vec![Section::new(
            "  A\t\ttitle ",
            ["one   two\nthree", "\tfour  five  "],
        )];

        assert_eq!(count_article_words(&tight), count_article_words(&loose));
        assert_eq!(compute_read_time(&tight), compute_read_time(&loose));
    }

    #[test]
    fn test_partial_minute_rounds_up() {
        let exact = vec![Section::new("", [words(200)])];
        let over = vec![Section::new("", [words(201)])];
        let double = vec![Section::new("", [words(150), words(250)])];

        assert_eq!(compute_read_time(&exact), 1);
        assert_eq!(compute_read_time(&over), 2);
        assert_eq!(compute_read_time(&double), 2);
    }

    #[test]
    fn test_words_are_summed_across_sections() {
        let sections = vec![
            Section::new("First part", [words(120)]),
            Section::new("Second part", [words(100), words(78)]),
        ];

        assert_eq!(count_article_words(&sections), 302);
        assert_eq!(compute_read_time(&sections), 302u64.div_ceil(200));
    }
}
