use crate::InputRecord;

/// (review, movie title, user id)
const SAMPLE_REVIEWS: [(&str, &str, &str); 10] = [
    (
        "This movie was absolutely fantastic! The acting was superb and the plot was engaging from start to finish. I couldn't take my eyes off the screen.",
        "The Great Adventure",
        "user001",
    ),
    (
        "Terrible movie. Boring plot, bad acting, and a complete waste of time. I regret watching it.",
        "The Boring Disaster",
        "user002",
    ),
    (
        "Amazing cinematography and brilliant performances by the entire cast. This is a masterpiece that will be remembered for years.",
        "Cinematic Masterpiece",
        "user003",
    ),
    (
        "I found this movie to be quite disappointing. The story had potential but was poorly executed.",
        "Missed Opportunity",
        "user004",
    ),
    (
        "Absolutely loved it! The characters were well-developed and the story was compelling. Highly recommend!",
        "Character Driven Drama",
        "user005",
    ),
    (
        "This film was a complete disaster. Poor direction, weak script, and terrible special effects.",
        "Special Effects Nightmare",
        "user006",
    ),
    (
        "A heartwarming story with beautiful visuals and touching moments. This movie touched my soul.",
        "Heartwarming Tale",
        "user007",
    ),
    (
        "Mediocre at best. Nothing special about this movie. It was just okay.",
        "Average Film",
        "user008",
    ),
    (
        "Outstanding performance by the lead actor! The movie exceeded all my expectations and delivered an unforgettable experience.",
        "Outstanding Performance",
        "user009",
    ),
    (
        "I was really looking forward to this movie but it was a huge disappointment. The plot made no sense.",
        "Plot Confusion",
        "user010",
    ),
];

/// The pipeline check batch: `n` movie reviews, cycling through the sample set
/// when `n` exceeds it. Every record carries `correlation_id` and a 1-based
/// sequence number.
pub fn sample_reviews(
    n: usize,
    correlation_id: &str,
) -> Vec<InputRecord> {
    SAMPLE_REVIEWS
        .iter()
        .cycle()
        .take(n)
        .enumerate()
        .map(|(i, (review, title, user))| {
            InputRecord::new(*review)
                .with_title(*title)
                .with_author(*user)
                .with_correlation_id(correlation_id)
                .with_sequence((i + 1) as u32)
        })
        .collect()
}
