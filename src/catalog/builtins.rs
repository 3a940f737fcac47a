//! Built-in question catalog used when no catalog file is configured.

use super::types::Question;

/// The default survey: two free-text, two choice and two scale questions.
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::text("What is your name?").required(),
        Question::text("What is your favorite color?"),
        Question::choice("What is your favorite pet?", ["Dog", "Cat", "Bird", "Other"]),
        Question::choice(
            "What is your favorite fruit?",
            ["Apple", "Banana", "Cherry", "Other"],
        ),
        Question::range("On a scale of 1 to 6, how do you feel today?", 1, 6)
            .required()
            .with_labels("Sad", "Happy"),
        Question::range("On a scale of 1 to 6, how much do you like ice cream?", 1, 6)
            .required()
            .with_labels("Not at all", "Quite a bit"),
    ]
}
