//! Built-in question set used when no question file is supplied.

use crate::model::QuestionDraft;

fn image_ref(n: usize) -> String {
    format!("https://picsum.photos/400/300?random={n}")
}

/// Sixteen mixed questions worth 91 points in total.
#[must_use]
pub fn default_questions() -> Vec<QuestionDraft> {
    let questions = vec![
        QuestionDraft::multi_choice(
            "Which of these planets are gas giants?",
            ["Mars", "Jupiter", "Saturn", "Venus"],
            [1, 2],
            8,
        ),
        QuestionDraft::single_choice(
            "What is the highest mountain in the world?",
            ["Mount Everest", "Kilimanjaro", "Mont Blanc", "Aconcagua"],
            0,
            5,
        ),
        QuestionDraft::single_choice(
            "What is the capital of China?",
            ["Shanghai", "Guangzhou", "Beijing", "Shenzhen"],
            2,
            5,
        ),
        QuestionDraft::single_choice(
            "How many months are there in a year?",
            ["10", "11", "12", "13"],
            2,
            5,
        ),
        QuestionDraft::single_choice(
            "What is the largest animal in the ocean?",
            ["Shark", "Blue whale", "Octopus", "Dolphin"],
            1,
            5,
        ),
        QuestionDraft::free_response("Name all seven colours of the rainbow in order.", 10),
        QuestionDraft::single_choice(
            "How long does the Earth take to orbit the Sun?",
            ["One month", "Half a year", "One year", "Two years"],
            2,
            5,
        ),
        QuestionDraft::single_choice(
            "What is the largest organ of the human body?",
            ["Heart", "Liver", "Skin", "Lungs"],
            2,
            5,
        ),
        QuestionDraft::free_response(
            "Explain why water boils at a lower temperature on a mountain top.",
            5,
        ),
        QuestionDraft::single_choice(
            "How many days are there in a week?",
            ["5", "6", "7", "8"],
            2,
            5,
        ),
        QuestionDraft::single_choice(
            "How many provinces does China have?",
            ["22", "23", "24", "25"],
            1,
            5,
        ),
        QuestionDraft::single_choice(
            "Roughly how fast does light travel?",
            ["300,000 km/s", "200,000 km/s", "400,000 km/s", "500,000 km/s"],
            0,
            5,
        ),
        QuestionDraft::multi_choice(
            "Which of these are oceans?",
            ["Atlantic", "Mediterranean", "Pacific", "Caspian"],
            [0, 2],
            8,
        ),
        QuestionDraft::single_choice(
            "How many bones are in the adult human body?",
            ["206", "196", "216", "186"],
            0,
            5,
        ),
        QuestionDraft::single_choice(
            "In which country are the pyramids of Giza?",
            ["Greece", "Egypt", "Italy", "Turkey"],
            1,
            5,
        ),
        QuestionDraft::free_response(
            "Name the smallest country in the world and the city it sits in.",
            5,
        ),
    ];

    questions
        .into_iter()
        .enumerate()
        .map(|(i, draft)| draft.with_image(image_ref(i + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionKind, validate_all};

    #[test]
    fn default_set_is_valid_and_mixed() {
        let questions = validate_all(default_questions()).unwrap();

        assert_eq!(questions.len(), 16);
        assert_eq!(questions.iter().map(|q| q.points()).sum::<u32>(), 91);
        for kind in [
            QuestionKind::SingleChoice,
            QuestionKind::MultiChoice,
            QuestionKind::FreeResponse,
        ] {
            assert!(questions.iter().any(|q| q.kind() == kind));
        }
        assert!(questions[0].image_ref().ends_with("random=1"));
    }
}
